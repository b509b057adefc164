mod filter;
mod record;

pub use filter::*;
pub use record::*;
