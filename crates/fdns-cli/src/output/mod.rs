//! Output formatting for matches.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, BufWriter, Write};
use std::str::FromStr;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One match per line
    #[default]
    Plain,
    /// One JSON string per line
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" | "jsonl" => Ok(Self::Json),
            _ => anyhow::bail!(
                "Unknown output format: {}\n\
                 Valid formats: plain, json",
                s
            ),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Writes matches to a buffered sink
pub struct Printer<W: Write> {
    writer: BufWriter<W>,
    format: OutputFormat,
}

impl<W: Write> Printer<W> {
    /// Create a printer writing `format` lines to `writer`
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer: BufWriter::new(writer),
            format,
        }
    }

    /// Write one match
    pub fn print(&mut self, item: &str) -> io::Result<()> {
        match self.format {
            OutputFormat::Plain => writeln!(self.writer, "{item}"),
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.writer, item)?;
                self.writer.write_all(b"\n")
            }
        }
    }

    /// Flush buffered output
    pub fn finish(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Returns true for errors caused by the reader of stdout going away
pub fn is_broken_pipe(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::BrokenPipe
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(format: OutputFormat, items: &[&str]) -> String {
        let mut buf = Vec::new();
        let mut printer = Printer::new(&mut buf, format);
        for item in items {
            printer.print(item).unwrap();
        }
        printer.finish().unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plain_prints_lines() {
        assert_eq!(
            render(OutputFormat::Plain, &["a.example.com", "b.example.com"]),
            "a.example.com\nb.example.com\n"
        );
    }

    #[test]
    fn json_quotes_and_escapes() {
        assert_eq!(
            render(OutputFormat::Json, &["a.example.com", "we\"ird"]),
            "\"a.example.com\"\n\"we\\\"ird\"\n"
        );
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Plain);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
