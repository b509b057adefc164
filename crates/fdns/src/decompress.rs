//! Streaming gzip stage.

use fdns_core::ParseError;
use flate2::bufread::MultiGzDecoder;
use std::io::{self, BufRead, BufReader, Chain, Cursor, Read};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decompressed view of a gzip source
pub(crate) type Decompressed<R> = BufReader<MultiGzDecoder<BufReader<Chain<Cursor<[u8; 2]>, R>>>>;

/// Wrap `reader` in a streaming gzip decoder
///
/// The magic bytes are checked up front and the first block is decoded
/// eagerly, so a source that is not gzip fails here with
/// [`ParseError::Format`] instead of on some later line. Concatenated gzip
/// members are read as one stream.
pub(crate) fn open<R: Read>(mut reader: R) -> Result<Decompressed<R>, ParseError> {
    let mut magic = [0u8; 2];
    reader.read_exact(&mut magic).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => ParseError::Format(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input ended before the gzip header",
        )),
        _ => ParseError::Io(e),
    })?;

    if magic != GZIP_MAGIC {
        return Err(ParseError::Format(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("missing gzip magic bytes, found {:02x} {:02x}", magic[0], magic[1]),
        )));
    }

    let input = BufReader::new(Cursor::new(magic).chain(reader));
    let mut stream = BufReader::new(MultiGzDecoder::new(input));
    stream.fill_buf().map_err(|e| match e.kind() {
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            ParseError::Format(e)
        }
        _ => ParseError::Io(e),
    })?;

    Ok(stream)
}
