//! Input and output stream selection.
//!
//! `None` or `-` means stdin/stdout. Decompression is chosen by flag, not by
//! sniffing the stream. Dumps are published as multistream bzip2, so the
//! decoder keeps going across stream boundaries.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;

use bzip2::read::MultiBzDecoder;

const READ_BUFFER: usize = 256 * 1024;

fn is_stdio(path: Option<&Path>) -> bool {
    path.map_or(true, |p| p.as_os_str() == "-")
}

/// Buffer a raw byte stream, decompressing it first when `bzip2` is set.
pub fn wrap_reader<'a, R: Read + 'a>(raw: R, bzip2: bool) -> Box<dyn BufRead + 'a> {
    if bzip2 {
        Box::new(BufReader::with_capacity(READ_BUFFER, MultiBzDecoder::new(raw)))
    } else {
        Box::new(BufReader::with_capacity(READ_BUFFER, raw))
    }
}

pub fn open_input(path: Option<&Path>, bzip2: bool) -> io::Result<Box<dyn BufRead>> {
    match path {
        Some(p) if !is_stdio(path) => Ok(wrap_reader(File::open(p)?, bzip2)),
        _ => Ok(wrap_reader(io::stdin(), bzip2)),
    }
}

/// Unbuffered sink; the pipeline's writer adds its own buffer.
pub fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write + Send>> {
    match path {
        Some(p) if !is_stdio(path) => Ok(Box::new(File::create(p)?)),
        _ => Ok(Box::new(io::stdout())),
    }
}
