//! Reading configuration payloads from a file or standard input.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use tracing::debug;

use crate::error::{FconfError, Result};

/// `--config` value that reads the payload from standard input.
pub const STDIN_SENTINEL: &str = "stdin";

/// Read a configuration payload from a file, or from stdin when `src` is
/// [`STDIN_SENTINEL`].
pub fn read_payload(src: &str) -> Result<Vec<u8>> {
    if src.is_empty() {
        return Err(FconfError::validation("missing configuration source"));
    }
    if src == STDIN_SENTINEL {
        let stdin = io::stdin();
        return read_line(&mut stdin.lock());
    }

    debug!(path = src, "reading configuration");
    fs::read(src).map_err(|e| FconfError::io(Path::new(src), e))
}

/// Read up to and including the first newline.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .read_until(b'\n', &mut buf)
        .map_err(|e| FconfError::io(STDIN_SENTINEL, e))?;
    Ok(buf)
}
