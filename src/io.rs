//! Stream plumbing: opening the input and output, sentinels, and the
//! one-byte-push-back byte source.
//!
//! Open failures are fatal here (missing input, uncreatable output) so the
//! pipeline proper never sees a half-configured run.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read};

use crate::cli::constants::{fatal, EX_CANTCREAT, EX_NOINPUT, STD_STREAM_MARK};

pub mod output;
pub mod source;

pub use output::Output;
pub use source::ByteSource;

/// An opened input stream.  Files (and in-memory buffers) stay addressable
/// so the initial skip can seek instead of reading.
pub enum Input {
    Stdin(std::io::Stdin),
    File(BufReader<File>),
    Mem(std::io::Cursor<Vec<u8>>),
}

impl Input {
    /// Wraps an in-memory byte buffer as an input stream.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Input {
        Input::Mem(std::io::Cursor::new(bytes.into()))
    }
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Input::Stdin(s) => s.read(buf),
            Input::File(f) => f.read(buf),
            Input::Mem(m) => m.read(buf),
        }
    }
}

/// Opens `path` for reading; `-` selects standard input (switched to binary
/// mode on Windows).  A missing or unreadable file is fatal.
pub fn open_input(path: &str) -> Input {
    if path == STD_STREAM_MARK {
        #[cfg(windows)]
        // SAFETY: setting the mode of fd 0 is always valid.
        unsafe {
            libc::_setmode(0, libc::O_BINARY);
        }
        return Input::Stdin(std::io::stdin());
    }
    match File::open(path) {
        Ok(f) => Input::File(BufReader::new(f)),
        Err(e) => fatal(EX_NOINPUT, &format!("{}: {}", path, e)),
    }
}

/// Opens `path` for writing; `-` selects standard output (switched to binary
/// mode on Windows).  A file that cannot be created is fatal.
pub fn open_output(path: &str) -> Output {
    if path == STD_STREAM_MARK {
        #[cfg(windows)]
        // SAFETY: setting the mode of fd 1 is always valid.
        unsafe {
            libc::_setmode(1, libc::O_BINARY);
        }
        return Output::Stdout(std::io::stdout());
    }
    match File::create(path) {
        Ok(f) => Output::File(BufWriter::new(f)),
        Err(e) => fatal(EX_CANTCREAT, &format!("{}: {}", path, e)),
    }
}
