//! The output sink shared by the three pipeline back ends.
//!
//! The dumper and the C-array emitter only need [`Write`]; the reverse
//! parser additionally seeks forward over gaps, producing a sparse file on
//! filesystems that support holes.  Seeking is only meaningful on a real
//! file, so [`Output::seek_to`] reports an error for standard output and
//! the caller turns that into a fatal diagnostic.

use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};

pub enum Output {
    Stdout(io::Stdout),
    File(BufWriter<File>),
}

impl Output {
    /// Moves the write position to absolute offset `pos`, creating a hole on
    /// filesystems that support it.  Fails on standard output.
    pub fn seek_to(&mut self, pos: u64) -> io::Result<()> {
        match self {
            Output::Stdout(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "standard output is not seekable",
            )),
            Output::File(f) => f.seek(SeekFrom::Start(pos)).map(|_| ()),
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(s) => s.write(buf),
            Output::File(f) => f.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(s) => s.flush(),
            Output::File(f) => f.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn file_output_seek_creates_hole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        let mut out = Output::File(BufWriter::new(File::create(&path).unwrap()));
        out.write_all(b"AB").unwrap();
        out.seek_to(6).unwrap();
        out.write_all(b"CD").unwrap();
        out.flush().unwrap();

        let mut got = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut got).unwrap();
        assert_eq!(got, b"AB\0\0\0\0CD");
    }

    #[test]
    fn stdout_refuses_seek() {
        let mut out = Output::Stdout(io::stdout());
        assert!(out.seek_to(8).is_err());
    }
}
