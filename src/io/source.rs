//! The byte source feeding the match engine.
//!
//! [`ByteSource`] layers three things over any reader: a guaranteed
//! one-byte push-back slot, a running total of delivered bytes, and a
//! configurable delivery ceiling.  An initial skip is applied at
//! construction — by seeking when the input is an addressable file, by
//! reading and discarding otherwise — and never counts toward the total.
//!
//! A mid-stream read error is not recoverable anywhere downstream, so it is
//! reported and the process exits with an I/O status right here.

use std::io::{Read, Seek, SeekFrom};

use crate::fatal_io;
use crate::io::Input;

pub struct ByteSource {
    inner: Input,
    /// User-facing stream name for diagnostics.
    path: String,
    /// The single guaranteed push-back slot.
    ungot: Option<u8>,
    /// Bytes delivered so far; [`ByteSource::unget`] decrements.
    total_read: u64,
    /// Delivery ceiling (`u64::MAX` = unlimited).
    max_bytes: u64,
}

impl ByteSource {
    /// Wraps `inner`, skipping `skip` bytes up front.
    pub fn new(mut inner: Input, path: &str, skip: u64, max_bytes: u64) -> ByteSource {
        if skip > 0 {
            skip_input(&mut inner, path, skip);
        }
        ByteSource {
            inner,
            path: path.to_owned(),
            ungot: None,
            total_read: 0,
            max_bytes,
        }
    }

    /// Delivers the next byte, or `None` at end of data or at the ceiling.
    pub fn get(&mut self) -> Option<u8> {
        if self.total_read >= self.max_bytes {
            return None;
        }
        if let Some(b) = self.ungot.take() {
            self.total_read += 1;
            return Some(b);
        }
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return None,
                Ok(_) => {
                    self.total_read += 1;
                    return Some(byte[0]);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => fatal_io!(&self.path, "read error: {}", e),
            }
        }
    }

    /// Returns `b` to the source; the next [`ByteSource::get`] will deliver
    /// it again.  At most one byte may be outstanding.
    pub fn unget(&mut self, b: u8) {
        debug_assert!(self.ungot.is_none(), "push-back slot already occupied");
        self.ungot = Some(b);
        self.total_read -= 1;
    }

    /// Total bytes delivered (net of push-backs).
    #[inline]
    pub fn total_read(&self) -> u64 {
        self.total_read
    }
}

/// Applies the initial skip: seek when possible, read-and-discard otherwise.
fn skip_input(input: &mut Input, path: &str, skip: u64) {
    match input {
        // Not every named path is seekable (FIFOs, devices); fall back to
        // draining on error.
        Input::File(f) => {
            if f.seek(SeekFrom::Start(skip)).is_ok() {
                return;
            }
        }
        Input::Mem(m) => {
            m.set_position(skip);
            return;
        }
        Input::Stdin(_) => {}
    }
    let mut remaining = skip;
    let mut chunk = [0u8; 4096];
    while remaining > 0 {
        let want = chunk.len().min(remaining as usize);
        match input.read(&mut chunk[..want]) {
            Ok(0) => return, // input shorter than the skip: nothing to dump
            Ok(n) => remaining -= n as u64,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => fatal_io!(path, "read error while skipping: {}", e),
        }
    }
}
