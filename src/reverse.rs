//! Reverse mode: reconstruct bytes from a previously emitted dump.
//!
//! The input grammar is exactly what the dumper writes with offsets enabled:
//! data rows (offset, `:`, hex bytes, optional ASCII column) and elision
//! separators (offset-width dashes with the suppressed byte count).  Offsets
//! must advance by one row per line; a larger jump becomes a seek in the
//! output, producing a sparse file; an elision materializes as repetitions
//! of the previous row.
//!
//! Every violation is fatal with the input name and the 1-based line and
//! column where parsing stopped.

use std::fmt;
use std::io::{self, BufRead, BufReader, Write};

use crate::cli::constants::{OFFSET_WIDTH_MAX, OFFSET_WIDTH_MIN};
use crate::config::Config;
use crate::io::{Input, Output};

// ── Errors ────────────────────────────────────────────────────────────────────

/// A grammar violation at a specific spot in the dump.
#[derive(Debug)]
pub struct ParseError {
    pub path: String,
    /// 1-based line number.
    pub line: u64,
    /// 1-based column number.
    pub col: usize,
    /// What the parser needed at that position.
    pub expected: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}: {}", self.path, self.line, self.col, self.expected)
    }
}

impl std::error::Error for ParseError {}

/// Reverse-mode failure: either malformed dump data or an output problem.
#[derive(Debug)]
pub enum ReverseError {
    Parse(ParseError),
    Io(io::Error),
}

impl fmt::Display for ReverseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReverseError::Parse(e) => e.fmt(f),
            ReverseError::Io(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for ReverseError {}

impl From<io::Error> for ReverseError {
    fn from(e: io::Error) -> Self {
        ReverseError::Io(e)
    }
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser<'a> {
    config: &'a Config,
    path: String,
    line_no: u64,
    /// Offset of the last materialized row, `None` before the first.
    prev_offset: Option<u64>,
    /// Bytes of the last data row, for elision expansion.
    last_row: Vec<u8>,
}

/// Runs reverse mode: parses the dump arriving on `input` and writes the
/// reconstructed bytes to `out`.
pub fn reverse(config: &Config, input: Input, out: &mut Output) -> Result<(), ReverseError> {
    let mut parser = Parser {
        config,
        path: config.input_path.clone(),
        line_no: 0,
        prev_offset: None,
        last_row: Vec::new(),
    };
    let mut reader = BufReader::new(input);
    let mut line: Vec<u8> = Vec::new();
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            break;
        }
        parser.line_no += 1;
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        parser.parse_line(&line, out)?;
    }
    out.flush()?;
    Ok(())
}

impl Parser<'_> {
    fn error(&self, col: usize, expected: impl Into<String>) -> ReverseError {
        ReverseError::Parse(ParseError {
            path: self.path.clone(),
            line: self.line_no,
            col: col + 1,
            expected: expected.into(),
        })
    }

    fn parse_line(&mut self, line: &[u8], out: &mut Output) -> Result<(), ReverseError> {
        if line.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(());
        }
        let dashes = line.iter().take_while(|&&b| b == b'-').count();
        if dashes >= OFFSET_WIDTH_MIN {
            return self.parse_elision(line, dashes, out);
        }
        self.parse_data_row(line, out)
    }

    // ── Elision separator ─────────────────────────────────────────────────────

    fn parse_elision(&mut self, line: &[u8], dashes: usize, out: &mut Output) -> Result<(), ReverseError> {
        if dashes > OFFSET_WIDTH_MAX {
            return Err(self.error(OFFSET_WIDTH_MAX, "at most 16 '-' characters"));
        }
        let mut pos = dashes;
        pos = self.expect(line, pos, b": (")?;
        let (delta, next) = self.scan_number(line, pos, 10)?;
        pos = next;
        pos = self.expect(line, pos, b" | 0x")?;
        let (delta_hex, next) = self.scan_number(line, pos, 16)?;
        pos = next;
        pos = self.expect(line, pos, b")")?;
        if pos != line.len() {
            return Err(self.error(pos, "end of line"));
        }
        if delta_hex != delta {
            return Err(self.error(dashes + 3, "matching decimal and hex byte counts"));
        }

        let row_bytes = self.config.row_bytes as u64;
        if delta == 0 || delta % row_bytes != 0 {
            return Err(self.error(dashes + 3, format!("a multiple of {} bytes", row_bytes)));
        }
        let Some(prev) = self.prev_offset else {
            return Err(self.error(0, "a data row before any elision"));
        };
        if self.last_row.len() != self.config.row_bytes {
            return Err(self.error(0, "a full-width row before an elision"));
        }
        for _ in 0..delta / row_bytes {
            out.write_all(&self.last_row)?;
        }
        self.prev_offset = Some(prev + delta);
        Ok(())
    }

    // ── Data row ──────────────────────────────────────────────────────────────

    fn parse_data_row(&mut self, line: &[u8], out: &mut Output) -> Result<(), ReverseError> {
        let radix = match self.config.offsets {
            Some(format) => format.radix(),
            None => 16,
        };
        let (new_offset, mut pos) = self.scan_number(line, 0, radix)?;
        if pos >= line.len() || line[pos] != b':' {
            return Err(self.error(pos, "':' after the offset"));
        }
        pos += 1;

        let bytes = self.scan_hex_bytes(line, &mut pos)?;
        if bytes.is_empty() {
            // Offset-only line: accepted and skipped.
            return Ok(());
        }

        let row_bytes = self.config.row_bytes as u64;
        let expected_next = match self.prev_offset {
            Some(prev) => prev + row_bytes,
            None => 0,
        };
        if new_offset < expected_next {
            return Err(self.error(0, format!("an offset of at least 0x{:x}", expected_next)));
        }
        if new_offset > expected_next {
            // Forward gap: hole in the output.
            out.seek_to(new_offset)?;
        }
        out.write_all(&bytes)?;
        self.prev_offset = Some(new_offset);
        self.last_row = bytes;
        Ok(())
    }

    /// Scans whitespace-separated 2-digit hex bytes.  Two consecutive blanks
    /// terminate the portion — three when sitting at the byte-8 boundary,
    /// where the dump itself puts a double blank.
    fn scan_hex_bytes(&self, line: &[u8], pos: &mut usize) -> Result<Vec<u8>, ReverseError> {
        let mut bytes: Vec<u8> = Vec::with_capacity(self.config.row_bytes);
        loop {
            let ws_start = *pos;
            while *pos < line.len() && (line[*pos] == b' ' || line[*pos] == b'\t') {
                *pos += 1;
            }
            let ws = *pos - ws_start;
            if *pos >= line.len() {
                return Ok(bytes);
            }
            let at_mid_gap = bytes.len() == 8 && ws == 2;
            if ws >= 2 && !at_mid_gap {
                return Ok(bytes); // the rest is the ASCII column
            }
            // One or more byte groups follow.
            let mut any = false;
            while *pos + 1 < line.len()
                && line[*pos].is_ascii_hexdigit()
                && line[*pos + 1].is_ascii_hexdigit()
            {
                if bytes.len() == self.config.row_bytes {
                    return Err(self.error(*pos, format!("at most {} bytes per row", self.config.row_bytes)));
                }
                let hi = hex_digit(line[*pos]);
                let lo = hex_digit(line[*pos + 1]);
                bytes.push((hi << 4) | lo);
                *pos += 2;
                any = true;
            }
            if !any {
                return Err(self.error(*pos, "a 2-digit hex byte"));
            }
            if *pos < line.len() && line[*pos] != b' ' && line[*pos] != b'\t' {
                return Err(self.error(*pos, "whitespace after a hex byte"));
            }
        }
    }

    // ── Scanning helpers ──────────────────────────────────────────────────────

    /// Requires the literal `expected` at `pos`; returns the position after it.
    fn expect(&self, line: &[u8], pos: usize, expected: &[u8]) -> Result<usize, ReverseError> {
        if line.len() >= pos + expected.len() && &line[pos..pos + expected.len()] == expected {
            Ok(pos + expected.len())
        } else {
            Err(self.error(
                pos,
                format!("'{}'", String::from_utf8_lossy(expected)),
            ))
        }
    }

    /// Scans a run of digits in `radix`; at least one digit is required.
    fn scan_number(&self, line: &[u8], pos: usize, radix: u32) -> Result<(u64, usize), ReverseError> {
        let mut value: u64 = 0;
        let mut i = pos;
        while i < line.len() {
            let d = match (line[i] as char).to_digit(radix) {
                Some(d) => d,
                None => break,
            };
            value = value
                .checked_mul(radix as u64)
                .and_then(|v| v.checked_add(d as u64))
                .ok_or_else(|| self.error(pos, "an offset that fits in 64 bits"))?;
            i += 1;
        }
        if i == pos {
            let what = match radix {
                8 => "an octal offset",
                10 => "a decimal number",
                _ => "a hexadecimal number",
            };
            return Err(self.error(pos, what));
        }
        Ok((value, i))
    }
}

#[inline]
fn hex_digit(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}
