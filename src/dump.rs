//! Row framing and dump formatting.
//!
//! The framer pulls `(byte, matched)` pairs from the match engine, packs
//! them into rows, and decides which rows reach the output: rows with any
//! match always do; other rows pass the suppression gauntlet (matching-only,
//! identical-row elision, printing-only).  Rows are double-buffered so the
//! last row is known one row ahead, which also lets the ASCII column finish
//! a UTF-8 character that crosses into the next row.
//!
//! The row layout is fixed and shared with the reverse parser: zero-padded
//! offset, `:`, hex groups each followed by one space (plus one extra after
//! byte 8 for narrow groupings), two more spaces, ASCII column.

use std::io::{self, Write};

use crate::cli::arg_utils::format_radix;
use crate::cli::constants::ROW_BYTES_MAX;
use crate::color::{color_end, color_start};
use crate::config::{Config, TotalMatches};
use crate::matcher::Matcher;
use crate::utf8::{utf8_decode, utf8_len};

/// One output line's worth of bytes plus per-byte match flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub bytes: [u8; ROW_BYTES_MAX],
    pub len: usize,
    /// Bit *i* (LSB = leftmost byte) set iff byte *i* matched.
    pub match_bits: u32,
}

impl Row {
    fn new() -> Row {
        Row {
            bytes: [0; ROW_BYTES_MAX],
            len: 0,
            match_bits: 0,
        }
    }

    #[inline]
    fn is_matched(&self, i: usize) -> bool {
        self.match_bits & (1 << i) != 0
    }

    /// Returns `true` when any byte is printable ASCII (`0x20..=0x7E`).
    fn has_printable(&self) -> bool {
        self.bytes[..self.len].iter().any(|b| (0x20..=0x7E).contains(b))
    }

    /// Row equality for elision: byte content only, match state aside.
    fn same_bytes(&self, other: &Row) -> bool {
        self.len == other.len && self.bytes[..self.len] == other.bytes[..other.len]
    }
}

/// Pulls up to `row_bytes` pairs into a fresh row.
fn next_row(matcher: &mut Matcher, row_bytes: usize) -> Option<Row> {
    let mut row = Row::new();
    while row.len < row_bytes {
        match matcher.next_byte() {
            Some((b, matched)) => {
                row.bytes[row.len] = b;
                if matched {
                    row.match_bits |= 1 << row.len;
                }
                row.len += 1;
            }
            None => break,
        }
    }
    (row.len > 0).then_some(row)
}

/// Runs the dump pipeline to completion.
///
/// The total match count is read back from `matcher` by the caller; with
/// `--total-matches-only` the engine still runs but nothing is written.
pub fn dump(config: &Config, matcher: &mut Matcher, out: &mut dyn Write) -> io::Result<()> {
    if config.total_matches == TotalMatches::PrintOnly {
        while matcher.next_byte().is_some() {}
        return Ok(());
    }

    let row_bytes = config.row_bytes;
    let mut offset: u64 = config.skip;
    let mut last_emitted: Option<(u64, Row)> = None;
    let mut carry = 0usize; // leading cells of the current row covered by the previous row's character
    let mut cur = next_row(matcher, row_bytes);

    while let Some(row) = cur {
        let next = next_row(matcher, row_bytes);
        let is_last = next.is_none();

        let differs = match last_emitted {
            Some((_, ref prev)) => !row.same_bytes(prev),
            None => true,
        };
        let emit = row.match_bits != 0
            || (!config.matching_only
                && (config.verbose || differs || is_last)
                && (!config.printing_only || row.has_printable()));

        if emit {
            if let Some((prev_offset, _)) = last_emitted {
                let gap = offset - prev_offset;
                if gap > row_bytes as u64 {
                    write_elision(config, out, gap - row_bytes as u64)?;
                }
            }
            carry = write_row(config, out, offset, &row, next.as_ref(), carry)?;
            last_emitted = Some((offset, row));
        } else {
            carry = 0;
        }

        offset += row.len as u64;
        cur = next;
    }
    Ok(())
}

// ── Formatting ────────────────────────────────────────────────────────────────

/// Writes the elision separator: offset-width dashes, then the suppressed
/// byte count in decimal and hex.
fn write_elision(config: &Config, out: &mut dyn Write, delta: u64) -> io::Result<()> {
    let colors = &config.colors;
    color_start(out, &colors.separator)?;
    write!(out, "{}:", "-".repeat(config.offset_width()))?;
    color_end(out, &colors.separator)?;
    write!(out, " (")?;
    color_start(out, &colors.elided)?;
    write!(out, "{} | 0x{:x}", delta, delta)?;
    color_end(out, &colors.elided)?;
    write!(out, ")")?;
    end_colored_line(config, out)
}

/// Finishes a line on which colors may have been used: clear to the end of
/// the line so colored backgrounds do not bleed, unless the `ne` capability
/// suppresses it.
fn end_colored_line(config: &Config, out: &mut dyn Write) -> io::Result<()> {
    if config.colors.any() && !config.colors.no_eol_reset {
        write!(out, "\x1B[K")?;
    }
    writeln!(out)
}

/// Writes one dump row.  Returns the number of leading bytes of the next
/// row consumed by a UTF-8 character that started in this one.
fn write_row(
    config: &Config,
    out: &mut dyn Write,
    offset: u64,
    row: &Row,
    next: Option<&Row>,
    carry: usize,
) -> io::Result<usize> {
    let colors = &config.colors;

    if let Some(format) = config.offsets {
        color_start(out, &colors.offset)?;
        write!(
            out,
            "{}",
            format_radix(offset, format.radix(), config.offset_width())
        )?;
        color_end(out, &colors.offset)?;
        color_start(out, &colors.separator)?;
        write!(out, ":")?;
        color_end(out, &colors.separator)?;
        write!(out, " ")?;
    }

    write_hex_columns(config, out, row)?;

    let mut carry_out = 0;
    if config.ascii {
        write!(out, "  ")?;
        carry_out = write_ascii_column(config, out, row, next, carry)?;
    }
    end_colored_line(config, out)?;
    Ok(carry_out)
}

/// Writes the hex columns, bracketing matched bytes with the hex-match
/// capability.  A color run is closed around every inter-group space and
/// reopened on the other side.
fn write_hex_columns(config: &Config, out: &mut dyn Write, row: &Row) -> io::Result<()> {
    let colors = &config.colors;
    // Rendered into a buffer so the trailing padding can be dropped when
    // there is no ASCII column to align.
    let mut area: Vec<u8> = Vec::with_capacity(ROW_BYTES_MAX * 4);
    let mut in_match = false;

    for i in 0..config.row_bytes {
        if i < row.len {
            if row.is_matched(i) && !in_match {
                color_start(&mut area, &colors.match_hex)?;
                in_match = true;
            } else if !row.is_matched(i) && in_match {
                color_end(&mut area, &colors.match_hex)?;
                in_match = false;
            }
            write!(area, "{:02X}", row.bytes[i])?;
        } else {
            if in_match {
                color_end(&mut area, &colors.match_hex)?;
                in_match = false;
            }
            area.extend_from_slice(b"  ");
        }
        if (i + 1) % config.group_by == 0 {
            // Close the run around the separator space so the gap itself is
            // never colored.
            if in_match {
                color_end(&mut area, &colors.match_hex)?;
            }
            area.push(b' ');
            if i == 7 && config.group_by < 8 {
                area.push(b' ');
            }
            if in_match {
                if i + 1 < row.len && row.is_matched(i + 1) {
                    color_start(&mut area, &colors.match_hex)?;
                } else {
                    in_match = false;
                }
            }
        }
    }
    if in_match {
        color_end(&mut area, &colors.match_hex)?;
    }

    if !config.ascii {
        while area.last() == Some(&b' ') {
            area.pop();
        }
    }
    out.write_all(&area)
}

/// Writes the ASCII column.  Returns the carry into the next row.
fn write_ascii_column(
    config: &Config,
    out: &mut dyn Write,
    row: &Row,
    next: Option<&Row>,
    carry: usize,
) -> io::Result<usize> {
    let colors = &config.colors;
    let mut in_match = false;
    let mut carry_out = 0usize;
    // Cells of this row already covered by a character printed earlier.
    let mut covered = carry.min(row.len);
    let mut i = 0usize;

    while i < row.len {
        let matched = row.is_matched(i);
        if matched && !in_match {
            color_start(out, &colors.match_ascii)?;
            in_match = true;
        } else if !matched && in_match {
            color_end(out, &colors.match_ascii)?;
            in_match = false;
        }

        if covered > 0 {
            write!(out, "{}", config.utf8_pad)?;
            covered -= 1;
            i += 1;
            continue;
        }

        let b = row.bytes[i];
        if config.utf8 && utf8_len(b) >= 2 {
            if let Some((cp, char_len)) = decode_crossing(row, next, i) {
                // `cp` passed validation; the char conversion cannot fail.
                if let Some(c) = char::from_u32(cp) {
                    write!(out, "{}", c)?;
                    let within = (char_len - 1).min(row.len - i - 1);
                    covered = within;
                    carry_out = char_len - 1 - within;
                    i += 1;
                    continue;
                }
            }
        }
        if (0x20..=0x7E).contains(&b) {
            write!(out, "{}", b as char)?;
        } else {
            write!(out, ".")?;
        }
        i += 1;
    }
    if in_match {
        color_end(out, &colors.match_ascii)?;
    }
    Ok(carry_out)
}

/// Decodes the character starting at `row.bytes[i]`, borrowing continuation
/// bytes from `next` when it crosses the row boundary.
fn decode_crossing(row: &Row, next: Option<&Row>, i: usize) -> Option<(u32, usize)> {
    let need = utf8_len(row.bytes[i]);
    let mut bytes = [0u8; 4];
    let in_row = (row.len - i).min(need);
    bytes[..in_row].copy_from_slice(&row.bytes[i..i + in_row]);
    if in_row < need {
        let next = next?;
        let from_next = need - in_row;
        if next.len < from_next {
            return None;
        }
        bytes[in_row..need].copy_from_slice(&next.bytes[..from_next]);
    }
    utf8_decode(&bytes[..need])
}
