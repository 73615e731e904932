//! Scanners for command-line argument values.
//!
//! All scanners parse an entire string and return `None` on any trailing
//! garbage; the argument loop in `cli::args` turns `None` into a usage
//! error naming the offending option.

use crate::utf8::codepoint_is_valid;

/// Returns the last path component of `path`, handling both `/` and `\`
/// separators.
pub fn last_name_from_path(path: &str) -> &str {
    let after_slash = match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    };
    match after_slash.rfind('\\') {
        Some(pos) => &after_slash[pos + 1..],
        None => after_slash,
    }
}

/// If `arg` starts with `prefix`, returns the remainder of `arg`.
pub fn long_command_w_arg<'a>(arg: &'a str, prefix: &str) -> Option<&'a str> {
    arg.strip_prefix(prefix)
}

/// Parses an unsigned integer with C `strtoull(…, 0)` base semantics:
/// a `0x`/`0X` prefix selects hexadecimal, a leading `0` selects octal,
/// anything else is decimal.
pub fn parse_u64(s: &str) -> Option<u64> {
    if s.is_empty() {
        return None;
    }
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

/// Parses a byte count or offset: an integer per [`parse_u64`] optionally
/// followed by a multiplier suffix — `b` (512-byte blocks), `k` (KiB), or
/// `m` (MiB).  Suffixes are accepted in either case.
pub fn parse_size(s: &str) -> Option<u64> {
    let (num, multiplier) = match s.as_bytes().last()? {
        b'b' | b'B' => (&s[..s.len() - 1], 512),
        b'k' | b'K' => (&s[..s.len() - 1], 1024),
        b'm' | b'M' => (&s[..s.len() - 1], 1_048_576),
        _ => (s, 1),
    };
    parse_u64(num)?.checked_mul(multiplier)
}

/// Parses a `--utf8-padding` argument into a code point.
///
/// Accepts a single literal character, `U+XXXX`, `0xXXXX`, or a decimal
/// number; the resulting code point must be valid.
pub fn parse_codepoint(s: &str) -> Option<u32> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(c as u32);
    }
    let cp = if let Some(hex) = s.strip_prefix("U+").or_else(|| s.strip_prefix("u+")) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        u32::try_from(parse_u64(s)?).ok()?
    };
    codepoint_is_valid(cp).then_some(cp)
}

/// Formats `n` in `radix` (8, 10, or 16, lowercase), zero-padded to `width`.
pub fn format_radix(n: u64, radix: u32, width: usize) -> String {
    let digits = match radix {
        8 => format!("{:o}", n),
        16 => format!("{:x}", n),
        _ => format!("{}", n),
    };
    format!("{:0>width$}", digits, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── last_name_from_path ───────────────────────────────────────────────────

    #[test]
    fn last_name_unix() {
        assert_eq!(last_name_from_path("/a/b/c.bin"), "c.bin");
    }

    #[test]
    fn last_name_windows() {
        assert_eq!(last_name_from_path("a\\b"), "b");
    }

    #[test]
    fn last_name_bare() {
        assert_eq!(last_name_from_path("file"), "file");
    }

    // ── parse_u64 ─────────────────────────────────────────────────────────────

    #[test]
    fn parse_u64_decimal() {
        assert_eq!(parse_u64("42"), Some(42));
        assert_eq!(parse_u64("0"), Some(0));
    }

    #[test]
    fn parse_u64_hex() {
        assert_eq!(parse_u64("0x10"), Some(16));
        assert_eq!(parse_u64("0XfF"), Some(255));
    }

    #[test]
    fn parse_u64_octal() {
        assert_eq!(parse_u64("017"), Some(15));
    }

    #[test]
    fn parse_u64_rejects_garbage() {
        assert_eq!(parse_u64(""), None);
        assert_eq!(parse_u64("0x"), None);
        assert_eq!(parse_u64("12three"), None);
        assert_eq!(parse_u64("-4"), None);
    }

    // ── parse_size ────────────────────────────────────────────────────────────

    #[test]
    fn parse_size_plain() {
        assert_eq!(parse_size("100"), Some(100));
    }

    #[test]
    fn parse_size_suffixes() {
        assert_eq!(parse_size("2b"), Some(1024));
        assert_eq!(parse_size("4k"), Some(4096));
        assert_eq!(parse_size("1m"), Some(1_048_576));
        assert_eq!(parse_size("1M"), Some(1_048_576));
    }

    #[test]
    fn parse_size_hex_with_suffix() {
        assert_eq!(parse_size("0x10k"), Some(16 * 1024));
    }

    #[test]
    fn parse_size_rejects_bare_suffix() {
        assert_eq!(parse_size("k"), None);
        assert_eq!(parse_size(""), None);
    }

    // ── parse_codepoint ───────────────────────────────────────────────────────

    #[test]
    fn codepoint_literal_char() {
        assert_eq!(parse_codepoint("#"), Some(0x23));
        assert_eq!(parse_codepoint("░"), Some(0x2591));
    }

    #[test]
    fn codepoint_u_plus() {
        assert_eq!(parse_codepoint("U+25A1"), Some(0x25A1));
        assert_eq!(parse_codepoint("u+2591"), Some(0x2591));
    }

    #[test]
    fn codepoint_numeric() {
        assert_eq!(parse_codepoint("0x25A1"), Some(0x25A1));
        assert_eq!(parse_codepoint("65"), Some(65));
    }

    #[test]
    fn codepoint_rejects_surrogates_and_junk() {
        assert_eq!(parse_codepoint("U+D800"), None);
        assert_eq!(parse_codepoint("U+110000"), None);
        assert_eq!(parse_codepoint("xyz"), None);
        assert_eq!(parse_codepoint(""), None);
    }

    // ── format_radix ──────────────────────────────────────────────────────────

    #[test]
    fn format_radix_widths() {
        assert_eq!(format_radix(0, 16, 12), "000000000000");
        assert_eq!(format_radix(0x10, 16, 12), "000000000010");
        assert_eq!(format_radix(16, 10, 12), "000000000016");
        assert_eq!(format_radix(8, 8, 4), "0010");
        assert_eq!(format_radix(0xABC, 16, 2), "abc");
    }
}
