//! Resolved run configuration.
//!
//! `cli::args` produces a raw [`crate::cli::args::ParsedArgs`]; this module
//! cross-validates it and derives the values the pipeline actually consumes
//! (row width, byte ceiling, the laid-out search key, the effective UTF-8
//! and color switches).  After [`Config::resolve`] returns, nothing in the
//! configuration is mutated again.

use anyhow::{anyhow, bail, Result};

use crate::cli::args::ParsedArgs;
use crate::cli::constants::{ROW_BYTES_DEFAULT, ROW_BYTES_MAX};
use crate::color::Colors;

// ── Option enums ──────────────────────────────────────────────────────────────

/// Radix of the offset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetFormat {
    Dec,
    Hex,
    Oct,
}

impl OffsetFormat {
    #[inline]
    pub fn radix(self) -> u32 {
        match self {
            OffsetFormat::Dec => 10,
            OffsetFormat::Hex => 16,
            OffsetFormat::Oct => 8,
        }
    }
}

/// `--utf8` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8When {
    Always,
    Auto,
    Encoding,
    Never,
}

impl Utf8When {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "always" => Some(Utf8When::Always),
            "auto" => Some(Utf8When::Auto),
            "encoding" => Some(Utf8When::Encoding),
            "never" => Some(Utf8When::Never),
            _ => None,
        }
    }

    /// Resolves to an on/off switch.  `Auto` and `Encoding` consult the
    /// locale environment (`LC_ALL`, `LC_CTYPE`, `LANG`; first one set wins).
    pub fn resolve(self) -> bool {
        match self {
            Utf8When::Always => true,
            Utf8When::Never => false,
            Utf8When::Auto | Utf8When::Encoding => locale_is_utf8(),
        }
    }
}

/// Returns `true` when the locale environment names a UTF-8 encoding.
fn locale_is_utf8() -> bool {
    for var in ["LC_ALL", "LC_CTYPE", "LANG"] {
        if let Ok(val) = std::env::var(var) {
            if !val.is_empty() {
                let upper = val.to_ascii_uppercase();
                return upper.contains("UTF-8") || upper.contains("UTF8");
            }
        }
    }
    false
}

/// Byte order for laying out a numeric search key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
    Host,
}

/// What to do with the total-match count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotalMatches {
    #[default]
    No,
    /// `-t`: print the count to stderr in addition to the dump.
    Print,
    /// `-T`: print the count to stderr and suppress the dump.
    PrintOnly,
}

// ── Strings-mode options ──────────────────────────────────────────────────────

/// Whitespace classes and termination rule for strings mode (`-S`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringsOpts {
    pub formfeed: bool,
    pub linefeed: bool,
    pub carriage_return: bool,
    pub space: bool,
    pub tab: bool,
    pub vtab: bool,
    /// A run only counts when the byte that closes it is `NUL`.
    pub null_terminated: bool,
}

impl Default for StringsOpts {
    fn default() -> Self {
        StringsOpts {
            formfeed: false,
            linefeed: false,
            carriage_return: false,
            space: true,
            tab: true,
            vtab: false,
            null_terminated: false,
        }
    }
}

impl StringsOpts {
    /// Parses a `-S` argument.  Letters accumulate; `*` enables everything,
    /// `-` clears everything.
    pub fn parse(s: &str) -> Option<Self> {
        let mut opts = StringsOpts {
            space: false,
            tab: false,
            ..StringsOpts::default()
        };
        for c in s.chars() {
            match c {
                '0' => opts.null_terminated = true,
                'f' => opts.formfeed = true,
                'l' | 'n' => opts.linefeed = true,
                'r' => opts.carriage_return = true,
                's' => opts.space = true,
                't' => opts.tab = true,
                'v' => opts.vtab = true,
                'w' => {
                    opts.formfeed = true;
                    opts.linefeed = true;
                    opts.carriage_return = true;
                    opts.space = true;
                    opts.tab = true;
                    opts.vtab = true;
                }
                '*' => {
                    opts = StringsOpts {
                        formfeed: true,
                        linefeed: true,
                        carriage_return: true,
                        space: true,
                        tab: true,
                        vtab: true,
                        null_terminated: true,
                    };
                }
                '-' => {
                    opts = StringsOpts {
                        formfeed: false,
                        linefeed: false,
                        carriage_return: false,
                        space: false,
                        tab: false,
                        vtab: false,
                        null_terminated: false,
                    };
                }
                _ => return None,
            }
        }
        Some(opts)
    }

    /// Returns `true` when `b` is one of the enabled whitespace bytes.
    #[inline]
    pub fn allows_whitespace(&self, b: u8) -> bool {
        match b {
            0x0C => self.formfeed,
            0x0A => self.linefeed,
            0x0D => self.carriage_return,
            b' ' => self.space,
            b'\t' => self.tab,
            0x0B => self.vtab,
            _ => false,
        }
    }
}

// ── C-array options ───────────────────────────────────────────────────────────

/// Length-variable type letters for `--c-array`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CArrayOpts {
    /// `8`: declare the array as `char8_t` instead of `unsigned char`.
    pub char8: bool,
    /// `c`: `const` on both declarations.
    pub const_: bool,
    /// `s`: `static` on both declarations.
    pub static_: bool,
    /// `i`: emit an `int` length variable.
    pub len_int: bool,
    /// `l`: emit a `long` length variable.
    pub len_long: bool,
    /// `u`: emit an `unsigned` length variable.
    pub len_unsigned: bool,
    /// `t`: emit a `size_t` length variable.
    pub len_size_t: bool,
}

impl CArrayOpts {
    /// Parses a `-C` argument.  `t` excludes each of `i`, `l`, and `u`.
    pub fn parse(s: &str) -> Result<Self> {
        let mut opts = CArrayOpts::default();
        for c in s.chars() {
            match c {
                '8' => opts.char8 = true,
                'c' => opts.const_ = true,
                'i' => opts.len_int = true,
                'l' => opts.len_long = true,
                's' => opts.static_ = true,
                't' => opts.len_size_t = true,
                'u' => opts.len_unsigned = true,
                _ => bail!("'{}': invalid --c-array format letter", c),
            }
        }
        if opts.len_size_t && (opts.len_int || opts.len_long || opts.len_unsigned) {
            bail!("--c-array 't' and any of 'i', 'l', 'u' are mutually exclusive");
        }
        Ok(opts)
    }

    /// Returns `true` when any length-type letter was given.
    #[inline]
    pub fn wants_length(&self) -> bool {
        self.len_int || self.len_long || self.len_unsigned || self.len_size_t
    }
}

// ── Search key ────────────────────────────────────────────────────────────────

/// What the match engine searches for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Search {
    /// No search: every byte reports unmatched.
    #[default]
    None,
    /// A fixed byte pattern (string or laid-out numeric key).
    Pattern(Vec<u8>),
    /// Strings mode: runs of at least `min_chars` acceptable characters.
    Strings { min_chars: u64, opts: StringsOpts },
}

impl Search {
    #[inline]
    pub fn is_some(&self) -> bool {
        !matches!(self, Search::None)
    }
}

// ── Resolved configuration ────────────────────────────────────────────────────

/// The fully resolved, read-only run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Offset column radix, or `None` when offsets are suppressed.
    pub offsets: Option<OffsetFormat>,
    /// Adjacent hex bytes printed without an intervening space.
    pub group_by: usize,
    /// Bytes per output row: `max(16, group_by)`.
    pub row_bytes: usize,
    /// Print the ASCII column.
    pub ascii: bool,
    /// Interpret multi-byte UTF-8 characters in the ASCII column.
    pub utf8: bool,
    /// Padding character for cells covered by a multi-byte character.
    pub utf8_pad: char,
    pub matching_only: bool,
    pub printing_only: bool,
    /// Do not elide identical rows.
    pub verbose: bool,
    /// Ceiling on bytes read (`u64::MAX` = unlimited).
    pub max_bytes: u64,
    /// Input prefix to skip before the first delivered byte.
    pub skip: u64,
    pub search: Search,
    pub ignore_case: bool,
    pub total_matches: TotalMatches,
    /// Resolved color capabilities; all-unset when colorization is off.
    pub colors: Colors,
    /// C-array sink, when selected.
    pub c_array: Option<CArrayOpts>,
    /// Reverse mode: parse a dump back into bytes.
    pub reverse: bool,
    /// User-facing input name (`-` for stdin).
    pub input_path: String,
    /// User-facing output name (`-` for stdout).
    pub output_path: String,
}

impl Config {
    /// Cross-validates `args` and derives the final configuration.
    ///
    /// The mutual-exclusion and required-together rules live here, as do the
    /// derivations: `row_bytes`, the byte ceiling from `--max-lines`, the
    /// endian-ordered numeric key, and the case-folded string key.
    pub fn resolve(args: ParsedArgs) -> Result<Config> {
        // ── Mutual exclusion / requirements ──────────────────────────────────
        if args.bits.is_some() && args.bytes.is_some() {
            bail!("--bits and --bytes are mutually exclusive");
        }
        if args.max_bytes.is_some() && args.max_lines.is_some() {
            bail!("--max-bytes and --max-lines are mutually exclusive");
        }
        if args.string.is_some() && args.number.is_some() {
            bail!("--string and a numeric search are mutually exclusive");
        }
        if args.strings.is_some() && (args.string.is_some() || args.number.is_some()) {
            bail!("--strings and a fixed search are mutually exclusive");
        }
        if (args.bits.is_some() || args.bytes.is_some()) && args.number.is_none() {
            bail!("--bits and --bytes require a numeric search");
        }
        if args.ignore_case && args.string.is_none() {
            bail!("--ignore-case requires --string");
        }
        if args.strings_opts.is_some() && args.strings.is_none() {
            bail!("--strings-opts requires --strings");
        }
        if args.reverse {
            let incompatible = args.string.is_some()
                || args.number.is_some()
                || args.strings.is_some()
                || args.c_array.is_some()
                || args.matching_only
                || args.printing_only
                || args.verbose
                || args.no_offsets
                || args.skip != 0
                || args.max_bytes.is_some()
                || args.max_lines.is_some()
                || args.total_matches != TotalMatches::No;
            if incompatible {
                bail!("--reverse is incompatible with search and dump options");
            }
        }

        // ── Search key ───────────────────────────────────────────────────────
        let search = if let Some(ref s) = args.string {
            if s.is_empty() {
                bail!("search string may not be empty");
            }
            let mut key = s.clone().into_bytes();
            if args.ignore_case {
                key.make_ascii_lowercase();
            }
            Search::Pattern(key)
        } else if let Some((value, endian)) = args.number {
            let size = match (args.bits, args.bytes) {
                (Some(bits), _) => Some(bits / 8),
                (_, Some(bytes)) => Some(bytes),
                _ => None,
            };
            Search::Pattern(layout_search_key(value, size, endian)?)
        } else if let Some(min_chars) = args.strings {
            Search::Strings {
                min_chars,
                opts: args.strings_opts.unwrap_or_default(),
            }
        } else {
            Search::None
        };

        if args.matching_only && !search.is_some() {
            bail!("--matching-only requires a search");
        }
        if args.total_matches != TotalMatches::No && !search.is_some() {
            bail!("--total-matches requires a search");
        }

        // ── Derivations ──────────────────────────────────────────────────────
        let group_by = args.group_by.unwrap_or(2);
        let row_bytes = ROW_BYTES_DEFAULT.max(group_by);
        debug_assert!(row_bytes <= ROW_BYTES_MAX);

        let max_bytes = match (args.max_bytes, args.max_lines) {
            (Some(n), _) => n,
            (_, Some(lines)) => lines.saturating_mul(row_bytes as u64),
            _ => u64::MAX,
        };

        Ok(Config {
            offsets: if args.no_offsets { None } else { Some(args.offset_format) },
            group_by,
            row_bytes,
            ascii: !args.no_ascii,
            utf8: args.utf8.resolve(),
            utf8_pad: args.utf8_pad,
            matching_only: args.matching_only,
            printing_only: args.printing_only,
            verbose: args.verbose,
            max_bytes,
            skip: args.skip,
            search,
            ignore_case: args.ignore_case,
            total_matches: args.total_matches,
            colors: Colors::resolve(args.color, &args.output_path),
            c_array: args.c_array,
            reverse: args.reverse,
            input_path: args.input_path,
            output_path: args.output_path,
        })
    }

    /// Offset column width in digits.
    ///
    /// 16 for the two wide layouts (single-byte grouping with the ASCII
    /// column, or rows past 16 bytes without it); 12 otherwise.
    pub fn offset_width(&self) -> usize {
        use crate::cli::constants::{OFFSET_WIDTH_MAX, OFFSET_WIDTH_MIN};
        if (self.group_by == 1 && self.ascii) || (self.row_bytes > 16 && !self.ascii) {
            OFFSET_WIDTH_MAX
        } else {
            OFFSET_WIDTH_MIN
        }
    }
}

/// Lays out a numeric search key as bytes in the requested order.
///
/// With no explicit size, the smallest width that holds `value` is used
/// (minimum 1).  An explicit size narrower than the value is a usage error.
pub fn layout_search_key(value: u64, size: Option<usize>, endian: Endian) -> Result<Vec<u8>> {
    let minimal = (((64 - value.leading_zeros() as usize) + 7) / 8).max(1);
    let size = match size {
        Some(n) => {
            if n < minimal {
                return Err(anyhow!(
                    "search number 0x{:X} requires {} bytes but only {} given",
                    value,
                    minimal,
                    n
                ));
            }
            n
        }
        None => minimal,
    };
    let big = match endian {
        Endian::Big => true,
        Endian::Little => false,
        Endian::Host => cfg!(target_endian = "big"),
    };
    let key = if big {
        value.to_be_bytes()[8 - size..].to_vec()
    } else {
        value.to_le_bytes()[..size].to_vec()
    };
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── StringsOpts ───────────────────────────────────────────────────────────

    #[test]
    fn strings_opts_default_space_tab() {
        let d = StringsOpts::default();
        assert!(d.allows_whitespace(b' '));
        assert!(d.allows_whitespace(b'\t'));
        assert!(!d.allows_whitespace(b'\n'));
        assert!(!d.null_terminated);
    }

    #[test]
    fn strings_opts_letters() {
        let o = StringsOpts::parse("0nr").unwrap();
        assert!(o.null_terminated);
        assert!(o.linefeed);
        assert!(o.carriage_return);
        assert!(!o.space);
    }

    #[test]
    fn strings_opts_w_enables_all_whitespace() {
        let o = StringsOpts::parse("w").unwrap();
        for b in [0x0Cu8, b'\n', b'\r', b' ', b'\t', 0x0B] {
            assert!(o.allows_whitespace(b), "byte {:#04X}", b);
        }
        assert!(!o.null_terminated);
    }

    #[test]
    fn strings_opts_star_and_dash() {
        assert!(StringsOpts::parse("*").unwrap().null_terminated);
        let none = StringsOpts::parse("*-").unwrap();
        assert!(!none.allows_whitespace(b' '));
        assert!(!none.null_terminated);
    }

    #[test]
    fn strings_opts_rejects_unknown() {
        assert!(StringsOpts::parse("x").is_none());
    }

    // ── CArrayOpts ────────────────────────────────────────────────────────────

    #[test]
    fn c_array_opts_parse() {
        let o = CArrayOpts::parse("scu").unwrap();
        assert!(o.static_ && o.const_ && o.len_unsigned);
        assert!(o.wants_length());
        assert!(!CArrayOpts::parse("c").unwrap().wants_length());
    }

    #[test]
    fn c_array_t_excludes_ilu() {
        assert!(CArrayOpts::parse("t").is_ok());
        assert!(CArrayOpts::parse("ti").is_err());
        assert!(CArrayOpts::parse("tu").is_err());
        assert!(CArrayOpts::parse("q").is_err());
    }

    // ── layout_search_key ─────────────────────────────────────────────────────

    #[test]
    fn key_minimal_size() {
        assert_eq!(layout_search_key(0x1234, None, Endian::Big).unwrap(), vec![0x12, 0x34]);
        assert_eq!(layout_search_key(0x1234, None, Endian::Little).unwrap(), vec![0x34, 0x12]);
        assert_eq!(layout_search_key(0, None, Endian::Big).unwrap(), vec![0]);
    }

    #[test]
    fn key_explicit_size_pads() {
        assert_eq!(
            layout_search_key(0x12, Some(4), Endian::Big).unwrap(),
            vec![0, 0, 0, 0x12]
        );
        assert_eq!(
            layout_search_key(0x12, Some(4), Endian::Little).unwrap(),
            vec![0x12, 0, 0, 0]
        );
    }

    #[test]
    fn key_too_narrow_is_error() {
        assert!(layout_search_key(0x12345, Some(2), Endian::Big).is_err());
    }

    #[test]
    fn key_host_matches_target_endian() {
        let host = layout_search_key(0xAABB, Some(2), Endian::Host).unwrap();
        if cfg!(target_endian = "little") {
            assert_eq!(host, vec![0xBB, 0xAA]);
        } else {
            assert_eq!(host, vec![0xAA, 0xBB]);
        }
    }
}
