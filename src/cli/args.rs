//! Command-line argument parsing for `ad`.
//!
//! The entry points are [`parse_args`] (reads `std::env::args()`) and
//! [`parse_args_from`] (takes an explicit slice, suitable for unit-testing).
//! Both return a [`ParsedArgs`] value capturing every option and operand
//! discovered during the parse; cross-option validation happens later in
//! [`crate::config::Config::resolve`].
//!
//! Short options may be aggregated (e.g. `-vmx`).  Long options use either
//! `--option=VALUE` or `--option VALUE` syntax; options with an *optional*
//! argument (`--strings`, `--c-array`) accept only the attached form.  A
//! bare `--` marks the end of options; `-` stands for a standard stream;
//! `+N` adds to the skip offset.
//!
//! Bad or unrecognised options return an `Err` with a human-readable
//! message; the caller prefixes the program name and exits with the usage
//! status.

use anyhow::{anyhow, bail, Result};

use crate::cli::arg_utils::{parse_codepoint, parse_size, parse_u64};
use crate::cli::constants::STD_STREAM_MARK;
use crate::color::ColorWhen;
use crate::config::{CArrayOpts, Endian, OffsetFormat, StringsOpts, TotalMatches, Utf8When};

/// Minimum run length for `--strings` when none is given.
pub const STRINGS_LEN_DEFAULT: u64 = 4;

/// Default padding character for multi-byte UTF-8 cells (U+25A1 WHITE SQUARE).
pub const UTF8_PAD_DEFAULT: char = '\u{25A1}';

// ── Public output type ────────────────────────────────────────────────────────

/// Raw result of the argument loop, before cross-validation.
#[derive(Debug, Clone)]
pub struct ParsedArgs {
    pub bits: Option<usize>,
    pub bytes: Option<usize>,
    pub c_array: Option<CArrayOpts>,
    pub color: ColorWhen,
    pub offset_format: OffsetFormat,
    pub group_by: Option<usize>,
    pub ignore_case: bool,
    pub matching_only: bool,
    pub max_bytes: Option<u64>,
    pub max_lines: Option<u64>,
    pub no_ascii: bool,
    pub no_offsets: bool,
    pub printing_only: bool,
    pub reverse: bool,
    /// Accumulated `--skip-bytes` plus any `+N` operands.
    pub skip: u64,
    pub string: Option<String>,
    /// Numeric search value and requested byte order.
    pub number: Option<(u64, Endian)>,
    /// Strings-mode minimum run length.
    pub strings: Option<u64>,
    pub strings_opts: Option<StringsOpts>,
    pub total_matches: TotalMatches,
    pub utf8: Utf8When,
    pub utf8_pad: char,
    pub verbose: bool,
    pub input_path: String,
    pub output_path: String,
    /// `--help` or `--version` was handled; exit 0 without running.
    pub exit_early: bool,
}

impl Default for ParsedArgs {
    fn default() -> Self {
        ParsedArgs {
            bits: None,
            bytes: None,
            c_array: None,
            color: ColorWhen::default(),
            offset_format: OffsetFormat::Hex,
            group_by: None,
            ignore_case: false,
            matching_only: false,
            max_bytes: None,
            max_lines: None,
            no_ascii: false,
            no_offsets: false,
            printing_only: false,
            reverse: false,
            skip: 0,
            string: None,
            number: None,
            strings: None,
            strings_opts: None,
            total_matches: TotalMatches::No,
            utf8: Utf8When::Never,
            utf8_pad: UTF8_PAD_DEFAULT,
            verbose: false,
            input_path: STD_STREAM_MARK.to_owned(),
            output_path: STD_STREAM_MARK.to_owned(),
            exit_early: false,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` (skipping argv[0]).
pub fn parse_args() -> Result<ParsedArgs> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(&argv)
}

/// Parse an explicit argument list.  Callable from tests without touching
/// `std::env`.
pub fn parse_args_from(argv: &[String]) -> Result<ParsedArgs> {
    let mut args = ParsedArgs::default();
    let mut all_arguments_are_files = false;
    let mut positionals: Vec<String> = Vec::new();

    let mut arg_idx = 0usize;
    while arg_idx < argv.len() {
        let argument = &argv[arg_idx];
        arg_idx += 1;

        if argument.is_empty() {
            continue;
        }
        let bytes = argument.as_bytes();

        // ── Operands ─────────────────────────────────────────────────────────
        if all_arguments_are_files || (bytes[0] != b'-' && bytes[0] != b'+') || bytes.len() == 1 {
            positionals.push(argument.clone());
            continue;
        }

        // ── `+N` skip operand ────────────────────────────────────────────────
        if bytes[0] == b'+' {
            let n = parse_size(&argument[1..])
                .ok_or_else(|| anyhow!("\"{}\": invalid skip amount", argument))?;
            args.skip += n;
            continue;
        }

        // ── Long options ─────────────────────────────────────────────────────
        if bytes[1] == b'-' {
            if argument == "--" {
                all_arguments_are_files = true;
                continue;
            }
            let body = &argument[2..];
            let (name, attached) = match body.split_once('=') {
                Some((n, v)) => (n, Some(v.to_owned())),
                None => (body, None),
            };
            // Options whose argument is optional never consume the next word.
            let take_value = |args_ref: &mut usize| -> Result<String> {
                if let Some(v) = attached.clone() {
                    return Ok(v);
                }
                if *args_ref < argv.len() {
                    let v = argv[*args_ref].clone();
                    *args_ref += 1;
                    return Ok(v);
                }
                bail!("--{} requires an argument", name);
            };
            match name {
                "bits" => {
                    let v = take_value(&mut arg_idx)?;
                    args.bits = Some(parse_bits(&v)?);
                }
                "bytes" => {
                    let v = take_value(&mut arg_idx)?;
                    args.bytes = Some(parse_bytes_opt(&v)?);
                }
                "c-array" => {
                    args.c_array = Some(match attached {
                        Some(ref v) => CArrayOpts::parse(v)?,
                        None => CArrayOpts::default(),
                    });
                }
                "color" | "colour" => {
                    let v = take_value(&mut arg_idx)?;
                    args.color = ColorWhen::parse(&v)
                        .ok_or_else(|| anyhow!("\"{}\": invalid --color argument", v))?;
                }
                "decimal" => args.offset_format = OffsetFormat::Dec,
                "group-by" => {
                    let v = take_value(&mut arg_idx)?;
                    args.group_by = Some(parse_group_by(&v)?);
                }
                "help" => {
                    crate::cli::help::print_usage();
                    args.exit_early = true;
                    return Ok(args);
                }
                "hexadecimal" => args.offset_format = OffsetFormat::Hex,
                "host-endian" => {
                    let v = take_value(&mut arg_idx)?;
                    set_number(&mut args, &v, Endian::Host)?;
                }
                "ignore-case" => args.ignore_case = true,
                "little-endian" => {
                    let v = take_value(&mut arg_idx)?;
                    set_number(&mut args, &v, Endian::Little)?;
                }
                "big-endian" => {
                    let v = take_value(&mut arg_idx)?;
                    set_number(&mut args, &v, Endian::Big)?;
                }
                "matching-only" => args.matching_only = true,
                "max-bytes" => {
                    let v = take_value(&mut arg_idx)?;
                    args.max_bytes = Some(
                        parse_size(&v).ok_or_else(|| anyhow!("\"{}\": invalid byte count", v))?,
                    );
                }
                "max-lines" => {
                    let v = take_value(&mut arg_idx)?;
                    args.max_lines = Some(
                        parse_u64(&v).ok_or_else(|| anyhow!("\"{}\": invalid line count", v))?,
                    );
                }
                "no-ascii" => args.no_ascii = true,
                "no-offsets" => args.no_offsets = true,
                "octal" => args.offset_format = OffsetFormat::Oct,
                "plain" => apply_plain(&mut args),
                "printing-only" => args.printing_only = true,
                "reverse" | "revert" => args.reverse = true,
                "skip-bytes" => {
                    let v = take_value(&mut arg_idx)?;
                    args.skip += parse_size(&v)
                        .ok_or_else(|| anyhow!("\"{}\": invalid skip offset", v))?;
                }
                "string" => {
                    args.string = Some(take_value(&mut arg_idx)?);
                }
                "strings" => {
                    args.strings = Some(match attached {
                        Some(ref v) => parse_u64(v)
                            .ok_or_else(|| anyhow!("\"{}\": invalid string length", v))?,
                        None => STRINGS_LEN_DEFAULT,
                    });
                }
                "strings-opts" => {
                    let v = take_value(&mut arg_idx)?;
                    args.strings_opts = Some(
                        StringsOpts::parse(&v)
                            .ok_or_else(|| anyhow!("\"{}\": invalid --strings-opts argument", v))?,
                    );
                }
                "total-matches" => args.total_matches = TotalMatches::Print,
                "total-matches-only" => args.total_matches = TotalMatches::PrintOnly,
                "utf8" => {
                    let v = take_value(&mut arg_idx)?;
                    args.utf8 = Utf8When::parse(&v)
                        .ok_or_else(|| anyhow!("\"{}\": invalid --utf8 argument", v))?;
                }
                "utf8-padding" => {
                    let v = take_value(&mut arg_idx)?;
                    args.utf8_pad = parse_codepoint(&v)
                        .and_then(char::from_u32)
                        .ok_or_else(|| anyhow!("\"{}\": invalid padding character", v))?;
                }
                "verbose" => args.verbose = true,
                "version" => {
                    crate::cli::help::print_version();
                    args.exit_early = true;
                    return Ok(args);
                }
                _ => bail!("\"--{}\": unknown option", name),
            }
            continue;
        }

        // ── Short options (possibly aggregated) ─────────────────────────────
        let cluster = &argument[1..];
        let mut chars = cluster.char_indices();
        while let Some((ci, c)) = chars.next() {
            // The rest of the cluster, available as an attached argument.
            let rest = &cluster[ci + c.len_utf8()..];
            let take_value = |arg_idx_ref: &mut usize| -> Result<String> {
                if !rest.is_empty() {
                    return Ok(rest.to_owned());
                }
                if *arg_idx_ref < argv.len() {
                    let v = argv[*arg_idx_ref].clone();
                    *arg_idx_ref += 1;
                    return Ok(v);
                }
                bail!("-{} requires an argument", c);
            };
            let mut consumed_rest = false;
            match c {
                'A' => args.no_ascii = true,
                'b' => {
                    args.bits = Some(parse_bits(&take_value(&mut arg_idx)?)?);
                    consumed_rest = true;
                }
                'B' => {
                    args.bytes = Some(parse_bytes_opt(&take_value(&mut arg_idx)?)?);
                    consumed_rest = true;
                }
                'C' => {
                    args.c_array = Some(if rest.is_empty() {
                        CArrayOpts::default()
                    } else {
                        consumed_rest = true;
                        CArrayOpts::parse(rest)?
                    });
                }
                'c' => {
                    let v = take_value(&mut arg_idx)?;
                    args.color = ColorWhen::parse(&v)
                        .ok_or_else(|| anyhow!("\"{}\": invalid --color argument", v))?;
                    consumed_rest = true;
                }
                'd' => args.offset_format = OffsetFormat::Dec,
                'E' => {
                    set_number(&mut args, &take_value(&mut arg_idx)?, Endian::Big)?;
                    consumed_rest = true;
                }
                'e' => {
                    set_number(&mut args, &take_value(&mut arg_idx)?, Endian::Little)?;
                    consumed_rest = true;
                }
                'g' => {
                    args.group_by = Some(parse_group_by(&take_value(&mut arg_idx)?)?);
                    consumed_rest = true;
                }
                'H' => {
                    set_number(&mut args, &take_value(&mut arg_idx)?, Endian::Host)?;
                    consumed_rest = true;
                }
                'h' => {
                    crate::cli::help::print_usage();
                    args.exit_early = true;
                    return Ok(args);
                }
                'i' => args.ignore_case = true,
                'j' => {
                    let v = take_value(&mut arg_idx)?;
                    args.skip += parse_size(&v)
                        .ok_or_else(|| anyhow!("\"{}\": invalid skip offset", v))?;
                    consumed_rest = true;
                }
                'L' => {
                    let v = take_value(&mut arg_idx)?;
                    args.max_lines = Some(
                        parse_u64(&v).ok_or_else(|| anyhow!("\"{}\": invalid line count", v))?,
                    );
                    consumed_rest = true;
                }
                'm' => args.matching_only = true,
                'N' => {
                    let v = take_value(&mut arg_idx)?;
                    args.max_bytes = Some(
                        parse_size(&v).ok_or_else(|| anyhow!("\"{}\": invalid byte count", v))?,
                    );
                    consumed_rest = true;
                }
                'n' => {
                    args.strings = Some(if rest.is_empty() {
                        STRINGS_LEN_DEFAULT
                    } else {
                        consumed_rest = true;
                        parse_u64(rest)
                            .ok_or_else(|| anyhow!("\"{}\": invalid string length", rest))?
                    });
                }
                'O' => args.no_offsets = true,
                'o' => args.offset_format = OffsetFormat::Oct,
                'P' => apply_plain(&mut args),
                'p' => args.printing_only = true,
                'r' => args.reverse = true,
                'S' => {
                    let v = take_value(&mut arg_idx)?;
                    args.strings_opts = Some(
                        StringsOpts::parse(&v)
                            .ok_or_else(|| anyhow!("\"{}\": invalid --strings-opts argument", v))?,
                    );
                    consumed_rest = true;
                }
                's' => {
                    args.string = Some(take_value(&mut arg_idx)?);
                    consumed_rest = true;
                }
                'T' => args.total_matches = TotalMatches::PrintOnly,
                't' => args.total_matches = TotalMatches::Print,
                'U' => {
                    let v = take_value(&mut arg_idx)?;
                    args.utf8_pad = parse_codepoint(&v)
                        .and_then(char::from_u32)
                        .ok_or_else(|| anyhow!("\"{}\": invalid padding character", v))?;
                    consumed_rest = true;
                }
                'u' => {
                    let v = take_value(&mut arg_idx)?;
                    args.utf8 = Utf8When::parse(&v)
                        .ok_or_else(|| anyhow!("\"{}\": invalid --utf8 argument", v))?;
                    consumed_rest = true;
                }
                'V' => {
                    crate::cli::help::print_version();
                    args.exit_early = true;
                    return Ok(args);
                }
                'v' => args.verbose = true,
                'x' => args.offset_format = OffsetFormat::Hex,
                _ => bail!("\"-{}\": unknown option", c),
            }
            if consumed_rest {
                break;
            }
        }
    }

    // ── Operands: input, then output ─────────────────────────────────────────
    let mut positionals = positionals.into_iter();
    if let Some(input) = positionals.next() {
        args.input_path = input;
    }
    if let Some(output) = positionals.next() {
        args.output_path = output;
    }
    if let Some(extra) = positionals.next() {
        bail!("\"{}\": unexpected argument", extra);
    }

    Ok(args)
}

// ── Option-value helpers ──────────────────────────────────────────────────────

/// `-P` is shorthand for `-A -O -g32`.
fn apply_plain(args: &mut ParsedArgs) {
    args.no_ascii = true;
    args.no_offsets = true;
    args.group_by = Some(32);
}

fn set_number(args: &mut ParsedArgs, value: &str, endian: Endian) -> Result<()> {
    let n = parse_u64(value).ok_or_else(|| anyhow!("\"{}\": invalid search number", value))?;
    if args.number.is_some() {
        bail!("only one numeric search may be given");
    }
    args.number = Some((n, endian));
    Ok(())
}

fn parse_bits(value: &str) -> Result<usize> {
    match parse_u64(value) {
        Some(bits @ 8..=64) if bits % 8 == 0 => Ok(bits as usize),
        _ => bail!("\"{}\": --bits must be a multiple of 8 in 8-64", value),
    }
}

fn parse_bytes_opt(value: &str) -> Result<usize> {
    match parse_u64(value) {
        Some(bytes @ 1..=8) => Ok(bytes as usize),
        _ => bail!("\"{}\": --bytes must be in 1-8", value),
    }
}

fn parse_group_by(value: &str) -> Result<usize> {
    match parse_u64(value) {
        Some(g @ (1 | 2 | 4 | 8 | 16 | 32)) => Ok(g as usize),
        _ => bail!("\"{}\": --group-by must be one of 1, 2, 4, 8, 16, 32", value),
    }
}
