//! ANSI SGR colorization capabilities.
//!
//! Capabilities come from the first of `AD_COLORS`, `GREP_COLORS`, or
//! `GREP_COLOR` that is set and parses, falling back to built-in defaults.
//! The first two hold colon-separated `key=value` entries whose values are
//! semicolon-separated SGR parameters (decimal, `0..=255`); legacy
//! `GREP_COLOR` is a single bare value applied to both match capabilities.
//!
//! Whether color is emitted at all is a separate policy question decided by
//! [`ColorWhen::resolve`]; when the answer is no, [`Colors::none`] leaves
//! every capability unset and the emit helpers become no-ops.

use std::io::{IsTerminal, Write};

/// `--color` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorWhen {
    Always,
    Auto,
    Isatty,
    Never,
    #[default]
    NotFile,
    NotIsreg,
    Tty,
}

impl ColorWhen {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "always" => Some(ColorWhen::Always),
            "auto" => Some(ColorWhen::Auto),
            "isatty" => Some(ColorWhen::Isatty),
            "never" => Some(ColorWhen::Never),
            "not_file" => Some(ColorWhen::NotFile),
            "not_isreg" => Some(ColorWhen::NotIsreg),
            "tty" => Some(ColorWhen::Tty),
            _ => None,
        }
    }

    /// Decides whether to colorize output going to `output_path` (`-` for
    /// stdout).  `Always` is unconditional; every other affirmative policy
    /// is vetoed by an empty or `dumb` `TERM`.
    pub fn resolve(self, output_path: &str) -> bool {
        let to_stdout = output_path == crate::cli::constants::STD_STREAM_MARK;
        let enabled = match self {
            ColorWhen::Always => return true,
            ColorWhen::Never => return false,
            ColorWhen::Auto | ColorWhen::Isatty | ColorWhen::Tty => {
                to_stdout && std::io::stdout().is_terminal()
            }
            // A named output is by definition a regular file about to be
            // created; stdout may be anything, so ask the kernel.
            ColorWhen::NotFile | ColorWhen::NotIsreg => to_stdout && !stdout_is_regular_file(),
        };
        enabled && term_supports_color()
    }
}

/// Returns `true` when fd 1 refers to a regular file.
#[cfg(unix)]
fn stdout_is_regular_file() -> bool {
    use nix::sys::stat::{fstat, SFlag};
    match fstat(std::io::stdout()) {
        Ok(st) => (SFlag::from_bits_truncate(st.st_mode) & SFlag::S_IFMT) == SFlag::S_IFREG,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn stdout_is_regular_file() -> bool {
    false
}

fn term_supports_color() -> bool {
    match std::env::var("TERM") {
        Ok(term) => !term.is_empty() && term != "dumb",
        Err(_) => false,
    }
}

// ── Capability set ────────────────────────────────────────────────────────────

/// One resolved capability: the raw SGR parameter list (e.g. `"1;31"`).
pub type Sgr = Option<String>;

/// The capability set consulted by the dumper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Colors {
    /// `bn`: the offset column.
    pub offset: Sgr,
    /// `EC`: the elision separator's byte count.
    pub elided: Sgr,
    /// `MA`: matched bytes in the ASCII column.
    pub match_ascii: Sgr,
    /// `MH`: matched bytes in the hex columns.
    pub match_hex: Sgr,
    /// `se`: the separator punctuation after the offset.
    pub separator: Sgr,
    /// `ne`: suppress the end-of-line reset.
    pub no_eol_reset: bool,
}

impl Colors {
    /// The all-unset capability set; every emit call becomes a no-op.
    pub fn none() -> Colors {
        Colors::default()
    }

    /// Returns `true` when any capability is set.
    pub fn any(&self) -> bool {
        self.offset.is_some()
            || self.elided.is_some()
            || self.match_ascii.is_some()
            || self.match_hex.is_some()
            || self.separator.is_some()
    }

    /// Built-in capabilities used when no environment variable overrides.
    pub fn builtin() -> Colors {
        Colors {
            offset: Some("32".to_owned()),
            elided: Some("35".to_owned()),
            match_ascii: Some("1;31".to_owned()),
            match_hex: Some("1;31".to_owned()),
            separator: Some("36".to_owned()),
            no_eol_reset: false,
        }
    }

    /// Resolves the capability set for a run: policy first, then the
    /// environment chain `AD_COLORS` → `GREP_COLORS` → `GREP_COLOR`.
    pub fn resolve(when: ColorWhen, output_path: &str) -> Colors {
        if !when.resolve(output_path) {
            return Colors::none();
        }
        for var in ["AD_COLORS", "GREP_COLORS"] {
            if let Ok(val) = std::env::var(var) {
                if let Some(colors) = Colors::parse_capabilities(&val) {
                    return colors;
                }
            }
        }
        if let Ok(val) = std::env::var("GREP_COLOR") {
            if parse_sgr_value(&val).is_some() {
                let mut colors = Colors::builtin();
                colors.match_ascii = Some(val.clone());
                colors.match_hex = Some(val);
                return colors;
            }
        }
        Colors::builtin()
    }

    /// Parses a colon-separated `key=value` capability string.  Unknown keys
    /// are ignored; a malformed value rejects the whole string so the next
    /// variable in the chain gets a chance.
    pub fn parse_capabilities(s: &str) -> Option<Colors> {
        let mut colors = Colors::builtin();
        for entry in s.split(':').filter(|e| !e.is_empty()) {
            if entry == "ne" {
                colors.no_eol_reset = true;
                continue;
            }
            let (key, value) = entry.split_once('=')?;
            let value = parse_sgr_value(value)?;
            match key {
                "bn" => colors.offset = Some(value),
                "EC" => colors.elided = Some(value),
                "MA" => colors.match_ascii = Some(value),
                "MH" => colors.match_hex = Some(value),
                "MB" | "mt" => {
                    colors.match_ascii = Some(value.clone());
                    colors.match_hex = Some(value);
                }
                "se" => colors.separator = Some(value),
                _ => {} // unknown capability: ignore
            }
        }
        Some(colors)
    }
}

/// Validates a semicolon-separated list of decimal SGR parameters in
/// `0..=255`, returning it unchanged.
fn parse_sgr_value(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    for part in value.split(';') {
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if part.parse::<u32>().ok()? > 255 {
            return None;
        }
    }
    Some(value.to_owned())
}

// ── Emission ──────────────────────────────────────────────────────────────────

/// Emits the SGR start sequence for `cap`, if set.
pub fn color_start(out: &mut dyn Write, cap: &Sgr) -> std::io::Result<()> {
    if let Some(sgr) = cap {
        write!(out, "\x1B[{}m", sgr)?;
    }
    Ok(())
}

/// Emits the SGR reset sequence closing `cap`, if set.
pub fn color_end(out: &mut dyn Write, cap: &Sgr) -> std::io::Result<()> {
    if cap.is_some() {
        write!(out, "\x1B[m")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_when_values() {
        assert_eq!(ColorWhen::parse("always"), Some(ColorWhen::Always));
        assert_eq!(ColorWhen::parse("auto"), Some(ColorWhen::Auto));
        assert_eq!(ColorWhen::parse("not_file"), Some(ColorWhen::NotFile));
        assert_eq!(ColorWhen::parse("sometimes"), None);
    }

    #[test]
    fn sgr_value_validation() {
        assert_eq!(parse_sgr_value("1;31"), Some("1;31".to_owned()));
        assert_eq!(parse_sgr_value("0"), Some("0".to_owned()));
        assert_eq!(parse_sgr_value("255"), Some("255".to_owned()));
        assert_eq!(parse_sgr_value("256"), None);
        assert_eq!(parse_sgr_value("1;"), None);
        assert_eq!(parse_sgr_value(""), None);
        assert_eq!(parse_sgr_value("bold"), None);
    }

    #[test]
    fn capability_string_overrides() {
        let c = Colors::parse_capabilities("bn=33:MH=7;31:ne").unwrap();
        assert_eq!(c.offset.as_deref(), Some("33"));
        assert_eq!(c.match_hex.as_deref(), Some("7;31"));
        // MA untouched: still the built-in value.
        assert_eq!(c.match_ascii.as_deref(), Some("1;31"));
        assert!(c.no_eol_reset);
    }

    #[test]
    fn capability_mb_sets_both_matches() {
        let c = Colors::parse_capabilities("MB=4;35").unwrap();
        assert_eq!(c.match_ascii.as_deref(), Some("4;35"));
        assert_eq!(c.match_hex.as_deref(), Some("4;35"));
        let c = Colors::parse_capabilities("mt=44").unwrap();
        assert_eq!(c.match_hex.as_deref(), Some("44"));
    }

    #[test]
    fn capability_unknown_key_ignored_bad_value_rejects() {
        assert!(Colors::parse_capabilities("zz=1").is_some());
        assert!(Colors::parse_capabilities("bn=zz").is_none());
        assert!(Colors::parse_capabilities("bn").is_none());
    }

    #[test]
    fn emit_helpers() {
        let mut out: Vec<u8> = Vec::new();
        color_start(&mut out, &Some("1;31".to_owned())).unwrap();
        out.extend_from_slice(b"X");
        color_end(&mut out, &Some("1;31".to_owned())).unwrap();
        assert_eq!(out, b"\x1B[1;31mX\x1B[m");

        let mut out: Vec<u8> = Vec::new();
        color_start(&mut out, &None).unwrap();
        color_end(&mut out, &None).unwrap();
        assert!(out.is_empty());
    }
}
