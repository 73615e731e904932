//! Program identity, exit statuses, and diagnostic plumbing.
//!
//! Every fatal path in the program funnels through [`fatal`] (or the
//! convenience macros below) so that diagnostics carry a uniform
//! `ad: ...` prefix and the process exits with a meaningful sysexits
//! status.

/// Program name used in diagnostics and help text.
pub const PROG_NAME: &str = "ad";

/// Marker accepted on the command line for a standard stream.
pub const STD_STREAM_MARK: &str = "-";

// ── Exit statuses (sysexits.h values) ─────────────────────────────────────────

/// Successful completion.
pub const EX_OK: i32 = 0;
/// A search was requested and nothing matched.
pub const EX_NO_MATCHES: i32 = 1;
/// Command-line usage error.
pub const EX_USAGE: i32 = 64;
/// Input data was malformed (reverse-mode parse errors).
pub const EX_DATAERR: i32 = 65;
/// Input file does not exist or is not readable.
pub const EX_NOINPUT: i32 = 66;
/// Output file cannot be created.
pub const EX_CANTCREAT: i32 = 73;
/// I/O error while reading or writing.
pub const EX_IOERR: i32 = 74;

// ── Row geometry ──────────────────────────────────────────────────────────────

/// Hard upper bound on bytes per output row.
pub const ROW_BYTES_MAX: usize = 32;

/// Default bytes per output row.
pub const ROW_BYTES_DEFAULT: usize = 16;

/// Narrow offset column width (digits).
pub const OFFSET_WIDTH_MIN: usize = 12;

/// Wide offset column width (digits).
pub const OFFSET_WIDTH_MAX: usize = 16;

// ── Diagnostics ───────────────────────────────────────────────────────────────

/// Print `ad: <msg>` to stderr and exit with `status`.
pub fn fatal(status: i32, msg: &str) -> ! {
    eprintln!("{}: {}", PROG_NAME, msg);
    std::process::exit(status);
}

/// Terminate with [`EX_IOERR`] after a failed read or write.
///
/// `path` is the user-facing name of the stream (`-` for a standard stream).
#[macro_export]
macro_rules! fatal_io {
    ($path:expr, $($arg:tt)*) => {{
        eprintln!(
            "{}: {}: {}",
            $crate::cli::constants::PROG_NAME,
            $path,
            format_args!($($arg)*)
        );
        std::process::exit($crate::cli::constants::EX_IOERR);
    }};
}

/// Terminate with [`EX_USAGE`] and point the user at `--help`.
#[macro_export]
macro_rules! fatal_usage {
    ($($arg:tt)*) => {{
        eprintln!(
            "{}: {}",
            $crate::cli::constants::PROG_NAME,
            format_args!($($arg)*)
        );
        eprintln!("try `{} --help` for more information", $crate::cli::constants::PROG_NAME);
        std::process::exit($crate::cli::constants::EX_USAGE);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sysexits_values() {
        assert_eq!(EX_USAGE, 64);
        assert_eq!(EX_DATAERR, 65);
        assert_eq!(EX_NOINPUT, 66);
        assert_eq!(EX_CANTCREAT, 73);
        assert_eq!(EX_IOERR, 74);
    }

    #[test]
    fn offset_widths_bound_row_bytes() {
        assert!(OFFSET_WIDTH_MIN < OFFSET_WIDTH_MAX);
        assert!(ROW_BYTES_DEFAULT <= ROW_BYTES_MAX);
    }
}
