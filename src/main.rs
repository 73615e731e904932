//! Binary entry point for the `ad` command-line tool.
//!
//! Control flow:
//!
//! 1. [`parse_args`] processes all flags and operands into a `ParsedArgs`.
//! 2. [`Config::resolve`] cross-validates options and derives the run
//!    configuration.
//! 3. [`run`] opens the streams and dispatches to one of the three sinks —
//!    the dumper, the C-array emitter, or the reverse parser — and returns
//!    the process exit code.

use ad::cli::args::parse_args;
use ad::cli::constants::{EX_DATAERR, EX_IOERR, EX_NO_MATCHES, EX_OK, PROG_NAME};
use ad::config::{Config, TotalMatches};
use ad::io::{open_input, open_output, ByteSource};
use ad::matcher::Matcher;
use ad::reverse::ReverseError;

/// Execute the operation selected by the resolved configuration.
///
/// Returns the process exit code.
fn run(config: Config) -> i32 {
    let input = open_input(&config.input_path);
    let mut output = open_output(&config.output_path);

    // ── Reverse mode ─────────────────────────────────────────────────────────
    if config.reverse {
        return match ad::reverse::reverse(&config, input, &mut output) {
            Ok(()) => EX_OK,
            Err(ReverseError::Parse(e)) => {
                eprintln!("{}: {}", PROG_NAME, e);
                EX_DATAERR
            }
            Err(ReverseError::Io(e)) => {
                eprintln!("{}: {}: {}", PROG_NAME, config.output_path, e);
                EX_IOERR
            }
        };
    }

    let source = ByteSource::new(input, &config.input_path, config.skip, config.max_bytes);

    // ── C-array sink (matching is irrelevant: null pattern) ──────────────────
    if config.c_array.is_some() {
        let mut matcher = Matcher::pass_through(source);
        if let Err(e) = ad::carray::emit(&config, &mut matcher, &mut output) {
            eprintln!("{}: {}: {}", PROG_NAME, config.output_path, e);
            return EX_IOERR;
        }
        if let Err(e) = std::io::Write::flush(&mut output) {
            eprintln!("{}: {}: {}", PROG_NAME, config.output_path, e);
            return EX_IOERR;
        }
        return EX_OK;
    }

    // ── Dump sink ────────────────────────────────────────────────────────────
    let mut matcher = Matcher::new(source, &config);
    if let Err(e) = ad::dump::dump(&config, &mut matcher, &mut output) {
        eprintln!("{}: {}: {}", PROG_NAME, config.output_path, e);
        return EX_IOERR;
    }
    if let Err(e) = std::io::Write::flush(&mut output) {
        eprintln!("{}: {}: {}", PROG_NAME, config.output_path, e);
        return EX_IOERR;
    }

    let total = matcher.total_matches();
    if config.total_matches != TotalMatches::No {
        eprintln!("{}", total);
    }
    if config.search.is_some() && total == 0 {
        return EX_NO_MATCHES;
    }
    EX_OK
}

fn main() {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => ad::fatal_usage!("{}", e),
    };

    // --help / --version were already handled; exit 0.
    if args.exit_early {
        std::process::exit(EX_OK);
    }

    let config = match Config::resolve(args) {
        Ok(c) => c,
        Err(e) => ad::fatal_usage!("{}", e),
    };

    std::process::exit(run(config));
}
