//! C source array emission.
//!
//! An alternate sink that renders the input as a C array definition, eight
//! bytes per line with an offset comment, optionally followed by a length
//! variable.  The match engine still feeds this sink, but with a null
//! pattern; matching plays no part here.

use std::io::{self, Write};

use crate::cli::arg_utils::{format_radix, last_name_from_path};
use crate::cli::constants::STD_STREAM_MARK;
use crate::config::{CArrayOpts, Config};
use crate::matcher::Matcher;

/// Bytes per emitted array line.
const BYTES_PER_LINE: usize = 8;

/// Derives the C identifier for the array from the input path.
///
/// Non-identifier bytes become `_`; a leading digit gets a `_` prefix;
/// standard input is simply `stdin`.
pub fn array_name(input_path: &str) -> String {
    if input_path == STD_STREAM_MARK {
        return "stdin".to_owned();
    }
    let base = last_name_from_path(input_path);
    let mut name = String::with_capacity(base.len() + 1);
    for (i, c) in base.chars().enumerate() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if i == 0 && c.is_ascii_digit() {
                name.push('_');
            }
            name.push(c);
        } else {
            name.push('_');
        }
    }
    if name.is_empty() {
        name.push('_');
    }
    name
}

/// Declaration qualifiers and element type for the array line.
fn array_decl(opts: &CArrayOpts, name: &str) -> String {
    let mut decl = String::new();
    if opts.static_ {
        decl.push_str("static ");
    }
    if opts.const_ {
        decl.push_str("const ");
    }
    decl.push_str(if opts.char8 { "char8_t" } else { "unsigned char" });
    decl.push(' ');
    decl.push_str(name);
    decl.push_str("[] = {");
    decl
}

/// The length-variable line, when any length-type letter was given.
fn length_decl(opts: &CArrayOpts, name: &str, len: u64) -> String {
    let mut decl = String::new();
    if opts.static_ {
        decl.push_str("static ");
    }
    if opts.const_ {
        decl.push_str("const ");
    }
    if opts.len_size_t {
        decl.push_str("size_t ");
    } else {
        if opts.len_unsigned {
            decl.push_str("unsigned ");
        }
        if opts.len_long {
            decl.push_str("long ");
        }
        if opts.len_int || !(opts.len_unsigned || opts.len_long) {
            decl.push_str("int ");
        }
    }
    decl.push_str(name);
    decl.push_str("_len = ");
    decl.push_str(&len.to_string());
    if opts.len_unsigned {
        decl.push('u');
    }
    if opts.len_long {
        decl.push('L');
    }
    decl.push(';');
    decl
}

/// Runs the C-array sink to completion.
pub fn emit(config: &Config, matcher: &mut Matcher, out: &mut dyn Write) -> io::Result<()> {
    let opts = config.c_array.unwrap_or_default();
    let name = array_name(&config.input_path);

    writeln!(out, "{}", array_decl(&opts, &name))?;

    let mut offset: u64 = config.skip;
    let mut line: Vec<u8> = Vec::with_capacity(BYTES_PER_LINE);
    let mut total: u64 = 0;
    loop {
        let byte = matcher.next_byte().map(|(b, _)| b);
        match byte {
            Some(b) => {
                line.push(b);
                total += 1;
                if line.len() == BYTES_PER_LINE {
                    write_line(config, out, offset, &line)?;
                    offset += line.len() as u64;
                    line.clear();
                }
            }
            None => {
                if !line.is_empty() {
                    write_line(config, out, offset, &line)?;
                }
                break;
            }
        }
    }
    writeln!(out, "}};")?;

    if opts.wants_length() {
        writeln!(out, "{}", length_decl(&opts, &name, total))?;
    }
    Ok(())
}

/// One array line: optional offset comment, then `0xHH,` entries.
fn write_line(config: &Config, out: &mut dyn Write, offset: u64, bytes: &[u8]) -> io::Result<()> {
    write!(out, "  ")?;
    if let Some(format) = config.offsets {
        write!(out, "/* {} */ ", format_radix(offset, format.radix(), 1))?;
    }
    let entries: Vec<String> = bytes.iter().map(|b| format!("0x{:02X}", b)).collect();
    writeln!(out, "{},", entries.join(", "))
}
