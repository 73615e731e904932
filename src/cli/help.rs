//! Usage and version text.

use crate::cli::constants::PROG_NAME;

/// Print the option summary to stdout (for `--help`).
pub fn print_usage() {
    println!("usage: {} [options] [+offset] [infile [outfile]]", PROG_NAME);
    println!("       {} --reverse [options] [infile [outfile]]", PROG_NAME);
    println!();
    println!("options:");
    println!("  -A, --no-ascii             suppress the ASCII column");
    println!("  -b, --bits=NUM             numeric search size in bits (8-64)");
    println!("  -B, --bytes=NUM            numeric search size in bytes (1-8)");
    println!("  -C, --c-array[=FMT]        dump as a C array ([8cilstu])");
    println!("  -c, --color=WHEN           when to colorize output");
    println!("  -d, --decimal              print offsets in decimal");
    println!("  -E, --big-endian=NUM       search for big-endian number");
    println!("  -e, --little-endian=NUM    search for little-endian number");
    println!("  -g, --group-by=NUM         group hex bytes by 1, 2, 4, 8, 16, or 32");
    println!("  -H, --host-endian=NUM      search for host-endian number");
    println!("  -h, --help                 print this help and exit");
    println!("  -i, --ignore-case          case-insensitive string search");
    println!("  -j, --skip-bytes=NUM       skip NUM input bytes first");
    println!("  -L, --max-lines=NUM        dump at most NUM lines");
    println!("  -m, --matching-only        print only rows having matches");
    println!("  -N, --max-bytes=NUM        dump at most NUM bytes");
    println!("  -n, --strings[=NUM]        dump strings of at least NUM characters");
    println!("  -O, --no-offsets           suppress the offset column");
    println!("  -o, --octal                print offsets in octal");
    println!("  -P, --plain                same as -A -O -g32");
    println!("  -p, --printing-only        print only rows having printable characters");
    println!("  -r, --reverse              convert a dump back into binary");
    println!("  -S, --strings-opts=OPTS    strings-mode options ([0flnrstvw*-])");
    println!("  -s, --string=STR           search for a string");
    println!("  -T, --total-matches-only   print only the total match count");
    println!("  -t, --total-matches        print the total match count");
    println!("  -U, --utf8-padding=CHAR    padding character for UTF-8 cells");
    println!("  -u, --utf8=WHEN            when to dump UTF-8 characters");
    println!("  -V, --version              print version and exit");
    println!("  -v, --verbose              dump all rows, even repeated ones");
    println!("  -x, --hexadecimal          print offsets in hexadecimal (default)");
}

/// Print the version line to stdout (for `--version`).
pub fn print_version() {
    println!("{} {}", PROG_NAME, env!("CARGO_PKG_VERSION"));
}
