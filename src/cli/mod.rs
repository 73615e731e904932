//! Command-line surface: argument parsing, scanners, identity, help.

pub mod arg_utils;
pub mod args;
pub mod constants;
pub mod help;
