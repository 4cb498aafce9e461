// promptclean/src/ui/output_format.rs
//! Styled status messages for stderr.
//!
//! Colors are applied only when the caller says the writer is a terminal, so
//! redirected output and test captures stay plain.

use owo_colors::{AnsiColors, OwoColorize};
use std::io::{self, Write};

fn print_prefixed<W: Write>(
    writer: &mut W,
    prefix: &str,
    color: AnsiColors,
    message: &str,
    supports_color: bool,
) -> io::Result<()> {
    if supports_color {
        writeln!(writer, "{} {}", prefix.color(color).bold(), message)
    } else {
        writeln!(writer, "{} {}", prefix, message)
    }
}

pub fn print_info_message<W: Write>(writer: &mut W, message: &str, supports_color: bool) -> io::Result<()> {
    print_prefixed(writer, "[info]", AnsiColors::Cyan, message, supports_color)
}

pub fn print_error_message<W: Write>(writer: &mut W, message: &str, supports_color: bool) -> io::Result<()> {
    print_prefixed(writer, "[error]", AnsiColors::Red, message, supports_color)
}
