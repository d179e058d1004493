//! Syntax layer tests: literal escaping and printing.

pub mod tests_literals;
pub mod tests_printer;
