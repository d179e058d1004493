//! HIR layer tests
//!
//! End-to-end conversions through the public pipeline and the symbol
//! table properties they rely on.

pub mod tests_end_to_end;
pub mod tests_symbol_properties;
