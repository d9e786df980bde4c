pub mod eval;
pub mod expr;
pub mod parse;

pub use expr::Formula;
pub use parse::{ParseError, parse_formula};
