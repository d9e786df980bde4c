pub mod formula;
pub mod generate;
pub mod store;
pub mod suite;
pub mod tableau;

pub use formula::{Formula, ParseError, parse_formula};
pub use store::{Assignment, BindingStore, Conflict};
pub use tableau::{Outcome, SolveError, SolveOptions, SolveStats, Tableau, solve};
