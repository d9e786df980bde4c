pub mod bindings;
pub mod list;

pub use bindings::{Assignment, BindingStore, Conflict};
pub use list::ConsList;
