#![deny(missing_debug_implementations)]

#[macro_use]
extern crate log;

pub mod error;
pub mod hresult;
pub mod macros;
pub mod print_table;

pub use print_table::Print;
pub use tabled::{Style, Table};
