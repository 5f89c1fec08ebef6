//! Tabular input: the response table type and CSV loading

pub mod loader;
pub mod table;

pub use loader::{load_csv, read_csv};
pub use table::ResponseTable;
