//! Statistical tests

pub mod chi_square;

pub use chi_square::{chi_square_independence, ChiSquareResult};
