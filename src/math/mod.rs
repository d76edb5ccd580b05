//! Mathematical utilities: least-squares trend fitting.

pub mod ols;

pub use ols::*;
