//! Cutting-stock optimization for rebar.
//!
//! Pieces are grouped by diameter and each group is packed onto fixed-length
//! stock bars with a best-fit decreasing heuristic.

pub mod optimizer;
pub mod render;
pub mod types;

pub use optimizer::{optimize, Optimizer};
pub use types::*;
