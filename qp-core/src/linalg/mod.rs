//! Linear algebra layer.
//!
//! Sparse constraint storage and dense factorization helpers.

pub mod dense;
pub mod sparse;
