//! Core compute primitives.
//!
//! A row-major `Matrix` plus the small distance helpers every
//! clustering routine shares. Decompositions go through `nalgebra`.

mod matrix;

pub use matrix::{squared_euclidean, Matrix};
