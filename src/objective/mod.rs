//! Objective functions and benchmarks
//!
//! This module provides the utility abstraction consumed by the optimizers.

pub mod benchmarks;
pub mod traits;

pub mod prelude {
    pub use super::benchmarks::*;
    pub use super::traits::*;
}
