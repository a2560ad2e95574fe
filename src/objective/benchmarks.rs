//! Benchmark objectives
//!
//! Standard test functions expressed as utilities: each one negates the
//! textbook (minimization) form so that the optimum is a maximum.

use std::f64::consts::PI;

use nalgebra::DVector;

use crate::objective::traits::{ObjectiveFunction, ParameterVector};

/// Trait for benchmark functions
pub trait BenchmarkFunction: Send + Sync {
    /// Name of the benchmark function
    fn name(&self) -> &'static str;

    /// Dimensionality of the problem
    fn dimension(&self) -> usize;

    /// Location of the global maximum of the utility
    fn optimal_solution(&self) -> ParameterVector;

    /// Evaluate the textbook form (returns value to be MINIMIZED)
    fn evaluate_raw(&self, x: &[f64]) -> f64;
}

/// Sphere function: f(x) = Σ(xᵢ - cᵢ)²
///
/// Unimodal, convex, separable. Optimum at the center `c`.
#[derive(Clone, Debug)]
pub struct Sphere {
    center: ParameterVector,
}

impl Sphere {
    /// Sphere centered at the origin
    pub fn new(dimension: usize) -> Self {
        Self {
            center: DVector::zeros(dimension),
        }
    }

    /// Sphere centered at an arbitrary point
    pub fn centered_at(center: ParameterVector) -> Self {
        Self { center }
    }

    /// Euclidean distance from `x` to the optimum
    pub fn distance_to_optimum(&self, x: &ParameterVector) -> f64 {
        (x - &self.center).norm()
    }
}

impl BenchmarkFunction for Sphere {
    fn name(&self) -> &'static str {
        "Sphere"
    }

    fn dimension(&self) -> usize {
        self.center.len()
    }

    fn optimal_solution(&self) -> ParameterVector {
        self.center.clone()
    }

    fn evaluate_raw(&self, x: &[f64]) -> f64 {
        x.iter()
            .zip(self.center.iter())
            .map(|(xi, ci)| (xi - ci).powi(2))
            .sum()
    }
}

/// Rastrigin function: f(x) = 10n + Σ(xᵢ² - 10cos(2πxᵢ))
///
/// Highly multimodal with many local minima. Optimum at origin.
#[derive(Clone, Debug)]
pub struct Rastrigin {
    dimension: usize,
}

impl Rastrigin {
    /// Create a new Rastrigin function
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl BenchmarkFunction for Rastrigin {
    fn name(&self) -> &'static str {
        "Rastrigin"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn optimal_solution(&self) -> ParameterVector {
        DVector::zeros(self.dimension)
    }

    fn evaluate_raw(&self, x: &[f64]) -> f64 {
        let a = 10.0;
        let n = x.len() as f64;
        a * n
            + x.iter()
                .map(|xi| xi * xi - a * (2.0 * PI * xi).cos())
                .sum::<f64>()
    }
}

/// Rosenbrock function: f(x) = Σ[100(xᵢ₊₁-xᵢ²)² + (1-xᵢ)²]
///
/// Valley structure, non-separable. Optimum at (1,1,...,1).
#[derive(Clone, Debug)]
pub struct Rosenbrock {
    dimension: usize,
}

impl Rosenbrock {
    /// Create a new Rosenbrock function
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl BenchmarkFunction for Rosenbrock {
    fn name(&self) -> &'static str {
        "Rosenbrock"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn optimal_solution(&self) -> ParameterVector {
        DVector::from_element(self.dimension, 1.0)
    }

    fn evaluate_raw(&self, x: &[f64]) -> f64 {
        x.windows(2)
            .map(|w| {
                let xi = w[0];
                let xi1 = w[1];
                100.0 * (xi1 - xi * xi).powi(2) + (1.0 - xi).powi(2)
            })
            .sum()
    }
}

macro_rules! benchmark_objective {
    ($($ty:ty),*) => {
        $(
            impl ObjectiveFunction for $ty {
                fn param_size(&self) -> usize {
                    self.dimension()
                }

                fn utility(&self, x: &ParameterVector) -> f64 {
                    -self.evaluate_raw(x.as_slice())
                }
            }
        )*
    };
}

benchmark_objective!(Sphere, Rastrigin, Rosenbrock);
