//! Objective traits
//!
//! Optimizers in this crate maximize. The search engine minimizes, so the
//! adapter hands it a [`Minimize`] view of the objective.

use nalgebra::DVector;

/// A point in parameter space
pub type ParameterVector = DVector<f64>;

/// A scalar utility to be maximized over a real-valued parameter vector
///
/// `utility` may be called from several threads at once and in any order, so
/// it must not rely on mutable shared state. Returning NaN or an infinity is
/// undefined: the shipped engine ranks NaN as the worst possible value but
/// makes no further promises.
pub trait ObjectiveFunction: Send + Sync {
    /// Dimension of the parameter vector (at least 1)
    fn param_size(&self) -> usize;

    /// Evaluate the utility (higher = better)
    fn utility(&self, x: &ParameterVector) -> f64;
}

impl<T: ObjectiveFunction + ?Sized> ObjectiveFunction for &T {
    fn param_size(&self) -> usize {
        (**self).param_size()
    }

    fn utility(&self, x: &ParameterVector) -> f64 {
        (**self).utility(x)
    }
}

/// Minimization view of an objective: `value(x) = -utility(x)`
pub struct Minimize<'a, F: ?Sized> {
    inner: &'a F,
}

impl<'a, F: ObjectiveFunction + ?Sized> Minimize<'a, F> {
    /// Wrap an objective without taking ownership
    pub fn new(objective: &'a F) -> Self {
        Self { inner: objective }
    }

    /// Value to be minimized
    pub fn value(&self, x: &ParameterVector) -> f64 {
        -self.inner.utility(x)
    }
}

/// A closure-backed objective
pub struct FnObjective<F>
where
    F: Fn(&ParameterVector) -> f64,
{
    dimension: usize,
    f: F,
}

impl<F> FnObjective<F>
where
    F: Fn(&ParameterVector) -> f64,
{
    /// Create an objective of the given dimension from a closure
    pub fn new(dimension: usize, f: F) -> Self {
        Self { dimension, f }
    }
}

impl<F> ObjectiveFunction for FnObjective<F>
where
    F: Fn(&ParameterVector) -> f64 + Send + Sync,
{
    fn param_size(&self) -> usize {
        self.dimension
    }

    fn utility(&self, x: &ParameterVector) -> f64 {
        (self.f)(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_objective() {
        let objective = FnObjective::new(3, |x: &ParameterVector| -x.norm_squared());

        assert_eq!(objective.param_size(), 3);
        let x = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(objective.utility(&x), -14.0);
    }

    #[test]
    fn test_minimize_negates_utility() {
        let objective = FnObjective::new(3, |x: &ParameterVector| -x.norm_squared());
        let minimize = Minimize::new(&objective);

        let x = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(minimize.value(&x), 14.0);
    }

    #[test]
    fn test_reference_is_objective() {
        fn dim_of<F: ObjectiveFunction>(f: F) -> usize {
            f.param_size()
        }

        let objective = FnObjective::new(4, |_: &ParameterVector| 0.0);
        assert_eq!(dim_of(&objective), 4);
    }
}
