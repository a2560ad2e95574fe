//! Genotype/phenotype transforms
//!
//! The engine samples in an unconstrained genotype space and evaluates the
//! objective on the phenotype. A bounded search plugs in
//! [`PiecewiseQuadraticBounds`] so every evaluated point lies inside the box;
//! an unbounded search uses [`Identity`].

use nalgebra::DVector;

use crate::error::{OptError, OptResult};

/// Bidirectional mapping between the engine's search space and the
/// caller's coordinates
pub trait GenoPheno: Send + Sync {
    /// Map an internal (genotype) point to external coordinates
    fn pheno(&self, x: &DVector<f64>) -> DVector<f64>;

    /// Map an external point to internal coordinates
    fn geno(&self, y: &DVector<f64>) -> DVector<f64>;

    /// Dimension the transform is built for, if it is dimension-specific
    fn dimension(&self) -> Option<usize> {
        None
    }
}

/// No transform: genotype and phenotype coincide
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Identity;

impl GenoPheno for Identity {
    fn pheno(&self, x: &DVector<f64>) -> DVector<f64> {
        x.clone()
    }

    fn geno(&self, y: &DVector<f64>) -> DVector<f64> {
        y.clone()
    }
}

/// Per-coordinate bound handling with quadratic bends near the bounds
///
/// Every genotype value maps inside `[lower, upper]`. The map is the identity
/// on the interior `[lower + al, upper - au]`, quadratic on the two margins
/// and periodic outside, so the engine never sees a hard wall.
#[derive(Clone, Debug, PartialEq)]
pub struct PiecewiseQuadraticBounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
    /// Width of the quadratic margin at the lower bound
    al: Vec<f64>,
    /// Width of the quadratic margin at the upper bound
    au: Vec<f64>,
}

impl PiecewiseQuadraticBounds {
    /// Create a transform for the box `[lower_i, upper_i]`
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> OptResult<Self> {
        if lower.len() != upper.len() {
            return Err(OptError::DimensionMismatch {
                expected: lower.len(),
                actual: upper.len(),
            });
        }
        if let Some(i) = (0..lower.len()).find(|&i| !(lower[i] < upper[i])) {
            return Err(OptError::Configuration(format!(
                "lower bound {} must be below upper bound {} in dimension {}",
                lower[i], upper[i], i
            )));
        }

        let al = lower
            .iter()
            .zip(&upper)
            .map(|(&lb, &ub)| ((ub - lb) / 2.0).min((1.0 + lb.abs()) / 20.0))
            .collect();
        let au = lower
            .iter()
            .zip(&upper)
            .map(|(&lb, &ub)| ((ub - lb) / 2.0).min((1.0 + ub.abs()) / 20.0))
            .collect();

        Ok(Self {
            lower,
            upper,
            al,
            au,
        })
    }

    /// Same box `[lower, upper]` in every dimension
    pub fn uniform(lower: f64, upper: f64, dimension: usize) -> OptResult<Self> {
        Self::new(vec![lower; dimension], vec![upper; dimension])
    }

    /// Lower bounds
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Upper bounds
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Check that a point lies inside the box
    pub fn contains(&self, y: &DVector<f64>) -> bool {
        y.len() == self.lower.len()
            && y.iter()
                .enumerate()
                .all(|(i, &v)| v >= self.lower[i] && v <= self.upper[i])
    }

    fn pheno_coordinate(&self, i: usize, x: f64) -> f64 {
        let (lb, ub, al, au) = (self.lower[i], self.upper[i], self.al[i], self.au[i]);

        // shift into the fundamental period [xlow, xup]
        let xlow = lb - 2.0 * al - (ub - lb) / 2.0;
        let xup = ub + 2.0 * au + (ub - lb) / 2.0;
        let period = 2.0 * (ub - lb + al + au);

        let mut y = x;
        if y < xlow {
            y += period * (1.0 + ((xlow - y) / period).trunc());
        }
        if y > xup {
            y -= period * (1.0 + ((y - xup) / period).trunc());
        }

        // reflect into [lb - al, ub + au]
        if y < lb - al {
            y += 2.0 * (lb - al - y);
        }
        if y > ub + au {
            y -= 2.0 * (y - ub - au);
        }

        if y < lb + al {
            lb + (y - (lb - al)).powi(2) / 4.0 / al
        } else if y > ub - au {
            ub - (y - (ub + au)).powi(2) / 4.0 / au
        } else {
            y
        }
    }

    fn geno_coordinate(&self, i: usize, y: f64) -> f64 {
        let (lb, ub, al, au) = (self.lower[i], self.upper[i], self.al[i], self.au[i]);
        let y = y.clamp(lb, ub);

        if y < lb + al {
            (lb - al) + 2.0 * (al * (y - lb)).sqrt()
        } else if y > ub - au {
            (ub + au) - 2.0 * (au * (ub - y)).sqrt()
        } else {
            y
        }
    }
}

impl GenoPheno for PiecewiseQuadraticBounds {
    fn pheno(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_fn(x.len(), |i, _| self.pheno_coordinate(i, x[i]))
    }

    fn geno(&self, y: &DVector<f64>) -> DVector<f64> {
        DVector::from_fn(y.len(), |i, _| self.geno_coordinate(i, y[i]))
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.lower.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box(dimension: usize) -> PiecewiseQuadraticBounds {
        PiecewiseQuadraticBounds::uniform(0.0, 1.005, dimension).unwrap()
    }

    #[test]
    fn test_identity_roundtrip() {
        let x = DVector::from_vec(vec![-3.0, 0.0, 42.0]);
        assert_eq!(Identity.pheno(&x), x);
        assert_eq!(Identity.geno(&x), x);
    }

    #[test]
    fn test_margins() {
        let gp = unit_box(1);
        assert_relative_eq!(gp.al[0], 0.05);
        assert_relative_eq!(gp.au[0], 0.10025);
    }

    #[test]
    fn test_interior_is_identity() {
        let gp = unit_box(3);
        let x = DVector::from_vec(vec![0.5, 0.2, 0.8]);
        assert_eq!(gp.pheno(&x), x);
        assert_eq!(gp.geno(&x), x);
    }

    #[test]
    fn test_pheno_stays_in_bounds() {
        let gp = unit_box(1);
        for &v in &[-1e6, -37.2, -1.0, -0.05, 0.0, 0.01, 0.99, 1.1, 2.5, 13.0, 1e6] {
            let y = gp.pheno(&DVector::from_element(1, v));
            assert!(gp.contains(&y), "pheno({}) = {} is out of bounds", v, y[0]);
        }
    }

    #[test]
    fn test_geno_inverts_pheno_near_bounds() {
        let gp = unit_box(2);
        let y = DVector::from_vec(vec![0.01, 0.999]);
        let x = gp.geno(&y);
        let back = gp.pheno(&x);
        assert_relative_eq!(back[0], y[0], epsilon = 1e-12);
        assert_relative_eq!(back[1], y[1], epsilon = 1e-12);
    }

    #[test]
    fn test_pheno_is_periodic() {
        let gp = unit_box(1);
        let period = 2.0 * (1.005 + 0.05 + 0.10025);
        let a = gp.pheno(&DVector::from_element(1, 0.3));
        let b = gp.pheno(&DVector::from_element(1, 0.3 + 3.0 * period));
        assert_relative_eq!(a[0], b[0], epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_box() {
        assert!(matches!(
            PiecewiseQuadraticBounds::uniform(1.0, 1.0, 2),
            Err(OptError::Configuration(_))
        ));
        assert!(matches!(
            PiecewiseQuadraticBounds::new(vec![0.0], vec![1.0, 2.0]),
            Err(OptError::DimensionMismatch { .. })
        ));
    }
}
