//! Property-based tests for evo-opt
//!
//! Uses proptest to verify invariants of the transforms, the budget
//! derivation and the optimizers.

use evo_opt::prelude::*;
use nalgebra::DVector;
use proptest::prelude::*;

proptest! {
    // ==================== Transform Properties ====================

    #[test]
    fn pheno_always_inside_box(genes in prop::collection::vec(-1e4..1e4f64, 1..8)) {
        let gp = PiecewiseQuadraticBounds::uniform(0.0, 1.005, genes.len()).unwrap();
        let y = gp.pheno(&DVector::from_vec(genes));
        prop_assert!(gp.contains(&y));
    }

    #[test]
    fn geno_inverts_pheno_inside_box(values in prop::collection::vec(0.0..1.005f64, 1..8)) {
        let gp = PiecewiseQuadraticBounds::uniform(0.0, 1.005, values.len()).unwrap();
        let y = DVector::from_vec(values);
        let back = gp.pheno(&gp.geno(&y));
        for (a, b) in back.iter().zip(y.iter()) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn arbitrary_boxes_hold_pheno(
        lower in -50.0..50.0f64,
        width in 1e-3..100.0f64,
        x in -1e3..1e3f64
    ) {
        let gp = PiecewiseQuadraticBounds::uniform(lower, lower + width, 1).unwrap();
        let y = gp.pheno(&DVector::from_element(1, x));
        prop_assert!(y[0] >= lower && y[0] <= lower + width);
    }

    // ==================== Budget Properties ====================

    #[test]
    fn auto_budget_follows_formula(dim in 1usize..50, negative in i64::MIN..0) {
        let config = CmaesConfig::default().with_max_fun_evals(negative);
        let budget = SearchBudget::derive(&config, dim);
        prop_assert_eq!(budget.max_fun_evals, 900 * (dim + 3) * (dim + 3));
        prop_assert_eq!(budget.max_iterations, 100_000);
    }

    #[test]
    fn explicit_budget_is_kept(dim in 1usize..50, evals in 0i64..1_000_000) {
        let config = CmaesConfig::default().with_max_fun_evals(evals);
        let budget = SearchBudget::derive(&config, dim);
        prop_assert_eq!(budget.max_fun_evals, evals as usize);
        prop_assert_eq!(budget.max_iterations, 100_000);
    }

    // ==================== Baseline Properties ====================

    #[test]
    fn random_point_in_unit_cube(dim in 1usize..30) {
        let f = Sphere::new(dim);
        let x = RandomPoint.optimize(&f, true).unwrap();
        prop_assert_eq!(x.len(), dim);
        prop_assert!(x.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    // ==================== Optimizer Properties ====================

    #[test]
    fn bounded_results_inside_box(
        center in prop::collection::vec(-3.0..3.0f64, 1..5),
        seed in any::<u64>()
    ) {
        let f = Sphere::centered_at(DVector::from_vec(center.clone()));
        let config = CmaesConfig::default().with_max_fun_evals(400).with_seed(seed);
        let x = Cmaes::new(config).optimize(&f, true).unwrap();

        prop_assert_eq!(x.len(), center.len());
        prop_assert!(x.iter().all(|&v| (0.0..=1.005).contains(&v)));
    }

    #[test]
    fn unbounded_results_finite(
        center in prop::collection::vec(-20.0..20.0f64, 1..5),
        seed in any::<u64>()
    ) {
        let f = Sphere::centered_at(DVector::from_vec(center.clone()));
        let config = CmaesConfig::default().with_max_fun_evals(400).with_seed(seed);
        let x = Cmaes::new(config).optimize(&f, false).unwrap();

        prop_assert_eq!(x.len(), center.len());
        prop_assert!(x.iter().all(|v| v.is_finite()));
    }
}
