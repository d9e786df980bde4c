use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tableausat::generate::random_formula;
use tableausat::tableau::{Outcome, solve};

proptest! {
    #[test]
    fn models_satisfy_formula(seed in any::<u64>(), vars in 1usize..6, depth in 0usize..7) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let f = random_formula(&mut rng, vars, depth);
        if let Outcome::Satisfiable(model) = solve(&f) {
            // unassigned variables may take either value
            prop_assert_eq!(f.eval_partial(&|v| model.value(v)), Some(true), "formula {}", f);
            let as_false = f.eval(&|v| model.value(v).unwrap_or(false));
            let as_true = f.eval(&|v| model.value(v).unwrap_or(true));
            prop_assert!(as_false && as_true, "formula {} model {}", f, model);
        }
    }

    #[test]
    fn verdict_agrees_with_truth_table(seed in any::<u64>(), vars in 1usize..6, depth in 0usize..7) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let f = random_formula(&mut rng, vars, depth);
        let oracle = f.brute_force_sat().expect("few variables");
        prop_assert_eq!(solve(&f).is_sat(), oracle, "formula {}", f);
    }

    #[test]
    fn solving_is_deterministic(seed in any::<u64>(), depth in 0usize..7) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let f = random_formula(&mut rng, 4, depth);
        let first = solve(&f);
        let second = solve(&f);
        let order = |o: &Outcome<String>| {
            o.assignment()
                .map(|a| a.iter().map(|(k, b)| (k.clone(), b)).collect::<Vec<_>>())
        };
        prop_assert_eq!(order(&first), order(&second));
    }

    #[test]
    fn model_only_binds_mentioned_variables(seed in any::<u64>(), depth in 0usize..7) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let f = random_formula(&mut rng, 5, depth);
        let vars = f.variables();
        if let Some(model) = solve(&f).assignment() {
            prop_assert!(model.iter().all(|(k, _)| vars.contains(k)));
        }
    }
}
