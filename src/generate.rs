use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::formula::Formula;

pub fn var_name(idx: usize) -> String {
    format!("x{}", idx)
}

/// Random formula over `x1..=x{vars}` with at most `depth` connectives on
/// any root-to-leaf path.
pub fn random_formula(rng: &mut ChaCha8Rng, vars: usize, depth: usize) -> Formula<String> {
    let vars = vars.max(1);
    // stop early now and then so trees are not all perfectly balanced
    if depth == 0 || rng.random_range(0..4) == 0 {
        let idx = rng.random_range(1..=vars);
        return Formula::lit(var_name(idx), rng.random::<bool>());
    }
    let left = random_formula(rng, vars, depth - 1);
    let right = random_formula(rng, vars, depth - 1);
    if rng.random::<bool>() {
        Formula::and(left, right)
    } else {
        Formula::or(left, right)
    }
}

/// `x1 && (x2 && (... && xn))`, right-nested.
pub fn and_chain(n: usize) -> Formula<String> {
    let n = n.max(1);
    (1..n).rev().fold(Formula::pos(var_name(n)), |acc, i| {
        Formula::and(Formula::pos(var_name(i)), acc)
    })
}

/// Alternates `And`/`Or` for `depth` levels, e.g. depth 3 gives
/// `(x1 && (!x2 || (x3 && x4)))`. Always satisfiable.
pub fn alternating(depth: usize) -> Formula<String> {
    let mut f = Formula::pos(var_name(depth + 1));
    for i in (1..=depth).rev() {
        f = if i % 2 == 1 {
            Formula::and(Formula::pos(var_name(i)), f)
        } else {
            Formula::or(Formula::neg(var_name(i)), f)
        };
    }
    f
}

/// `((a1 || b1) && ((a2 || b2) && ... (z && !z)))`. The innermost conjunct
/// always conflicts, so the search visits all `2^n` branch combinations
/// before reporting unsat.
pub fn backtrack_ladder(n: usize) -> Formula<String> {
    let clash = Formula::and(Formula::pos("z".to_string()), Formula::neg("z".to_string()));
    (1..=n).rev().fold(clash, |acc, i| {
        let choice = Formula::or(
            Formula::pos(format!("a{}", i)),
            Formula::pos(format!("b{}", i)),
        );
        Formula::and(choice, acc)
    })
}
