//! Generators for the benchmark problem families. Every instance is
//! unsatisfiable, so all calculi must close it.

use std::rc::Rc;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::logic::{signed::SignedFormula, Formula};

fn a(i: usize) -> Rc<Formula> {
    Formula::atom(&format!("a{}", i))
}

fn b(i: usize) -> Rc<Formula> {
    Formula::atom(&format!("b{}", i))
}

// `ai -> (a(i+1)|b(i+1))` and the same for `bi`, for every `i` in `1..=n`.
fn gamma_steps(n: usize, negated: bool) -> Vec<Rc<Formula>> {
    let step = |premise: Rc<Formula>, i: usize| {
        let next = Formula::or(a(i + 1), b(i + 1));
        if negated {
            Formula::or(Formula::not(premise), next)
        } else {
            Formula::implies(premise, next)
        }
    };
    (1..=n)
        .flat_map(|i| [step(a(i), i), step(b(i), i)])
        .collect()
}

/// `gamma_n`: from `a1|b1` and `ai -> (a(i+1)|b(i+1))`, `bi -> (a(i+1)|b(i+1))`
/// for `i` in `1..=n` refute `F a(n+1)|b(n+1)`. With `negated` the
/// implications are written as `(!ai)|...`.
pub fn gamma(n: usize, negated: bool) -> Vec<SignedFormula> {
    gamma_padded(n, negated, 0, 0)
}

/// `gamma_n` with `irrelevant` random formulas interleaved with the steps.
/// The padding is built around the atoms `ci`, `di`, which play no part in
/// the refutation, and is fully determined by `seed`.
pub fn gamma_padded(n: usize, negated: bool, irrelevant: usize, seed: u64) -> Vec<SignedFormula> {
    let mut rng = StdRng::seed_from_u64(seed);
    let relevant: Vec<String> = (1..=n + 1)
        .flat_map(|i| [format!("a{}", i), format!("b{}", i)])
        .collect();
    let unrelated: Vec<String> = (1..=n + 1)
        .flat_map(|i| [format!("c{}", i), format!("d{}", i)])
        .collect();
    let padding: Vec<_> = (0..irrelevant)
        .map(|_| random_formula(&mut rng, &relevant, &unrelated))
        .collect();

    let steps = gamma_steps(n, negated);
    let mut items = vec![SignedFormula::t(Formula::or(a(1), b(1)))];
    for j in 0..steps.len().max(padding.len()) {
        for f in [steps.get(j), padding.get(j)].into_iter().flatten() {
            items.push(SignedFormula::t(f.clone()));
        }
    }
    items.push(SignedFormula::f(Formula::or(a(n + 1), b(n + 1))));
    items
}

// Starts from an unrelated atom and wraps it in one to three connectives.
fn random_formula(rng: &mut StdRng, relevant: &[String], unrelated: &[String]) -> Rc<Formula> {
    let pick = |atoms: &[String], rng: &mut StdRng| {
        Formula::atom(&atoms[rng.gen_range(0..atoms.len())])
    };
    let mut f = pick(unrelated, rng);
    for _ in 0..rng.gen_range(1..=3) {
        f = match rng.gen_range(0..4) {
            0 => Formula::not(f),
            1 => {
                let side = if rng.gen_bool(0.5) { relevant } else { unrelated };
                Formula::and(pick(side, rng), f)
            }
            2 => Formula::or(pick(unrelated, rng), f),
            _ => {
                let atom = pick(relevant, rng);
                if rng.gen_bool(0.5) {
                    Formula::implies(atom, f)
                } else {
                    Formula::implies(f, atom)
                }
            }
        };
    }
    f
}

/// `h_n`: the disjunction of all `2^n` conjunctions of `p1..pn` with every
/// sign pattern is valid. With `negated` each conjunction is written as a
/// negated disjunction.
pub fn h(n: usize, negated: bool) -> Vec<SignedFormula> {
    assert!(n >= 1, "h needs at least one atom");
    let conjunctions = (0..1usize << n)
        .map(|pattern| {
            let literals = (1..=n)
                .map(|j| {
                    let p = Formula::atom(&format!("p{}", j));
                    if (pattern >> (j - 1)) & 1 == 1 {
                        if negated {
                            Formula::not(p)
                        } else {
                            p
                        }
                    } else if negated {
                        p
                    } else {
                        Formula::not(p)
                    }
                })
                .collect();
            if negated {
                Formula::not(Formula::or_of(literals))
            } else {
                Formula::and_of(literals)
            }
        })
        .collect();
    vec![SignedFormula::f(Formula::or_of(conjunctions))]
}

/// Statman's `S_n` over the atoms `cj`, `dj`. With `F_k` the conjunction of
/// `cj|dj` for `j` in `0..=k`, the premises are `c0|d0` and
/// `(F_(j-1) -> cj)|(F_(j-1) -> dj)`; the goal is `c(n-1)|d(n-1)`. With
/// `negated` only `!` and `|` occur.
pub fn statman(n: usize, negated: bool) -> Vec<SignedFormula> {
    assert!(n >= 1, "statman needs n >= 1");
    let c = |j: usize| Formula::atom(&format!("c{}", j));
    let d = |j: usize| Formula::atom(&format!("d{}", j));

    let prefixes: Vec<_> = (0..n - 1)
        .map(|k| {
            let pairs: Vec<_> = (0..=k)
                .map(|j| {
                    let pair = Formula::or(c(j), d(j));
                    if negated {
                        Formula::not(pair)
                    } else {
                        pair
                    }
                })
                .collect();
            if negated {
                Formula::not(Formula::or_of(pairs))
            } else {
                Formula::and_of(pairs)
            }
        })
        .collect();
    let guarded = |j: usize, goal: Rc<Formula>| {
        if j == 0 {
            goal
        } else if negated {
            Formula::or(Formula::not(prefixes[j - 1].clone()), goal)
        } else {
            Formula::implies(prefixes[j - 1].clone(), goal)
        }
    };

    let mut items: Vec<_> = (0..n)
        .map(|j| SignedFormula::t(Formula::or(guarded(j, c(j)), guarded(j, d(j)))))
        .collect();
    items.push(SignedFormula::f(Formula::or(c(n - 1), d(n - 1))));
    items
}

/// Pigeonhole principle for `n` holes and `n + 1` pigeons: if every pigeon
/// sits in some hole, some hole holds two pigeons. Atom `pi,j` reads
/// "pigeon i sits in hole j". With `negated` the formula only uses `!` and
/// `|`.
pub fn php(n: usize, negated: bool) -> Vec<SignedFormula> {
    assert!(n >= 1, "php needs at least one hole");
    let p = |i: usize, j: usize| Formula::atom(&format!("p{},{}", i, j));

    let rows: Vec<_> = (0..=n)
        .map(|i| {
            let row = Formula::or_of((0..n).map(|j| p(i, j)).collect());
            if negated {
                Formula::not(row)
            } else {
                row
            }
        })
        .collect();
    let every_pigeon_placed = if negated {
        Formula::not(Formula::or_of(rows))
    } else {
        Formula::and_of(rows)
    };

    let mut shared = vec![];
    for j in 0..n {
        for i in 0..n {
            for k in i + 1..=n {
                shared.push(if negated {
                    Formula::not(Formula::or(
                        Formula::not(p(i, j)),
                        Formula::not(p(k, j)),
                    ))
                } else {
                    Formula::and(p(i, j), p(k, j))
                });
            }
        }
    }
    let some_hole_shared = Formula::or_of(shared);

    let php = if negated {
        Formula::or(Formula::not(every_pigeon_placed), some_hole_shared)
    } else {
        Formula::implies(every_pigeon_placed, some_hole_shared)
    };
    vec![SignedFormula::f(php)]
}
