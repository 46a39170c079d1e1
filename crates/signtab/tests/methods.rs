use signtab::{
    calculus::prove,
    families::{gamma, gamma_padded, h, php, statman},
    parse::{dimacs::parse_dimacs, prove::parse_prove},
    session, Method, Params, Prover,
};

fn params(method: Method) -> Params {
    Params {
        method,
        trace: false,
    }
}

#[test]
fn families_close_under_every_method() {
    session(|| {
        for method in Method::ALL {
            for negated in [false, true] {
                for n in 1..=3 {
                    let report = prove(gamma(n, negated), &params(method));
                    assert!(report.closed, "{} gamma({}, {})", method, n, negated);
                }
                for n in 1..=2 {
                    let report = prove(php(n, negated), &params(method));
                    assert!(report.closed, "{} php({}, {})", method, n, negated);
                }
                for n in 1..=3 {
                    let report = prove(h(n, negated), &params(method));
                    assert!(report.closed, "{} h({}, {})", method, n, negated);
                    let report = prove(statman(n, negated), &params(method));
                    assert!(report.closed, "{} statman({}, {})", method, n, negated);
                }
                for seed in [1, 42] {
                    let report = prove(gamma_padded(2, negated, 4, seed), &params(method));
                    assert!(report.closed, "{} padded gamma seed {}", method, seed);
                }
            }
        }
    })
}

#[test]
fn satisfiable_sets_stay_open() {
    session(|| {
        let problems = ["T(a|b) Fa", "T(a->b) Fb", "F((a&b)->c)", "T(!(a&b)) Ta"];
        for method in Method::ALL {
            for text in problems {
                let mut prover = method.build(parse_prove(text).unwrap());
                assert!(!prover.close(), "{} on {}", method, text);
                assert!(!prover.is_closed());
            }
        }
    })
}

#[test]
fn counts_are_consistent() {
    session(|| {
        for method in Method::ALL {
            let items = gamma(2, false);
            let roots = items.len();
            let mut prover = method.build(items);
            let before = prover.render(0);
            assert_eq!(1, prover.count_nodes());
            assert_eq!(roots, prover.count_formulae());
            assert_eq!(roots, before.lines().count());

            assert!(prover.close());
            assert!(prover.is_closed());
            assert_eq!(prover.count_formulae(), prover.render(0).lines().count());
            assert!(prover.render(0).starts_with(&before));
            // closing again changes nothing
            let nodes = prover.count_nodes();
            assert!(prover.close());
            assert_eq!(nodes, prover.count_nodes());
        }
    })
}

#[test]
fn relevance_set_only_for_kes3() {
    session(|| {
        for method in Method::ALL {
            let report = prove(php(2, true), &params(method));
            match method {
                Method::KeS3 | Method::KeS3NegLast => assert!(report.relevance_size() > 0),
                _ => assert!(report.relevance_set.is_none()),
            }
        }
    })
}

#[test]
fn dimacs_problem() {
    session(|| {
        let cnf = "c all four clauses over two variables\n\
                   p cnf 2 4\n\
                   1 2 0\n\
                   -1 2 0\n\
                   1 -2 0\n\
                   -1 -2 0\n";
        for method in Method::ALL {
            let items = parse_dimacs(cnf).unwrap();
            assert_eq!(4, items.len());
            assert!(prove(items, &params(method)).closed, "{}", method);
        }

        let sat = "p cnf 3 2\n1 -2 0\n2 3 0\n";
        for method in Method::ALL {
            assert!(!prove(parse_dimacs(sat).unwrap(), &params(method)).closed);
        }
    })
}

#[test]
fn trace_keeps_rendering() {
    session(|| {
        let report = prove(
            parse_prove("T(a|b)\nFa\nFb\n").unwrap(),
            &Params {
                method: Method::KeS3,
                trace: true,
            },
        );
        assert!(report.closed);
        let tableau = report.tableau.unwrap();
        assert!(tableau.starts_with("0 T (a|b)\n1 F a\n2 F b\n"));
    })
}
