use std::{collections::BTreeSet, time::Instant};

use log::info;
use serde::{Deserialize, Serialize};

use crate::calculi::{tableaux::tree::Tree, Method};
use crate::logic::signed::SignedFormula;
use crate::symbol::Symbol;

/// A tableau prover for a fixed set of root formulas.
pub trait Prover {
    /// Expands the tableau until every branch is closed or no rule applies.
    /// Returns whether the tableau is closed. Repeated calls return the first
    /// outcome.
    fn close(&mut self) -> bool;

    fn tree(&self) -> &Tree;

    fn is_closed(&self) -> bool {
        self.tree().root().is_closed()
    }

    fn count_nodes(&self) -> usize {
        self.tree().count_nodes()
    }

    fn count_formulae(&self) -> usize {
        self.tree().count_formulae()
    }

    fn render(&self, level: usize) -> String {
        self.tree().render(level)
    }

    /// Atoms relevant to the proof. Only tracked by KE-S3.
    fn relevance_set(&self) -> Option<BTreeSet<Symbol>> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct Params {
    pub method: Method,
    /// Keep the rendered tableau in the report.
    pub trace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofReport {
    pub method: Method,
    pub closed: bool,
    pub nodes: usize,
    pub formulae: usize,
    pub seconds: f64,
    #[serde(rename = "relevanceSet", skip_serializing_if = "Option::is_none")]
    pub relevance_set: Option<Vec<Symbol>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tableau: Option<String>,
}

impl ProofReport {
    /// Size of the relevance set, 0 for calculi without one.
    pub fn relevance_size(&self) -> usize {
        self.relevance_set.as_ref().map_or(0, Vec::len)
    }
}

/// Builds the tableau for `items`, closes it and collects statistics.
pub fn prove(items: Vec<SignedFormula>, params: &Params) -> ProofReport {
    let mut prover = params.method.build(items);

    let start = Instant::now();
    let closed = prover.close();
    let seconds = start.elapsed().as_secs_f64();

    info!(
        "{} finished: closed={} nodes={} formulae={}",
        params.method,
        closed,
        prover.count_nodes(),
        prover.count_formulae()
    );

    ProofReport {
        method: params.method,
        closed,
        nodes: prover.count_nodes(),
        formulae: prover.count_formulae(),
        seconds,
        relevance_set: prover.relevance_set().map(|s| s.into_iter().collect()),
        tableau: params.trace.then(|| prover.render(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::families;
    use crate::session;

    #[test]
    fn report_for_every_method() {
        session(|| {
            for method in Method::ALL {
                let params = Params {
                    method,
                    trace: false,
                };
                let report = prove(families::gamma(2, false), &params);
                assert!(report.closed, "{}", method);
                assert!(report.nodes >= 1);
                assert!(report.formulae >= 6);
                assert!(report.tableau.is_none());
                assert_eq!(
                    matches!(method, Method::KeS3 | Method::KeS3NegLast),
                    report.relevance_set.is_some()
                );
            }
        })
    }

    #[test]
    fn report_json() {
        session(|| {
            let params = Params {
                method: Method::Ke,
                trace: true,
            };
            let report = prove(families::gamma(1, false), &params);
            let json = serde_json::to_value(&report).unwrap();
            assert_eq!("ke", json["method"]);
            assert_eq!(true, json["closed"]);
            assert!(json.get("relevanceSet").is_none());
            assert!(json["tableau"].as_str().unwrap().starts_with("0 T (a1|b1)"));
        })
    }

    #[test]
    fn params_from_json() {
        session(|| {
            let params: Params =
                serde_json::from_str(r#"{"method": "kes3+PB", "trace": false}"#).unwrap();
            assert_eq!(Method::KeS3NegLast, params.method);
            assert!(serde_json::from_str::<Params>(r#"{"method": "dpll", "trace": true}"#).is_err());
        })
    }
}
