use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calculus::Prover;
use crate::logic::signed::SignedFormula;
use tableaux::{
    AnalyticTableau, KeS3Tableau, KeTableau, Order, PbHeuristic,
};

pub mod tableaux;

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "&str")]
pub enum Method {
    #[default]
    Analytic,
    AnalyticBottomUp,
    Ke,
    KeValuation,
    KePolarity,
    KeS3,
    KeS3NegLast,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Analytic,
        Method::AnalyticBottomUp,
        Method::Ke,
        Method::KeValuation,
        Method::KePolarity,
        Method::KeS3,
        Method::KeS3NegLast,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Method::Analytic => "analytic",
            Method::AnalyticBottomUp => "analytic+BU",
            Method::Ke => "ke",
            Method::KeValuation => "ke+V",
            Method::KePolarity => "ke+P",
            Method::KeS3 => "kes3",
            Method::KeS3NegLast => "kes3+PB",
        }
    }

    /// Sets up the tableau for `items` with the calculus and strategy this
    /// method names.
    pub fn build(self, items: Vec<SignedFormula>) -> Box<dyn Prover> {
        match self {
            Method::Analytic => Box::new(AnalyticTableau::new(items, Order::TopDown)),
            Method::AnalyticBottomUp => Box::new(AnalyticTableau::new(items, Order::BottomUp)),
            Method::Ke => Box::new(KeTableau::new(items, PbHeuristic::Leftmost)),
            Method::KeValuation => Box::new(KeTableau::new(items, PbHeuristic::Valuation)),
            Method::KePolarity => Box::new(KeTableau::new(items, PbHeuristic::Polarity)),
            Method::KeS3 => Box::new(KeS3Tableau::new(items, PbHeuristic::Relevance)),
            Method::KeS3NegLast => {
                Box::new(KeS3Tableau::new(items, PbHeuristic::RelevanceNegLast))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodErr(pub String);

impl fmt::Display for MethodErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = Method::ALL.iter().map(|m| m.to_str()).collect();
        write!(
            f,
            "Unknown method '{}', expected one of {}",
            self.0,
            names.join(", ")
        )
    }
}

impl std::error::Error for MethodErr {}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl<'a> TryFrom<&'a str> for Method {
    type Error = MethodErr;

    fn try_from(s: &'a str) -> Result<Self, Self::Error> {
        Method::ALL
            .into_iter()
            .find(|m| m.to_str() == s)
            .ok_or_else(|| MethodErr(s.to_string()))
    }
}

impl std::str::FromStr for Method {
    type Err = MethodErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::try_from(s)
    }
}

impl Serialize for Method {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_str())
    }
}
