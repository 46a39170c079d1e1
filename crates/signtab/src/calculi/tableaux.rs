//! Signed tableau calculi for propositional logic.
//!
//! All calculi share the arena [`tree::Tree`], the rule tables in [`rules`]
//! and the branch bookkeeping in [`strategy`]. They differ in how they pick
//! the next expansion step.

pub mod analytic;
pub mod ke;
pub mod kes3;
pub mod rules;
pub mod strategy;
pub mod tree;

pub use analytic::AnalyticTableau;
pub use ke::KeTableau;
pub use kes3::KeS3Tableau;
pub use strategy::{Order, PbHeuristic};
