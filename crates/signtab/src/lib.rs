pub mod calculi;
pub mod calculus;
pub mod families;
pub mod logic;
pub mod parse;
mod symbol;

pub use calculi::tableaux;
pub use calculi::Method;
pub use calculus::{Params, ProofReport, Prover};
pub use logic::signed::SignedFormula;
pub use logic::Formula;
pub use symbol::{session, Symbol};
