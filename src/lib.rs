//! Sugeno-style fuzzy inference over FIS documents.
//!
//! A [`System`] is built once from a FIS document and is read-only
//! afterwards. Evaluation is a pure function of the system and a set of
//! crisp inputs:
//!
//! ```
//! use fuzzy_sugeno::{evaluate, Inputs, System};
//!
//! let system: System = "
//! [System]
//! Name='depth'
//! Type='sugeno'
//! NumInputs=1
//! NumOutputs=1
//! NumRules=2
//!
//! [Input1]
//! Name='depth'
//! Range=[0 100]
//! NumMFs=2
//! MF1='shallow':'trimf',[0 0 100]
//! MF2='deep':'trimf',[0 100 100]
//!
//! [Output1]
//! Name='score'
//! Range=[0 10]
//! NumMFs=2
//! MF1='low':'constant',[0]
//! MF2='high':'constant',[10]
//!
//! [Rules]
//! 1, 1 (1) : 1
//! 2, 2 (1) : 1
//! "
//! .parse()?;
//!
//! let score = evaluate(&system, &Inputs::from_iter([("depth", 25.)]), "score")?;
//! assert_eq!(score, 2.5);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod batch;
mod config;
mod document;
mod dsl;
mod error;
mod inference;
mod inputs;
mod membership;
mod ops;
mod outputs;
mod rules;
mod system;
mod variable;

pub use batch::{evaluate_grid, Cell};
pub use config::{BatchOptions, CellFailure};
pub use document::{Document, Line, Section};
pub use dsl::Expr;
pub use error::{BatchError, BuildError, EvaluationError, FormatError, ValidationError};
pub use inference::{evaluate, evaluate_all, Inference, SugenoInference};
pub use inputs::Inputs;
pub use membership::{gauss2mf, gaussmf, trapmf, trimf, MembershipFunction};
pub use ops::{not, AndOp, DefuzzMethod, OrOp, SystemType};
pub use outputs::Outputs;
pub use rules::{Connective, Rule, RuleInput, RuleOutput};
pub use system::System;
pub use variable::Variable;
