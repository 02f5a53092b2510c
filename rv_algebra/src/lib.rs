pub mod algebra;
pub mod continuous;
pub mod counting;
pub mod discrete;
pub mod event;
pub mod floats;
pub mod operations;
pub mod quadrature;
pub mod random_variable;
pub mod serialization;

pub use algebra::{
    reflected_apply, scalar_add, scalar_divide, scalar_multiply, scalar_subtract, BinaryOp, Combined, Operand,
};
pub use continuous::{Lomax, Uniform};
pub use discrete::{combine_pmf, combine_pmf_with, check_pmf, DiceRoll, DiscreteRV, Pmf};
pub use discrete::beta_binomial::BetaBinomial;
pub use discrete::negative_binomial::NegativeBinomial;
pub use event::Event;
pub use floats::ApproxFloat;
pub use operations::{expectation, probability, variance};
pub use random_variable::{RandomVariable, Variable};
pub use serialization::VariableDescription;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RVError {
    #[error("unsupported operand: {0}")]
    UnsupportedOperand(String),
    #[error("not implemented: {0}")]
    NotImplemented(String),
    #[error("invalid bounds")]
    InvalidBounds,
    #[error("probability masses sum to {0}, not 1")]
    CDFNotOne(f64),
    #[error("negative probability mass")]
    NegProb,
    #[error("probability {0} is outside of [0, 1]")]
    InvalidProbability(f64),
    #[error("division by zero")]
    ZeroDivisor,
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RVError>;

pub(crate) fn not_implemented<T>(what: &str) -> Result<T> {
    Err(RVError::NotImplemented(String::from(what)))
}
