use serde::{Deserialize, Serialize};

use crate::algebra::{reflected_apply, BinaryOp};
use crate::continuous::{Lomax, Uniform};
use crate::discrete::beta_binomial::BetaBinomial;
use crate::discrete::negative_binomial::NegativeBinomial;
use crate::discrete::{DiceRoll, DiscreteRV};
use crate::random_variable::Variable;
use crate::Result;

/// A random variable expression as it is written down in a description file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariableDescription {
    Dice(u32),
    Constant(i64),
    Pmf(Vec<(i64, f64)>),
    Uniform { low: f64, high: f64 },
    Lomax { lambda: f64, alpha: f64 },
    BetaBinomial { n: u64, alpha: f64, beta: f64 },
    NegativeBinomial { r: u64, p: f64 },
    WithScalar { op: BinaryOp, left: Box<VariableDescription>, scalar: f64 },
    ScalarFirst { op: BinaryOp, scalar: f64, right: Box<VariableDescription> },
    Combine { op: BinaryOp, left: Box<VariableDescription>, right: Box<VariableDescription> },
}

impl VariableDescription {
    pub fn with_scalar(op: BinaryOp, left: VariableDescription, scalar: f64) -> Self {
        VariableDescription::WithScalar { op, left: Box::new(left), scalar }
    }

    pub fn scalar_first(op: BinaryOp, scalar: f64, right: VariableDescription) -> Self {
        VariableDescription::ScalarFirst { op, scalar, right: Box::new(right) }
    }

    pub fn combine(op: BinaryOp, left: VariableDescription, right: VariableDescription) -> Self {
        VariableDescription::Combine { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn to_variable(&self) -> Result<Variable> {
        let var = match self {
            VariableDescription::Dice(sides) => Variable::new(DiceRoll::new(*sides as i64)?),
            VariableDescription::Constant(k) => Variable::new(DiscreteRV::constant(*k)),
            VariableDescription::Pmf(pairs) => Variable::new(DiscreteRV::from_pairs(pairs.iter().copied())?),
            VariableDescription::Uniform { low, high } => Variable::new(Uniform::new(*low, *high)?),
            VariableDescription::Lomax { lambda, alpha } => Variable::new(Lomax::new(*lambda, *alpha)?),
            VariableDescription::BetaBinomial { n, alpha, beta } => {
                Variable::new(BetaBinomial::new(*n, *alpha, *beta)?)
            },
            VariableDescription::NegativeBinomial { r, p } => Variable::new(NegativeBinomial::new(*r, *p)?),
            VariableDescription::WithScalar { op, left, scalar } => left.to_variable()?.apply(*op, *scalar)?,
            VariableDescription::ScalarFirst { op, scalar, right } => {
                reflected_apply(*scalar, *op, &right.to_variable()?)?
            },
            VariableDescription::Combine { op, left, right } => {
                left.to_variable()?.apply(*op, right.to_variable()?)?
            },
        };
        Ok(var)
    }
}
