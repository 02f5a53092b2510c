use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::Path;

use rv_algebra::{Event, RVError, Variable, VariableDescription};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("could not read description: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse description: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not evaluate description: {0}")]
    RVE(#[from] RVError),
}

impl CalcError {
    /// Process exit code reported by `rv_calc`.
    pub fn exit_code(&self) -> i32 {
        match self {
            CalcError::Io(_) => 1,
            CalcError::Json(_) => 2,
            CalcError::RVE(_) => 3,
        }
    }
}

/// Log filter read from the environment variable `var`, INFO when it is
/// unset or does not parse.
pub fn log_filter_from(var: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn log_filter() -> EnvFilter {
    log_filter_from(EnvFilter::DEFAULT_ENV)
}

pub fn parse_description(text: &str) -> Result<VariableDescription, CalcError> {
    Ok(serde_json::from_str(text)?)
}

pub fn load_description(path: impl AsRef<Path>) -> Result<VariableDescription, CalcError> {
    let text = fs::read_to_string(path.as_ref())?;
    debug!(path = %path.as_ref().display(), bytes = text.len(), "read description");
    parse_description(&text)
}

/// Queries that a variable may legitimately leave unanswered show up as
/// `None`; any other failure is an error.
fn optional(value: rv_algebra::Result<f64>) -> Result<Option<f64>, RVError> {
    match value {
        Ok(v) => Ok(Some(v)),
        Err(RVError::NotImplemented(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub expectation: Option<f64>,
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
    pub median: Option<f64>,
    pub mode: Option<f64>,
    pub support: (f64, f64),
    pub discrete: bool,
}

pub fn summarize(var: &Variable) -> Result<Summary, RVError> {
    Ok(Summary {
        expectation: optional(var.expectation())?,
        variance: optional(var.variance())?,
        std_dev: optional(var.std_dev())?,
        median: optional(var.median())?,
        mode: optional(var.mode())?,
        support: var.support(),
        discrete: var.is_discrete(),
    })
}

fn show(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => String::from("n/a"),
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "kind: {}", if self.discrete { "discrete" } else { "continuous" })?;
        writeln!(f, "support: [{}, {}]", self.support.0, self.support.1)?;
        writeln!(f, "expectation: {}", show(self.expectation))?;
        writeln!(f, "variance: {}", show(self.variance))?;
        writeln!(f, "std dev: {}", show(self.std_dev))?;
        writeln!(f, "median: {}", show(self.median))?;
        write!(f, "mode: {}", show(self.mode))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Eq => "==",
        }
    }

    pub fn evaluate(&self, var: &Variable, threshold: f64) -> Result<Event, RVError> {
        match self {
            Comparison::Lt => var.less_than(threshold),
            Comparison::Le => var.less_equal(threshold),
            Comparison::Gt => var.greater_than(threshold),
            Comparison::Ge => var.greater_equal(threshold),
            Comparison::Eq => var.equal_to(threshold),
        }
    }
}

/// Evaluates every requested threshold, in the order given.
pub fn compare_all(var: &Variable, queries: &[(Comparison, f64)]) -> Result<Vec<(String, Event)>, RVError> {
    queries.iter()
        .map(|(cmp, threshold)| {
            let event = cmp.evaluate(var, *threshold)?;
            Ok((format!("P(X {} {})", cmp.symbol(), threshold), event))
        })
        .collect()
}
