use std::fmt::{self, Display, Formatter};

use crate::floats::{is_close, ApproxFloat, REL_TOL};
use crate::{RVError, Result};

/// The outcome of a comparison between random variables, reduced to its
/// probability.
///
/// Conjunctions assume the two events are independent unless they are judged
/// mutually exclusive. The exclusivity test only looks at the probabilities:
/// two non-trivial events whose probabilities add up to one are treated as
/// complements of each other. Two independent fair coin flips are therefore
/// misread as exclusive; correlated events are not modelled at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    prob: f64,
}

impl Event {
    pub fn new(prob: f64) -> Result<Self> {
        if prob.is_nan() {
            return Err(RVError::InvalidProbability(prob));
        }
        // 1 - cdf and friends can land a hair outside of [0, 1]
        if (0.0..=1.0).contains(&prob) {
            Ok(Self { prob })
        } else if prob < 0.0 && prob >= -REL_TOL {
            Ok(Self { prob: 0.0 })
        } else if prob > 1.0 && is_close(prob, 1.0) {
            Ok(Self { prob: 1.0 })
        } else {
            Err(RVError::InvalidProbability(prob))
        }
    }

    pub fn certain() -> Self {
        Self { prob: 1.0 }
    }

    pub fn impossible() -> Self {
        Self { prob: 0.0 }
    }

    pub fn probability(&self) -> ApproxFloat {
        ApproxFloat::new(self.prob)
    }

    pub fn is_mutually_exclusive(&self, other: &Event) -> bool {
        self.prob > 0.0 && other.prob > 0.0 && ApproxFloat::new(self.prob + other.prob) == 1.0
    }

    pub fn and(&self, other: &Event) -> Event {
        if self.is_mutually_exclusive(other) {
            Event::impossible()
        } else {
            Event { prob: self.prob * other.prob }
        }
    }

    pub fn or(&self, other: &Event) -> Event {
        let both = self.and(other).prob;
        Event { prob: (self.prob + other.prob - both).clamp(0.0, 1.0) }
    }

    pub fn not(&self) -> Event {
        Event { prob: 1.0 - self.prob }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Event(prob={})", self.prob)
    }
}
