//! Shorthand for the three queries asked most often.

use crate::event::Event;
use crate::floats::ApproxFloat;
use crate::random_variable::Variable;
use crate::Result;

/// P(event).
pub fn probability(event: &Event) -> ApproxFloat {
    event.probability()
}

/// E[X].
pub fn expectation(rv: &Variable) -> Result<f64> {
    rv.expectation()
}

/// Var(X).
pub fn variance(rv: &Variable) -> Result<f64> {
    rv.variance()
}

#[cfg(test)]
mod tests {
    use crate::continuous::Uniform;
    use crate::discrete::DiceRoll;
    use crate::RVError;

    use super::*;

    #[test]
    fn test_shorthand() {
        let u = Variable::new(Uniform::standard());
        let v = Variable::new(Uniform::standard());
        assert_eq!(Ok(0.5), expectation(&u));
        assert_eq!(Ok(1.5), expectation(&u.add(1).unwrap()));
        assert_eq!(Ok(1.0), expectation(&u.add(&v).unwrap()));
        assert_eq!(Ok(1.0 / 12.0), variance(&u));
        assert!(matches!(expectation(&u.divide(&v).unwrap()), Err(RVError::NotImplemented(_))));
    }

    #[test]
    fn test_probability() {
        let d = Variable::new(DiceRoll::new(6).unwrap());
        let event = d.greater_equal(5).unwrap();
        assert_eq!(1.0 / 3.0, probability(&event));
        assert_eq!(2.0 / 3.0, probability(&event.not()));
    }
}
