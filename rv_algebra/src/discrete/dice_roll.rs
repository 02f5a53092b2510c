use crate::discrete::pmf::{Outcome, Pmf};
use crate::discrete::rv::DiscreteRV;
use crate::random_variable::RandomVariable;
use crate::{RVError, Result};

/// A fair die numbered `1..=sides`.
#[derive(PartialEq, Clone, Debug)]
pub struct DiceRoll {
    sides: i64,
    rv: DiscreteRV,
}

impl DiceRoll {
    pub fn new(sides: i64) -> Result<Self> {
        if sides < 1 {
            return Err(RVError::InvalidBounds);
        }
        let pmf = Pmf::uniform((1..=sides).map(Outcome::from_integer))?;
        Ok(Self {
            sides,
            rv: DiscreteRV::new(pmf),
        })
    }

    pub fn sides(&self) -> i64 {
        self.sides
    }
}

impl RandomVariable for DiceRoll {
    fn pdf(&self, x: f64) -> Result<f64> {
        self.rv.pdf(x)
    }

    fn cdf(&self, x: f64) -> Result<f64> {
        self.rv.cdf(x)
    }

    fn expectation(&self) -> Result<f64> {
        Ok((self.sides + 1) as f64 / 2.0)
    }

    fn variance(&self) -> Result<f64> {
        let ev = self.expectation()?;
        let total: f64 = (1..=self.sides).map(|i| (i as f64 - ev).powi(2)).sum();
        Ok(total / self.sides as f64)
    }

    // integer division, so even dice report the lower of the two middle faces
    fn median(&self) -> Result<f64> {
        Ok((self.sides / 2) as f64)
    }

    fn mode(&self) -> Result<f64> {
        self.rv.mode()
    }

    fn support(&self) -> (f64, f64) {
        (1.0, self.sides as f64)
    }

    fn pmf(&self) -> Option<&Pmf> {
        self.rv.pmf()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::floats::ApproxFloat;
    use crate::Variable;

    use super::*;

    #[test]
    fn test_die_roll() {
        let d = DiceRoll::new(6).unwrap();
        assert_eq!(Ok(3.5), d.expectation());
        assert_relative_eq!(105.0 / 36.0, d.variance().unwrap(), epsilon = 1e-12);
        assert_eq!(Ok(1.0 / 6.0), d.pdf(2.0));
        assert_eq!(Ok(1.0 / 6.0), d.pdf(6.0));
        assert_eq!(Ok(0.0), d.pdf(60.0));
        assert_eq!(Ok(3.0), d.median());
        assert_eq!(Ok(1.0), d.mode());
        assert!(d.pmf().unwrap().check().is_ok());
    }

    #[test]
    fn test_closed_forms_agree_with_pmf() {
        for sides in [1, 2, 4, 6, 8, 10, 12, 20, 100] {
            let d = DiceRoll::new(sides).unwrap();
            let pmf = d.pmf().unwrap();
            assert_eq!(ApproxFloat::new(pmf.expectation()), d.expectation().unwrap());
            assert_eq!(ApproxFloat::new(pmf.variance()), d.variance().unwrap());
        }
    }

    #[test]
    fn test_cdf() {
        let d = DiceRoll::new(4).unwrap();
        assert_eq!(Ok(0.0), d.cdf(1.0));
        assert_eq!(Ok(0.5), d.cdf(3.0));
        assert_eq!(Ok(1.0), d.cdf(4.5));
    }

    #[test]
    fn test_bad_dice() {
        assert_eq!(Err(RVError::InvalidBounds), DiceRoll::new(0));
        assert_eq!(Err(RVError::InvalidBounds), DiceRoll::new(-6));
    }

    #[test]
    fn test_two_dice_roll() {
        let d6 = Variable::new(DiceRoll::new(6).unwrap());
        let d = d6.add(Variable::new(DiceRoll::new(6).unwrap())).unwrap();
        assert_eq!(Ok(7.0), d.expectation());
        assert_relative_eq!(35.0 / 6.0, d.variance().unwrap(), epsilon = 1e-12);

        let expected = [
            (2, 1.0 / 36.0),
            (3, 1.0 / 18.0),
            (4, 1.0 / 12.0),
            (5, 1.0 / 9.0),
            (6, 5.0 / 36.0),
            (7, 1.0 / 6.0),
            (8, 5.0 / 36.0),
            (9, 1.0 / 9.0),
            (10, 1.0 / 12.0),
            (11, 1.0 / 18.0),
            (12, 1.0 / 36.0),
        ];
        let pmf = d.pmf().unwrap();
        assert_eq!(expected.len(), pmf.len());
        for (k, p) in expected {
            assert_eq!(ApproxFloat::new(p), pmf.mass(&Outcome::from_integer(k)));
            assert_eq!(ApproxFloat::new(p), d.pdf(k as f64).unwrap());
        }
        assert_eq!(Ok(0.0), d.pdf(60.0));
    }
}
