use std::collections::BTreeMap;

use itertools::iproduct;
use num::rational::Rational64;
use num::traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub};
use num::{One, Zero};
use tracing::debug;

use crate::algebra::BinaryOp;
use crate::floats::ApproxFloat;
use crate::{RVError, Result};

/// Discrete outcomes are exact rationals, so sums, products and quotients of
/// integer outcomes never drift and colliding keys merge exactly.
pub type Outcome = Rational64;

pub fn outcome_to_f64(k: &Outcome) -> f64 {
    *k.numer() as f64 / *k.denom() as f64
}

/// Relative distance within which a float is read as a simple fraction.
const FRACTION_TOL: f64 = 1e-12;

/// The first continued-fraction convergent of `x` that is within
/// `FRACTION_TOL` of it, so `0.1` reads as 1/10 rather than the exact
/// binary value.
fn simple_fraction(x: f64) -> Option<Outcome> {
    let (mut h0, mut h1): (i64, i64) = (0, 1);
    let (mut k0, mut k1): (i64, i64) = (1, 0);
    let mut rest = x;
    for _ in 0..64 {
        let a = rest.floor();
        if a.abs() >= (1u64 << 53) as f64 {
            return None;
        }
        let a = a as i64;
        let h2 = a.checked_mul(h1)?.checked_add(h0)?;
        let k2 = a.checked_mul(k1)?.checked_add(k0)?;
        (h0, h1, k0, k1) = (h1, h2, k1, k2);
        let frac = rest - rest.floor();
        if frac == 0.0 || (h2 as f64 / k2 as f64 - x).abs() <= FRACTION_TOL * x.abs().max(1.0) {
            return Some(Outcome::new(h2, k2));
        }
        rest = 1.0 / frac;
    }
    None
}

pub fn outcome_from_f64(x: f64) -> Result<Outcome> {
    if !x.is_finite() {
        return Err(RVError::UnsupportedOperand(format!("{} is not a finite outcome", x)));
    }
    if x.fract() == 0.0 && x.abs() < (1u64 << 53) as f64 {
        return Ok(Outcome::from_integer(x as i64));
    }
    simple_fraction(x)
        .or_else(|| Outcome::approximate_float(x))
        .ok_or_else(|| RVError::UnsupportedOperand(format!("{} has no rational outcome", x)))
}

fn overflow(op: BinaryOp) -> RVError {
    RVError::Other(format!("outcome overflow while applying '{}'", op))
}

fn checked_pow(base: &Outcome, exponent: &Outcome) -> Result<Outcome> {
    if !exponent.is_integer() {
        return Err(RVError::UnsupportedOperand(format!(
            "discrete outcomes only take integer powers, not {}",
            exponent
        )));
    }
    let power = exponent.to_integer();
    if base.is_zero() && power < 0 {
        return Err(RVError::ZeroDivisor);
    }
    let magnitude = usize::try_from(power.unsigned_abs()).map_err(|_| overflow(BinaryOp::Pow))?;
    let result = num::checked_pow(*base, magnitude).ok_or_else(|| overflow(BinaryOp::Pow))?;
    if power < 0 {
        Ok(result.recip())
    } else {
        Ok(result)
    }
}

/// Applies `op` to two outcomes. Fails instead of panicking on a zero divisor
/// or on `i64` overflow.
pub fn apply_op(op: BinaryOp, a: &Outcome, b: &Outcome) -> Result<Outcome> {
    match op {
        BinaryOp::Add => a.checked_add(b).ok_or_else(|| overflow(op)),
        BinaryOp::Sub => a.checked_sub(b).ok_or_else(|| overflow(op)),
        BinaryOp::Mul => a.checked_mul(b).ok_or_else(|| overflow(op)),
        BinaryOp::Div => {
            if b.is_zero() {
                Err(RVError::ZeroDivisor)
            } else {
                a.checked_div(b).ok_or_else(|| overflow(op))
            }
        },
        BinaryOp::Pow => checked_pow(a, b),
    }
}

/// A normalized probability mass function.
///
/// The map only ever holds outcomes with positive mass; lookups of anything
/// else read as zero and never insert.
#[derive(PartialEq, Clone, Debug)]
pub struct Pmf {
    masses: BTreeMap<Outcome, ApproxFloat>,
}

impl Pmf {
    pub fn new(m: BTreeMap<Outcome, f64>) -> Result<Self> {
        if m.is_empty() {
            return Err(RVError::InvalidBounds);
        }
        if m.values().any(|p| !(*p >= 0.0)) {
            return Err(RVError::NegProb);
        }
        let total: ApproxFloat = m.values().map(|p| ApproxFloat::new(*p)).sum();
        if total != ApproxFloat::one() {
            return Err(RVError::CDFNotOne(total.value()));
        }
        let masses = m.into_iter()
            .filter(|(_, p)| *p > 0.0)
            .map(|(k, p)| (k, ApproxFloat::new(p)))
            .collect();
        Ok(Self { masses })
    }

    /// Builds a pmf from `(outcome, mass)` pairs, merging repeated outcomes.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Outcome, f64)>,
    {
        let mut m: BTreeMap<Outcome, f64> = BTreeMap::new();
        for (k, p) in pairs {
            m.entry(k)
                .and_modify(|old| *old += p)
                .or_insert(p);
        }
        Pmf::new(m)
    }

    pub fn point(k: Outcome) -> Self {
        Self { masses: BTreeMap::from([(k, ApproxFloat::one())]) }
    }

    pub fn uniform<I>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = Outcome>,
    {
        let keys: Vec<Outcome> = keys.into_iter().collect();
        if keys.is_empty() {
            return Err(RVError::InvalidBounds);
        }
        let p = 1.0 / keys.len() as f64;
        Pmf::from_pairs(keys.into_iter().map(|k| (k, p)))
    }

    // trusted callers only: combination results are checked on demand
    pub(crate) fn from_map_unchecked(masses: BTreeMap<Outcome, ApproxFloat>) -> Self {
        Self { masses }
    }

    pub fn backing_map(&self) -> &BTreeMap<Outcome, ApproxFloat> {
        &self.masses
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Outcome> {
        self.masses.keys()
    }

    pub fn lower_bound(&self) -> Option<&Outcome> {
        self.masses.keys().next()
    }

    pub fn upper_bound(&self) -> Option<&Outcome> {
        self.masses.keys().next_back()
    }

    pub fn total(&self) -> ApproxFloat {
        self.masses.values().sum()
    }

    pub fn mass(&self, k: &Outcome) -> ApproxFloat {
        self.masses.get(k).copied().unwrap_or_else(ApproxFloat::zero)
    }

    /// Mass of the outcome whose float value is exactly `x`.
    pub fn mass_at_f64(&self, x: f64) -> ApproxFloat {
        self.masses.iter()
            .take_while(|(k, _)| outcome_to_f64(k) <= x)
            .find(|(k, _)| outcome_to_f64(k) == x)
            .map(|(_, p)| *p)
            .unwrap_or_else(ApproxFloat::zero)
    }

    /// Total mass strictly below `x`.
    pub fn cdf(&self, x: f64) -> ApproxFloat {
        self.masses.iter()
            .take_while(|(k, _)| outcome_to_f64(k) < x)
            .map(|(_, p)| *p)
            .sum()
    }

    pub fn general_expected_value<F>(&self, f: F) -> f64
    where
        F: Fn(&Outcome) -> f64,
    {
        self.masses.iter().map(|(k, p)| p.value() * f(k)).sum()
    }

    pub fn expectation(&self) -> f64 {
        self.general_expected_value(outcome_to_f64)
    }

    pub fn variance(&self) -> f64 {
        let ev = self.expectation();
        self.general_expected_value(|k| (outcome_to_f64(k) - ev).powi(2))
    }

    /// The outcome with the largest mass. Ties, up to the `ApproxFloat`
    /// tolerance, go to the smallest outcome.
    pub fn mode(&self) -> Option<&Outcome> {
        let mut best: Option<(&Outcome, ApproxFloat)> = None;
        for (k, p) in self.masses.iter() {
            match best {
                Some((_, best_p)) if !(*p > best_p && *p != best_p) => {},
                _ => best = Some((k, *p)),
            }
        }
        best.map(|(k, _)| k)
    }

    /// The smallest outcome whose inclusive cumulative mass reaches 1/2.
    pub fn median(&self) -> Option<&Outcome> {
        let half = ApproxFloat::new(0.5);
        let mut cumulative = ApproxFloat::zero();
        for (k, p) in self.masses.iter() {
            cumulative = cumulative + *p;
            if cumulative >= half || cumulative == half {
                return Some(k);
            }
        }
        self.upper_bound()
    }

    /// Diagnostic check that the masses form a distribution.
    pub fn check(&self) -> Result<()> {
        if self.masses.values().any(|p| !(p.value() >= 0.0)) {
            return Err(RVError::NegProb);
        }
        let total = self.total();
        if total != ApproxFloat::one() {
            return Err(RVError::CDFNotOne(total.value()));
        }
        Ok(())
    }

    pub fn map_keys<F>(&self, f: F) -> Result<Pmf>
    where
        F: Fn(&Outcome) -> Result<Outcome>,
    {
        let mut new_masses: BTreeMap<Outcome, ApproxFloat> = BTreeMap::new();
        for (k, p) in self.masses.iter() {
            let l = f(k)?;
            new_masses.entry(l)
                .and_modify(|old| *old = *old + *p)
                .or_insert(*p);
        }
        Ok(Pmf::from_map_unchecked(new_masses))
    }

    pub fn to_f64_pairs(&self) -> Vec<(f64, f64)> {
        self.masses.iter().map(|(k, p)| (outcome_to_f64(k), p.value())).collect()
    }
}

/// Discrete convolution of two independent mass functions under `op`: every
/// pair `(a, b)` contributes `p(a) * q(b)` to the outcome `op(a, b)`.
pub fn combine_pmf(first: &Pmf, second: &Pmf, op: BinaryOp) -> Result<Pmf> {
    let combined = combine_pmf_with(first, second, |a, b| apply_op(op, a, b))?;
    debug!(op = %op, left = first.len(), right = second.len(), combined = combined.len(), "combined pmfs");
    Ok(combined)
}

/// `combine_pmf` under an arbitrary binary operator on outcomes.
pub fn combine_pmf_with<F>(first: &Pmf, second: &Pmf, op: F) -> Result<Pmf>
where
    F: Fn(&Outcome, &Outcome) -> Result<Outcome>,
{
    let mut new_masses: BTreeMap<Outcome, ApproxFloat> = BTreeMap::new();
    for ((a, p_a), (b, p_b)) in iproduct!(first.masses.iter(), second.masses.iter()) {
        let p_ab = *p_a * *p_b;
        if p_ab.is_zero() {
            continue;
        }
        let k = op(a, b)?;
        new_masses.entry(k)
            .and_modify(|p| *p = *p + p_ab)
            .or_insert(p_ab);
    }
    Ok(Pmf::from_map_unchecked(new_masses))
}

pub fn check_pmf(pmf: &Pmf) -> Result<()> {
    pmf.check()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn die(sides: i64) -> Pmf {
        Pmf::uniform((1..=sides).map(Outcome::from_integer)).unwrap()
    }

    #[test]
    fn test_checked_constructor() {
        let mut m = BTreeMap::new();
        assert_eq!(Err(RVError::InvalidBounds), Pmf::new(m.clone()));
        m.insert(Outcome::from_integer(1), 0.5);
        m.insert(Outcome::from_integer(2), 0.25);
        assert!(matches!(Pmf::new(m.clone()), Err(RVError::CDFNotOne(_))));
        m.insert(Outcome::from_integer(3), -0.25);
        assert_eq!(Err(RVError::NegProb), Pmf::new(m.clone()));
        m.insert(Outcome::from_integer(3), 0.25);
        m.insert(Outcome::from_integer(4), 0.0);
        let pmf = Pmf::new(m).unwrap();
        assert_eq!(3, pmf.len());
        assert_eq!(Some(&Outcome::from_integer(3)), pmf.upper_bound());
    }

    #[test]
    fn test_lookups_never_insert() {
        let pmf = die(6);
        assert_eq!(0.0, pmf.mass(&Outcome::from_integer(60)));
        assert_eq!(0.0, pmf.mass_at_f64(2.5));
        assert_eq!(1.0 / 6.0, pmf.mass_at_f64(2.0));
        assert_eq!(6, pmf.len());
    }

    #[test]
    fn test_cdf_is_strict() {
        let pmf = die(6);
        assert_eq!(0.0, pmf.cdf(1.0));
        assert_eq!(1.0 / 6.0, pmf.cdf(2.0));
        assert_eq!(0.5, pmf.cdf(3.5));
        assert_eq!(1.0, pmf.cdf(7.0));
    }

    #[test]
    fn test_combine_two_dice() {
        let d6 = die(6);
        let two_d6 = combine_pmf(&d6, &d6, BinaryOp::Add).unwrap();
        assert_eq!(11, two_d6.len());
        for x in 2..=12 {
            let numerator = 6 - (7 - x as i64).abs();
            assert_eq!(numerator as f64 / 36.0, two_d6.mass(&Outcome::from_integer(x)));
        }
        assert!(two_d6.check().is_ok());
        assert_eq!(7.0, ApproxFloat::new(two_d6.expectation()));
        assert_eq!(35.0 / 6.0, ApproxFloat::new(two_d6.variance()));
    }

    #[test]
    fn test_combine_is_exact_under_division() {
        let d4 = die(4);
        let ratio = combine_pmf(&d4, &d4, BinaryOp::Div).unwrap();
        // 1/2 == 2/4, so those two pairs share a key
        assert_eq!(2.0 / 16.0, ratio.mass(&Outcome::new(1, 2)));
        assert_eq!(4.0 / 16.0, ratio.mass(&Outcome::one()));
        assert!(ratio.check().is_ok());
    }

    #[test]
    fn test_combine_rejects_zero_divisor() {
        let with_zero = Pmf::uniform((0..=2).map(Outcome::from_integer)).unwrap();
        assert_eq!(Err(RVError::ZeroDivisor), combine_pmf(&die(6), &with_zero, BinaryOp::Div));
    }

    #[test]
    fn test_integer_powers_only() {
        let d3 = die(3);
        let squares = combine_pmf(&d3, &Pmf::point(Outcome::from_integer(2)), BinaryOp::Pow).unwrap();
        assert_eq!(3, squares.len());
        assert_eq!(1.0 / 3.0, squares.mass(&Outcome::from_integer(9)));
        assert_eq!(0.0, squares.mass(&Outcome::from_integer(3)));
        let half = Pmf::point(Outcome::new(1, 2));
        assert!(matches!(combine_pmf(&d3, &half, BinaryOp::Pow), Err(RVError::UnsupportedOperand(_))));
    }

    #[test]
    fn test_large_powers_of_units() {
        let units = Pmf::uniform((-1..=1).map(Outcome::from_integer)).unwrap();
        let huge = Pmf::point(Outcome::from_integer(300_000_001));
        let powers = combine_pmf(&units, &huge, BinaryOp::Pow).unwrap();
        assert_eq!(1.0 / 3.0, powers.mass(&Outcome::from_integer(-1)));
        assert_eq!(1.0 / 3.0, powers.mass(&Outcome::zero()));
        assert_eq!(1.0 / 3.0, powers.mass(&Outcome::one()));

        let two = Pmf::point(Outcome::from_integer(2));
        assert!(matches!(combine_pmf(&two, &huge, BinaryOp::Pow), Err(RVError::Other(_))));
        let inverse = combine_pmf(&two, &Pmf::point(Outcome::from_integer(-3)), BinaryOp::Pow).unwrap();
        assert_eq!(1.0, inverse.mass(&Outcome::new(1, 8)));
    }

    #[test]
    fn test_combine_with_any_operator() {
        let d4 = die(4);
        let highest = combine_pmf_with(&d4, &d4, |a, b| Ok(*a.max(b))).unwrap();
        assert_eq!(4, highest.len());
        assert_eq!(1.0 / 16.0, highest.mass(&Outcome::one()));
        assert_eq!(7.0 / 16.0, highest.mass(&Outcome::from_integer(4)));
        assert!(highest.check().is_ok());

        let failing = combine_pmf_with(&d4, &d4, |_, _| Err(RVError::ZeroDivisor));
        assert_eq!(Err(RVError::ZeroDivisor), failing);
    }

    #[test]
    fn test_mode_and_median() {
        let pmf = Pmf::from_pairs(vec![
            (Outcome::from_integer(0), 0.1),
            (Outcome::from_integer(3), 0.3),
            (Outcome::from_integer(5), 0.3),
            (Outcome::from_integer(9), 0.3),
        ]).unwrap();
        assert_eq!(Some(&Outcome::from_integer(3)), pmf.mode());
        assert_eq!(Some(&Outcome::from_integer(5)), pmf.median());
        assert_eq!(Some(&Outcome::from_integer(1)), die(6).mode());
        assert_eq!(Some(&Outcome::from_integer(3)), die(6).median());
    }

    #[test]
    fn test_outcome_conversion() {
        assert_eq!(Ok(Outcome::from_integer(-3)), outcome_from_f64(-3.0));
        assert_eq!(Ok(Outcome::new(1, 10)), outcome_from_f64(0.1));
        assert_eq!(Ok(Outcome::new(1, 3)), outcome_from_f64(1.0 / 3.0));
        assert!(outcome_from_f64(f64::NAN).is_err());
        assert_eq!(0.25, outcome_to_f64(&Outcome::new(1, 4)));
    }

    #[test]
    fn test_map_keys_merges() {
        let parity = die(6).map_keys(|k| Ok(Outcome::from_integer(k.to_integer() % 2))).unwrap();
        assert_eq!(2, parity.len());
        assert_eq!(0.5, parity.mass(&Outcome::zero()));
        assert!(parity.check().is_ok());
    }
}
