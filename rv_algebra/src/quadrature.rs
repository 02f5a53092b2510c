//! Adaptive Gauss-Legendre integration of one-dimensional functions.
//!
//! Finite intervals are split into panels. Each panel's estimate is compared
//! against the sum over its two halves and bisected until the two agree.
//! Half-infinite and infinite intervals are mapped onto finite ones first.

use std::f64::consts::PI;
use std::sync::OnceLock;

use tracing::{trace, warn};

use crate::{RVError, Result};

/// Nodes per panel.
pub const ORDER: usize = 10;
const INITIAL_PANELS: usize = 8;
const ABS_TOL: f64 = 1e-10;
const REL_TOL: f64 = 1e-10;
const MAX_DEPTH: u32 = 50;
const MAX_SPLITS: usize = 200_000;

type Rule = (Vec<f64>, Vec<f64>);

/// Nodes and weights on `[-1, 1]`, found by Newton iteration on the
/// Legendre polynomial. Only half the roots are computed; the rest mirror.
fn gauss_legendre_nodes_weights(n: usize) -> Rule {
    let mut nodes = vec![0.0f64; n];
    let mut weights = vec![0.0f64; n];
    if n == 0 {
        return (nodes, weights);
    }
    if n == 1 {
        weights[0] = 2.0;
        return (nodes, weights);
    }

    let nf = n as f64;
    let legendre = |x: f64| {
        let mut p0 = 1.0f64;
        let mut p1 = x;
        for j in 2..=n {
            let jf = j as f64;
            let p2 = ((2.0 * jf - 1.0) * x * p1 - (jf - 1.0) * p0) / jf;
            p0 = p1;
            p1 = p2;
        }
        // (P_n(x), P'_n(x))
        (p1, nf * (x * p1 - p0) / (x * x - 1.0))
    };

    for i in 0..n.div_ceil(2) {
        let mut x = ((PI * (i as f64 + 0.75)) / (nf + 0.5)).cos();
        for _ in 0..100 {
            let (p, dp) = legendre(x);
            let dx = p / dp;
            x -= dx;
            if dx.abs() < 1e-15 {
                break;
            }
        }
        let (_, dp) = legendre(x);
        let w = 2.0 / ((1.0 - x * x) * dp * dp);
        nodes[i] = -x;
        nodes[n - 1 - i] = x;
        weights[i] = w;
        weights[n - 1 - i] = w;
    }
    (nodes, weights)
}

fn rule() -> &'static Rule {
    static RULE: OnceLock<Rule> = OnceLock::new();
    RULE.get_or_init(|| gauss_legendre_nodes_weights(ORDER))
}

fn panel<F>(f: &F, a: f64, b: f64) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    let (nodes, weights) = rule();
    let half_len = (b - a) / 2.0;
    let mid = (a + b) / 2.0;
    let mut sum = 0.0;
    for (x, w) in nodes.iter().zip(weights.iter()) {
        sum += w * f(mid + half_len * x)?;
    }
    let estimate = sum * half_len;
    if !estimate.is_finite() {
        return Err(RVError::Other(format!("integrand is not finite on [{}, {}]", a, b)));
    }
    Ok(estimate)
}

fn adaptive<F>(f: &F, lo: f64, hi: f64) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    let width = (hi - lo) / INITIAL_PANELS as f64;
    let mut stack = Vec::with_capacity(INITIAL_PANELS + 2 * MAX_DEPTH as usize);
    for i in 0..INITIAL_PANELS {
        let a = lo + i as f64 * width;
        let b = if i + 1 == INITIAL_PANELS { hi } else { lo + (i + 1) as f64 * width };
        stack.push((a, b, panel(f, a, b)?, 0));
    }

    let mut total = 0.0;
    let mut splits = 0;
    let mut exhausted = false;
    while let Some((a, b, whole, depth)) = stack.pop() {
        let m = 0.5 * (a + b);
        let left = panel(f, a, m)?;
        let right = panel(f, m, b)?;
        let refined = left + right;
        let err = (refined - whole).abs();
        trace!(a, b, err, depth, "quadrature panel");
        if err <= ABS_TOL.max(REL_TOL * refined.abs()) {
            total += refined;
        } else if depth >= MAX_DEPTH || splits >= MAX_SPLITS || m <= a || m >= b {
            exhausted = true;
            total += refined;
        } else {
            splits += 1;
            stack.push((a, m, left, depth + 1));
            stack.push((m, b, right, depth + 1));
        }
    }
    if exhausted {
        warn!(lo, hi, splits, "quadrature hit its refinement limit, accepting the refined estimate");
    }
    Ok(total)
}

/// Integrates `f` over `[lo, hi]`. Either bound may be infinite.
///
/// Reversed bounds give the negated integral. Errors raised by `f`
/// propagate unchanged.
pub fn integrate<F>(f: F, lo: f64, hi: f64) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    if lo.is_nan() || hi.is_nan() {
        return Err(RVError::InvalidBounds);
    }
    if lo == hi {
        return Ok(0.0);
    }
    if lo > hi {
        return Ok(-integrate(f, hi, lo)?);
    }
    match (lo.is_finite(), hi.is_finite()) {
        (true, true) => adaptive(&f, lo, hi),
        (true, false) => {
            let g = |t: f64| -> Result<f64> {
                let s = 1.0 - t;
                Ok(f(lo + t / s)? / (s * s))
            };
            adaptive(&g, 0.0, 1.0)
        },
        (false, true) => {
            let g = |t: f64| -> Result<f64> { Ok(f(hi - (1.0 - t) / t)? / (t * t)) };
            adaptive(&g, 0.0, 1.0)
        },
        (false, false) => {
            let g = |t: f64| -> Result<f64> {
                let s = 1.0 - t * t;
                Ok(f(t / s)? * (1.0 + t * t) / (s * s))
            };
            adaptive(&g, -1.0, 1.0)
        },
    }
}
