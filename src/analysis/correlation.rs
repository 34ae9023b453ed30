use crate::types::{CorrelationStrength, Direction, Metric};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorrelationError {
    #[error("insufficient data: {pairs} paired observations, at least 2 required")]
    InsufficientData { pairs: usize },
    #[error("one of the series has zero variance")]
    ZeroVariance,
    #[error("series lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

pub type Result<T> = std::result::Result<T, CorrelationError>;

/// Significance level and strength cut-offs applied to a coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationPolicy {
    pub alpha: f64,
    pub strong: f64,
    pub moderate: f64,
}

impl Default for CorrelationPolicy {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            strong: 0.7,
            moderate: 0.3,
        }
    }
}

impl CorrelationPolicy {
    pub fn strength(&self, r: f64) -> CorrelationStrength {
        let abs_r = r.abs();
        if abs_r >= self.strong {
            CorrelationStrength::Strong
        } else if abs_r >= self.moderate {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }

    pub fn is_significant(&self, p_value: f64) -> bool {
        p_value < self.alpha
    }
}

/// Only strictly positive coefficients are labelled positive; zero falls on the negative side.
pub fn direction(r: f64) -> Direction {
    if r > 0.0 {
        Direction::Positive
    } else {
        Direction::Negative
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub metric: Metric,
    pub r: f64,
    pub p_value: Option<f64>,
    pub observations: usize,
    pub strength: CorrelationStrength,
    pub direction: Direction,
    pub significant: Option<bool>,
}

/// Keeps only positions where both series hold a finite value.
pub fn paired(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Result<(Array1<f64>, Array1<f64>)> {
    if x.len() != y.len() {
        return Err(CorrelationError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .unzip();
    Ok((Array1::from(xs), Array1::from(ys)))
}

/// Pearson product-moment correlation coefficient, clamped to [-1, 1].
pub fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Result<f64> {
    let (x, y) = paired(x, y)?;
    if x.len() < 2 {
        return Err(CorrelationError::InsufficientData { pairs: x.len() });
    }

    let mean_x = x.mean().ok_or(CorrelationError::InsufficientData { pairs: 0 })?;
    let mean_y = y.mean().ok_or(CorrelationError::InsufficientData { pairs: 0 })?;
    let dx = &x - mean_x;
    let dy = &y - mean_y;

    let sxy = dx.dot(&dy);
    let sxx = dx.dot(&dx);
    let syy = dy.dot(&dy);
    if sxx == 0.0 || syy == 0.0 {
        return Err(CorrelationError::ZeroVariance);
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    if !r.is_finite() {
        return Err(CorrelationError::ZeroVariance);
    }
    Ok(r.clamp(-1.0, 1.0))
}

/// Two-sided p-value for H0: rho = 0, using Student's t with n - 2 degrees of freedom.
/// Undefined with two or fewer observations.
pub fn p_value(r: f64, n: usize) -> Option<f64> {
    if n <= 2 {
        return None;
    }
    let df = (n - 2) as f64;
    let denom = 1.0 - r * r;
    if denom <= 0.0 {
        return Some(0.0);
    }
    let t = r * (df / denom).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

pub fn correlate(
    metric: Metric,
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
    policy: &CorrelationPolicy,
) -> Result<CorrelationResult> {
    let (px, py) = paired(x, y)?;
    let r = pearson(px.view(), py.view())?;
    let observations = px.len();
    let p_value = p_value(r, observations);

    Ok(CorrelationResult {
        metric,
        r,
        p_value,
        observations,
        strength: policy.strength(r),
        direction: direction(r),
        significant: p_value.map(|p| policy.is_significant(p)),
    })
}
