use super::correlation::{paired, CorrelationError, Result};
use ndarray::ArrayView1;
use ndarray_stats::QuantileExt;
use serde::Serialize;

/// Ordinary-least-squares line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trendline {
    pub slope: f64,
    pub intercept: f64,
    /// `None` when the dependent series is constant.
    pub r_squared: Option<f64>,
}

impl Trendline {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

pub fn ols(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Result<Trendline> {
    let (x, y) = paired(x, y)?;
    if x.len() < 2 {
        return Err(CorrelationError::InsufficientData { pairs: x.len() });
    }

    let mean_x = x.mean().ok_or(CorrelationError::InsufficientData { pairs: 0 })?;
    let mean_y = y.mean().ok_or(CorrelationError::InsufficientData { pairs: 0 })?;
    let dx = &x - mean_x;
    let dy = &y - mean_y;

    let sxx = dx.dot(&dx);
    if sxx == 0.0 {
        return Err(CorrelationError::ZeroVariance);
    }
    let sxy = dx.dot(&dy);
    let syy = dy.dot(&dy);

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if syy == 0.0 {
        None
    } else {
        Some((sxy * sxy) / (sxx * syy))
    };

    Ok(Trendline {
        slope,
        intercept,
        r_squared,
    })
}

/// Smallest and largest finite value, if any.
pub fn finite_range(values: ArrayView1<f64>) -> Option<(f64, f64)> {
    let finite = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect::<ndarray::Array1<f64>>();
    let min = *finite.min().ok()?;
    let max = *finite.max().ok()?;
    Some((min, max))
}
