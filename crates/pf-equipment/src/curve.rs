//! Dimensionless performance curves for turbomachinery corrections.

use crate::error::CurveError;

/// Correction-factor curve in normalised coordinates.
///
/// Curves map a dimensionless operating ratio (U/C or Qn relative to design)
/// to a multiplier on a design value. Both variants are total: any finite
/// abscissa produces a finite result.
///
/// ## Parabola
///
/// Vertex fixed at `(h, k)`, normally `(1, 1)`, so the design point is
/// always the peak (or trough) of the curve:
///
/// ```text
/// y = a·(x − h)² + k
/// ```
///
/// ## Monotonic spline
///
/// Piecewise cubic Hermite interpolation through sorted samples. Tangents at
/// interior nodes are central secants; end segments use their own secant.
/// Outside the sampled range the curve continues linearly with the slope of
/// the first or last segment.
#[derive(Clone, Debug, PartialEq)]
pub enum PerformanceCurve {
    Parabola { a: f64, h: f64, k: f64 },
    MonotonicSpline { x: Vec<f64>, y: Vec<f64> },
}

impl PerformanceCurve {
    /// Parabola with vertex at the design point `(1, 1)`.
    pub fn parabola(a: f64) -> Self {
        PerformanceCurve::Parabola { a, h: 1.0, k: 1.0 }
    }

    /// Curvature estimate with the vertex fixed at `(1, 1)`:
    ///
    /// ```text
    /// a = Σ (y − k)(x − h) / Σ (x − h)²
    /// ```
    ///
    /// This weights deviations by `(x − h)`, not `(x − h)²`, so it does not
    /// reproduce an exact parabola; samples placed symmetrically about `h`
    /// give `a = 0`. Samples that all sit at `x = h` leave the curve flat.
    pub fn fit_parabola(x: &[f64], y: &[f64]) -> Result<Self, CurveError> {
        validate_samples(x, y)?;
        let (h, k) = (1.0, 1.0);
        let (num, den) = x.iter().zip(y).fold((0.0, 0.0), |(num, den), (&xi, &yi)| {
            let dx = xi - h;
            (num + (yi - k) * dx, den + dx * dx)
        });
        let a = if den == 0.0 { 0.0 } else { num / den };
        Ok(PerformanceCurve::Parabola { a, h, k })
    }

    /// Build a monotonic spline from samples in any order.
    ///
    /// Samples are sorted by abscissa. Repeated abscissae are collapsed to a
    /// single node carrying the mean ordinate.
    pub fn fit_spline(x: &[f64], y: &[f64]) -> Result<Self, CurveError> {
        validate_samples(x, y)?;

        let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut xs: Vec<f64> = Vec::with_capacity(pairs.len());
        let mut ys: Vec<f64> = Vec::with_capacity(pairs.len());
        let mut run = 1.0;
        for (xi, yi) in pairs {
            match xs.last() {
                Some(&last) if last == xi => {
                    run += 1.0;
                    if let Some(mean) = ys.last_mut() {
                        *mean += (yi - *mean) / run;
                    }
                }
                _ => {
                    run = 1.0;
                    xs.push(xi);
                    ys.push(yi);
                }
            }
        }

        if xs.len() < 2 {
            return Err(CurveError::TooFewSamples { len: xs.len() });
        }
        Ok(PerformanceCurve::MonotonicSpline { x: xs, y: ys })
    }

    /// Evaluate the curve at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            PerformanceCurve::Parabola { a, h, k } => a * (x - h).powi(2) + k,
            PerformanceCurve::MonotonicSpline { x: xs, y: ys } => hermite(xs, ys, x),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PerformanceCurve::Parabola { .. } => "parabola",
            PerformanceCurve::MonotonicSpline { .. } => "monotonic_spline",
        }
    }
}

fn validate_samples(x: &[f64], y: &[f64]) -> Result<(), CurveError> {
    if x.len() != y.len() {
        return Err(CurveError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(CurveError::TooFewSamples { len: x.len() });
    }
    if let Some(index) = x
        .iter()
        .zip(y)
        .position(|(xi, yi)| !xi.is_finite() || !yi.is_finite())
    {
        return Err(CurveError::NonFinite { index });
    }
    Ok(())
}

/// Cubic Hermite evaluation over strictly increasing `xs` (at least 2 nodes).
fn hermite(xs: &[f64], ys: &[f64], q: f64) -> f64 {
    let n = xs.len();

    if q <= xs[0] {
        let slope = (ys[1] - ys[0]) / (xs[1] - xs[0]);
        return ys[0] + slope * (q - xs[0]);
    }
    if q >= xs[n - 1] {
        let slope = (ys[n - 1] - ys[n - 2]) / (xs[n - 1] - xs[n - 2]);
        return ys[n - 1] + slope * (q - xs[n - 1]);
    }

    // segment i with xs[i] <= q < xs[i + 1]
    let i = xs
        .partition_point(|&v| v <= q)
        .saturating_sub(1)
        .min(n - 2);

    let (x0, x1) = (xs[i], xs[i + 1]);
    let (y0, y1) = (ys[i], ys[i + 1]);
    let h = x1 - x0;
    let secant = (y1 - y0) / h;

    let m0 = if i == 0 {
        secant
    } else {
        (y1 - ys[i - 1]) / (x1 - xs[i - 1])
    };
    let m1 = if i == n - 2 {
        secant
    } else {
        (ys[i + 2] - y0) / (xs[i + 2] - x0)
    };

    let t = (q - x0) / h;
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    h00 * y0 + h10 * h * m0 + h01 * y1 + h11 * h * m1
}
