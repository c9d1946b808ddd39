//! NaN-aware series kernels.
//!
//! Missing values are `f64::NAN`. Every kernel returns a vector of the same
//! length as its input, and a position with missing inputs yields NaN rather
//! than an error.

/// Fractional change from the previous observation.
///
/// `out[0]` is NaN. A NaN operand or a zero previous value yields NaN.
pub fn pct_change(xs: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; xs.len()];
    for i in 1..xs.len() {
        out[i] = ratio(xs[i] - xs[i - 1], xs[i - 1]);
    }
    out
}

/// Natural log of the ratio to the previous observation.
pub fn log_change(xs: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; xs.len()];
    for i in 1..xs.len() {
        let r = ratio(xs[i], xs[i - 1]);
        out[i] = if r > 0.0 { r.ln() } else { f64::NAN };
    }
    out
}

/// Sample standard deviation (ddof = 1) over a trailing window.
///
/// A value is produced only when all `window` observations in the window are
/// present; otherwise NaN.
pub fn rolling_std(xs: &[f64], window: usize) -> Vec<f64> {
    let n = xs.len();
    let mut out = vec![f64::NAN; n];
    if window < 2 || n < window {
        return out;
    }
    for end in (window - 1)..n {
        let slice = &xs[end + 1 - window..=end];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[end] = sample_std(slice);
    }
    out
}

/// Mean over a trailing window, NaN unless the window is complete.
pub fn rolling_mean(xs: &[f64], window: usize) -> Vec<f64> {
    let n = xs.len();
    let mut out = vec![f64::NAN; n];
    if window == 0 || n < window {
        return out;
    }
    for end in (window - 1)..n {
        let slice = &xs[end + 1 - window..=end];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[end] = slice.iter().sum::<f64>() / window as f64;
    }
    out
}

/// Running product that skips missing positions (they stay NaN).
pub fn cumprod_skipna(xs: &[f64]) -> Vec<f64> {
    let mut acc = 1.0;
    xs.iter()
        .map(|&x| {
            if x.is_nan() {
                f64::NAN
            } else {
                acc *= x;
                acc
            }
        })
        .collect()
}

/// Mean of the present values; NaN when none are present.
pub fn nan_mean(xs: &[f64]) -> f64 {
    let (sum, count) = xs
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Last present value, if any.
pub fn last_valid(xs: &[f64]) -> Option<f64> {
    xs.iter().rev().copied().find(|v| !v.is_nan())
}

/// Pearson correlation over positions where both series are present.
///
/// NaN with fewer than two complete pairs or when either side is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= 0.0 || var_y <= 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Elementwise `num / den`, NaN on a zero or missing denominator.
pub fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 || den.is_nan() || num.is_nan() {
        f64::NAN
    } else {
        num / den
    }
}

fn sample_std(xs: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}
