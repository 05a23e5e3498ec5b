// Class breaks and summary statistics for graduated (choropleth) styling

use crate::palette::{sample_colors, ColorRamp};
use thiserror::Error;

/// Largest class count a legend can be built for
pub const MAX_CLASSES: usize = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("cannot classify an empty value series")]
    EmptySeries,
    #[error("{requested} classes requested, at most {max} are supported", max = MAX_CLASSES)]
    TooManyClasses { requested: usize },
}

/// Strategy for placing class boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassificationMethod {
    /// Equal-width intervals between min and max
    #[default]
    EqualInterval,
    /// Equal member count per class
    Quantile,
    /// Approximate natural breaks: boundaries at evenly sized chunks of
    /// the sorted series. This is not a variance-minimizing solve; use
    /// `FisherJenks` for that.
    NaturalBreaks,
    /// Multiples of one standard deviation around the mean
    StandardDeviation,
    /// Optimal natural breaks (minimum within-class variance)
    FisherJenks,
}

impl ClassificationMethod {
    /// Resolve a method name, ignoring case, `_`, `-` and spaces.
    /// Unknown names resolve to `EqualInterval`.
    pub fn from_name(name: &str) -> Self {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "equal" | "equalinterval" => ClassificationMethod::EqualInterval,
            "quantile" | "quantiles" => ClassificationMethod::Quantile,
            "jenks" | "natural" | "naturalbreaks" => ClassificationMethod::NaturalBreaks,
            "stddev" | "std" | "standarddeviation" => ClassificationMethod::StandardDeviation,
            "fisherjenks" | "jenksoptimal" => ClassificationMethod::FisherJenks,
            _ => {
                tracing::debug!(method = name, "unknown classification method, using equal interval");
                ClassificationMethod::EqualInterval
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClassificationMethod::EqualInterval => "equal_interval",
            ClassificationMethod::Quantile => "quantile",
            ClassificationMethod::NaturalBreaks => "natural_breaks",
            ClassificationMethod::StandardDeviation => "standard_deviation",
            ClassificationMethod::FisherJenks => "fisher_jenks",
        }
    }
}

/// Population statistics over a value series
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub range: f64,
}

/// One legend row of a graduated style
#[derive(Debug, Clone, PartialEq)]
pub struct GraduatedClass {
    pub lower: f64,
    pub upper: f64,
    pub color: String,
    pub count: usize,
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Compute `num_classes + 1` ascending class boundaries.
///
/// A `num_classes` of 0 is treated as 1; more than [`MAX_CLASSES`] is an
/// error. Series shorter than the class
/// count still yield a full, possibly repetitive, boundary list; equal
/// consecutive boundaries are kept as empty classes.
pub fn compute_breaks(
    values: &[f64],
    method: ClassificationMethod,
    num_classes: usize,
) -> Result<Vec<f64>, ClassifyError> {
    if values.is_empty() {
        return Err(ClassifyError::EmptySeries);
    }
    if num_classes > MAX_CLASSES {
        return Err(ClassifyError::TooManyClasses { requested: num_classes });
    }
    let k = num_classes.max(1);
    let sorted = sorted(values);
    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];

    let breaks = match method {
        ClassificationMethod::EqualInterval => {
            let width = (max - min) / k as f64;
            let mut breaks: Vec<f64> = (0..k).map(|i| min + i as f64 * width).collect();
            breaks.push(max);
            breaks
        }
        ClassificationMethod::Quantile => {
            // Each interior boundary is the last member of its class.
            let mut breaks = vec![min];
            breaks.extend((1..k).map(|i| sorted[(i * n).div_ceil(k) - 1]));
            breaks.push(max);
            breaks
        }
        ClassificationMethod::NaturalBreaks => {
            let chunk = (n / k).max(1);
            let mut breaks = vec![min];
            breaks.extend((1..k).map(|i| sorted[(i * chunk).min(n - 1)]));
            breaks.push(max);
            breaks
        }
        ClassificationMethod::StandardDeviation => {
            let stats = statistics_of_sorted(&sorted);
            let half = (k / 2) as f64;
            (0..=k)
                .map(|i| stats.mean + (i as f64 - half) * stats.std_dev)
                .collect()
        }
        ClassificationMethod::FisherJenks => fisher_jenks(&sorted, k),
    };

    Ok(breaks)
}

/// Dynamic-programming Jenks over an ascending series. Interior breaks
/// are the largest member of the lower class.
fn fisher_jenks(sorted: &[f64], k: usize) -> Vec<f64> {
    let n = sorted.len();
    if k >= n {
        let mut breaks = vec![sorted[0]];
        breaks.extend((1..=k).map(|i| sorted[i.min(n - 1)]));
        return breaks;
    }

    // 1-based tables: lower_limits[l][j] is the first member (1-based) of
    // class j in the best partition of the first l values into j classes.
    let mut lower_limits = vec![vec![0usize; k + 1]; n + 1];
    let mut variances = vec![vec![0.0f64; k + 1]; n + 1];
    for j in 1..=k {
        lower_limits[1][j] = 1;
        for row in variances.iter_mut().skip(2) {
            row[j] = f64::INFINITY;
        }
    }

    for l in 2..=n {
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut weight = 0.0;
        let mut variance = 0.0;

        for m in 1..=l {
            let lower = l - m + 1;
            let value = sorted[lower - 1];
            weight += 1.0;
            sum += value;
            sum_sq += value * value;
            variance = sum_sq - (sum * sum) / weight;

            let prev = lower - 1;
            if prev != 0 {
                for j in 2..=k {
                    let candidate = variance + variances[prev][j - 1];
                    if variances[l][j] >= candidate {
                        lower_limits[l][j] = lower;
                        variances[l][j] = candidate;
                    }
                }
            }
        }

        lower_limits[l][1] = 1;
        variances[l][1] = variance;
    }

    let mut breaks = vec![0.0; k + 1];
    breaks[0] = sorted[0];
    breaks[k] = sorted[n - 1];
    let mut idx = n;
    for class in (2..=k).rev() {
        let lower = lower_limits[idx][class].max(2);
        breaks[class - 1] = sorted[lower - 2];
        idx = lower - 1;
    }
    breaks
}

fn statistics_of_sorted(sorted: &[f64]) -> Statistics {
    let count = sorted.len();
    let min = sorted[0];
    let max = sorted[count - 1];
    let sum: f64 = sorted.iter().sum();
    let mean = sum / count as f64;
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

    Statistics {
        count,
        min,
        max,
        sum,
        mean,
        median,
        variance,
        std_dev: variance.sqrt(),
        range: max - min,
    }
}

/// Count, extremes, mean, median and population variance of `values`
pub fn compute_statistics(values: &[f64]) -> Result<Statistics, ClassifyError> {
    if values.is_empty() {
        return Err(ClassifyError::EmptySeries);
    }
    Ok(statistics_of_sorted(&sorted(values)))
}

/// One color per class, optionally reversed
pub fn sample_colors_for_classes<S: AsRef<str>>(ramp: &[S], num_classes: usize, invert: bool) -> ColorRamp {
    let mut colors = sample_colors(ramp, num_classes);
    if invert {
        colors.reverse();
    }
    colors
}

/// Class a value falls into: the lowest `i` with
/// `breaks[i] <= value <= breaks[i + 1]`. Values beyond either end are
/// clamped to the first or last class; NaN has no class.
pub fn class_index(value: f64, breaks: &[f64]) -> Option<usize> {
    if breaks.len() < 2 || value.is_nan() {
        return None;
    }
    let last_class = breaks.len() - 2;
    if value < breaks[0] {
        return Some(0);
    }
    let idx = breaks
        .windows(2)
        .position(|w| value >= w[0] && value <= w[1])
        .unwrap_or(last_class);
    Some(idx)
}

/// Breaks, colors and member counts for a graduated legend
pub fn graduated_classes<S: AsRef<str>>(
    values: &[f64],
    method: ClassificationMethod,
    num_classes: usize,
    ramp: &[S],
    invert: bool,
) -> Result<Vec<GraduatedClass>, ClassifyError> {
    let breaks = compute_breaks(values, method, num_classes)?;
    let class_count = breaks.len() - 1;
    let colors = sample_colors_for_classes(ramp, class_count, invert);

    let mut counts = vec![0usize; class_count];
    for &v in values {
        if let Some(i) = class_index(v, &breaks) {
            counts[i] += 1;
        }
    }

    Ok(breaks
        .windows(2)
        .zip(counts)
        .enumerate()
        .map(|(i, (w, count))| GraduatedClass {
            lower: w[0],
            upper: w[1],
            color: colors.get(i).cloned().unwrap_or_else(|| "#000000".to_string()),
            count,
        })
        .collect())
}
