// Weighted averaging of chunk scores into a single polarity/subjectivity pair
use super::assessment::Assessment;

/// `Σ weight(w)·v / Σ weight(w)` over `(w, v)` pairs, or 0 when the weights sum to zero.
pub fn weighted_average<I, F>(pairs: I, weight: F) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
    F: Fn(f64) -> f64,
{
    let mut sum = 0.0;
    let mut total = 0.0;
    for (w, value) in pairs {
        let w = weight(w);
        sum += w * value;
        total += w;
    }
    if total == 0.0 {
        0.0
    } else {
        sum / total
    }
}

/// Polarity of a set of assessments, each weighted by `weight(subjectivity)`.
pub fn polarity<F: Fn(f64) -> f64>(assessments: &[Assessment], weight: F) -> f64 {
    weighted_average(assessments.iter().map(|a| (a.subjectivity, a.polarity)), weight)
}

/// Subjectivity of a set of assessments, each weighted by `weight(subjectivity)`.
pub fn subjectivity<F: Fn(f64) -> f64>(assessments: &[Assessment], weight: F) -> f64 {
    weighted_average(assessments.iter().map(|a| (a.subjectivity, a.subjectivity)), weight)
}
