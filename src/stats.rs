/// Arithmetic mean of a sample set.
///
/// Callers must not pass an empty slice.
pub fn mean(samples: &[f64]) -> f64 {
    let sum = samples.iter().sum::<f64>();

    sum / samples.len() as f64
}

/// Population standard deviation of `samples` around `mean`.
///
/// Callers must not pass an empty slice.
pub fn std_dev(samples: &[f64], mean: f64) -> f64 {
    let variance = samples
        .iter()
        .map(|sample| (sample - mean).powi(2))
        .sum::<f64>()
        / samples.len() as f64;

    variance.sqrt()
}
