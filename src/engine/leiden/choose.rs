//! Candidate selection: argmax and softmax sampling.

use rand::Rng;

/// First candidate with the strictly largest score.
pub fn argmax<T, I>(candidates: I) -> Option<(T, f64)>
where
    I: IntoIterator<Item = (T, f64)>,
{
    let mut best: Option<(T, f64)> = None;
    for (candidate, score) in candidates {
        if best.as_ref().map_or(true, |(_, max)| score > *max) {
            best = Some((candidate, score));
        }
    }
    best
}

/// Softmax of `values` at temperature `smoothing`.
///
/// Shifted by the maximum so large values do not overflow.
pub fn softmax(values: &[f64], smoothing: f64) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = values.iter().map(|v| ((v - max) / smoothing).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

/// Sample one candidate with softmax probabilities of its score.
///
/// A non-positive `smoothing` degenerates to [`argmax`].
pub fn choose<T: Copy, R: Rng + ?Sized>(
    candidates: &[(T, f64)],
    smoothing: f64,
    rng: &mut R,
) -> Option<T> {
    if smoothing <= 0.0 {
        return argmax(candidates.iter().copied()).map(|(c, _)| c);
    }
    let (last, _) = *candidates.last()?;
    let scores: Vec<f64> = candidates.iter().map(|&(_, s)| s).collect();
    let drawn: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (&(candidate, _), probability) in candidates.iter().zip(softmax(&scores, smoothing)) {
        cumulative += probability;
        if drawn <= cumulative {
            return Some(candidate);
        }
    }
    // Rounding can leave the cumulative sum just short of 1.
    Some(last)
}
