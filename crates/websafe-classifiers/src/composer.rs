//! Score composition from the oracle's class prediction
//!
//! The score always reads as "probability mass of being benign" on a 0-10
//! scale. For a legitimate prediction that is `p[0]`; for any other
//! prediction it is the complement of the *phishing* probability `p[1]`,
//! whatever class was actually predicted.

use websafe_core::{Error, Result, Verdict};

/// Upper bound of the safety score
pub const MAX_SCORE: f64 = 10.0;

/// Compose the verdict and safety score.
///
/// Probabilities outside [0, 1] are clamped. Non-finite values or a missing
/// probability entry mean the oracle is malformed and yield an error.
pub fn compose(predicted_class: i64, probabilities: &[f64]) -> Result<(Verdict, f64)> {
    if let Some(bad) = probabilities.iter().find(|p| !p.is_finite()) {
        return Err(Error::oracle(format!("non-finite class probability: {}", bad)));
    }

    let probability = |index: usize| {
        probabilities
            .get(index)
            .map(|p| p.clamp(0.0, 1.0))
            .ok_or_else(|| {
                Error::oracle(format!(
                    "expected probability for class {}, oracle returned {} entries",
                    index,
                    probabilities.len()
                ))
            })
    };

    let raw = if predicted_class == 0 {
        probability(0)? * MAX_SCORE
    } else {
        (1.0 - probability(1)?) * MAX_SCORE
    };

    Ok((Verdict::from_class(predicted_class), round_one_decimal(raw).clamp(0.0, MAX_SCORE)))
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
