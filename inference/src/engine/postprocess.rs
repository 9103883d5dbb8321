use shared::Prediction;

/// Numerically stable softmax: the maximum score is subtracted before
/// exponentiation, so the output is invariant to shifting every score by a
/// constant.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max_score = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max_score).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Converts a raw score vector into the `k` most probable labels in
/// descending probability order. Labels are 1-based (`index + 1`); equal
/// probabilities keep ascending label order (stable sort).
pub fn top_predictions(scores: &[f32], k: usize) -> Vec<Prediction> {
    if scores.is_empty() {
        return Vec::new();
    }

    let probabilities = softmax(scores);
    let mut indexed: Vec<(usize, f32)> = probabilities.into_iter().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    indexed
        .into_iter()
        .take(k)
        .map(|(index, probability)| Prediction {
            label: (index + 1) as u32,
            confidence: probability,
        })
        .collect()
}
