// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Randomly shuffles samples and splits them into two sets:
//   - Training set:   used to update model weights
//   - Validation set: used to pick the best checkpoint
//
// Sizes depend only on the total, never on the shuffle:
//
//   train = floor(total * train_fraction)
//   val   = total - train
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: rand crate documentation

use rand::{seq::SliceRandom, Rng};

/// Default share of samples used for training
pub const TRAIN_FRACTION: f64 = 0.8;

/// Number of training samples for a set of `total`.
pub fn train_size(total: usize, train_fraction: f64) -> usize {
    (((total as f64) * train_fraction).floor() as usize).min(total)
}

/// Shuffle `samples` with `rng` and split into (train, validation).
pub fn split_train_val<T, R: Rng + ?Sized>(
    mut samples:    Vec<T>,
    train_fraction: f64,
    rng:            &mut R,
) -> (Vec<T>, Vec<T>) {
    samples.shuffle(rng);

    let total    = samples.len();
    let split_at = train_size(total, train_fraction);

    // split_off(n) leaves [0..n) in samples and returns [n..total)
    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        samples.len(),
        val.len(),
    );

    (samples, val)
}
