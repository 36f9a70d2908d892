//! Success or failure from a single uniform sample.

use tracing::info;

use crate::dice::Dice;

/// The resolved outcome of one attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    /// The sample drawn from `[0, 1)`.
    pub roll: f64,
    /// The chance the sample was compared against.
    pub chance: f64,
    /// Whether the attempt succeeded.
    pub success: bool,
}

/// Draw one sample and compare it against `chance`. Success iff the sample
/// is strictly below the chance, so a chance of 0 never succeeds and a
/// chance of 1 always does.
pub fn resolve(chance: f64, dice: &mut dyn Dice) -> Outcome {
    let roll = dice.unit();
    let success = roll < chance;
    info!(roll, chance, success, "attempt resolved");
    Outcome {
        roll,
        chance,
        success,
    }
}
