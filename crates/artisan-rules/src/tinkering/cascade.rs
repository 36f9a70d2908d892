//! Two-stage randomized cascades.
//!
//! A gate roll decides whether a bonus is rolled at all. When it passes, a
//! bucket roll over a fixed range picks one payload from a table of
//! contiguous `(inclusive upper bound, bucket)` rows. Tables are plain
//! data so they can be balanced and tested apart from the payload code.

use tracing::info;

use super::TinkerJob;

/// Payload class selected by a bucket roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// The common small bonus.
    ExtraFlat,
    /// Rare loss on the same statistic.
    CriticalFailure,
    /// One of three orthogonal secondary bonuses.
    SecondaryBonus,
    /// Resistance cleaving against the weapon's damage type.
    ResistanceCleave,
    /// A named special property.
    SpecialProperty,
    /// Large flat bonus, announced to everyone.
    JackpotFlat,
    /// The item becomes bonded, announced to everyone.
    JackpotBonded,
    /// No payload.
    Nothing,
}

/// The row of `table` containing `roll`.
///
/// Rows are `(inclusive upper bound, value)` in ascending order. Rolls
/// above the last bound match nothing.
pub fn pick<T: Copy>(table: &[(i32, T)], roll: i32) -> Option<T> {
    table
        .iter()
        .find(|(upper, _)| roll <= *upper)
        .map(|(_, value)| *value)
}

/// Named, versioned boundary table for one material's cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeTable {
    /// Table name, used in logs.
    pub name: &'static str,
    /// Balance revision.
    pub version: u32,
    /// Sides of the gate die.
    pub gate_sides: i32,
    /// Highest gate roll that passes.
    pub gate_threshold: i32,
    /// Sides of the bucket die.
    pub bucket_sides: i32,
    /// `(inclusive upper bound, bucket)` rows, ascending.
    pub buckets: &'static [(i32, Bucket)],
}

impl CascadeTable {
    /// Whether a gate roll lets the bucket roll happen.
    pub const fn gate_passes(&self, roll: i32) -> bool {
        roll <= self.gate_threshold
    }

    /// The bucket a roll lands in.
    pub fn classify(&self, roll: i32) -> Bucket {
        pick(self.buckets, roll).unwrap_or(Bucket::Nothing)
    }

    /// Whether the rows strictly ascend and end exactly at the die size.
    pub fn is_contiguous(&self) -> bool {
        let ascending = self
            .buckets
            .windows(2)
            .all(|pair| matches!(pair, [(low, _), (high, _)] if low < high));
        let starts_in_range = self.buckets.first().is_some_and(|(upper, _)| *upper >= 1);
        let ends_at_die = self
            .buckets
            .last()
            .is_some_and(|(upper, _)| *upper == self.bucket_sides);
        ascending && starts_in_range && ends_at_die
    }
}

/// A material's randomized cascade.
pub trait Cascade: Send + Sync {
    /// The boundary table.
    fn table(&self) -> &'static CascadeTable;

    /// Apply the result of a failed gate roll.
    fn on_gate_failed(&self, gate: i32, job: &mut TinkerJob<'_>);

    /// Apply the payload for `bucket`. `roll` is the bucket roll.
    fn on_bucket(&self, bucket: Bucket, roll: i32, job: &mut TinkerJob<'_>);
}

/// The rolls a cascade consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeRoll {
    /// Gate roll.
    pub gate: i32,
    /// Bucket roll and its bucket, when the gate passed.
    pub bucket: Option<(i32, Bucket)>,
}

/// Roll the gate and, if it passes, the bucket, and apply the payload.
pub fn run_cascade(cascade: &dyn Cascade, job: &mut TinkerJob<'_>) -> CascadeRoll {
    let table = cascade.table();
    let gate = job.roll(1, table.gate_sides);
    if !table.gate_passes(gate) {
        info!(
            table = table.name,
            version = table.version,
            gate,
            target = %job.target.id,
            "cascade gate failed"
        );
        cascade.on_gate_failed(gate, job);
        return CascadeRoll { gate, bucket: None };
    }

    let roll = job.roll(1, table.bucket_sides);
    let bucket = table.classify(roll);
    info!(
        table = table.name,
        version = table.version,
        gate,
        roll,
        ?bucket,
        target = %job.target.id,
        "cascade bucket rolled"
    );
    cascade.on_bucket(bucket, roll, job);
    CascadeRoll {
        gate,
        bucket: Some((roll, bucket)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: CascadeTable = CascadeTable {
        name: "sample",
        version: 1,
        gate_sides: 200,
        gate_threshold: 60,
        bucket_sides: 10,
        buckets: &[
            (5, Bucket::ExtraFlat),
            (9, Bucket::CriticalFailure),
            (10, Bucket::JackpotFlat),
        ],
    };

    #[test]
    fn pick_uses_inclusive_upper_bounds() {
        assert_eq!(pick(SAMPLE.buckets, 1), Some(Bucket::ExtraFlat));
        assert_eq!(pick(SAMPLE.buckets, 5), Some(Bucket::ExtraFlat));
        assert_eq!(pick(SAMPLE.buckets, 6), Some(Bucket::CriticalFailure));
        assert_eq!(pick(SAMPLE.buckets, 10), Some(Bucket::JackpotFlat));
        assert_eq!(pick(SAMPLE.buckets, 11), None);
    }

    #[test]
    fn classify_defaults_to_nothing() {
        assert_eq!(SAMPLE.classify(11), Bucket::Nothing);
    }

    #[test]
    fn gate_threshold_is_inclusive() {
        assert!(SAMPLE.gate_passes(60));
        assert!(!SAMPLE.gate_passes(61));
    }

    #[test]
    fn contiguity_detects_gaps_and_short_tables() {
        assert!(SAMPLE.is_contiguous());
        let short = CascadeTable {
            bucket_sides: 12,
            ..SAMPLE
        };
        assert!(!short.is_contiguous());
        let unordered = CascadeTable {
            buckets: &[(5, Bucket::ExtraFlat), (5, Bucket::Nothing), (10, Bucket::Nothing)],
            ..SAMPLE
        };
        assert!(!unordered.is_contiguous());
    }
}
