//! Priority scale and weighted-candidate resolution
//!
//! The scorer collects independent weighted proposals per way and keeps the
//! one with the highest confidence weight. The path-search cost function
//! consumes the resulting code purely ordinally.

use serde::Serialize;

/// Discrete preference scale, most discouraged to most encouraged.
///
/// Higher ordinal = more preferred; the search weighting must treat the
/// ordinal monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityCode {
    Worst = 0,
    AvoidIfPossible = 1,
    ReachDest = 2,
    Unchanged = 3,
    Prefer = 4,
    VeryNice = 5,
    Best = 6,
}

impl PriorityCode {
    /// Stable ordinal used by the flag packing stage.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(value: u8) -> Option<PriorityCode> {
        match value {
            0 => Some(PriorityCode::Worst),
            1 => Some(PriorityCode::AvoidIfPossible),
            2 => Some(PriorityCode::ReachDest),
            3 => Some(PriorityCode::Unchanged),
            4 => Some(PriorityCode::Prefer),
            5 => Some(PriorityCode::VeryNice),
            6 => Some(PriorityCode::Best),
            _ => None,
        }
    }
}

/// Weighted priority proposals collected while scoring a single way.
///
/// Heuristics append `(weight, code)` pairs in evaluation order; `resolve`
/// selects the code at the greatest weight. Equal-weight entries are
/// last-write-wins, which is the override mechanism the tunnel sub-rule
/// relies on.
#[derive(Debug, Default)]
pub struct PriorityCandidates {
    entries: Vec<(f64, PriorityCode)>,
}

impl PriorityCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, weight: f64, code: PriorityCode) {
        self.entries.push((weight, code));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Select-max-weight fold. An empty list resolves to
    /// [`PriorityCode::Unchanged`].
    pub fn resolve(&self) -> PriorityCode {
        let mut best: Option<(f64, PriorityCode)> = None;
        for &(weight, code) in &self.entries {
            match best {
                Some((top, _)) if weight < top => {}
                _ => best = Some((weight, code)),
            }
        }
        best.map_or(PriorityCode::Unchanged, |(_, code)| code)
    }
}
