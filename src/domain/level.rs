//! Level classification of cost nodes for display.

use std::fmt;

/// Status flag that suppresses level coloring.
pub const NEUTRAL_STATUS: &str = "N";

/// Display category of a cost node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelCategory {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    /// Depth outside the table
    Overflow,
    /// Node flagged neutral
    Neutral,
}

/// Depth 1 maps to the first entry.
const LEVEL_TABLE: [LevelCategory; 8] = [
    LevelCategory::A,
    LevelCategory::B,
    LevelCategory::C,
    LevelCategory::D,
    LevelCategory::E,
    LevelCategory::F,
    LevelCategory::G,
    LevelCategory::H,
];

/// Classify a node by depth and status flag.
///
/// Budget roots (depth 0) are styled structurally and are not meant to be
/// classified; they fall into [`LevelCategory::Overflow`].
pub fn classify(depth: usize, status: &str) -> LevelCategory {
    classify_with(depth, status, NEUTRAL_STATUS)
}

/// Same as [`classify`] with a configurable neutral marker.
pub fn classify_with(depth: usize, status: &str, neutral_status: &str) -> LevelCategory {
    if status == neutral_status {
        return LevelCategory::Neutral;
    }
    depth
        .checked_sub(1)
        .and_then(|i| LEVEL_TABLE.get(i))
        .copied()
        .unwrap_or(LevelCategory::Overflow)
}

impl fmt::Display for LevelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LevelCategory::A => "A",
            LevelCategory::B => "B",
            LevelCategory::C => "C",
            LevelCategory::D => "D",
            LevelCategory::E => "E",
            LevelCategory::F => "F",
            LevelCategory::G => "G",
            LevelCategory::H => "H",
            LevelCategory::Overflow => "overflow",
            LevelCategory::Neutral => "neutral",
        };
        f.write_str(s)
    }
}
