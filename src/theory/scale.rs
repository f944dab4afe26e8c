//! Scale derivation from step patterns.

use super::notes::ChromaticNote;
use serde::{Deserialize, Serialize};

/// Whole-whole-half-whole-whole-whole-half.
pub const MAJOR_INTERVALS: [i32; 7] = [2, 2, 1, 2, 2, 2, 1];

/// Whole-half-whole-whole-half-whole-whole.
pub const NATURAL_MINOR_INTERVALS: [i32; 7] = [2, 1, 2, 2, 1, 2, 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleType {
    #[serde(rename = "Major")]
    Major,
    #[serde(rename = "Natural Minor")]
    NaturalMinor,
}

impl ScaleType {
    pub const ALL: [ScaleType; 2] = [ScaleType::Major, ScaleType::NaturalMinor];

    pub fn intervals(self) -> &'static [i32; 7] {
        match self {
            ScaleType::Major => &MAJOR_INTERVALS,
            ScaleType::NaturalMinor => &NATURAL_MINOR_INTERVALS,
        }
    }

    /// Value stored in the scale's `type` property.
    pub fn as_str(self) -> &'static str {
        match self {
            ScaleType::Major => "Major",
            ScaleType::NaturalMinor => "Natural Minor",
        }
    }

    /// Suffix used in scale names, e.g. "A Minor".
    pub fn name_suffix(self) -> &'static str {
        match self {
            ScaleType::Major => "Major",
            ScaleType::NaturalMinor => "Minor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub name: String,
    #[serde(rename = "type")]
    pub scale_type: ScaleType,
    pub notes: Vec<ChromaticNote>,
}

impl Scale {
    pub fn new(root: ChromaticNote, scale_type: ScaleType) -> Self {
        Scale {
            name: format!("{} {}", root, scale_type.name_suffix()),
            scale_type,
            notes: derive_scale(root, scale_type.intervals()),
        }
    }

    pub fn root(&self) -> ChromaticNote {
        self.notes[0]
    }
}

/// Walks `intervals` from `root`, returning `intervals.len() + 1` notes.
///
/// The first note is the root and the last one is where the accumulated
/// steps land, so a full octave pattern ends on the root again.
pub fn derive_scale(root: ChromaticNote, intervals: &[i32]) -> Vec<ChromaticNote> {
    let mut notes = Vec::with_capacity(intervals.len() + 1);
    let mut offset = 0;
    notes.push(root);
    for step in intervals {
        offset += step;
        notes.push(root.transpose(offset));
    }
    notes
}
