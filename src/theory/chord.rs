//! Chord derivation from semitone offsets.

use super::notes::ChromaticNote;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Major7,
    Dom7,
    Minor7,
    Min7b5,
}

impl ChordQuality {
    pub const ALL: [ChordQuality; 8] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Major7,
        ChordQuality::Dom7,
        ChordQuality::Minor7,
        ChordQuality::Min7b5,
    ];

    /// Semitone offsets from the root.
    pub fn offsets(self) -> &'static [i32] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Dom7 => &[0, 4, 7, 10],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Min7b5 => &[0, 3, 6, 10],
        }
    }

    /// Value stored in the chord's `quality` property.
    pub fn as_str(self) -> &'static str {
        match self {
            ChordQuality::Major => "major",
            ChordQuality::Minor => "minor",
            ChordQuality::Diminished => "diminished",
            ChordQuality::Augmented => "augmented",
            ChordQuality::Major7 => "major7",
            ChordQuality::Dom7 => "dom7",
            ChordQuality::Minor7 => "minor7",
            ChordQuality::Min7b5 => "min7b5",
        }
    }

    /// Human readable name, appended to the root in chord names.
    pub fn display_name(self) -> &'static str {
        match self {
            ChordQuality::Major => "Major",
            ChordQuality::Minor => "Minor",
            ChordQuality::Diminished => "Diminished",
            ChordQuality::Augmented => "Augmented",
            ChordQuality::Major7 => "Major 7th",
            ChordQuality::Dom7 => "Dominant 7th",
            ChordQuality::Minor7 => "Minor 7th",
            ChordQuality::Min7b5 => "Half-diminished",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub name: String,
    pub quality: ChordQuality,
    pub notes: Vec<ChromaticNote>,
}

impl Chord {
    pub fn new(root: ChromaticNote, quality: ChordQuality) -> Self {
        Chord {
            name: format!("{} {}", root, quality.display_name()),
            quality,
            notes: derive_chord(root, quality.offsets()),
        }
    }
}

pub fn derive_chord(root: ChromaticNote, offsets: &[i32]) -> Vec<ChromaticNote> {
    offsets.iter().map(|offset| root.transpose(*offset)).collect()
}
