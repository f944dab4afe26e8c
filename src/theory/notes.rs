//! Chromatic pitch classes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of pitch classes in the chromatic set.
pub const CHROMATIC_LEN: usize = 12;

/// One of the 12 pitch classes, ordered cyclically starting from C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChromaticNote {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D#")]
    DSharp,
    #[serde(rename = "E")]
    E,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "F#")]
    FSharp,
    #[serde(rename = "G")]
    G,
    #[serde(rename = "G#")]
    GSharp,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A#")]
    ASharp,
    #[serde(rename = "B")]
    B,
}

impl ChromaticNote {
    /// All pitch classes in chromatic order.
    pub const ALL: [ChromaticNote; CHROMATIC_LEN] = [
        ChromaticNote::C,
        ChromaticNote::CSharp,
        ChromaticNote::D,
        ChromaticNote::DSharp,
        ChromaticNote::E,
        ChromaticNote::F,
        ChromaticNote::FSharp,
        ChromaticNote::G,
        ChromaticNote::GSharp,
        ChromaticNote::A,
        ChromaticNote::ASharp,
        ChromaticNote::B,
    ];

    /// Position in the chromatic set, 0 for C up to 11 for B.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Note at the given index, wrapping modulo 12.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % CHROMATIC_LEN]
    }

    /// Moves the note by a (possibly negative) number of semitones.
    pub fn transpose(self, semitones: i32) -> Self {
        let shifted = (self.index() as i32 + semitones).rem_euclid(CHROMATIC_LEN as i32);
        Self::from_index(shifted as usize)
    }

    /// Ascending distance in semitones from `self` to `other`, in 0..12.
    pub fn semitones_to(self, other: ChromaticNote) -> i32 {
        (other.index() as i32 - self.index() as i32).rem_euclid(CHROMATIC_LEN as i32)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChromaticNote::C => "C",
            ChromaticNote::CSharp => "C#",
            ChromaticNote::D => "D",
            ChromaticNote::DSharp => "D#",
            ChromaticNote::E => "E",
            ChromaticNote::F => "F",
            ChromaticNote::FSharp => "F#",
            ChromaticNote::G => "G",
            ChromaticNote::GSharp => "G#",
            ChromaticNote::A => "A",
            ChromaticNote::ASharp => "A#",
            ChromaticNote::B => "B",
        }
    }
}

impl fmt::Display for ChromaticNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChromaticNote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChromaticNote::ALL
            .iter()
            .copied()
            .find(|note| note.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown pitch class: {}", s))
    }
}
