//! Static music theory catalog used to seed the graph store.

use super::chord::{Chord, ChordQuality};
use super::notes::ChromaticNote;
use super::scale::{Scale, ScaleType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub name: String,
    pub typical_rhythms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Motif {
    pub pattern: String,
    pub style: String,
}

/// A genre "embraces" a motif. The relation is many-to-many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreMotifLink {
    pub genre: String,
    pub motif: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TheoryCatalog {
    pub scales: Vec<Scale>,
    pub chords: Vec<Chord>,
    pub genres: Vec<Genre>,
    pub motifs: Vec<Motif>,
    pub genre_motif_links: Vec<GenreMotifLink>,
}

const GENRES: &[(&str, &[&str])] = &[
    ("Classical", &["steady", "complex time signatures"]),
    ("Jazz", &["swing", "syncopation"]),
    ("Rock", &["straight", "backbeat"]),
    ("Blues", &["shuffle", "slow swing"]),
    ("Pop", &["4-on-the-floor", "straight"]),
    ("Hip Hop", &["breakbeat", "syncopation"]),
    ("Electronic", &["house beat", "breakbeat"]),
    ("Reggae", &["one-drop", "offbeat"]),
];

const MOTIFS: &[(&str, &str)] = &[
    ("ascending", "bright"),
    ("descending", "melancholic"),
    ("arpeggio", "flowing"),
    ("syncopated", "rhythmic"),
    ("scalar", "linear"),
    ("leapwise", "bold"),
    ("ostinato", "hypnotic"),
    ("pedal tone", "anchoring"),
];

const GENRE_MOTIF_LINKS: &[(&str, &str)] = &[
    ("Jazz", "syncopated"),
    ("Classical", "ascending"),
    ("Classical", "ostinato"),
    ("Rock", "arpeggio"),
    ("Blues", "descending"),
    ("Electronic", "pedal tone"),
    ("Pop", "scalar"),
    ("Hip Hop", "syncopated"),
];

/// Builds the full catalog: every root in both scale types, every root in
/// every chord quality, plus the fixed genre and motif sets.
pub fn build_catalog() -> TheoryCatalog {
    let scales = ChromaticNote::ALL
        .iter()
        .flat_map(|root| ScaleType::ALL.iter().map(move |t| Scale::new(*root, *t)))
        .collect();

    let chords = ChromaticNote::ALL
        .iter()
        .flat_map(|root| ChordQuality::ALL.iter().map(move |q| Chord::new(*root, *q)))
        .collect();

    let genres = GENRES
        .iter()
        .map(|(name, rhythms)| Genre {
            name: name.to_string(),
            typical_rhythms: rhythms.iter().map(|r| r.to_string()).collect(),
        })
        .collect();

    let motifs = MOTIFS
        .iter()
        .map(|(pattern, style)| Motif {
            pattern: pattern.to_string(),
            style: style.to_string(),
        })
        .collect();

    let genre_motif_links = GENRE_MOTIF_LINKS
        .iter()
        .map(|(genre, motif)| GenreMotifLink {
            genre: genre.to_string(),
            motif: motif.to_string(),
        })
        .collect();

    TheoryCatalog {
        scales,
        chords,
        genres,
        motifs,
        genre_motif_links,
    }
}
