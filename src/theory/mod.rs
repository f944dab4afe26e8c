//! Music theory primitives: pitch classes, scales, chords and the static
//! catalog of genres and motifs.
//!
//! Everything here is a pure function of fixed interval tables and the
//! chromatic ordering.

mod catalog;
mod chord;
mod notes;
mod scale;

pub use catalog::{build_catalog, Genre, GenreMotifLink, Motif, TheoryCatalog};
pub use chord::{derive_chord, Chord, ChordQuality};
pub use notes::{ChromaticNote, CHROMATIC_LEN};
pub use scale::{derive_scale, Scale, ScaleType, MAJOR_INTERVALS, NATURAL_MINOR_INTERVALS};
