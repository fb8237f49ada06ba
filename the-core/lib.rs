//! Text primitives shared by the target resolution crates: character
//! classes, grapheme clusters and line endings.

pub mod chars;
pub mod grapheme;
pub mod line_ending;
