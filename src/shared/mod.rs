//! Layer-neutrale Bausteine: Bézier-Geometrie und Konfiguration.

pub mod bezier;
pub mod options;

pub use options::PainterOptions;
