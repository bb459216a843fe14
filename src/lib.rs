//! Spline-Terrain-Painter: Höhenfeld- und Splat-Map-Bearbeitung
//! entlang einer stückweise kubischen Bézier-Spline.
//!
//! Die Kurve lebt in Weltkoordinaten über dem Terrain. Der Painter
//! projiziert sie auf das Grid, passt das Höhenfeld an die Kurvenhöhe
//! an (flacher Pfad plus Böschung) und malt Textur-Layer entlang des
//! Verlaufs. Bearbeitungen laufen in Sessions mit Snapshot-Undo.

pub mod core;
pub mod persist;
pub mod shared;

pub use crate::core::{
    BezierSpline, BrushEffect, BrushKernel, ControlPointMode, EditSession, MemoryTerrain,
    TerrainAccess, TerrainMapper, TerrainPainter,
};
pub use crate::persist::SplineDocument;
pub use crate::shared::PainterOptions;
