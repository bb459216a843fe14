//! Kernlogik: Spline-Geometrie, Koordinaten-Mapping und die
//! Terrain-Modifikations-Engine.

pub mod bounds;
pub mod brush;
pub mod grid;
pub mod mapper;
pub mod painter;
pub mod spline;
pub mod terrain;

pub use bounds::{curve_bounds, GridRect};
pub use brush::BrushKernel;
pub use grid::{Grid2, Grid3};
pub use mapper::TerrainMapper;
pub use painter::{BrushEffect, EditSession, SlopeFalloff, TerrainPainter};
pub use spline::{BezierSpline, ControlPointMode};
pub use terrain::{MemoryTerrain, TerrainAccess};
