//! Zentrale Konfiguration für den Spline-Terrain-Painter.
//!
//! `PainterOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Brush ───────────────────────────────────────────────────────────

/// Standard-Kantenlänge des Paint-Brush in Grid-Zellen.
pub const BRUSH_AREA_DEFAULT: usize = 32;
/// Minimale Brush-Kantenlänge.
pub const BRUSH_AREA_MIN: usize = 1;
/// Maximale Brush-Kantenlänge.
pub const BRUSH_AREA_MAX: usize = 256;
/// Minimale Brush-Stärke.
pub const STRENGTH_MIN: f32 = 0.01;
/// Maximale Brush-Stärke.
pub const STRENGTH_MAX: f32 = 1.0;

// ── Paint (Splat-Map) ───────────────────────────────────────────────

/// Verstärkungsfaktor für den Layer-Gewichts-Zuwachs beim Malen.
///
/// Die Zelle wird nach jedem Zuwachs renormalisiert (Summe == 1),
/// der Faktor steuert daher nur, wie schnell ein Layer dominiert.
/// Kalibriert für f32-Gewichtskarten; jeder positive Wert ist gültig.
pub const PAINT_GAIN: f32 = 16.0;

// ── Höhenanpassung entlang der Kurve ────────────────────────────────

/// Standard-Kantenlänge des Höhen-Brush in Grid-Zellen.
pub const HEIGHT_AREA_DEFAULT: usize = 48;
/// Standard-Breite des flachen Pfad-Kerns in Grid-Zellen.
pub const PATH_AREA_DEFAULT: usize = 16;
/// Standard-Steigung der Böschung (0 = keine Angleichung, 1 = voll).
pub const SLOPE_DEFAULT: f32 = 1.0;

// ── Kurven-Abtastung ────────────────────────────────────────────────

/// Abtastschritte pro Kurvensegment beim Malen entlang der Spline.
pub const STEPS_PER_SEGMENT: usize = 10;

/// Alle zur Laufzeit änderbaren Painter-Parameter.
///
/// Bereichs-Klemmung passiert in den Settern des Painters, nicht hier:
/// ein deserialisiertes Options-Objekt wird beim Übernehmen geklemmt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PainterOptions {
    /// Kantenlänge des Paint-Brush in Zellen der Gewichtskarte.
    pub area_of_effect: usize,
    /// Kantenlänge des Höhen-Brush in Zellen des Höhenfelds.
    pub height_adjustment_area: usize,
    /// Breite des flachen Pfad-Kerns innerhalb des Höhen-Brush.
    pub height_path_area: usize,
    /// Stärke für Raise/Lower/Flatten/Paint (0.01 bis 1.0).
    pub strength: f32,
    /// Glättungsfaktor für Smooth und den globalen Glättungs-Pass.
    pub smoothing: f32,
    /// Zielhöhe für Flatten in Weltmetern.
    pub flatten_height: f32,
    /// Böschungs-Steigung der Höhenanpassung (0 bis 1).
    pub slope: f32,
    /// Verstärkungsfaktor des Gewichts-Zuwachses beim Malen.
    pub paint_gain: f32,
    /// Abtastschritte pro Kurvensegment.
    pub steps_per_segment: usize,
    /// Splat-Map entlang der Kurve malen?
    pub paint_terrain: bool,
    /// Höhenfeld an die Kurve anpassen?
    pub paint_height: bool,
    /// Index des aktiven Textur-Layers.
    pub layer: usize,
}

impl Default for PainterOptions {
    fn default() -> Self {
        Self {
            area_of_effect: BRUSH_AREA_DEFAULT,
            height_adjustment_area: HEIGHT_AREA_DEFAULT,
            height_path_area: PATH_AREA_DEFAULT,
            strength: 0.5,
            smoothing: 0.0,
            flatten_height: 0.0,
            slope: SLOPE_DEFAULT,
            paint_gain: PAINT_GAIN,
            steps_per_segment: STEPS_PER_SEGMENT,
            paint_terrain: true,
            paint_height: true,
            layer: 0,
        }
    }
}
