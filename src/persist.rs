//! Speichern und Laden von Spline plus Painter-Parametern als JSON.
//!
//! Das Terrain selbst wird nicht serialisiert, nur die Kurve und die
//! Brush-Einstellungen, mit denen sie gemalt wurde.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::spline::BezierSpline;
use crate::shared::options::PainterOptions;

/// Serialisierbares Dokument: Kurve und zugehörige Brush-Parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplineDocument {
    pub spline: BezierSpline,
    pub options: PainterOptions,
}

impl SplineDocument {
    pub fn new(spline: BezierSpline, options: PainterOptions) -> Self {
        Self { spline, options }
    }

    /// Schreibt das Dokument als eingerücktes JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Spline-Dokument konnte nicht serialisiert werden")?;
        fs::write(path, json)
            .with_context(|| format!("Datei konnte nicht geschrieben werden: {}", path.display()))?;
        log::info!("Spline-Dokument gespeichert: {}", path.display());
        Ok(())
    }

    /// Liest ein Dokument und prüft die strukturelle Invariante der
    /// Kurve (3n+1 Punkte, n+1 Modi).
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Datei konnte nicht gelesen werden: {}", path.display()))?;
        let document: Self = serde_json::from_str(&json)
            .with_context(|| format!("Ungültiges Spline-Dokument: {}", path.display()))?;
        if !document.spline.is_well_formed() {
            bail!(
                "Spline-Dokument strukturell ungültig: {} Punkte, {} Modi",
                document.spline.point_count(),
                document.spline.mode_count()
            );
        }
        log::info!(
            "Spline-Dokument geladen: {} ({} Segmente)",
            path.display(),
            document.spline.segment_count()
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::spline::ControlPointMode;
    use glam::Vec3;

    #[test]
    fn test_save_load_roundtrip() {
        let dir = std::env::temp_dir().join("spline_terrain_painter_persist_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("doc.json");

        let mut spline = BezierSpline::new();
        spline.add_segment();
        spline.set_mode(0, ControlPointMode::Mirrored);
        let document = SplineDocument::new(spline, PainterOptions::default());

        document.save(&path).unwrap();
        let loaded = SplineDocument::load(&path).unwrap();

        assert_eq!(
            loaded.spline.point_count(),
            document.spline.point_count()
        );
        assert_eq!(loaded.spline.mode(0), ControlPointMode::Mirrored);
        assert_eq!(loaded.options.area_of_effect, document.options.area_of_effect);
        assert_eq!(loaded.spline.point(0.0), Vec3::new(1.0, 0.0, 0.0));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_fehlende_datei() {
        let err = SplineDocument::load(Path::new("/nonexistent/doc.json")).unwrap_err();
        assert!(err.to_string().contains("gelesen"));
    }

    #[test]
    fn test_load_strukturell_ungueltig() {
        let dir = std::env::temp_dir().join("spline_terrain_painter_persist_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("kaputt.json");

        // 5 Punkte sind kein 3n+1-Layout
        let json = r#"{
            "spline": {
                "points": [
                    [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0],
                    [3.0, 0.0, 0.0], [4.0, 0.0, 0.0]
                ],
                "modes": ["Free", "Free"],
                "looped": false
            },
            "options": {
                "area_of_effect": 32, "height_adjustment_area": 48,
                "height_path_area": 16, "strength": 0.5, "smoothing": 0.0,
                "flatten_height": 0.0, "slope": 1.0, "paint_gain": 16.0,
                "steps_per_segment": 10, "paint_terrain": true,
                "paint_height": true, "layer": 0
            }
        }"#;
        std::fs::write(&path, json).unwrap();

        let err = SplineDocument::load(&path).unwrap_err();
        assert!(err.to_string().contains("ungültig"));

        std::fs::remove_file(&path).ok();
    }
}
