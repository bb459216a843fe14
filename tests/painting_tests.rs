//! Integrationstests für das Malen entlang der Spline:
//! - Höhenanpassung mit Pfad-Kern, Böschung und Idempotenz
//! - Splat-Map-Malen mit Simplex-Invariante
//! - Session-Undo und Bake

use glam::Vec3;
use image::{DynamicImage, ImageBuffer, Luma};
use spline_terrain_painter::{
    BezierSpline, ControlPointMode, MemoryTerrain, TerrainAccess, TerrainPainter,
};

const RES: usize = 64;

/// Terrain mit 1 Zelle pro Weltmeter und 10 m Höhenspanne.
fn terrain(height: f32) -> MemoryTerrain {
    MemoryTerrain::flat(RES, 3, Vec3::new(RES as f32, 10.0, RES as f32), height)
}

/// Gerade Kurve quer über die Terrainmitte auf 5 m Höhe.
fn curve_across_middle() -> BezierSpline {
    let spline = BezierSpline::new();
    spline.transformed(|p| Vec3::new(8.0 + (p.x - 1.0) * 16.0, 5.0, 32.0))
}

fn white_brush() -> DynamicImage {
    DynamicImage::ImageLuma8(ImageBuffer::from_pixel(16, 16, Luma([255u8])))
}

fn painter() -> TerrainPainter {
    let mut painter = TerrainPainter::with_spline(curve_across_middle());
    painter.set_brush_image(white_brush());
    painter.set_height_adjustment_area(8);
    painter.set_height_path_area(4);
    painter
}

fn height_map(terrain: &MemoryTerrain) -> Vec<f32> {
    let mut map = Vec::with_capacity(RES * RES);
    for z in 0..RES {
        for x in 0..RES {
            map.push(terrain.height_at(x, z));
        }
    }
    map
}

// ─── Höhenanpassung ──────────────────────────────────────────────────────────

#[test]
fn test_pfad_zellen_springen_auf_kurvenhoehe() {
    let mut painter = painter();
    let mut opts = painter.options().clone();
    opts.paint_terrain = false;
    painter.set_options(opts);

    let mut terrain = terrain(0.1);
    painter.start_painting(&terrain);
    painter.paint_along_spline(&mut terrain).unwrap();

    // Kurve bei z=32, y=5 m → normalisiert 0.5; Zellen direkt unter
    // dem Pfad exakt auf Kurvenhöhe
    assert!((terrain.height_at(20, 32) - 0.5).abs() < 1e-5);
    assert!((terrain.height_at(40, 32) - 0.5).abs() < 1e-5);
    // weit weg von der Kurve unverändert
    assert!((terrain.height_at(32, 5) - 0.1).abs() < 1e-6);
    assert!((terrain.height_at(2, 60) - 0.1).abs() < 1e-6);
}

#[test]
fn test_boeschung_faellt_monoton_ab() {
    let mut painter = painter();
    let mut opts = painter.options().clone();
    opts.paint_terrain = false;
    painter.set_options(opts);

    let mut terrain = terrain(0.1);
    painter.start_painting(&terrain);
    painter.paint_along_spline(&mut terrain).unwrap();

    // Querschnitt bei x=32: vom Pfad nach außen nie ansteigend
    let mut previous = terrain.height_at(32, 32);
    for z in 33..44 {
        let h = terrain.height_at(32, z);
        assert!(
            h <= previous + 1e-6,
            "Querschnitt steigt bei z={} an: {} > {}",
            z,
            h,
            previous
        );
        previous = h;
    }
    // Böschungszellen liegen strikt zwischen Start- und Kurvenhöhe
    let slope_cell = terrain.height_at(32, 35);
    assert!(slope_cell > 0.1 && slope_cell < 0.5);
}

#[test]
fn test_benutzerdefinierte_falloff_kurve() {
    let mut painter = painter();
    let mut opts = painter.options().clone();
    opts.paint_terrain = false;
    painter.set_options(opts);
    // Konstanter Falloff 1: die gesamte Böschung landet auf Kurvenhöhe
    painter.set_slope_falloff(Some(Box::new(|_| 1.0)));

    let mut terrain = terrain(0.1);
    painter.start_painting(&terrain);
    painter.paint_along_spline(&mut terrain).unwrap();

    // Böschungszellen exakt auf Kurvenhöhe statt linear abgeblendet
    assert!((terrain.height_at(32, 35) - 0.5).abs() < 1e-5);
    assert!((terrain.height_at(32, 36) - 0.5).abs() < 1e-5);
    // außerhalb des Bandes weiterhin unberührt
    assert!((terrain.height_at(32, 40) - 0.1).abs() < 1e-6);
}

#[test]
fn test_glaettungs_pass_weicht_pfadkante_auf() {
    let mut painter = painter();
    let mut opts = painter.options().clone();
    opts.paint_terrain = false;
    painter.set_options(opts);
    painter.set_smoothing(0.5);

    let mut terrain = terrain(0.1);
    painter.start_painting(&terrain);
    painter.paint_along_spline(&mut terrain).unwrap();

    // Pfadkante (letzte Pfad-Zelle vor der Böschung) wird zum
    // Böschungs-Nachbarn hin abgemildert
    assert!(terrain.height_at(32, 34) < 0.5 - 1e-3);
    // Pfad-Inneres mit lauter gleichen Nachbarn bleibt auf Kurvenhöhe
    assert!((terrain.height_at(32, 32) - 0.5).abs() < 1e-5);
}

#[test]
fn test_hoehenanpassung_ist_idempotent() {
    let mut painter = painter();
    let mut opts = painter.options().clone();
    opts.paint_terrain = false;
    painter.set_options(opts);

    let mut terrain = terrain(0.1);
    painter.start_painting(&terrain);
    painter.paint_along_spline(&mut terrain).unwrap();
    let first = height_map(&terrain);

    // Zweiter Durchlauf aus derselben Session ohne Kurvenänderung
    painter.paint_along_spline(&mut terrain).unwrap();
    let second = height_map(&terrain);

    assert_eq!(first, second);
}

#[test]
fn test_replay_nach_undo_mit_geaenderter_kurve() {
    let mut painter = painter();
    let mut opts = painter.options().clone();
    opts.paint_terrain = false;
    painter.set_options(opts);

    let mut terrain = terrain(0.1);
    let before = height_map(&terrain);

    painter.start_painting(&terrain);
    painter.paint_along_spline(&mut terrain).unwrap();

    // Parameteränderung: Kurve höher legen, Undo + Replay
    painter.undo_paint(&mut terrain).unwrap();
    assert_eq!(height_map(&terrain), before);

    let raised = painter.spline().transformed(|p| p + Vec3::new(0.0, 3.0, 0.0));
    *painter.spline_mut() = raised;
    painter.paint_along_spline(&mut terrain).unwrap();

    // Kurve jetzt bei 8 m → normalisiert 0.8
    assert!((terrain.height_at(32, 32) - 0.8).abs() < 1e-5);
}

#[test]
fn test_kurve_ausserhalb_des_terrains_ist_noop() {
    let mut painter = painter();
    let mut opts = painter.options().clone();
    opts.paint_terrain = false;
    painter.set_options(opts);
    let shifted = painter
        .spline()
        .transformed(|p| p + Vec3::new(10_000.0, 0.0, 0.0));
    *painter.spline_mut() = shifted;

    let mut terrain = terrain(0.3);
    let before = height_map(&terrain);
    painter.start_painting(&terrain);
    painter.paint_along_spline(&mut terrain).unwrap();

    assert_eq!(height_map(&terrain), before);
}

// ─── Splat-Map ───────────────────────────────────────────────────────────────

#[test]
fn test_malen_erhaelt_simplex_und_trifft_den_pfad() {
    let mut painter = painter();
    let mut opts = painter.options().clone();
    opts.paint_height = false;
    opts.area_of_effect = 8;
    opts.strength = 1.0;
    opts.layer = 1;
    painter.set_options(opts);

    let mut terrain = terrain(0.0);
    painter.start_painting(&terrain);
    painter.paint_along_spline(&mut terrain).unwrap();

    // Jede Zelle bleibt ein Simplex (Summe 1)
    for z in 0..RES {
        for x in 0..RES {
            let sum: f32 = (0..terrain.layer_count())
                .map(|l| terrain.weight_at(x, z, l))
                .sum();
            assert!(
                (sum - 1.0).abs() < 1e-4,
                "Simplex verletzt bei ({}, {}): {}",
                x,
                z,
                sum
            );
        }
    }

    // Entlang des Pfads dominiert Layer 1, abseits Layer 0
    assert!(terrain.weight_at(32, 32, 1) > 0.5);
    assert!(terrain.weight_at(32, 5, 0) > 0.99);
}

// ─── Session-Lebenszyklus ────────────────────────────────────────────────────

#[test]
fn test_undo_stellt_hoehen_und_gewichte_bitgenau_wieder_her() {
    let mut painter = painter();
    let mut terrain = terrain(0.25);
    let heights_before = height_map(&terrain);
    let weight_before = terrain.weight_at(30, 32, 0);

    painter.start_painting(&terrain);
    painter.paint_along_spline(&mut terrain).unwrap();
    assert_ne!(height_map(&terrain), heights_before);

    painter.undo_paint(&mut terrain).unwrap();
    assert_eq!(height_map(&terrain), heights_before);
    assert_eq!(terrain.weight_at(30, 32, 0), weight_before);
}

#[test]
fn test_bake_committet_einweg() {
    let mut painter = painter();
    let mut terrain = terrain(0.25);

    painter.start_painting(&terrain);
    painter.paint_along_spline(&mut terrain).unwrap();
    let painted = height_map(&terrain);

    painter.bake(&mut terrain);
    assert!(!painter.is_painting());
    assert_eq!(height_map(&terrain), painted);
    // ohne Session ist Undo ein Fehler, der Stand bleibt
    assert!(painter.undo_paint(&mut terrain).is_err());
    assert_eq!(height_map(&terrain), painted);
}

// ─── Kontinuität und Malen zusammen ──────────────────────────────────────────

#[test]
fn test_gekruemmte_kurve_malt_nur_innerhalb_der_bounding_box() {
    let mut painter = painter();
    let mut opts = painter.options().clone();
    opts.paint_terrain = false;
    painter.set_options(opts);

    // Bogen: Handles nach oben gezogen, Modus Mirrored am Startjoint
    let mut spline = curve_across_middle();
    spline.set_mode(0, ControlPointMode::Mirrored);
    spline.set_control_point(1, Vec3::new(24.0, 5.0, 20.0));
    *painter.spline_mut() = spline;

    let mut terrain = terrain(0.1);
    painter.start_painting(&terrain);
    painter.paint_along_spline(&mut terrain).unwrap();

    // Ecke weit außerhalb der Kurven-Box bleibt unberührt
    assert!((terrain.height_at(1, 62) - 0.1).abs() < 1e-6);
}
