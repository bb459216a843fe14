//! Terrain-Modifikations-Engine: wendet Brush-Effekte entlang der
//! Spline auf Höhenfeld und Gewichtskarte an.
//!
//! Zustandsautomat: Idle → Editing (`start_painting` nimmt einen
//! Snapshot) → zurück nach Idle über `bake` (Commit). `undo_paint`
//! stellt den Snapshot wieder her, behält die Session aber, damit die
//! aufrufende Schicht Parameteränderungen als
//! `undo_paint(); paint_along_spline();` wiederholen kann.
//!
//! Alle Regions-Operationen sind über [`GridRect`] geclippt; der Kern
//! liest und schreibt nie außerhalb der Terrain-Auflösung.

use std::path::Path;

use anyhow::{bail, Result};
use glam::Vec3;
use image::DynamicImage;

use super::bounds::{curve_bounds, GridRect};
use super::brush::{self, BrushKernel};
use super::grid::{Grid2, Grid3};
use super::mapper::TerrainMapper;
use super::spline::BezierSpline;
use super::terrain::TerrainAccess;
use crate::shared::options::{
    PainterOptions, BRUSH_AREA_MAX, BRUSH_AREA_MIN, STRENGTH_MAX, STRENGTH_MIN,
};

/// Brush-Effekt für einen einzelnen Stempel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushEffect {
    /// Höhen anheben: `h += kernel · strength`.
    Raise,
    /// Höhen absenken: `h -= kernel · strength`.
    Lower,
    /// Höhen zur Zielhöhe bewegen, ohne Überschwingen.
    Flatten,
    /// Höhen zum Nachbar-Mittelwert glätten, radial abfallend.
    Smooth,
    /// Layer-Gewicht erhöhen und Zelle renormalisieren.
    Paint,
}

/// Böschungs-Falloff: normalisierte Distanz [0, 1] → Blendfaktor.
pub type SlopeFalloff = Box<dyn Fn(f32) -> f32 + Send + Sync>;

/// Snapshot von Höhenfeld und Gewichtskarte bei Editier-Beginn.
///
/// Vollständige Kopie, keine Referenz: externe Änderungen am Terrain
/// nach Session-Start beeinflussen den Snapshot nicht. Wiederholtes
/// Wiederherstellen ist dadurch idempotent.
#[derive(Debug, Clone)]
pub struct EditSession {
    heights: Grid2,
    weights: Grid3,
}

impl EditSession {
    fn capture(terrain: &dyn TerrainAccess) -> Self {
        let height_res = terrain.height_resolution();
        let layer_res = terrain.layer_resolution();
        Self {
            heights: terrain.heights(0, 0, height_res, height_res),
            weights: terrain.layer_weights(0, 0, layer_res, layer_res),
        }
    }

    fn restore(&self, terrain: &mut dyn TerrainAccess) {
        terrain.set_heights(0, 0, &self.heights);
        terrain.set_layer_weights(0, 0, &self.weights);
    }

    /// Höhe einer Zelle zum Zeitpunkt des Session-Starts.
    pub fn start_height(&self, x: usize, z: usize) -> f32 {
        self.heights.get(x, z)
    }
}

/// Bewegt `current` um höchstens `max_delta` auf `target` zu.
fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// Besitzt Spline, Brush-Parameter und die laufende Editier-Session.
///
/// Layer- und Brush-Indizes werden an der Editier-Grenze (UI) geklemmt;
/// ein Layer-Index jenseits von `layer_count` ist hier ein
/// Programmierfehler und paniket beim Indexieren.
pub struct TerrainPainter {
    spline: BezierSpline,
    options: PainterOptions,
    /// Welt-Ursprung des aktiven Terrains.
    origin: Vec3,
    brush_image: Option<DynamicImage>,
    paint_kernel: Option<BrushKernel>,
    height_kernel: Option<BrushKernel>,
    slope_falloff: Option<SlopeFalloff>,
    session: Option<EditSession>,
}

impl Default for TerrainPainter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainPainter {
    pub fn new() -> Self {
        Self {
            spline: BezierSpline::new(),
            options: PainterOptions::default(),
            origin: Vec3::ZERO,
            brush_image: None,
            paint_kernel: None,
            height_kernel: None,
            slope_falloff: None,
            session: None,
        }
    }

    pub fn with_spline(spline: BezierSpline) -> Self {
        Self {
            spline,
            ..Self::new()
        }
    }

    // ── Zugriff und Parameter ───────────────────────────────────────

    pub fn spline(&self) -> &BezierSpline {
        &self.spline
    }

    pub fn spline_mut(&mut self) -> &mut BezierSpline {
        &mut self.spline
    }

    pub fn options(&self) -> &PainterOptions {
        &self.options
    }

    /// Übernimmt einen kompletten Options-Satz (z.B. deserialisiert)
    /// und klemmt alle Werte in gültige Bereiche.
    pub fn set_options(&mut self, mut options: PainterOptions) {
        options.area_of_effect = options.area_of_effect.clamp(BRUSH_AREA_MIN, BRUSH_AREA_MAX);
        options.height_adjustment_area = options
            .height_adjustment_area
            .clamp(BRUSH_AREA_MIN, BRUSH_AREA_MAX);
        options.height_path_area = options.height_path_area.min(options.height_adjustment_area);
        options.strength = options.strength.clamp(STRENGTH_MIN, STRENGTH_MAX);
        options.smoothing = options.smoothing.clamp(0.0, 1.0);
        options.slope = options.slope.clamp(0.0, 1.0);
        options.paint_gain = options.paint_gain.max(0.0);
        options.steps_per_segment = options.steps_per_segment.max(1);
        self.options = options;
        self.refresh_kernels();
    }

    /// Setzt das Brush-Quellbild und rastert beide Kernel neu.
    pub fn set_brush_image(&mut self, image: DynamicImage) {
        self.brush_image = Some(image);
        self.refresh_kernels();
    }

    /// Lädt ein Brush-Bild von der Platte und setzt es.
    pub fn load_brush(&mut self, path: &Path) -> Result<()> {
        let image = brush::load_brush_image(path)?;
        self.set_brush_image(image);
        Ok(())
    }

    /// Kantenlänge des Paint-Brush in Zellen (geklemmt).
    pub fn set_area_of_effect(&mut self, size: usize) {
        self.options.area_of_effect = size.clamp(BRUSH_AREA_MIN, BRUSH_AREA_MAX);
        self.refresh_kernels();
    }

    /// Kantenlänge des Höhen-Brush in Zellen (geklemmt); der Pfad-Kern
    /// wird mitgeklemmt, damit das Falloff-Band nie negativ wird.
    pub fn set_height_adjustment_area(&mut self, size: usize) {
        self.options.height_adjustment_area = size.clamp(BRUSH_AREA_MIN, BRUSH_AREA_MAX);
        self.options.height_path_area = self
            .options
            .height_path_area
            .min(self.options.height_adjustment_area);
        self.refresh_kernels();
    }

    /// Breite des flachen Pfad-Kerns (geklemmt auf den Höhen-Brush).
    pub fn set_height_path_area(&mut self, size: usize) {
        self.options.height_path_area = size.min(self.options.height_adjustment_area);
    }

    pub fn set_strength(&mut self, strength: f32) {
        self.options.strength = strength.clamp(STRENGTH_MIN, STRENGTH_MAX);
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.options.smoothing = smoothing.clamp(0.0, 1.0);
    }

    pub fn set_slope(&mut self, slope: f32) {
        self.options.slope = slope.clamp(0.0, 1.0);
    }

    pub fn set_flatten_height(&mut self, meters: f32) {
        self.options.flatten_height = meters;
    }

    pub fn set_layer(&mut self, layer: usize) {
        self.options.layer = layer;
    }

    pub fn set_paint_gain(&mut self, gain: f32) {
        self.options.paint_gain = gain.max(0.0);
    }

    /// Welt-Ursprung des aktiven Terrains; muss beim Terrain-Wechsel
    /// neu gesetzt werden.
    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    /// Benutzerdefinierte Böschungskurve; `None` = linear `1 - x`.
    pub fn set_slope_falloff(&mut self, falloff: Option<SlopeFalloff>) {
        self.slope_falloff = falloff;
    }

    // ── Kernel-Verwaltung ───────────────────────────────────────────

    /// Rastert beide Kernel neu, sofern ein Quellbild gesetzt ist.
    fn refresh_kernels(&mut self) {
        if let Some(image) = &self.brush_image {
            self.paint_kernel = Some(BrushKernel::from_image(image, self.options.area_of_effect));
            self.height_kernel = Some(BrushKernel::from_image(
                image,
                self.options.height_adjustment_area,
            ));
        }
    }

    /// Stellt sicher, dass beide Kernel existieren und zur aktuellen
    /// Brush-Größe passen. Meldet "nicht bereit", wenn kein Bild
    /// gesetzt ist.
    pub fn ensure_kernels(&mut self) -> Result<()> {
        if self.brush_image.is_none() {
            bail!("Kein Brush-Bild gesetzt");
        }
        let paint_stale = self.paint_kernel.as_ref().map(BrushKernel::size)
            != Some(self.options.area_of_effect);
        let height_stale = self.height_kernel.as_ref().map(BrushKernel::size)
            != Some(self.options.height_adjustment_area);
        if paint_stale || height_stale {
            self.refresh_kernels();
        }
        Ok(())
    }

    /// Paint-Kernel, dessen Größe garantiert zum Wirkbereich passt.
    fn checked_paint_kernel(&self) -> Result<&BrushKernel> {
        match &self.paint_kernel {
            Some(k) if k.size() == self.options.area_of_effect => Ok(k),
            _ => bail!("Paint-Kernel fehlt oder passt nicht zur Brush-Größe"),
        }
    }

    fn checked_height_kernel(&self) -> Result<&BrushKernel> {
        match &self.height_kernel {
            Some(k) if k.size() == self.options.height_adjustment_area => Ok(k),
            _ => bail!("Höhen-Kernel fehlt oder passt nicht zur Brush-Größe"),
        }
    }

    // ── Session-Lebenszyklus ────────────────────────────────────────

    pub fn is_painting(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Beginnt eine Editier-Session: vollständiger Snapshot von
    /// Höhenfeld und Gewichtskarte. Eine bereits laufende Session wird
    /// ersetzt.
    pub fn start_painting(&mut self, terrain: &dyn TerrainAccess) {
        if self.session.is_some() {
            log::warn!("Editier-Session bereits aktiv, Snapshot wird ersetzt");
        }
        self.session = Some(EditSession::capture(terrain));
        log::info!(
            "Editier-Session gestartet: Höhenfeld {}², Gewichtskarte {}² × {} Layer",
            terrain.height_resolution(),
            terrain.layer_resolution(),
            terrain.layer_count()
        );
    }

    /// Stellt den Session-Snapshot bitgenau wieder her. Die Session
    /// bleibt aktiv; wiederholte Aufrufe sind idempotent.
    pub fn undo_paint(&mut self, terrain: &mut dyn TerrainAccess) -> Result<()> {
        let Some(session) = &self.session else {
            bail!("Keine aktive Editier-Session");
        };
        session.restore(terrain);
        terrain.flush();
        log::info!("Editier-Session zurückgesetzt");
        Ok(())
    }

    /// Commit: verwirft den Snapshot und übernimmt den aktuellen Stand.
    /// Einweg-Operation, danach ist kein Undo mehr möglich.
    pub fn bake(&mut self, terrain: &mut dyn TerrainAccess) {
        self.session = None;
        terrain.flush();
        log::info!("Editier-Session gebacken");
    }

    // ── Einzelne Brush-Stempel ──────────────────────────────────────

    /// Wendet einen Brush-Stempel zentriert auf Grid-Zelle (x, z) an.
    /// Über den Rand hinausragende Stempel werden geclippt, nie
    /// umgebrochen; vollständig außerhalb liegende sind ein No-Op.
    pub fn apply_brush(
        &mut self,
        terrain: &mut dyn TerrainAccess,
        effect: BrushEffect,
        x: i32,
        z: i32,
    ) -> Result<()> {
        self.ensure_kernels()?;
        match effect {
            BrushEffect::Paint => self.paint_stamp(terrain, x, z),
            BrushEffect::Smooth => self.smooth_stamp(terrain, x, z),
            BrushEffect::Raise | BrushEffect::Lower | BrushEffect::Flatten => {
                self.sculpt_stamp(terrain, effect, x, z)
            }
        }
    }

    fn stamp_rect(center_x: i32, center_z: i32, area: usize, resolution: usize) -> Option<(GridRect, i32, i32)> {
        let x0 = center_x - (area / 2) as i32;
        let z0 = center_z - (area / 2) as i32;
        GridRect::clip(x0, z0, area, area, resolution).map(|rect| (rect, x0, z0))
    }

    /// Raise/Lower/Flatten über den Höhen-Brush.
    fn sculpt_stamp(
        &self,
        terrain: &mut dyn TerrainAccess,
        effect: BrushEffect,
        x: i32,
        z: i32,
    ) -> Result<()> {
        let kernel = self.checked_height_kernel()?;
        let area = self.options.height_adjustment_area;
        let resolution = terrain.height_resolution();
        let Some((rect, x0, z0)) = Self::stamp_rect(x, z, area, resolution) else {
            return Ok(());
        };

        let mapper = TerrainMapper::new(self.origin, terrain.size(), resolution);
        let flatten_target = mapper.normalized_height(self.options.flatten_height);
        let strength = self.options.strength;

        let mut region = terrain.heights(rect.min_x, rect.min_z, rect.width(), rect.height());
        for dz in 0..rect.height() {
            for dx in 0..rect.width() {
                let kx = (rect.min_x + dx) as i32 - x0;
                let kz = (rect.min_z + dz) as i32 - z0;
                let weight = kernel.weight(kx as usize, kz as usize) * strength;
                let h = region.get(dx, dz);
                let new_h = match effect {
                    BrushEffect::Raise => h + weight,
                    BrushEffect::Lower => h - weight,
                    BrushEffect::Flatten => move_towards(h, flatten_target, weight),
                    _ => unreachable!("sculpt_stamp nur für Höhen-Effekte"),
                };
                region.set(dx, dz, new_h);
            }
        }
        terrain.set_heights(rect.min_x, rect.min_z, &region);
        Ok(())
    }

    /// Glättet Höhen zum Nachbar-Mittelwert, radial abfallend vom
    /// Stempel-Zentrum (0) zum Ecken-Radius (1).
    fn smooth_stamp(&self, terrain: &mut dyn TerrainAccess, x: i32, z: i32) -> Result<()> {
        let area = self.options.height_adjustment_area;
        let resolution = terrain.height_resolution();
        let Some((rect, _, _)) = Self::stamp_rect(x, z, area, resolution) else {
            return Ok(());
        };

        let half = area as f32 / 2.0;
        let corner_radius = (2.0 * half * half).sqrt();
        let smoothing = self.options.smoothing;

        let mut region = terrain.heights(rect.min_x, rect.min_z, rect.width(), rect.height());
        // Mittelwerte aus dem unveränderten Zustand, damit die
        // Iterationsreihenfolge das Ergebnis nicht beeinflusst
        let source = region.clone();
        for dz in 0..rect.height() {
            for dx in 0..rect.width() {
                let gx = (rect.min_x + dx) as f32;
                let gz = (rect.min_z + dz) as f32;
                let dist = ((gx - x as f32).powi(2) + (gz - z as f32).powi(2)).sqrt();
                let ratio = (dist / corner_radius).min(1.0);
                let h = source.get(dx, dz);
                let avg = source.neighbor_average(dx, dz);
                region.set(dx, dz, h - (h - avg) * ratio * smoothing);
            }
        }
        terrain.set_heights(rect.min_x, rect.min_z, &region);
        Ok(())
    }

    /// Erhöht das aktive Layer-Gewicht und renormalisiert jede Zelle,
    /// sodass die Summe über alle Layer exakt 1 bleibt.
    fn paint_stamp(&self, terrain: &mut dyn TerrainAccess, x: i32, z: i32) -> Result<()> {
        let kernel = self.checked_paint_kernel()?;
        let area = self.options.area_of_effect;
        let resolution = terrain.layer_resolution();
        let Some((rect, x0, z0)) = Self::stamp_rect(x, z, area, resolution) else {
            return Ok(());
        };

        let gain = self.options.strength * self.options.paint_gain;
        let layer = self.options.layer;

        let mut region =
            terrain.layer_weights(rect.min_x, rect.min_z, rect.width(), rect.height());
        for dz in 0..rect.height() {
            for dx in 0..rect.width() {
                let kx = (rect.min_x + dx) as i32 - x0;
                let kz = (rect.min_z + dz) as i32 - z0;
                let add = kernel.weight(kx as usize, kz as usize) * gain;

                let cell = region.cell_mut(dx, dz);
                cell[layer] += add;
                let sum: f32 = cell.iter().sum();
                if sum > 0.0 {
                    for weight in cell.iter_mut() {
                        *weight /= sum;
                    }
                }
            }
        }
        terrain.set_layer_weights(rect.min_x, rect.min_z, &region);
        Ok(())
    }

    // ── Malen entlang der Spline ────────────────────────────────────

    /// Fährt die Spline ab und wendet die aktiven Effekte an: Paint-
    /// Stempel an `steps_per_segment · segmente + 1` Abtastpunkten,
    /// anschließend Höhenanpassung über die Kurven-Bounding-Box und
    /// optional ein einmaliger Glättungs-Pass.
    ///
    /// Benötigt eine aktive Editier-Session; für das Malen der
    /// Splat-Map außerdem ein Brush-Bild.
    pub fn paint_along_spline(&mut self, terrain: &mut dyn TerrainAccess) -> Result<()> {
        if self.session.is_none() {
            bail!("Keine aktive Editier-Session: start_painting zuerst aufrufen");
        }
        if self.options.paint_terrain {
            self.ensure_kernels()?;
        }

        let steps = (self.options.steps_per_segment * self.spline.segment_count()).max(1);

        if self.options.paint_terrain {
            let mapper = TerrainMapper::new(self.origin, terrain.size(), terrain.layer_resolution());
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                let world = self.spline.point(t);
                let (x, z) = mapper.to_grid(world);
                log::trace!("Paint-Stempel bei t={:.3} → Zelle ({}, {})", t, x, z);
                self.paint_stamp(terrain, x, z)?;
            }
        }

        if self.options.paint_height {
            if let Some(session) = &self.session {
                self.snap_heights_along_curve(session, terrain, steps)?;
            }
        }

        terrain.flush();
        Ok(())
    }

    /// Passt das Höhenfeld innerhalb der Kurven-Bounding-Box an die
    /// projizierte Kurvenhöhe an (Pfad-Kern exakt, Böschungs-Band mit
    /// Falloff und Monotonie-Schutz).
    fn snap_heights_along_curve(
        &self,
        session: &EditSession,
        terrain: &mut dyn TerrainAccess,
        lut_steps: usize,
    ) -> Result<()> {
        let resolution = terrain.height_resolution();
        let mapper = TerrainMapper::new(self.origin, terrain.size(), resolution);
        let projected = self.spline.transformed(|p| mapper.project(p));

        let (min, max) = curve_bounds(&projected);
        let pad = self.options.height_adjustment_area as f32 / 2.0;
        let Some(rect) = GridRect::from_bounds(min, max, pad, resolution) else {
            log::debug!("Kurve liegt vollständig außerhalb des Terrains");
            return Ok(());
        };
        log::debug!(
            "Höhenanpassung über x={}..={}, z={}..={}",
            rect.min_x,
            rect.max_x,
            rect.min_z,
            rect.max_z
        );

        // LUT einmal pro Pass bauen, nicht pro Zelle
        let lut = projected.build_lut(lut_steps);

        let path_half = self.options.height_path_area as f32 / 2.0;
        let band_half = self
            .options
            .height_adjustment_area
            .saturating_sub(self.options.height_path_area) as f32
            / 2.0;
        let band = (2.0 * band_half * band_half).sqrt();

        let mut region = terrain.heights(rect.min_x, rect.min_z, rect.width(), rect.height());
        for gz in rect.min_z..=rect.max_z {
            for gx in rect.min_x..=rect.max_x {
                let cell = Vec3::new(gx as f32, 0.0, gz as f32);
                let (closest, t) = projected.project_with_lut(cell, &lut);
                let dist = cell.distance(closest) - path_half;
                if dist > band {
                    continue;
                }

                let curve_height = mapper.normalized_height(self.spline.point(t).y);
                let dx = gx - rect.min_x;
                let dz = gz - rect.min_z;
                if dist <= 0.0 {
                    // flacher Pfad-Kern: exakt auf Kurvenhöhe
                    region.set(dx, dz, curve_height);
                    continue;
                }

                // Böschungs-Band: Blend-Ziel aus der Session-Start-Höhe,
                // damit wiederholte Pässe ohne Kurvenänderung nichts
                // weiter verschieben
                let start_height = session.start_height(gx, gz);
                let raising = curve_height >= start_height;
                let ratio = dist / band;
                let falloff = match &self.slope_falloff {
                    Some(curve) => curve(ratio),
                    None => 1.0 - ratio,
                };
                let blend = self.options.slope * falloff;
                let candidate = start_height + (curve_height - start_height) * blend;

                // Monotonie-Schutz: ein späterer Zellbesuch darf die
                // Richtung eines früheren nicht rückgängig machen
                let current = region.get(dx, dz);
                let new_height = if raising {
                    candidate.max(current)
                } else {
                    candidate.min(current)
                };
                region.set(dx, dz, new_height);
            }
        }

        // Einmaliger Glättungs-Pass über die berührte Region
        if self.options.smoothing > 0.0 {
            let source = region.clone();
            for dz in 0..rect.height() {
                for dx in 0..rect.width() {
                    let h = source.get(dx, dz);
                    let avg = source.neighbor_average(dx, dz);
                    region.set(dx, dz, h + (avg - h) * self.options.smoothing);
                }
            }
        }

        terrain.set_heights(rect.min_x, rect.min_z, &region);
        Ok(())
    }
}
