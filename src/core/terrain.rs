//! Terrain-Schnittstelle und In-Memory-Terrain.
//!
//! Höhenfeld und Gewichtskarte gehören dem Terrain-Kollaborateur; der
//! Kern liest und schreibt ausschließlich über [`TerrainAccess`].
//! Regionen werden als Ausschnitts-Grids übergeben, die Auflösung von
//! Höhenfeld und Gewichtskarte darf sich unterscheiden.

use glam::Vec3;

use super::grid::{Grid2, Grid3};

/// Zugriff auf Höhenfeld und Layer-Gewichtskarte eines Terrains.
///
/// Regions-Koordinaten sind vom Aufrufer bereits geclippt; Zugriffe
/// außerhalb der Auflösung sind Programmierfehler (Panik beim
/// Indexieren), keine stillen No-Ops.
pub trait TerrainAccess {
    /// Zellen pro Achse des Höhenfelds.
    fn height_resolution(&self) -> usize;
    /// Zellen pro Achse der Gewichtskarte.
    fn layer_resolution(&self) -> usize;
    /// Anzahl der Textur-Layer.
    fn layer_count(&self) -> usize;
    /// Physische Terrain-Größe in Metern pro Achse.
    fn size(&self) -> Vec3;

    /// Höhen-Ausschnitt `w × h` ab Zelle (x, z), normalisierte Werte.
    fn heights(&self, x: usize, z: usize, w: usize, h: usize) -> Grid2;
    /// Schreibt einen Höhen-Ausschnitt ab Zelle (x, z) zurück.
    fn set_heights(&mut self, x: usize, z: usize, grid: &Grid2);

    /// Gewichts-Ausschnitt `w × h` ab Zelle (x, z), alle Layer.
    fn layer_weights(&self, x: usize, z: usize, w: usize, h: usize) -> Grid3;
    /// Schreibt einen Gewichts-Ausschnitt ab Zelle (x, z) zurück.
    fn set_layer_weights(&mut self, x: usize, z: usize, grid: &Grid3);

    /// Übernimmt ausstehende Änderungen in die Host-Darstellung.
    fn flush(&mut self);
}

/// Vollständige In-Memory-Implementierung von [`TerrainAccess`].
///
/// Für Tests und eigenständige Werkzeuge; Höhen und Gewichte liegen in
/// flachen f32-Grids. Die Gewichte starten vollständig auf Layer 0
/// (Simplex-Invariante gilt ab Konstruktion).
#[derive(Debug, Clone)]
pub struct MemoryTerrain {
    resolution: usize,
    layer_resolution: usize,
    size: Vec3,
    heights: Grid2,
    weights: Grid3,
    flush_count: usize,
}

impl MemoryTerrain {
    /// Ebenes Terrain mit konstanter normalisierter Höhe.
    pub fn flat(resolution: usize, layers: usize, size: Vec3, height: f32) -> Self {
        let mut weights = Grid3::new(resolution, resolution, layers.max(1));
        for z in 0..resolution {
            for x in 0..resolution {
                weights.set_weight(x, z, 0, 1.0);
            }
        }
        Self {
            resolution,
            layer_resolution: resolution,
            size,
            heights: Grid2::filled(resolution, resolution, height),
            weights,
            flush_count: 0,
        }
    }

    /// Anzahl der bisherigen Flushes (für Tests).
    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    /// Direkter Höhenzugriff (für Tests).
    pub fn height_at(&self, x: usize, z: usize) -> f32 {
        self.heights.get(x, z)
    }

    /// Direkter Gewichtszugriff (für Tests).
    pub fn weight_at(&self, x: usize, z: usize, layer: usize) -> f32 {
        self.weights.weight(x, z, layer)
    }
}

impl TerrainAccess for MemoryTerrain {
    fn height_resolution(&self) -> usize {
        self.resolution
    }

    fn layer_resolution(&self) -> usize {
        self.layer_resolution
    }

    fn layer_count(&self) -> usize {
        self.weights.layers()
    }

    fn size(&self) -> Vec3 {
        self.size
    }

    fn heights(&self, x: usize, z: usize, w: usize, h: usize) -> Grid2 {
        let mut region = Grid2::filled(w, h, 0.0);
        for dz in 0..h {
            for dx in 0..w {
                region.set(dx, dz, self.heights.get(x + dx, z + dz));
            }
        }
        region
    }

    fn set_heights(&mut self, x: usize, z: usize, grid: &Grid2) {
        for dz in 0..grid.height() {
            for dx in 0..grid.width() {
                self.heights.set(x + dx, z + dz, grid.get(dx, dz));
            }
        }
    }

    fn layer_weights(&self, x: usize, z: usize, w: usize, h: usize) -> Grid3 {
        let mut region = Grid3::new(w, h, self.weights.layers());
        for dz in 0..h {
            for dx in 0..w {
                for layer in 0..self.weights.layers() {
                    region.set_weight(dx, dz, layer, self.weights.weight(x + dx, z + dz, layer));
                }
            }
        }
        region
    }

    fn set_layer_weights(&mut self, x: usize, z: usize, grid: &Grid3) {
        for dz in 0..grid.height() {
            for dx in 0..grid.width() {
                for layer in 0..grid.layers() {
                    self.weights
                        .set_weight(x + dx, z + dz, layer, grid.weight(dx, dz, layer));
                }
            }
        }
    }

    fn flush(&mut self) {
        self.flush_count += 1;
        log::debug!("Terrain geflusht ({}. Mal)", self.flush_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_terrain_startet_auf_layer_0() {
        let terrain = MemoryTerrain::flat(8, 3, Vec3::new(100.0, 20.0, 100.0), 0.25);
        assert_eq!(terrain.height_at(3, 5), 0.25);
        assert_eq!(terrain.weight_at(3, 5, 0), 1.0);
        assert_eq!(terrain.weight_at(3, 5, 1), 0.0);
        assert_eq!(terrain.layer_count(), 3);
    }

    #[test]
    fn test_region_roundtrip() {
        let mut terrain = MemoryTerrain::flat(8, 2, Vec3::ONE, 0.0);
        let mut region = terrain.heights(2, 2, 3, 3);
        region.set(1, 1, 0.8);
        terrain.set_heights(2, 2, &region);

        assert_eq!(terrain.height_at(3, 3), 0.8);
        assert_eq!(terrain.height_at(2, 2), 0.0);

        let read_back = terrain.heights(2, 2, 3, 3);
        assert_eq!(read_back.get(1, 1), 0.8);
    }

    #[test]
    fn test_gewichts_region_roundtrip() {
        let mut terrain = MemoryTerrain::flat(4, 2, Vec3::ONE, 0.0);
        let mut region = terrain.layer_weights(0, 0, 2, 2);
        region.set_weight(0, 0, 1, 0.5);
        terrain.set_layer_weights(0, 0, &region);
        assert_eq!(terrain.weight_at(0, 0, 1), 0.5);
    }
}
