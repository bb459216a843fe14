//! Koordinaten-Mapper zwischen Welt-/Spline-Raum und Grid-Koordinaten.
//!
//! Pur und zustandslos gegenüber dem Terrain: muss neu aufgebaut werden,
//! sobald ein anderes Terrain (andere Größe/Auflösung) aktiv wird.

use glam::Vec3;

/// Übersetzt Weltpunkte in Zellen eines Höhenfelds bzw. einer
/// Gewichtskarte mit gegebener Auflösung.
#[derive(Debug, Clone, Copy)]
pub struct TerrainMapper {
    /// Welt-Ursprung des Terrains (Ecke bei Grid-Zelle 0, 0).
    origin: Vec3,
    /// Physische Terrain-Größe in Metern pro Achse.
    size: Vec3,
    /// Grid-Auflösung (Zellen pro Achse).
    resolution: usize,
}

impl TerrainMapper {
    pub fn new(origin: Vec3, size: Vec3, resolution: usize) -> Self {
        Self {
            origin,
            size,
            resolution,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Weltpunkt → Grid-Zelle (x, z), abgeschnitten auf ganze Zellen.
    /// Punkte außerhalb des Terrains liefern negative bzw. zu große
    /// Indizes; das Clipping übernimmt die aufrufende Schicht.
    pub fn to_grid(&self, world: Vec3) -> (i32, i32) {
        let local = world - self.origin;
        let x = local.x / self.size.x * self.resolution as f32;
        let z = local.z / self.size.z * self.resolution as f32;
        (x as i32, z as i32)
    }

    /// Weltpunkt → Grid-Raum als Vektor (x, 0, z), ohne Rundung der
    /// Höhe. Für projizierte Spline-Kontrollpunkte.
    pub fn project(&self, world: Vec3) -> Vec3 {
        let (x, z) = self.to_grid(world);
        Vec3::new(x as f32, 0.0, z as f32)
    }

    /// Welt-Y → normalisierte Terrainhöhe [0, 1] relativ zum Ursprung.
    pub fn normalized_height(&self, world_y: f32) -> f32 {
        (world_y - self.origin.y) / self.size.y
    }
}
