//! Grid-Container für Höhenfeld-Regionen und Layer-Gewichtskarten.
//!
//! Flacher `Vec<f32>`-Speicher, zeilenweise indiziert mit
//! `z * width + x`. Nachbar-Zugriffe am Rand laufen über
//! bounds-geprüfte `Option`-Accessor, nicht über Ausnahmen.

/// 2D-Grid von f32-Werten (Ausschnitt eines Höhenfelds).
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2 {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Grid2 {
    /// Grid gefüllt mit einem konstanten Wert.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, z: usize) -> f32 {
        self.data[z * self.width + x]
    }

    pub fn set(&mut self, x: usize, z: usize, value: f32) {
        self.data[z * self.width + x] = value;
    }

    /// Bounds-geprüfter Zugriff, auch für negative Indizes.
    pub fn checked(&self, x: i32, z: i32) -> Option<f32> {
        if x < 0 || z < 0 || x as usize >= self.width || z as usize >= self.height {
            return None;
        }
        Some(self.get(x as usize, z as usize))
    }

    /// Mittelwert der bis zu vier direkten Nachbarn. Am Rand zählen nur
    /// die vorhandenen Nachbarn; ohne Nachbarn (1×1-Grid) bleibt der
    /// Zellwert selbst stehen.
    pub fn neighbor_average(&self, x: usize, z: usize) -> f32 {
        let x = x as i32;
        let z = z as i32;
        let mut sum = 0.0;
        let mut count = 0u32;
        for (nx, nz) in [(x + 1, z), (x - 1, z), (x, z + 1), (x, z - 1)] {
            if let Some(value) = self.checked(nx, nz) {
                sum += value;
                count += 1;
            }
        }
        if count == 0 {
            return self.get(x as usize, z as usize);
        }
        sum / count as f32
    }
}

/// 3D-Grid von Layer-Gewichten: pro Zelle ein zusammenhängender Block
/// von `layers` Gewichten.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid3 {
    width: usize,
    height: usize,
    layers: usize,
    data: Vec<f32>,
}

impl Grid3 {
    pub fn new(width: usize, height: usize, layers: usize) -> Self {
        Self {
            width,
            height,
            layers,
            data: vec![0.0; width * height * layers],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    fn base(&self, x: usize, z: usize) -> usize {
        (z * self.width + x) * self.layers
    }

    /// Gewichte einer Zelle als zusammenhängender Slice.
    pub fn cell(&self, x: usize, z: usize) -> &[f32] {
        let base = self.base(x, z);
        &self.data[base..base + self.layers]
    }

    pub fn cell_mut(&mut self, x: usize, z: usize) -> &mut [f32] {
        let base = self.base(x, z);
        &mut self.data[base..base + self.layers]
    }

    pub fn weight(&self, x: usize, z: usize, layer: usize) -> f32 {
        self.data[self.base(x, z) + layer]
    }

    pub fn set_weight(&mut self, x: usize, z: usize, layer: usize, value: f32) {
        let i = self.base(x, z) + layer;
        self.data[i] = value;
    }
}
