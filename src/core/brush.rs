//! Brush-Rasterizer: wandelt ein Graustufenbild in einen quadratischen
//! Gewichts-Kernel der gewünschten Auflösung.
//!
//! Der Kernel wird bei jeder Änderung von Quellbild oder Größe neu
//! erzeugt; ein Kernel, dessen Größe nicht zum aktiven Wirkbereich
//! passt, darf nie ausgelesen werden.

use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::DynamicImage;

/// Quadratischer Gewichts-Kernel mit normalisierten Werten in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct BrushKernel {
    size: usize,
    weights: Vec<f32>,
}

impl BrushKernel {
    /// Rastert ein Quellbild auf `size × size` und mappt jede
    /// Pixel-Helligkeit auf ein Gewicht in [0, 1]. Bilineares Resampling
    /// reicht für Brush-Masken aus.
    pub fn from_image(image: &DynamicImage, size: usize) -> Self {
        let size = size.max(1);
        let scaled = image::imageops::resize(
            &image.to_luma8(),
            size as u32,
            size as u32,
            FilterType::Triangle,
        );
        let weights = scaled.pixels().map(|p| p[0] as f32 / 255.0).collect();
        log::debug!("Brush-Kernel erzeugt: {}x{}", size, size);
        Self { size, weights }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Gewicht an der Kernel-Zelle (x, z).
    pub fn weight(&self, x: usize, z: usize) -> f32 {
        self.weights[z * self.size + x]
    }
}

/// Lädt ein Brush-Bild von der Platte.
pub fn load_brush_image(path: &Path) -> Result<DynamicImage> {
    let image = image::open(path)
        .with_context(|| format!("Fehler beim Laden des Brush-Bilds: {}", path.display()))?;
    log::info!(
        "Brush-Bild geladen: {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn uniform_image(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(ImageBuffer::from_pixel(width, height, Luma([value])))
    }

    #[test]
    fn test_kernel_normalisiert_helligkeit() {
        let kernel = BrushKernel::from_image(&uniform_image(8, 8, 255), 4);
        assert_eq!(kernel.size(), 4);
        for x in 0..4 {
            for z in 0..4 {
                assert!((kernel.weight(x, z) - 1.0).abs() < 1e-6);
            }
        }

        let half = BrushKernel::from_image(&uniform_image(8, 8, 128), 4);
        assert!((half.weight(0, 0) - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_kernel_resampling_aendern_der_groesse() {
        let image = uniform_image(16, 16, 200);
        let small = BrushKernel::from_image(&image, 4);
        let large = BrushKernel::from_image(&image, 32);
        assert_eq!(small.size(), 4);
        assert_eq!(large.size(), 32);
        // Gleichmäßiges Bild: Resampling ändert die Gewichte nicht
        assert!((small.weight(2, 2) - large.weight(16, 16)).abs() < 1e-2);
    }

    #[test]
    fn test_kernel_minimale_groesse() {
        let kernel = BrushKernel::from_image(&uniform_image(4, 4, 10), 0);
        assert_eq!(kernel.size(), 1);
    }

    #[test]
    fn test_load_fehlendes_bild() {
        let err = load_brush_image(std::path::Path::new("/nonexistent/brush.png")).unwrap_err();
        assert!(err.to_string().contains("Brush-Bild"));
    }
}
