//! Bounding-Box-Schätzer für kubische Segmente im Grid-Raum.
//!
//! Die achsenparallelen Extrema einer Kubik liegen an den Endpunkten
//! oder an Nullstellen der ersten Ableitung (pro Achse quadratisch in
//! t). Die eng anliegende Box begrenzt die Grid-Iteration, statt das
//! gesamte Höhenfeld abzulaufen.

use glam::Vec2;

use super::spline::BezierSpline;

/// Inklusiver, auf das Grid geclippter Zellbereich.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRect {
    pub min_x: usize,
    pub min_z: usize,
    pub max_x: usize,
    pub max_z: usize,
}

impl GridRect {
    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> usize {
        self.max_z - self.min_z + 1
    }

    /// Clippt einen Brush-Stempel (Ecke `x0`/`z0`, Kantenlängen `w`/`h`)
    /// auf `[0, resolution)`. Bereiche vollständig außerhalb ergeben
    /// `None`; überstehende Ränder werden abgeschnitten, nie umgebrochen.
    pub fn clip(x0: i32, z0: i32, w: usize, h: usize, resolution: usize) -> Option<Self> {
        if resolution == 0 || w == 0 || h == 0 {
            return None;
        }
        let min_x = x0.max(0);
        let min_z = z0.max(0);
        let max_x = (x0 + w as i32 - 1).min(resolution as i32 - 1);
        let max_z = (z0 + h as i32 - 1).min(resolution as i32 - 1);
        if min_x > max_x || min_z > max_z {
            return None;
        }
        Some(Self {
            min_x: min_x as usize,
            min_z: min_z as usize,
            max_x: max_x as usize,
            max_z: max_z as usize,
        })
    }

    /// Baut aus Fließkomma-Schranken einen gepolsterten, geclippten
    /// Zellbereich.
    pub fn from_bounds(min: Vec2, max: Vec2, pad: f32, resolution: usize) -> Option<Self> {
        if resolution == 0 {
            return None;
        }
        let min_x = ((min.x - pad).floor() as i32).max(0);
        let min_z = ((min.y - pad).floor() as i32).max(0);
        let max_x = ((max.x + pad).ceil() as i32).min(resolution as i32 - 1);
        let max_z = ((max.y + pad).ceil() as i32).min(resolution as i32 - 1);
        if min_x > max_x || min_z > max_z {
            return None;
        }
        Some(Self {
            min_x: min_x as usize,
            min_z: min_z as usize,
            max_x: max_x as usize,
            max_z: max_z as usize,
        })
    }
}

/// Enge (x, z)-Schranken einer bereits in Grid-Raum projizierten Spline.
///
/// Pro Segment werden beide Endpunkte sowie alle Ableitungs-Nullstellen
/// mit 0 < t < 1 in ein laufendes Min/Max gefaltet.
pub fn curve_bounds(projected: &BezierSpline) -> (Vec2, Vec2) {
    let first = projected.control_point(0);
    let mut min = Vec2::new(first.x, first.z);
    let mut max = min;

    for segment in 0..projected.segment_count() {
        let i = segment * 3;
        let p0 = xz(projected.control_point(i));
        let p1 = xz(projected.control_point(i + 1));
        let p2 = xz(projected.control_point(i + 2));
        let p3 = xz(projected.control_point(i + 3));

        min = min.min(p0).min(p3);
        max = max.max(p0).max(p3);

        // Bernstein-Ableitungskoeffizienten: Nullstellen von
        // a·t² + 2b·t + c pro Achse
        let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
        let b = p0 - 2.0 * p1 + p2;
        let c = -p0 + p1;

        for axis in 0..2 {
            for root in derivative_roots(a[axis], b[axis], c[axis]) {
                let Some(t) = root else { continue };
                if t > 0.0 && t < 1.0 {
                    let s = 1.0 - t;
                    let q = s * s * s * p0
                        + 3.0 * s * s * t * p1
                        + 3.0 * s * t * t * p2
                        + t * t * t * p3;
                    min = min.min(q);
                    max = max.max(q);
                }
            }
        }
    }

    (min, max)
}

fn xz(p: glam::Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Nullstellen von `a·t² + 2b·t + c`. Ein nahezu verschwindender
/// Führungskoeffizient fällt auf die lineare Nullstelle zurück, statt
/// durch ~0 zu teilen.
fn derivative_roots(a: f32, b: f32, c: f32) -> [Option<f32>; 2] {
    const EPS: f32 = 1e-6;
    if a.abs() < EPS {
        if b.abs() < EPS {
            return [None, None];
        }
        return [Some(-c / (2.0 * b)), None];
    }
    let h = b * b - a * c;
    if h <= 0.0 {
        return [None, None];
    }
    let h = h.sqrt();
    [Some((-b - h) / a), Some((-b + h) / a)]
}
