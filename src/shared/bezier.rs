//! Reine Geometrie-Funktionen für Bézier-Kurven (quadratisch und kubisch).
//!
//! Layer-neutral: kann von `core`-Modulen und Tests importiert werden,
//! ohne Zirkel-Abhängigkeiten zu erzeugen. Alle Funktionen sind pur und
//! arbeiten in Bernstein-Form (De-Casteljau-äquivalent).

use glam::Vec3;

/// Punkt auf einer quadratischen Bézier-Kurve (t ∈ [0, 1]).
///
/// Außerhalb des Parameterbereichs wird auf die Endpunkte geklemmt,
/// es findet keine Extrapolation statt.
pub fn quadratic_point(p0: Vec3, p1: Vec3, p2: Vec3, t: f32) -> Vec3 {
    if t <= 0.0 {
        return p0;
    }
    if t >= 1.0 {
        return p2;
    }
    let s = 1.0 - t;
    s * s * p0 + 2.0 * s * t * p1 + t * t * p2
}

/// Erste Ableitung (Tangente) einer quadratischen Bézier-Kurve.
pub fn quadratic_tangent(p0: Vec3, p1: Vec3, p2: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    2.0 * (1.0 - t) * (p1 - p0) + 2.0 * t * (p2 - p1)
}

/// Punkt auf einer kubischen Bézier-Kurve (t ∈ [0, 1]).
///
/// Außerhalb des Parameterbereichs wird auf die Endpunkte geklemmt,
/// es findet keine Extrapolation statt.
pub fn cubic_point(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    if t <= 0.0 {
        return p0;
    }
    if t >= 1.0 {
        return p3;
    }
    let s = 1.0 - t;
    s * s * s * p0 + 3.0 * s * s * t * p1 + 3.0 * s * t * t * p2 + t * t * t * p3
}

/// Erste Ableitung (Tangente) einer kubischen Bézier-Kurve.
pub fn cubic_tangent(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let s = 1.0 - t;
    3.0 * s * s * (p1 - p0) + 6.0 * s * t * (p2 - p1) + 3.0 * t * t * (p3 - p2)
}
