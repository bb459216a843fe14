//! Stückweise kubische Bézier-Spline mit Kontinuitäts-Modi pro Joint.
//!
//! Die Spline besitzt ihre Kontrollpunkt- und Modus-Arrays exklusiv und
//! hält nach jeder Mutation die Invarianten
//! `points.len() == 3 * segmente + 1` und `modes.len() == segmente + 1`.
//! Jeder dritte Punkt (Index % 3 == 0) ist ein Joint, die beiden
//! flankierenden Punkte sind Tangenten-Handles.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::shared::bezier;

/// Kontinuitäts-Modus eines Joints: wie verhalten sich seine zwei Handles?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlPointMode {
    /// Handles sind unabhängig.
    #[default]
    Free,
    /// Handles sind kollinear, Längen bleiben unabhängig.
    Aligned,
    /// Handles sind kollinear und gleich lang.
    Mirrored,
}

/// Stückweise kubische Bézier-Spline in Spline-lokalen Koordinaten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BezierSpline {
    points: Vec<Vec3>,
    modes: Vec<ControlPointMode>,
    looped: bool,
}

impl Default for BezierSpline {
    fn default() -> Self {
        Self::new()
    }
}

impl BezierSpline {
    /// Erstellt eine Spline mit genau einem Segment (Joints bei x=1 und x=4).
    pub fn new() -> Self {
        Self {
            points: vec![
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(3.0, 0.0, 0.0),
                Vec3::new(4.0, 0.0, 0.0),
            ],
            modes: vec![ControlPointMode::Free, ControlPointMode::Free],
            looped: false,
        }
    }

    /// Baut eine Spline aus rohen Arrays. Gibt `None` zurück, wenn die
    /// Längen-Invarianten verletzt sind.
    pub fn from_parts(points: Vec<Vec3>, modes: Vec<ControlPointMode>, looped: bool) -> Option<Self> {
        let spline = Self {
            points,
            modes,
            looped,
        };
        spline.is_well_formed().then_some(spline)
    }

    /// Prüft die Längen-Invarianten der Arrays.
    pub fn is_well_formed(&self) -> bool {
        self.points.len() >= 4
            && (self.points.len() - 1) % 3 == 0
            && self.modes.len() == (self.points.len() - 1) / 3 + 1
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn mode_count(&self) -> usize {
        self.modes.len()
    }

    pub fn segment_count(&self) -> usize {
        (self.points.len() - 1) / 3
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    /// Schließt die Spline zu einer Schleife bzw. öffnet sie wieder.
    /// Beim Schließen übernimmt das letzte Joint Position und Modus des ersten.
    pub fn set_looped(&mut self, looped: bool) {
        self.looped = looped;
        if looped {
            let first_mode = self.modes[0];
            *self.modes.last_mut().unwrap() = first_mode;
            self.set_control_point(0, self.points[0]);
        }
    }

    // ── Auswertung ──────────────────────────────────────────────────

    /// Mappt den globalen Parameter t ∈ [0, 1] auf (Basis-Index, lokales t).
    /// t == 1 landet exakt auf dem letzten Segment bei t=1 (kein
    /// Fließkomma-Überlauf in ein nicht existierendes Segment).
    fn locate(&self, t: f32) -> (usize, f32) {
        if t >= 1.0 {
            (self.points.len() - 4, 1.0)
        } else {
            let scaled = t.clamp(0.0, 1.0) * self.segment_count() as f32;
            let i = scaled as usize;
            (i * 3, scaled - i as f32)
        }
    }

    /// Punkt auf der Spline beim globalen Parameter t ∈ [0, 1].
    pub fn point(&self, t: f32) -> Vec3 {
        let (i, t) = self.locate(t);
        bezier::cubic_point(
            self.points[i],
            self.points[i + 1],
            self.points[i + 2],
            self.points[i + 3],
            t,
        )
    }

    /// Tangente (erste Ableitung) beim globalen Parameter t ∈ [0, 1].
    pub fn tangent(&self, t: f32) -> Vec3 {
        let (i, t) = self.locate(t);
        bezier::cubic_tangent(
            self.points[i],
            self.points[i + 1],
            self.points[i + 2],
            self.points[i + 3],
            t,
        )
    }

    /// Normierte Bewegungsrichtung beim globalen Parameter t.
    pub fn direction(&self, t: f32) -> Vec3 {
        self.tangent(t).normalize_or_zero()
    }

    // ── Kontrollpunkte und Modi ─────────────────────────────────────

    pub fn control_point(&self, index: usize) -> Vec3 {
        self.points[index]
    }

    /// Setzt einen Kontrollpunkt. Joints (Index % 3 == 0) ziehen ihre
    /// beiden Handles um dasselbe Delta mit, damit die Tangentenform
    /// erhalten bleibt; bei Schleifen wird das geteilte erste/letzte
    /// Joint symmetrisch aktualisiert.
    pub fn set_control_point(&mut self, index: usize, point: Vec3) {
        if index % 3 == 0 {
            let delta = point - self.points[index];
            let last = self.points.len() - 1;
            if self.looped {
                if index == 0 {
                    self.points[1] += delta;
                    self.points[last - 1] += delta;
                    self.points[last] = point;
                } else if index == last {
                    self.points[0] = point;
                    self.points[1] += delta;
                    self.points[index - 1] += delta;
                } else {
                    self.points[index - 1] += delta;
                    self.points[index + 1] += delta;
                }
            } else {
                if index > 0 {
                    self.points[index - 1] += delta;
                }
                if index + 1 < self.points.len() {
                    self.points[index + 1] += delta;
                }
            }
        }
        self.points[index] = point;
        self.enforce_mode(index);
    }

    /// Modus des Joints, zu dem der Kontrollpunkt `index` gehört.
    pub fn mode(&self, index: usize) -> ControlPointMode {
        self.modes[(index + 1) / 3]
    }

    /// Setzt den Modus des zugehörigen Joints und erzwingt ihn sofort.
    /// Bei Schleifen teilen erstes und letztes Joint denselben Modus.
    pub fn set_mode(&mut self, index: usize, mode: ControlPointMode) {
        let mode_index = (index + 1) / 3;
        self.modes[mode_index] = mode;
        if self.looped {
            if mode_index == 0 {
                *self.modes.last_mut().unwrap() = mode;
            } else if mode_index == self.modes.len() - 1 {
                self.modes[0] = mode;
            }
        }
        self.enforce_mode(index);
    }

    /// Stellt die Kontinuitäts-Bedingung am Joint des zuletzt editierten
    /// Punkts wieder her: der *andere* Handle wird aus dem *editierten*
    /// Handle berechnet. Muss nach jeder Punkt-Mutation laufen, auch
    /// nach programmatischen.
    fn enforce_mode(&mut self, index: usize) {
        let mode_index = (index + 1) / 3;
        let mode = self.modes[mode_index];
        // Free sowie Endpunkte offener Splines bleiben unangetastet
        if mode == ControlPointMode::Free
            || (!self.looped && (mode_index == 0 || mode_index == self.modes.len() - 1))
        {
            return;
        }

        let middle_index = mode_index * 3;
        let len = self.points.len();
        let (fixed_index, enforced_index) = if index <= middle_index {
            // editiert wurde der kleinere Handle, erzwungen wird der größere
            let fixed = if middle_index == 0 { len - 2 } else { middle_index - 1 };
            let enforced = if middle_index + 1 >= len { 1 } else { middle_index + 1 };
            (fixed, enforced)
        } else {
            let fixed = if middle_index + 1 >= len { 1 } else { middle_index + 1 };
            let enforced = if middle_index == 0 { len - 2 } else { middle_index - 1 };
            (fixed, enforced)
        };

        let middle = self.points[middle_index];
        let mut enforced_tangent = middle - self.points[fixed_index];
        if mode == ControlPointMode::Aligned {
            // Richtung spiegeln, ursprüngliche Länge des anderen Handles behalten
            enforced_tangent = enforced_tangent.normalize_or_zero()
                * middle.distance(self.points[enforced_index]);
        }
        self.points[enforced_index] = middle + enforced_tangent;
    }

    // ── Segment-Operationen ─────────────────────────────────────────

    /// Hängt ein Segment an: drei neue Punkte, jeweils +1/+2/+3 auf der
    /// x-Achse hinter dem bisher letzten Punkt, plus ein Modus.
    pub fn add_segment(&mut self) {
        let mut point = *self.points.last().unwrap();
        for _ in 0..3 {
            point.x += 1.0;
            self.points.push(point);
        }

        let last_mode = *self.modes.last().unwrap();
        self.modes.push(last_mode);
        self.enforce_mode(self.points.len() - 4);

        if self.looped {
            let first = self.points[0];
            *self.points.last_mut().unwrap() = first;
            let first_mode = self.modes[0];
            *self.modes.last_mut().unwrap() = first_mode;
            self.enforce_mode(0);
        }
        log::trace!(
            "Segment angehängt: {} Punkte, {} Segmente",
            self.points.len(),
            self.segment_count()
        );
    }

    /// Entfernt das letzte Segment. Das letzte verbleibende Segment ist
    /// nicht entfernbar; in dem Fall passiert nichts und es kommt
    /// `false` zurück.
    pub fn remove_segment(&mut self) -> bool {
        if self.segment_count() <= 1 {
            return false;
        }
        self.points.truncate(self.points.len() - 3);
        self.modes.truncate(self.modes.len() - 1);
        if self.looped {
            let first = self.points[0];
            *self.points.last_mut().unwrap() = first;
            let first_mode = self.modes[0];
            *self.modes.last_mut().unwrap() = first_mode;
            self.enforce_mode(0);
        }
        true
    }

    /// Punkt auf einem einzelnen Segment bei lokalem t ∈ [0, 1].
    fn segment_point(&self, segment: usize, t: f32) -> Vec3 {
        let i = segment * 3;
        bezier::cubic_point(
            self.points[i],
            self.points[i + 1],
            self.points[i + 2],
            self.points[i + 3],
            t,
        )
    }

    /// Unterteilt ein Segment in `n` kubische Teilstücke, die dieselbe
    /// Kurvenform reproduzieren. Die neuen Joints erben den Modus des
    /// Segment-Start-Joints.
    ///
    /// Gibt `false` zurück und mutiert nichts, wenn die Parameter
    /// ungültig sind oder der Bézier-Fit degeneriert (singuläres 2×2-
    /// System). Da intern mit festen u=1/3, v=2/3 gefittet wird, ist
    /// ein Fehlschlag ein Programmierfehler des Aufrufers, kein
    /// Benutzerfehler.
    pub fn split_segment(&mut self, segment: usize, n: usize) -> bool {
        if n < 2 || segment >= self.segment_count() {
            return false;
        }

        // Erst alle Teilstücke fitten, dann mutieren: bei einem
        // degenerierten Fit bleibt die Spline unverändert.
        let mut chain: Vec<Vec3> = Vec::with_capacity(3 * n + 1);
        let mut p0 = self.points[segment * 3];
        chain.push(p0);
        let divisions = (3 * n) as f32;
        for i in 0..n {
            let base = (3 * i) as f32;
            let p1 = self.segment_point(segment, (base + 1.0) / divisions);
            let p2 = self.segment_point(segment, (base + 2.0) / divisions);
            let p3 = self.segment_point(segment, (base + 3.0) / divisions);
            let Some((c1, c2)) = fit_control_points(p0, p1, p2, p3, 1.0 / 3.0, 2.0 / 3.0) else {
                return false;
            };
            chain.push(c1);
            chain.push(c2);
            chain.push(p3);
            p0 = p3;
        }

        // Das alte Segment (Indizes 3s ..= 3s+3) durch die Kette ersetzen
        let start = segment * 3;
        self.points.splice(start..start + 4, chain);
        let segment_mode = self.modes[segment];
        for _ in 0..n - 1 {
            self.modes.insert(segment + 1, segment_mode);
        }
        debug_assert!(self.is_well_formed());
        log::trace!(
            "Segment {} in {} Teilstücke geteilt: {} Punkte",
            segment,
            n,
            self.points.len()
        );
        true
    }

    // ── Projektion ──────────────────────────────────────────────────

    /// Gleichverteilte Kurven-Abtastung für die Projektion: `steps + 1`
    /// Punkte bei t = i/steps. Bei vielen Abfragen gegen dieselbe Kurve
    /// einmal bauen und an [`Self::project_with_lut`] weiterreichen.
    pub fn build_lut(&self, steps: usize) -> Vec<Vec3> {
        let steps = steps.max(1);
        (0..=steps)
            .map(|i| self.point(i as f32 / steps as f32))
            .collect()
    }

    /// Nächster Kurvenpunkt zu `point` als (Punkt, globales t).
    /// Baut die LUT bei jedem Aufruf neu; für Massen-Abfragen die
    /// Variante mit geteilter LUT verwenden.
    pub fn project(&self, point: Vec3, steps: usize) -> (Vec3, f32) {
        let lut = self.build_lut(steps);
        self.project_with_lut(point, &lut)
    }

    /// Zweiphasige Suche mit vorab gebauter LUT: grober Scan über die
    /// Abtastpunkte, dann Feinsuche mit fester Schrittweite
    /// `0.1 / steps` im Parameterfenster um den besten LUT-Index.
    /// Heuristik, kein exakter Nächster-Punkt-Löser: zwischen zwei
    /// LUT-Samples wird die Kurve als nahezu linear angenommen, was bei
    /// sehr scharfen Biegungen und groben `steps` danebenliegen kann.
    pub fn project_with_lut(&self, point: Vec3, lut: &[Vec3]) -> (Vec3, f32) {
        let steps = lut.len().saturating_sub(1).max(1);

        // Phase 1: bester LUT-Index
        let mut closest_index = 0;
        let mut min_dist = f32::MAX;
        for (i, p) in lut.iter().enumerate() {
            let d = p.distance_squared(point);
            if d < min_dist {
                min_dist = d;
                closest_index = i;
            }
        }

        // Phase 2: Feinsuche im benachbarten Parameterfenster
        let l = steps as f32;
        let t1 = (closest_index as f32 - 1.0) / l;
        let t2 = (closest_index as f32 + 1.0) / l;
        let step = 0.1 / l;

        let mut best_t = closest_index as f32 / l;
        let mut best_point = lut[closest_index];
        let mut best_dist = best_point.distance(point);

        let mut t = t1;
        while t < t2 + step {
            let p = self.point(t);
            let d = p.distance(point);
            if d < best_dist {
                best_dist = d;
                best_point = p;
                best_t = t;
            }
            t += step;
        }

        (best_point, best_t.clamp(0.0, 1.0))
    }

    /// Kopie der Spline mit transformierten Kontrollpunkten (Modi und
    /// Loop-Flag bleiben erhalten). Für die Projektion in Grid-Raum.
    pub fn transformed(&self, f: impl Fn(Vec3) -> Vec3) -> Self {
        Self {
            points: self.points.iter().copied().map(f).collect(),
            modes: self.modes.clone(),
            looped: self.looped,
        }
    }
}

/// Löst das 2×2-System des geschlossenen Bézier-Fits: gesucht sind die
/// beiden Handles einer Kubik durch `p0` und `p3`, die bei den lokalen
/// Parametern `u` und `v` durch `p1` bzw. `p2` läuft.
///
/// Gibt `None` zurück bei `u`/`v` außerhalb von (0, 1), `u >= v` oder
/// singulärer Matrix.
pub fn fit_control_points(
    p0: Vec3,
    p1: Vec3,
    p2: Vec3,
    p3: Vec3,
    u: f32,
    v: f32,
) -> Option<(Vec3, Vec3)> {
    if u <= 0.0 || u >= 1.0 || v <= 0.0 || v >= 1.0 || u >= v {
        return None;
    }

    let a = 3.0 * (1.0 - u) * (1.0 - u) * u;
    let b = 3.0 * (1.0 - u) * u * u;
    let c = 3.0 * (1.0 - v) * (1.0 - v) * v;
    let d = 3.0 * (1.0 - v) * v * v;
    let det = a * d - b * c;
    if det == 0.0 {
        return None;
    }

    // Residuen: Messpunkte minus Endpunkt-Anteile der Bernstein-Basis
    let q1 = p1 - ((1.0 - u).powi(3) * p0 + u.powi(3) * p3);
    let q2 = p2 - ((1.0 - v).powi(3) * p0 + v.powi(3) * p3);

    let control1 = (d * q1 - b * q2) / det;
    let control2 = (-c * q1 + a * q2) / det;
    Some((control1, control2))
}
