use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::airfoil::Airfoil;
use super::control::{Control, ControlKind};
use super::section::Section;
use super::vector::{format_vector, front_view_distance, lerp, mirror_y, Vector3};
use crate::error::{GeometryError, GeometryResult};

/// Two spanwise positions closer than this are the same position, m.
pub const SPAN_EPS: f64 = 1e-9;

/// Gap between two touching control runs, m.
pub const HAIRLINE: f64 = 1e-4;

/// Relative front-view deviation still accepted as straight.
const STRAIGHT_TOL: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Spanwise extent of one control run: signed spanwise positions and hinge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRange {
    pub start: f64,
    pub end: f64,
    pub x_hinge: f64,
}

impl ControlRange {
    pub fn new(start: f64, end: f64, x_hinge: f64) -> Self {
        Self { start, end, x_hinge }
    }

    /// Same range seen on the mirrored surface.
    pub fn mirrored(&self) -> Self {
        Self {
            start: -self.end,
            end: -self.start,
            x_hinge: self.x_hinge,
        }
    }
}

/// Control runs per preset kind.
pub type Mechanization = BTreeMap<ControlKind, Vec<ControlRange>>;

/// How spanwise positions are measured from the root section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanAxis {
    /// Front-view (YZ) distance, signed along the tip direction.
    #[default]
    FrontView,
    /// Projection on the y axis.
    Y,
    /// Projection on the z axis.
    Z,
}

/// Vortex paneling line of a SURFACE block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paneling {
    pub chordwise: u32,
    pub chord_spacing: f64,
}

impl Default for Paneling {
    fn default() -> Self {
        Self {
            chordwise: 12,
            chord_spacing: 1.0,
        }
    }
}

/// Optional per-surface solver switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceFlags {
    pub component: Option<u32>,
    pub no_wake: bool,
    pub no_albe: bool,
    pub no_load: bool,
}

/// Planform families recognised by [`Surface::get_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceType {
    Rectangular,
    SimpleTapered,
    Delta,
    DoubleTrapez,
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SurfaceType::Rectangular => "Rectangular",
            SurfaceType::SimpleTapered => "Simple-Tapered",
            SurfaceType::Delta => "Delta",
            SurfaceType::DoubleTrapez => "Double-Trapez",
        })
    }
}

// ---------------------------------------------------------------------------
// Surface: ordered sections forming one lifting surface
// ---------------------------------------------------------------------------

/// A wing, tail or fin. Sections stay sorted by distance from the root
/// section, which is fixed at construction.
#[derive(Debug, Clone)]
pub struct Surface {
    pub name: String,
    pub y_duplicate: bool,
    pub origin: Vector3,
    pub airfoil: Arc<Airfoil>,
    pub paneling: Paneling,
    pub flags: SurfaceFlags,
    sections: Vec<Section>,
    span_axis: SpanAxis,
    root: Vector3,
    direction: f64,
    mechanization: Mechanization,
}

impl Surface {
    /// Build from at least two sections; the first one is the root.
    pub fn new(
        name: impl Into<String>,
        sections: Vec<Section>,
        y_duplicate: bool,
        origin: Vector3,
        airfoil: Arc<Airfoil>,
    ) -> GeometryResult<Self> {
        Surface::with_axis(name, sections, y_duplicate, origin, airfoil, SpanAxis::FrontView)
    }

    pub fn with_axis(
        name: impl Into<String>,
        sections: Vec<Section>,
        y_duplicate: bool,
        origin: Vector3,
        airfoil: Arc<Airfoil>,
        span_axis: SpanAxis,
    ) -> GeometryResult<Self> {
        let name = name.into();
        if sections.len() < 2 {
            return Err(GeometryError::InsufficientSections {
                surface: name,
                count: sections.len(),
            });
        }
        let root_chord = sections[0].chord;
        if root_chord <= 0.0 {
            return Err(GeometryError::NonPositiveChord {
                surface: name,
                chord: root_chord,
            });
        }

        let root = sections[0].leading_edge;
        let tip_le = sections
            .iter()
            .map(|s| s.leading_edge)
            .max_by(|a, b| {
                raw_coordinate(span_axis, &root, a)
                    .abs()
                    .total_cmp(&raw_coordinate(span_axis, &root, b).abs())
            })
            .unwrap_or(root);
        let direction = orientation(span_axis, &root, &tip_le);
        let tip_position = unsigned_distance(span_axis, &root, &tip_le, direction) * direction;
        let (min, max) = (tip_position.min(0.0), tip_position.max(0.0));

        let mut keyed: Vec<(f64, Section)> = sections
            .into_iter()
            .map(|s| (unsigned_distance(span_axis, &root, &s.leading_edge, direction), s))
            .collect();
        if let Some((d, _)) = keyed.iter().find(|(d, _)| *d < -SPAN_EPS) {
            return Err(GeometryError::OutOfRange {
                position: d * direction,
                min,
                max,
            });
        }
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(w) = keyed.windows(2).find(|w| (w[1].0 - w[0].0).abs() < SPAN_EPS) {
            return Err(GeometryError::DuplicateSpanwise {
                surface: name,
                position: w[1].0 * direction,
            });
        }

        Ok(Self {
            name,
            y_duplicate,
            origin,
            airfoil,
            paneling: Paneling::default(),
            flags: SurfaceFlags::default(),
            sections: keyed.into_iter().map(|(_, s)| s).collect(),
            span_axis,
            root,
            direction,
            mechanization: Mechanization::new(),
        })
    }

    pub fn with_origin(mut self, origin: Vector3) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_paneling(mut self, paneling: Paneling) -> Self {
        self.paneling = paneling;
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn root(&self) -> &Section {
        &self.sections[0]
    }

    pub fn tip(&self) -> &Section {
        &self.sections[self.sections.len() - 1]
    }

    pub fn span_axis(&self) -> SpanAxis {
        self.span_axis
    }

    pub fn mechanization(&self) -> &Mechanization {
        &self.mechanization
    }

    /// Signed spanwise position of a section.
    pub fn spanwise(&self, section: &Section) -> f64 {
        self.distance(section) * self.direction
    }

    pub fn spanwise_positions(&self) -> Vec<f64> {
        self.sections.iter().map(|s| self.spanwise(s)).collect()
    }

    /// Spanwise interval covered by the sections, ordered low→high.
    pub fn spanwise_limits(&self) -> (f64, f64) {
        let tip = self.spanwise(self.tip());
        (tip.min(0.0), tip.max(0.0))
    }

    /// Unsigned distance from the root along the spanwise metric.
    fn distance(&self, section: &Section) -> f64 {
        unsigned_distance(self.span_axis, &self.root, &section.leading_edge, self.direction)
    }

    // -----------------------------------------------------------------------
    // Section insertion
    // -----------------------------------------------------------------------

    /// Insert a section between root and tip. Returns false (and leaves the
    /// surface untouched) when it falls outside or collides with another.
    pub fn add_section(&mut self, section: Section) -> bool {
        let d = self.distance(&section);
        let tip = self.distance(self.tip());
        if d < -SPAN_EPS || d > tip + SPAN_EPS {
            log::warn!(
                "{}: section at {:.6} outside of span, ignored",
                self.name,
                d * self.direction
            );
            return false;
        }
        if self.index_at_distance(d).is_some() {
            log::warn!(
                "{}: a section already exists at {:.6}, ignored",
                self.name,
                d * self.direction
            );
            return false;
        }
        let idx = self.sections.partition_point(|s| self.distance(s) < d);
        self.sections.insert(idx, section);
        true
    }

    /// Make sure a section exists at `spanwise` without changing the shape:
    /// leading edge, chord and incidence are interpolated from the two
    /// bracketing sections. Returns the section index.
    pub fn add_section_gentle(&mut self, spanwise: f64) -> GeometryResult<usize> {
        let d = spanwise * self.direction;
        let tip = self.distance(self.tip());
        if d < -SPAN_EPS || d > tip + SPAN_EPS {
            let (min, max) = self.spanwise_limits();
            return Err(GeometryError::OutOfRange {
                position: spanwise,
                min,
                max,
            });
        }
        if let Some(idx) = self.index_at_distance(d) {
            return Ok(idx);
        }

        let upper = self.sections.partition_point(|s| self.distance(s) < d);
        let (a, b) = (&self.sections[upper - 1], &self.sections[upper]);
        let t = self.interpolation_parameter(a, b, d);

        let mut section = Section::new(
            lerp(&a.leading_edge, &b.leading_edge, t),
            a.chord + (b.chord - a.chord) * t,
            a.inclination + (b.inclination - a.inclination) * t,
            Arc::clone(&self.airfoil),
        )?;
        if a.shares_control_with(b) {
            section.control = a.control.clone();
        }

        log::debug!("{}: gentle section at {:.6}", self.name, spanwise);
        self.sections.insert(upper, section);
        Ok(upper)
    }

    /// Segment parameter of the point `d` away from the root on segment a→b.
    fn interpolation_parameter(&self, a: &Section, b: &Section, d: f64) -> f64 {
        let t = match self.span_axis {
            SpanAxis::Y | SpanAxis::Z => {
                let (da, db) = (self.distance(a), self.distance(b));
                (d - da) / (db - da)
            }
            SpanAxis::FrontView => {
                // |p0 + t*dp| = d in the YZ plane, measured from the root
                let p0 = (a.leading_edge.y - self.root.y, a.leading_edge.z - self.root.z);
                let dp = (
                    b.leading_edge.y - a.leading_edge.y,
                    b.leading_edge.z - a.leading_edge.z,
                );
                let qa = dp.0 * dp.0 + dp.1 * dp.1;
                let qb = 2.0 * (p0.0 * dp.0 + p0.1 * dp.1);
                let qc = p0.0 * p0.0 + p0.1 * p0.1 - d * d;
                if qa <= 0.0 {
                    0.0
                } else {
                    let disc = (qb * qb - 4.0 * qa * qc).max(0.0);
                    (-qb + disc.sqrt()) / (2.0 * qa)
                }
            }
        };
        t.clamp(0.0, 1.0)
    }

    fn index_at_distance(&self, d: f64) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| (self.distance(s) - d).abs() < SPAN_EPS)
    }

    /// Indices of the sections whose spanwise position lies in [start, end].
    pub fn sections_in_range(&self, start: f64, end: f64) -> Vec<usize> {
        let (lo, hi) = ordered(start * self.direction, end * self.direction);
        (0..self.sections.len())
            .filter(|&i| {
                let d = self.distance(&self.sections[i]);
                d >= lo - SPAN_EPS && d <= hi + SPAN_EPS
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Mechanization
    // -----------------------------------------------------------------------

    /// Attach one control kind to a set of spanwise ranges. A kind can only
    /// be configured once; on failure the sections are left as they were.
    pub fn set_mechanization(&mut self, kind: ControlKind, ranges: &[ControlRange]) -> GeometryResult<()> {
        if self.mechanization.contains_key(&kind) {
            return Err(GeometryError::AlreadyConfigured(kind.name().to_string()));
        }

        let snapshot = self.sections.clone();
        match self.attach_ranges(kind, ranges) {
            Ok(()) => {
                self.mechanization.insert(kind, ranges.to_vec());
                Ok(())
            }
            Err(err) => {
                self.sections = snapshot;
                Err(err)
            }
        }
    }

    /// Apply every kind of a mechanization map, in kind order.
    pub fn mechanize(&mut self, mechanization: &Mechanization) -> GeometryResult<()> {
        for (kind, ranges) in mechanization {
            self.set_mechanization(*kind, ranges)?;
        }
        Ok(())
    }

    fn attach_ranges(&mut self, kind: ControlKind, ranges: &[ControlRange]) -> GeometryResult<()> {
        for range in ranges {
            let control = Arc::new(Control::preset(kind, range.x_hinge)?);
            self.add_section_gentle(range.start)?;
            self.add_section_gentle(range.end)?;

            let (lo, hi) = ordered(range.start * self.direction, range.end * self.direction);
            for idx in self.sections_in_range(range.start, range.end) {
                let d = self.distance(&self.sections[idx]);
                if let Some(existing) = &self.sections[idx].control {
                    let on_boundary = (d - lo).abs() < SPAN_EPS || (d - hi).abs() < SPAN_EPS;
                    let (run_lo, run_hi) = self.run_extent(idx);
                    let inside = run_lo < hi - SPAN_EPS && run_hi > lo + SPAN_EPS;
                    if !(on_boundary && !inside && **existing == *control) {
                        return Err(GeometryError::SectionAlreadyControlled {
                            position: d * self.direction,
                            existing: existing.name.clone(),
                        });
                    }
                }
                self.sections[idx].control = Some(Arc::clone(&control));
            }
        }
        self.separate_touching_runs()
    }

    /// Distance interval covered by the control run through section `idx`.
    fn run_extent(&self, idx: usize) -> (f64, f64) {
        let (mut first, mut last) = (idx, idx);
        while first > 0 && self.sections[first - 1].shares_control_with(&self.sections[idx]) {
            first -= 1;
        }
        while last + 1 < self.sections.len() && self.sections[last + 1].shares_control_with(&self.sections[idx]) {
            last += 1;
        }
        (self.distance(&self.sections[first]), self.distance(&self.sections[last]))
    }

    /// Touching runs with equal controls would merge in the solver; give the
    /// left run its own end section a hairline before the right one.
    fn separate_touching_runs(&mut self) -> GeometryResult<()> {
        let mut i = 0;
        while i + 1 < self.sections.len() {
            let (a, b) = (&self.sections[i], &self.sections[i + 1]);
            let touching = match (&a.control, &b.control) {
                (Some(ca), Some(cb)) => ca == cb && !Arc::ptr_eq(ca, cb),
                _ => false,
            };
            if touching {
                let left = a.control.clone();
                let (da, db) = (self.distance(a), self.distance(b));
                let gap = if db - da > 2.0 * HAIRLINE { HAIRLINE } else { (db - da) / 2.0 };
                let idx = self.add_section_gentle((db - gap) * self.direction)?;
                self.sections[idx].control = left;
                i = idx;
            }
            i += 1;
        }
        Ok(())
    }

    /// After a file load: adjacent sections with equal controls share one
    /// instance, and preset runs are recorded as the mechanization. Sections
    /// a hairline apart stay in separate runs; the left run's range ends at
    /// the right run's start.
    pub(crate) fn adopt_control_runs(&mut self) {
        for i in 1..self.sections.len() {
            if self.is_hairline_gap(i - 1, i) {
                continue;
            }
            let merged = match (&self.sections[i - 1].control, &self.sections[i].control) {
                (Some(a), Some(b)) if a == b && !Arc::ptr_eq(a, b) => Some(Arc::clone(a)),
                _ => None,
            };
            if merged.is_some() {
                self.sections[i].control = merged;
            }
        }

        let mut mechanization = Mechanization::new();
        let mut i = 0;
        while i < self.sections.len() {
            let Some(control) = self.sections[i].control.clone() else {
                i += 1;
                continue;
            };
            let mut j = i;
            while j + 1 < self.sections.len() && self.sections[j + 1].shares_control_with(&self.sections[i]) {
                j += 1;
            }
            if let Some(kind) = control.kind {
                let end = match self.sections.get(j + 1) {
                    Some(next)
                        if self.is_hairline_gap(j, j + 1)
                            && next.control.as_deref() == Some(&*control) =>
                    {
                        next
                    }
                    _ => &self.sections[j],
                };
                mechanization.entry(kind).or_default().push(ControlRange::new(
                    self.spanwise(&self.sections[i]),
                    self.spanwise(end),
                    control.x_hinge,
                ));
            }
            i = j + 1;
        }
        self.mechanization = mechanization;
    }

    fn is_hairline_gap(&self, a: usize, b: usize) -> bool {
        let gap = self.distance(&self.sections[b]) - self.distance(&self.sections[a]);
        gap.abs() <= HAIRLINE + SPAN_EPS
    }

    // -----------------------------------------------------------------------
    // Derived geometry
    // -----------------------------------------------------------------------

    /// True when all leading edges line up in the front view.
    pub fn is_straight(&self) -> bool {
        let root = &self.root().leading_edge;
        let tip = &self.tip().leading_edge;
        let length = front_view_distance(root, tip);
        if length <= 0.0 {
            return false;
        }
        let (uy, uz) = ((tip.y - root.y) / length, (tip.z - root.z) / length);
        self.sections.iter().all(|s| {
            let (py, pz) = (s.leading_edge.y - root.y, s.leading_edge.z - root.z);
            (py * uz - pz * uy).abs() <= STRAIGHT_TOL * length
        })
    }

    /// Dihedral angle in degrees; None unless the surface is straight.
    pub fn dihedral(&self) -> Option<f64> {
        if !self.is_straight() {
            return None;
        }
        let root = &self.root().leading_edge;
        let tip = &self.tip().leading_edge;
        Some((tip.z - root.z).atan2((tip.y - root.y).abs()).to_degrees())
    }

    /// Front-view length of each section pair.
    fn segment_lengths(&self) -> Vec<f64> {
        self.sections
            .windows(2)
            .map(|w| front_view_distance(&w[0].leading_edge, &w[1].leading_edge))
            .collect()
    }

    fn duplicate_factor(&self) -> f64 {
        if self.y_duplicate {
            2.0
        } else {
            1.0
        }
    }

    /// Span along the surface in the front view (both halves if duplicated).
    pub fn span(&self) -> f64 {
        self.segment_lengths().iter().sum::<f64>() * self.duplicate_factor()
    }

    /// Span projected on the y axis (both halves if duplicated).
    pub fn projected_span(&self) -> f64 {
        (self.tip().leading_edge.y - self.root().leading_edge.y).abs() * self.duplicate_factor()
    }

    /// Planform area as trapezoids between section pairs.
    pub fn area(&self) -> f64 {
        let area: f64 = self
            .sections
            .windows(2)
            .zip(self.segment_lengths())
            .map(|(w, len)| 0.5 * (w[0].chord + w[1].chord) * len)
            .sum();
        area * self.duplicate_factor()
    }

    /// Area-weighted mean chord (area / span).
    pub fn mac(&self) -> f64 {
        let lengths = self.segment_lengths();
        let means: Vec<f64> = self
            .sections
            .windows(2)
            .map(|w| 0.5 * (w[0].chord + w[1].chord))
            .collect();
        let total: f64 = lengths.iter().sum();
        if total <= 0.0 {
            return self.root().chord;
        }
        // weighted mean around the first segment keeps equal chords exact
        let base = means[0];
        let delta: f64 = means
            .iter()
            .zip(&lengths)
            .map(|(m, l)| (m - base) * l)
            .sum();
        base + delta / total
    }

    pub fn aspect_ratio(&self) -> f64 {
        let area = self.area();
        if area > 0.0 {
            self.span().powi(2) / area
        } else {
            0.0
        }
    }

    pub fn taper_ratio(&self) -> f64 {
        self.tip().chord / self.root().chord
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    /// Planform family of a 2- or 3-section surface; `tolerance` is relative
    /// to the root chord. None for anything else.
    pub fn get_type(&self, tolerance: f64) -> Option<SurfaceType> {
        let tol = tolerance * self.root().chord;
        match self.sections.len() {
            2 => Some(self.classify_trapez(tol)),
            3 => {
                let (root, mid, tip) = (&self.sections[0], &self.sections[1], &self.sections[2]);
                let t = self.distance(mid) / self.distance(tip);
                let expected = lerp(&root.leading_edge, &tip.leading_edge, t);
                let chord = root.chord + (tip.chord - root.chord) * t;
                let linear = (mid.leading_edge.x - expected.x).abs() <= tol
                    && (mid.leading_edge.z - expected.z).abs() <= tol
                    && (mid.chord - chord).abs() <= tol;
                if linear {
                    Some(self.classify_trapez(tol))
                } else {
                    Some(SurfaceType::DoubleTrapez)
                }
            }
            _ => None,
        }
    }

    fn classify_trapez(&self, tol: f64) -> SurfaceType {
        let (root, tip) = (self.root(), self.tip());
        if tip.chord <= tol && (tip.trailing_edge().x - root.trailing_edge().x).abs() <= tol {
            SurfaceType::Delta
        } else if (tip.chord - root.chord).abs() <= tol
            && (tip.leading_edge.x - root.leading_edge.x).abs() <= tol
        {
            SurfaceType::Rectangular
        } else {
            SurfaceType::SimpleTapered
        }
    }

    // -----------------------------------------------------------------------
    // Mirroring
    // -----------------------------------------------------------------------

    /// Mirror image across the XZ plane. Controls are copied so the copy
    /// never aliases the original; runs stay shared within the copy.
    pub fn get_symmetric(&self) -> Surface {
        let mut copies: Vec<(Arc<Control>, Arc<Control>)> = Vec::new();
        let sections = self
            .sections
            .iter()
            .map(|s| {
                let mut m = s.mirror();
                if let Some(original) = &s.control {
                    let copy = match copies.iter().find(|(o, _)| Arc::ptr_eq(o, original)) {
                        Some((_, c)) => Arc::clone(c),
                        None => {
                            let c = Arc::new(Control::clone(original));
                            copies.push((Arc::clone(original), Arc::clone(&c)));
                            c
                        }
                    };
                    m.control = Some(copy);
                }
                m
            })
            .collect::<Vec<_>>();

        let root = mirror_y(&self.root);
        let tip = sections[sections.len() - 1].leading_edge;
        let mechanization = self
            .mechanization
            .iter()
            .map(|(k, ranges)| (*k, ranges.iter().map(ControlRange::mirrored).collect()))
            .collect();

        Surface {
            name: format!("{}_mirrored", self.name),
            y_duplicate: self.y_duplicate,
            origin: mirror_y(&self.origin),
            airfoil: Arc::clone(&self.airfoil),
            paneling: self.paneling,
            flags: self.flags,
            sections,
            span_axis: self.span_axis,
            root,
            direction: orientation(self.span_axis, &root, &tip),
            mechanization,
        }
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// SURFACE block, sections in spanwise order.
    pub fn serialize(&self) -> String {
        let mut out = format!(
            "SURFACE\n{}\n{} {:?}\n",
            self.name, self.paneling.chordwise, self.paneling.chord_spacing
        );
        if let Some(index) = self.flags.component {
            out.push_str(&format!("COMPONENT\n{}\n", index));
        }
        if self.flags.no_wake {
            out.push_str("NOWAKE\n");
        }
        if self.flags.no_albe {
            out.push_str("NOALBE\n");
        }
        if self.flags.no_load {
            out.push_str("NOLOAD\n");
        }
        if self.y_duplicate {
            out.push_str("YDUPLICATE\n0.0\n");
        }
        out.push_str(&format!(
            "SCALE\n1 1 1\nTRANSLATE\n{}\nANGLE\n0\n",
            format_vector(&self.origin)
        ));
        for section in &self.sections {
            out.push_str(&section.serialize());
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Spanwise metric helpers
// ---------------------------------------------------------------------------

/// Position along the span axis before the tip direction is applied.
fn raw_coordinate(axis: SpanAxis, root: &Vector3, p: &Vector3) -> f64 {
    match axis {
        SpanAxis::FrontView => front_view_distance(root, p),
        SpanAxis::Y => p.y - root.y,
        SpanAxis::Z => p.z - root.z,
    }
}

/// Distance from the root along the span metric, never negative for
/// sections on the tip side.
fn unsigned_distance(axis: SpanAxis, root: &Vector3, p: &Vector3, direction: f64) -> f64 {
    match axis {
        SpanAxis::FrontView => front_view_distance(root, p),
        SpanAxis::Y | SpanAxis::Z => raw_coordinate(axis, root, p) * direction,
    }
}

/// +1 or -1: sign of the dominant root→tip component along the span axis.
fn orientation(axis: SpanAxis, root: &Vector3, tip: &Vector3) -> f64 {
    let (dy, dz) = (tip.y - root.y, tip.z - root.z);
    let dominant = match axis {
        SpanAxis::FrontView if dy.abs() >= dz.abs() => dy,
        SpanAxis::FrontView => dz,
        SpanAxis::Y => dy,
        SpanAxis::Z => dz,
    };
    if dominant < 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn naca() -> Arc<Airfoil> {
        Arc::new(Airfoil::from_code("2412").unwrap())
    }

    fn section(x: f64, y: f64, z: f64, chord: f64) -> Section {
        Section::new(Vector3::new(x, y, z), chord, 0.0, naca()).unwrap()
    }

    fn rect_wing() -> Surface {
        Surface::new(
            "Wing",
            vec![section(0.0, 0.0, 0.0, 1.0), section(0.0, 5.0, 0.0, 1.0)],
            true,
            Vector3::zeros(),
            naca(),
        )
        .unwrap()
    }

    fn tapered_wing() -> Surface {
        Surface::new(
            "Wing",
            vec![section(0.0, 0.0, 0.0, 2.0), section(0.5, 4.0, 0.4, 1.0)],
            true,
            Vector3::zeros(),
            naca(),
        )
        .unwrap()
    }

    fn assert_positions(s: &Surface, expected: &[f64]) {
        let pos = s.spanwise_positions();
        assert_eq!(pos.len(), expected.len(), "positions {:?}", pos);
        for (p, e) in pos.iter().zip(expected) {
            assert!((p - e).abs() < 1e-12, "positions {:?}, expected {:?}", pos, expected);
        }
    }

    fn assert_sorted(s: &Surface) {
        let pos = s.spanwise_positions();
        for w in pos.windows(2) {
            assert!(w[1].abs() > w[0].abs() + SPAN_EPS, "unsorted: {:?}", pos);
        }
    }

    #[test]
    fn needs_two_sections_and_positive_root() {
        let one = Surface::new("S", vec![section(0.0, 0.0, 0.0, 1.0)], false, Vector3::zeros(), naca());
        assert!(matches!(one, Err(GeometryError::InsufficientSections { count: 1, .. })));
        let flat = Surface::new(
            "S",
            vec![section(0.0, 0.0, 0.0, 0.0), section(0.0, 1.0, 0.0, 1.0)],
            false,
            Vector3::zeros(),
            naca(),
        );
        assert!(matches!(flat, Err(GeometryError::NonPositiveChord { .. })));
    }

    #[test]
    fn duplicate_positions_rejected() {
        let s = Surface::new(
            "S",
            vec![section(0.0, 0.0, 0.0, 1.0), section(0.0, 2.0, 0.0, 1.0), section(1.0, 2.0, 0.0, 0.5)],
            false,
            Vector3::zeros(),
            naca(),
        );
        assert!(matches!(s, Err(GeometryError::DuplicateSpanwise { .. })));
    }

    #[test]
    fn sections_sorted_from_root() {
        let s = Surface::new(
            "S",
            vec![section(0.0, 0.0, 0.0, 1.0), section(0.0, 4.0, 0.0, 0.5), section(0.0, 2.0, 0.0, 0.8)],
            false,
            Vector3::zeros(),
            naca(),
        )
        .unwrap();
        assert_positions(&s, &[0.0, 2.0, 4.0]);
    }

    #[test]
    fn add_section_rejects_outside_and_collisions() {
        let mut s = rect_wing();
        assert!(!s.add_section(section(0.0, 6.0, 0.0, 1.0)));
        assert!(!s.add_section(section(0.0, 5.0, 0.0, 1.0)));
        assert!(s.add_section(section(0.1, 2.5, 0.0, 0.9)));
        assert_eq!(s.sections().len(), 3);
        assert_sorted(&s);
    }

    #[test]
    fn gentle_insertion_keeps_shape() {
        let mut s = tapered_wing();
        let half = s.spanwise(s.tip()) / 2.0;
        let idx = s.add_section_gentle(half).unwrap();
        assert_eq!(idx, 1);
        let mid = &s.sections()[1];
        assert!((mid.chord - 1.5).abs() < 1e-12);
        assert!((mid.leading_edge - Vector3::new(0.25, 2.0, 0.2)).norm() < 1e-12);
        assert!((s.spanwise(mid) - half).abs() < 1e-12);
        assert_sorted(&s);

        // existing position: no new section
        assert_eq!(s.add_section_gentle(half).unwrap(), 1);
        assert_eq!(s.sections().len(), 3);
    }

    #[test]
    fn gentle_insertion_out_of_range() {
        let mut s = rect_wing();
        assert!(matches!(s.add_section_gentle(5.5), Err(GeometryError::OutOfRange { .. })));
        assert!(matches!(s.add_section_gentle(-0.5), Err(GeometryError::OutOfRange { .. })));
    }

    #[test]
    fn mixed_insertions_stay_monotonic() {
        let mut s = tapered_wing();
        let tip = s.spanwise(s.tip());
        for f in [0.7, 0.1, 0.45, 0.9, 0.3] {
            s.add_section_gentle(f * tip).unwrap();
        }
        s.add_section(section(0.3, 2.2, 0.22, 1.4));
        s.add_section(section(0.3, 2.2, 0.22, 1.4));
        assert_eq!(s.sections().len(), 8);
        assert_sorted(&s);
    }

    #[test]
    fn rectangular_mac_equals_chord() {
        let s = rect_wing();
        assert_eq!(s.mac(), 1.0);
        assert!((s.area() - 10.0).abs() < 1e-12);
        assert!((s.span() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn tapered_mac_and_area() {
        let s = Surface::new(
            "W",
            vec![section(0.0, 0.0, 0.0, 2.0), section(0.0, 4.0, 0.0, 1.0)],
            false,
            Vector3::zeros(),
            naca(),
        )
        .unwrap();
        assert!((s.area() - 6.0).abs() < 1e-12);
        assert!((s.mac() - 1.5).abs() < 1e-12);
        assert!((s.taper_ratio() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn dihedral_only_for_straight_surfaces() {
        let s = tapered_wing();
        let d = s.dihedral().unwrap();
        assert!((d - (0.4f64).atan2(4.0).to_degrees()).abs() < 1e-9);

        let gull = Surface::new(
            "Gull",
            vec![section(0.0, 0.0, 0.0, 1.0), section(0.0, 2.0, 0.5, 1.0), section(0.0, 4.0, 0.5, 1.0)],
            false,
            Vector3::zeros(),
            naca(),
        )
        .unwrap();
        assert!(!gull.is_straight());
        assert_eq!(gull.dihedral(), None);
    }

    #[test]
    fn classification() {
        assert_eq!(rect_wing().get_type(0.05), Some(SurfaceType::Rectangular));
        assert_eq!(tapered_wing().get_type(0.05), Some(SurfaceType::SimpleTapered));

        let delta = Surface::new(
            "Delta",
            vec![section(0.0, 0.0, 0.0, 2.0), section(2.0, 1.5, 0.0, 0.0)],
            true,
            Vector3::zeros(),
            naca(),
        )
        .unwrap();
        assert_eq!(delta.get_type(0.05), Some(SurfaceType::Delta));

        let mut with_mid = tapered_wing();
        with_mid.add_section_gentle(1.0).unwrap();
        assert_eq!(with_mid.get_type(0.05), Some(SurfaceType::SimpleTapered));

        let kinked = Surface::new(
            "Kinked",
            vec![section(0.0, 0.0, 0.0, 3.0), section(1.0, 1.0, 0.0, 2.0), section(1.5, 4.0, 0.0, 1.0)],
            true,
            Vector3::zeros(),
            naca(),
        )
        .unwrap();
        assert_eq!(kinked.get_type(0.05), Some(SurfaceType::DoubleTrapez));

        with_mid.add_section_gentle(2.0).unwrap();
        assert_eq!(with_mid.get_type(0.05), None);
    }

    #[test]
    fn mechanization_inserts_boundary_sections() {
        let mut s = rect_wing();
        s.set_mechanization(ControlKind::Aileron, &[ControlRange::new(3.0, 4.5, 0.7)])
            .unwrap();
        assert_positions(&s, &[0.0, 3.0, 4.5, 5.0]);
        let secs = s.sections();
        assert!(secs[0].control.is_none());
        assert!(secs[1].shares_control_with(&secs[2]));
        assert!(secs[3].control.is_none());
        assert_eq!(s.mechanization()[&ControlKind::Aileron].len(), 1);
    }

    #[test]
    fn mechanization_configured_once() {
        let mut s = rect_wing();
        s.set_mechanization(ControlKind::Flap, &[ControlRange::new(0.5, 2.0, 0.7)])
            .unwrap();
        let again = s.set_mechanization(ControlKind::Flap, &[ControlRange::new(3.0, 4.0, 0.7)]);
        assert_eq!(again, Err(GeometryError::AlreadyConfigured("flap".into())));
    }

    #[test]
    fn overlapping_controls_rejected() {
        let mut s = rect_wing();
        s.set_mechanization(ControlKind::Flap, &[ControlRange::new(0.5, 3.0, 0.7)])
            .unwrap();
        let before = s.sections().len();
        let err = s
            .set_mechanization(ControlKind::Aileron, &[ControlRange::new(2.0, 4.5, 0.7)])
            .unwrap_err();
        assert!(matches!(err, GeometryError::SectionAlreadyControlled { .. }));
        assert_eq!(s.sections().len(), before, "failed attach must not leave sections behind");
        assert!(!s.mechanization().contains_key(&ControlKind::Aileron));
    }

    #[test]
    fn overlapping_ranges_of_one_kind_rejected() {
        let mut s = rect_wing();
        let err = s.set_mechanization(
            ControlKind::Flap,
            &[ControlRange::new(0.5, 3.0, 0.7), ControlRange::new(2.0, 4.0, 0.7)],
        );
        assert!(matches!(err, Err(GeometryError::SectionAlreadyControlled { .. })));
    }

    #[test]
    fn nested_ranges_of_one_kind_rejected() {
        for ranges in [
            [ControlRange::new(0.5, 4.0, 0.7), ControlRange::new(2.0, 3.0, 0.7)],
            [ControlRange::new(0.5, 3.0, 0.7), ControlRange::new(2.0, 3.0, 0.7)],
            [ControlRange::new(1.0, 3.0, 0.7), ControlRange::new(1.0, 2.0, 0.7)],
        ] {
            let mut s = rect_wing();
            let err = s.set_mechanization(ControlKind::Flap, &ranges);
            assert!(
                matches!(err, Err(GeometryError::SectionAlreadyControlled { .. })),
                "{:?} accepted",
                ranges
            );
            assert_positions(&s, &[0.0, 5.0]);
            assert!(s.mechanization().is_empty());
        }
    }

    #[test]
    fn touching_ranges_get_hairline_separator() {
        let mut s = rect_wing();
        s.set_mechanization(
            ControlKind::Flap,
            &[ControlRange::new(1.0, 3.0, 0.7), ControlRange::new(3.0, 4.0, 0.7)],
        )
        .unwrap();
        let pos = s.spanwise_positions();
        assert_eq!(pos.len(), 6);
        assert!((pos[2] - (3.0 - HAIRLINE)).abs() < 1e-12);
        let secs = s.sections();
        assert!(secs[1].shares_control_with(&secs[2]));
        assert!(!secs[2].shares_control_with(&secs[3]));
        assert!(secs[3].shares_control_with(&secs[4]));
    }

    #[test]
    fn gentle_insertion_inside_run_keeps_control() {
        let mut s = rect_wing();
        s.set_mechanization(ControlKind::Aileron, &[ControlRange::new(2.0, 5.0, 0.7)])
            .unwrap();
        let idx = s.add_section_gentle(4.0).unwrap();
        assert!(s.sections()[idx].shares_control_with(s.tip()));
    }

    #[test]
    fn mirror_twice_is_identity() {
        let mut s = tapered_wing();
        s.set_mechanization(ControlKind::Aileron, &[ControlRange::new(2.0, 3.5, 0.75)])
            .unwrap();
        let m = s.get_symmetric();
        assert!(m.tip().leading_edge.y < 0.0);
        assert!(m.spanwise(m.tip()) < 0.0);
        let range = m.mechanization()[&ControlKind::Aileron][0];
        assert_eq!(range.start, -3.5);
        assert_eq!(range.end, -2.0);
        for (a, b) in s.sections().iter().zip(m.sections()) {
            assert!(!a.shares_control_with(b));
        }
        assert!(m.sections()[1].shares_control_with(&m.sections()[2]));

        let mm = m.get_symmetric();
        assert_eq!(mm.sections().len(), s.sections().len());
        for (a, b) in s.sections().iter().zip(mm.sections()) {
            assert!((a.leading_edge - b.leading_edge).norm() < 1e-12);
            assert_eq!(a.chord, b.chord);
            assert_eq!(a.control, b.control);
        }
        assert_eq!(mm.mechanization(), s.mechanization());
    }

    #[test]
    fn mirrored_surface_accepts_negative_positions() {
        let mut m = rect_wing().get_symmetric();
        let idx = m.add_section_gentle(-2.0).unwrap();
        assert!((m.sections()[idx].leading_edge.y + 2.0).abs() < 1e-12);
        assert!(m.add_section_gentle(2.0).is_err());
    }

    #[test]
    fn vertical_surface_spans_in_z() {
        let fin = Surface::new(
            "Fin",
            vec![section(0.0, 0.0, 0.0, 1.0), section(0.3, 0.0, 1.5, 0.6)],
            false,
            Vector3::zeros(),
            naca(),
        )
        .unwrap();
        assert_positions(&fin, &[0.0, 1.5]);
        assert!((fin.dihedral().unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn axis_projection_metric() {
        let mut s = Surface::with_axis(
            "W",
            vec![section(0.0, 0.0, 0.0, 1.0), section(0.0, 4.0, 1.0, 1.0)],
            false,
            Vector3::zeros(),
            naca(),
            SpanAxis::Y,
        )
        .unwrap();
        assert_positions(&s, &[0.0, 4.0]);
        let idx = s.add_section_gentle(1.0).unwrap();
        assert!((s.sections()[idx].leading_edge.z - 0.25).abs() < 1e-12);
    }

    #[test]
    fn loaded_controls_regrouped_into_runs() {
        let flap = || Control::flap(0.7).unwrap();
        let mut s = Surface::new(
            "W",
            vec![
                section(0.0, 0.0, 0.0, 1.0),
                section(0.0, 1.0, 0.0, 1.0).with_control(flap()),
                section(0.0, 2.0, 0.0, 1.0).with_control(flap()),
                section(0.0, 3.0, 0.0, 1.0).with_control(Control::new("tab", -0.2, true).unwrap()),
                section(0.0, 4.0, 0.0, 1.0),
            ],
            false,
            Vector3::zeros(),
            naca(),
        )
        .unwrap();
        s.adopt_control_runs();
        assert!(s.sections()[1].shares_control_with(&s.sections()[2]));
        let ranges = &s.mechanization()[&ControlKind::Flap];
        assert_eq!(ranges.len(), 1);
        assert!((ranges[0].start - 1.0).abs() < 1e-12);
        assert!((ranges[0].end - 2.0).abs() < 1e-12);
        assert_eq!(s.mechanization().len(), 1);
    }

    #[test]
    fn serialize_surface_header() {
        let s = rect_wing();
        let text = s.serialize();
        assert!(text.starts_with(
            "SURFACE\nWing\n12 1.0\nYDUPLICATE\n0.0\nSCALE\n1 1 1\nTRANSLATE\n0 0 0\nANGLE\n0\nSECTION\n"
        ));
        assert_eq!(text.matches("SECTION").count(), 2);
    }
}
