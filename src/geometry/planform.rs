use std::sync::Arc;

use super::airfoil::Airfoil;
use super::section::Section;
use super::surface::{Surface, SpanAxis};
use super::vector::Vector3;
use crate::error::GeometryResult;

// ---------------------------------------------------------------------------
// Planform: parameters of one trapezoidal panel
// ---------------------------------------------------------------------------

/// One trapezoidal panel, measured from its root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planform {
    pub root_chord: f64,   // m
    pub tip_chord: f64,    // m
    pub span: f64,         // m, projected, one side only
    pub sweep: f64,        // deg, leading edge
    pub dihedral: f64,     // deg (cant angle from vertical for fins)
    pub incidence: f64,    // deg at the root
    pub twist: f64,        // deg, tip minus root
}

impl Planform {
    /// Leading edge of the tip relative to the root, horizontal panel.
    fn tip_offset(&self) -> Vector3 {
        Vector3::new(
            self.span * self.sweep.to_radians().tan(),
            self.span,
            self.span * self.dihedral.to_radians().tan(),
        )
    }

    /// Leading edge of the tip relative to the root, vertical panel.
    fn fin_tip_offset(&self) -> Vector3 {
        Vector3::new(
            self.span * self.sweep.to_radians().tan(),
            self.span * self.dihedral.to_radians().tan(),
            self.span,
        )
    }
}

// ---------------------------------------------------------------------------
// Planform builder
// ---------------------------------------------------------------------------

pub struct PlanformBuilder {
    root_chord: f64,
    tip_chord: f64,
    span: f64,
    sweep: f64,
    dihedral: f64,
    incidence: f64,
    twist: f64,
}

impl PlanformBuilder {
    pub fn new() -> Self {
        Self {
            root_chord: 1.0,
            tip_chord: 1.0,
            span: 5.0,
            sweep: 0.0,
            dihedral: 0.0,
            incidence: 0.0,
            twist: 0.0,
        }
    }

    pub fn root_chord(mut self, v: f64) -> Self { self.root_chord = v; self }
    pub fn tip_chord(mut self, v: f64) -> Self { self.tip_chord = v; self }
    pub fn span(mut self, v: f64) -> Self { self.span = v; self }
    pub fn sweep(mut self, v: f64) -> Self { self.sweep = v; self }
    pub fn dihedral(mut self, v: f64) -> Self { self.dihedral = v; self }
    pub fn incidence(mut self, v: f64) -> Self { self.incidence = v; self }
    pub fn twist(mut self, v: f64) -> Self { self.twist = v; self }

    pub fn build(self) -> Planform {
        Planform {
            root_chord: self.root_chord,
            tip_chord: self.tip_chord,
            span: self.span,
            sweep: self.sweep,
            dihedral: self.dihedral,
            incidence: self.incidence,
            twist: self.twist,
        }
    }
}

impl Default for PlanformBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Surface constructors
// ---------------------------------------------------------------------------

/// Straight tapered wing or tail, mirrored by the solver.
pub fn simple_tapered(name: &str, planform: &Planform, airfoil: Arc<Airfoil>) -> GeometryResult<Surface> {
    let root = Section::new(
        Vector3::zeros(),
        planform.root_chord,
        planform.incidence,
        Arc::clone(&airfoil),
    )?;
    let tip = Section::new(
        planform.tip_offset(),
        planform.tip_chord,
        planform.incidence + planform.twist,
        Arc::clone(&airfoil),
    )?;
    Surface::new(name, vec![root, tip], true, Vector3::zeros(), airfoil)
}

/// Delta wing: pointed tip whose trailing edge lines up with the root's.
pub fn delta(
    name: &str,
    root_chord: f64,
    span: f64,
    dihedral: f64,
    airfoil: Arc<Airfoil>,
) -> GeometryResult<Surface> {
    let root = Section::new(Vector3::zeros(), root_chord, 0.0, Arc::clone(&airfoil))?;
    let tip = Section::new(
        Vector3::new(root_chord, span, span * dihedral.to_radians().tan()),
        0.0,
        0.0,
        Arc::clone(&airfoil),
    )?;
    Surface::new(name, vec![root, tip], true, Vector3::zeros(), airfoil)
}

/// Two panels joined at a kink. The outer panel starts where the inner one
/// ends; its root chord and incidence are taken from the inner tip.
pub fn double_trapez(
    name: &str,
    inner: &Planform,
    outer: &Planform,
    airfoil: Arc<Airfoil>,
) -> GeometryResult<Surface> {
    let kink_le = inner.tip_offset();
    let kink_incidence = inner.incidence + inner.twist;
    let root = Section::new(Vector3::zeros(), inner.root_chord, inner.incidence, Arc::clone(&airfoil))?;
    let kink = Section::new(kink_le, inner.tip_chord, kink_incidence, Arc::clone(&airfoil))?;
    let tip = Section::new(
        kink_le + outer.tip_offset(),
        outer.tip_chord,
        kink_incidence + outer.twist,
        Arc::clone(&airfoil),
    )?;
    Surface::new(name, vec![root, kink, tip], true, Vector3::zeros(), airfoil)
}

/// Single fin on the plane of symmetry, spanning upwards.
pub fn vertical_fin(name: &str, planform: &Planform, airfoil: Arc<Airfoil>) -> GeometryResult<Surface> {
    let root = Section::new(Vector3::zeros(), planform.root_chord, planform.incidence, Arc::clone(&airfoil))?;
    let tip = Section::new(
        planform.fin_tip_offset(),
        planform.tip_chord,
        planform.incidence + planform.twist,
        Arc::clone(&airfoil),
    )?;
    Surface::with_axis(name, vec![root, tip], false, Vector3::zeros(), airfoil, SpanAxis::Z)
}

/// Pair of fins `y_offset` either side of the plane of symmetry.
pub fn twin(name: &str, planform: &Planform, y_offset: f64, airfoil: Arc<Airfoil>) -> GeometryResult<Surface> {
    let mut fin = vertical_fin(name, planform, airfoil)?;
    fin.y_duplicate = true;
    Ok(fin.with_origin(Vector3::new(0.0, y_offset, 0.0)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SurfaceType;

    fn naca() -> Arc<Airfoil> {
        Arc::new(Airfoil::from_code("0012").unwrap())
    }

    #[test]
    fn rectangular_planform() {
        let p = PlanformBuilder::new().root_chord(1.2).tip_chord(1.2).span(6.0).build();
        let wing = simple_tapered("Wing", &p, naca()).unwrap();
        assert_eq!(wing.get_type(0.05), Some(SurfaceType::Rectangular));
        assert_eq!(wing.mac(), 1.2);
        assert!((wing.span() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn tapered_planform_with_twist() {
        let p = PlanformBuilder::new()
            .root_chord(2.0)
            .tip_chord(1.0)
            .span(5.0)
            .sweep(10.0)
            .dihedral(3.0)
            .incidence(2.0)
            .twist(-3.0)
            .build();
        let wing = simple_tapered("Wing", &p, naca()).unwrap();
        assert_eq!(wing.get_type(0.05), Some(SurfaceType::SimpleTapered));
        assert!((wing.tip().inclination + 1.0).abs() < 1e-12);
        assert!((wing.dihedral().unwrap() - 3.0).abs() < 1e-9);
        assert!((wing.projected_span() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn delta_constructor_is_classified_delta() {
        let wing = delta("Delta", 3.0, 2.0, 0.0, naca()).unwrap();
        assert_eq!(wing.get_type(0.05), Some(SurfaceType::Delta));
        assert!((wing.area() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn double_trapez_has_kink() {
        let inner = PlanformBuilder::new().root_chord(3.0).tip_chord(2.0).span(1.5).sweep(30.0).build();
        let outer = PlanformBuilder::new().tip_chord(0.8).span(4.0).sweep(20.0).build();
        let wing = double_trapez("Wing", &inner, &outer, naca()).unwrap();
        assert_eq!(wing.sections().len(), 3);
        assert_eq!(wing.get_type(0.05), Some(SurfaceType::DoubleTrapez));
        assert!((wing.tip().leading_edge.y - 5.5).abs() < 1e-12);
    }

    #[test]
    fn fins_span_upwards() {
        let p = PlanformBuilder::new().root_chord(1.0).tip_chord(0.6).span(1.2).sweep(35.0).build();
        let fin = vertical_fin("Fin", &p, naca()).unwrap();
        assert!(!fin.y_duplicate);
        assert!((fin.spanwise(fin.tip()) - 1.2).abs() < 1e-12);

        let pair = twin("Twin", &p, 0.8, naca()).unwrap();
        assert!(pair.y_duplicate);
        assert_eq!(pair.origin, Vector3::new(0.0, 0.8, 0.0));
    }
}
