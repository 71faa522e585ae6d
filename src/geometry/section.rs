use std::sync::Arc;

use super::airfoil::Airfoil;
use super::control::Control;
use super::vector::{format_vector, mirror_y, Vector3};
use crate::error::{GeometryError, GeometryResult};

// ---------------------------------------------------------------------------
// Section: one spanwise cut through a surface
// ---------------------------------------------------------------------------

/// Cross-section of a lifting surface. Sections of one control run share the
/// same `Arc<Control>`; value-equal but distinct instances mark separate runs.
#[derive(Debug, Clone)]
pub struct Section {
    pub leading_edge: Vector3,   // m, relative to the surface origin
    pub chord: f64,              // m
    pub inclination: f64,        // deg, positive = leading edge up
    pub airfoil: Arc<Airfoil>,
    pub control: Option<Arc<Control>>,
}

impl Section {
    pub fn new(
        leading_edge: Vector3,
        chord: f64,
        inclination: f64,
        airfoil: Arc<Airfoil>,
    ) -> GeometryResult<Self> {
        if !chord.is_finite() || chord < 0.0 {
            return Err(GeometryError::InvalidChord(chord));
        }
        Ok(Self {
            leading_edge,
            chord,
            inclination,
            airfoil,
            control: None,
        })
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.control = Some(Arc::new(control));
        self
    }

    /// Point at a chord fraction along the (inclined) chord line.
    pub fn position_at(&self, x_over_chord: f64) -> Vector3 {
        let inc = self.inclination.to_radians();
        let dir = Vector3::new(inc.cos(), 0.0, -inc.sin());
        self.leading_edge + dir * (self.chord * x_over_chord)
    }

    pub fn trailing_edge(&self) -> Vector3 {
        self.position_at(1.0)
    }

    /// Reflection across the XZ plane. The control is copied, never shared
    /// with the original.
    pub fn mirror(&self) -> Section {
        Section {
            leading_edge: mirror_y(&self.leading_edge),
            chord: self.chord,
            inclination: self.inclination,
            airfoil: Arc::clone(&self.airfoil),
            control: self.control.as_ref().map(|c| Arc::new(Control::clone(c))),
        }
    }

    /// True when both sections hold the very same control instance.
    pub fn shares_control_with(&self, other: &Section) -> bool {
        match (&self.control, &other.control) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn serialize(&self) -> String {
        let mut out = format!(
            "SECTION\n{} {} {}\n",
            format_vector(&self.leading_edge),
            self.chord,
            self.inclination
        );
        out.push_str(&self.airfoil.serialize());
        if let Some(control) = &self.control {
            out.push_str(&control.serialize());
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn naca() -> Arc<Airfoil> {
        Arc::new(Airfoil::from_code("0012").unwrap())
    }

    #[test]
    fn negative_chord_rejected() {
        assert!(Section::new(Vector3::zeros(), -0.1, 0.0, naca()).is_err());
        assert!(Section::new(Vector3::zeros(), f64::NAN, 0.0, naca()).is_err());
        assert!(Section::new(Vector3::zeros(), 0.0, 0.0, naca()).is_ok());
    }

    #[test]
    fn trailing_edge_drops_with_positive_incidence() {
        let s = Section::new(Vector3::new(1.0, 2.0, 0.0), 2.0, 30.0, naca()).unwrap();
        let te = s.trailing_edge();
        assert!((te.x - (1.0 + 2.0 * 30f64.to_radians().cos())).abs() < 1e-12);
        assert!((te.y - 2.0).abs() < 1e-12);
        assert!((te.z + 1.0).abs() < 1e-12);
    }

    #[test]
    fn mirror_copies_control() {
        let s = Section::new(Vector3::new(0.0, 3.0, 0.2), 1.0, 2.0, naca())
            .unwrap()
            .with_control(Control::aileron(0.7).unwrap());
        let m = s.mirror();
        assert_eq!(m.leading_edge, Vector3::new(0.0, -3.0, 0.2));
        assert!(!s.shares_control_with(&m));
        assert_eq!(s.control, m.control);
    }

    #[test]
    fn serialize_section_block() {
        let s = Section::new(Vector3::new(0.0, 1.5, 0.0), 0.8, -1.0, naca())
            .unwrap()
            .with_control(Control::flap(0.75).unwrap());
        assert_eq!(
            s.serialize(),
            "SECTION\n0 1.5 0 0.8 -1\nNACA 0 1\n0012\nCONTROL\nflap 1 0.75 0 0 0 +1\n"
        );
    }
}
