use std::fmt;

use crate::error::{GeometryError, GeometryResult};

// ---------------------------------------------------------------------------
// Control kinds (closed set of presets)
// ---------------------------------------------------------------------------

/// Preset control-surface types. Each fixes the solver name, the sign
/// convention on the mirrored half and a display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlKind {
    Flap,
    Aileron,
    Elevator,
}

impl ControlKind {
    pub const ALL: [ControlKind; 3] = [ControlKind::Flap, ControlKind::Aileron, ControlKind::Elevator];

    pub fn name(self) -> &'static str {
        match self {
            ControlKind::Flap => "flap",
            ControlKind::Aileron => "aileron",
            ControlKind::Elevator => "elevator",
        }
    }

    /// Ailerons deflect antisymmetrically, flaps and elevators symmetrically.
    pub fn sign_duplicate(self) -> bool {
        !matches!(self, ControlKind::Aileron)
    }

    pub fn color(self) -> [u8; 3] {
        match self {
            ControlKind::Flap => [0x1f, 0x77, 0xb4],
            ControlKind::Aileron => [0xd6, 0x27, 0x28],
            ControlKind::Elevator => [0x2c, 0xa0, 0x2c],
        }
    }

    /// Case-insensitive lookup by solver name.
    pub fn from_name(name: &str) -> Option<ControlKind> {
        ControlKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Control descriptor
// ---------------------------------------------------------------------------

/// Control surface hinged at `x_hinge` (chord fraction). Negative hinge
/// values follow the solver convention of a surface ahead of the hinge.
#[derive(Debug, Clone)]
pub struct Control {
    pub name: String,
    pub x_hinge: f64,
    pub sign_duplicate: bool,
    pub gain: f64,
    pub color: [u8; 3],
    pub kind: Option<ControlKind>,
}

impl Control {
    /// Free-form control with `x_hinge` in (-1, 1).
    pub fn new(name: impl Into<String>, x_hinge: f64, sign_duplicate: bool) -> GeometryResult<Self> {
        if !(x_hinge > -1.0 && x_hinge < 1.0) {
            return Err(GeometryError::HingeOutOfRange {
                x_hinge,
                domain: "(-1, 1)",
            });
        }
        Ok(Self {
            name: name.into(),
            x_hinge,
            sign_duplicate,
            gain: 1.0,
            color: [0x7f, 0x7f, 0x7f],
            kind: None,
        })
    }

    /// Preset control; the hinge must lie strictly inside the chord.
    pub fn preset(kind: ControlKind, x_hinge: f64) -> GeometryResult<Self> {
        if !(x_hinge > 0.0 && x_hinge < 1.0) {
            return Err(GeometryError::HingeOutOfRange {
                x_hinge,
                domain: "(0, 1)",
            });
        }
        let mut control = Control::new(kind.name(), x_hinge, kind.sign_duplicate())?;
        control.color = kind.color();
        control.kind = Some(kind);
        Ok(control)
    }

    pub fn flap(x_hinge: f64) -> GeometryResult<Self> {
        Control::preset(ControlKind::Flap, x_hinge)
    }

    pub fn aileron(x_hinge: f64) -> GeometryResult<Self> {
        Control::preset(ControlKind::Aileron, x_hinge)
    }

    pub fn elevator(x_hinge: f64) -> GeometryResult<Self> {
        Control::preset(ControlKind::Elevator, x_hinge)
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    /// CONTROL sub-block of a SECTION (hinge axis left to the solver).
    pub fn serialize(&self) -> String {
        format!(
            "CONTROL\n{} {} {} 0 0 0 {}\n",
            self.name,
            self.gain,
            self.x_hinge,
            if self.sign_duplicate { "+1" } else { "-1" }
        )
    }
}

/// Value equality: same preset (or name) and same hinge line.
impl PartialEq for Control {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name && self.x_hinge == other.x_hinge
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_fix_name_and_sign() {
        let a = Control::aileron(0.7).unwrap();
        assert_eq!(a.name, "aileron");
        assert!(!a.sign_duplicate);
        let f = Control::flap(0.75).unwrap();
        assert!(f.sign_duplicate);
        assert_eq!(f.kind, Some(ControlKind::Flap));
    }

    #[test]
    fn hinge_domains() {
        assert!(Control::new("tab", -0.5, true).is_ok());
        assert!(Control::new("tab", 1.0, true).is_err());
        assert!(Control::elevator(0.0).is_err());
        assert!(Control::elevator(-0.3).is_err());
        assert!(Control::elevator(0.99).is_ok());
    }

    #[test]
    fn serialize_uses_signed_duplicate_token() {
        let a = Control::aileron(0.7).unwrap();
        assert_eq!(a.serialize(), "CONTROL\naileron 1 0.7 0 0 0 -1\n");
        let e = Control::elevator(0.6).unwrap().with_gain(2.0);
        assert_eq!(e.serialize(), "CONTROL\nelevator 2 0.6 0 0 0 +1\n");
    }

    #[test]
    fn equality_ignores_gain_but_not_hinge() {
        let a = Control::flap(0.7).unwrap();
        assert_eq!(a, Control::flap(0.7).unwrap().with_gain(3.0));
        assert_ne!(a, Control::flap(0.8).unwrap());
        assert_ne!(a, Control::aileron(0.7).unwrap());
    }

    #[test]
    fn kind_lookup_is_case_insensitive() {
        assert_eq!(ControlKind::from_name("Aileron"), Some(ControlKind::Aileron));
        assert_eq!(ControlKind::from_name("rudder"), None);
    }
}
