use std::collections::BTreeMap;
use std::path::Path;

use super::surface::Surface;
use super::vector::Vector3;
use crate::error::{GeometryError, GeometryResult, ParseResult};
use crate::io::avl;

// ---------------------------------------------------------------------------
// Geometry: the whole aircraft as the solver sees it
// ---------------------------------------------------------------------------

/// Named surfaces plus the reference quantities of the `.avl` header.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub name: String,
    pub mach: f64,
    pub ref_area: f64,      // m^2
    pub ref_chord: f64,     // m
    pub ref_span: f64,      // m
    pub ref_pos: Vector3,   // m, moment reference point
    pub cd_p: f64,          // profile drag added to every case
    surfaces: BTreeMap<String, Surface>,
}

impl Geometry {
    /// Reference area defaults to `ref_chord * ref_span`.
    pub fn new(name: impl Into<String>, ref_chord: f64, ref_span: f64) -> Self {
        Self {
            name: name.into(),
            mach: 0.0,
            ref_area: ref_chord * ref_span,
            ref_chord,
            ref_span,
            ref_pos: Vector3::zeros(),
            cd_p: 0.0,
            surfaces: BTreeMap::new(),
        }
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.values()
    }

    pub fn surface_names(&self) -> impl Iterator<Item = &str> {
        self.surfaces.keys().map(String::as_str)
    }

    pub fn surface(&self, name: &str) -> Option<&Surface> {
        self.surfaces.get(name)
    }

    pub fn surface_mut(&mut self, name: &str) -> Option<&mut Surface> {
        self.surfaces.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn add_surface(&mut self, surface: Surface) -> GeometryResult<()> {
        if self.surfaces.contains_key(&surface.name) {
            return Err(GeometryError::DuplicateName(surface.name));
        }
        self.surfaces.insert(surface.name.clone(), surface);
        Ok(())
    }

    /// Swap in a surface with an existing name; returns the old one.
    pub fn replace_surface(&mut self, surface: Surface) -> GeometryResult<Surface> {
        match self.surfaces.get_mut(&surface.name) {
            Some(slot) => Ok(std::mem::replace(slot, surface)),
            None => Err(GeometryError::NotFound(surface.name)),
        }
    }

    pub fn remove_surface(&mut self, name: &str) -> GeometryResult<Surface> {
        self.surfaces
            .remove(name)
            .ok_or_else(|| GeometryError::NotFound(name.to_string()))
    }

    /// Take reference area, chord and span from one surface (usually the
    /// main wing).
    pub fn set_reference_from(&mut self, name: &str) -> GeometryResult<()> {
        let surface = self
            .surfaces
            .get(name)
            .ok_or_else(|| GeometryError::NotFound(name.to_string()))?;
        self.ref_area = surface.area();
        self.ref_chord = surface.mac();
        self.ref_span = surface.span();
        Ok(())
    }

    /// `.avl` text of the whole geometry.
    pub fn serialize(&self) -> String {
        avl::serialize_geometry(self)
    }

    pub fn parse(text: &str) -> ParseResult<Geometry> {
        avl::parse_geometry(text)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ParseResult<Geometry> {
        avl::read_geometry_file(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        avl::write_geometry_file(path, self)
    }
}

// ---------------------------------------------------------------------------
// Geometry builder
// ---------------------------------------------------------------------------

pub struct GeometryBuilder {
    name: String,
    mach: f64,
    ref_area: Option<f64>,
    ref_chord: f64,
    ref_span: f64,
    ref_pos: Vector3,
    reference_surface: Option<String>,
    surfaces: Vec<Surface>,
}

impl GeometryBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mach: 0.0,
            ref_area: None,
            ref_chord: 1.0,
            ref_span: 1.0,
            ref_pos: Vector3::zeros(),
            reference_surface: None,
            surfaces: vec![],
        }
    }

    pub fn mach(mut self, v: f64) -> Self { self.mach = v; self }
    pub fn ref_area(mut self, v: f64) -> Self { self.ref_area = Some(v); self }
    pub fn ref_chord(mut self, v: f64) -> Self { self.ref_chord = v; self }
    pub fn ref_span(mut self, v: f64) -> Self { self.ref_span = v; self }
    pub fn ref_pos(mut self, v: Vector3) -> Self { self.ref_pos = v; self }

    /// Derive reference quantities from the named surface at build time.
    pub fn reference_surface(mut self, name: impl Into<String>) -> Self {
        self.reference_surface = Some(name.into());
        self
    }

    pub fn surface(mut self, surface: Surface) -> Self {
        self.surfaces.push(surface);
        self
    }

    pub fn build(self) -> GeometryResult<Geometry> {
        let mut geometry = Geometry::new(self.name, self.ref_chord, self.ref_span);
        geometry.mach = self.mach;
        geometry.ref_pos = self.ref_pos;
        if let Some(area) = self.ref_area {
            geometry.ref_area = area;
        }
        for surface in self.surfaces {
            geometry.add_surface(surface)?;
        }
        if let Some(name) = self.reference_surface {
            geometry.set_reference_from(&name)?;
        }
        Ok(geometry)
    }
}

// ---------------------------------------------------------------------------
// Preset aircraft
// ---------------------------------------------------------------------------

pub mod presets {
    use std::sync::Arc;

    use super::*;
    use crate::geometry::airfoil::Airfoil;
    use crate::geometry::control::ControlKind;
    use crate::geometry::planform::{simple_tapered, vertical_fin, PlanformBuilder};
    use crate::geometry::surface::ControlRange;

    /// Conventional glider: tapered wing with flaps and ailerons, elevator
    /// on the horizontal tail, single fin.
    pub fn glider() -> GeometryResult<Geometry> {
        let wing_foil = Arc::new(Airfoil::from_code("2412")?);
        let tail_foil = Arc::new(Airfoil::from_code("0009")?);

        let mut wing = simple_tapered(
            "Wing",
            &PlanformBuilder::new()
                .root_chord(1.0)
                .tip_chord(0.5)
                .span(6.0)
                .sweep(2.0)
                .dihedral(4.0)
                .incidence(2.0)
                .twist(-2.0)
                .build(),
            wing_foil,
        )?;
        let half_span = wing.spanwise(wing.tip());
        wing.set_mechanization(
            ControlKind::Flap,
            &[ControlRange::new(0.3, 0.5 * half_span, 0.75)],
        )?;
        wing.set_mechanization(
            ControlKind::Aileron,
            &[ControlRange::new(0.55 * half_span, 0.95 * half_span, 0.75)],
        )?;

        let mut tail = simple_tapered(
            "Elevator",
            &PlanformBuilder::new()
                .root_chord(0.6)
                .tip_chord(0.4)
                .span(1.6)
                .sweep(5.0)
                .build(),
            Arc::clone(&tail_foil),
        )?
        .with_origin(Vector3::new(4.0, 0.0, 0.2));
        let tail_span = tail.spanwise(tail.tip());
        tail.set_mechanization(ControlKind::Elevator, &[ControlRange::new(0.0, tail_span, 0.6)])?;

        let fin = vertical_fin(
            "Fin",
            &PlanformBuilder::new()
                .root_chord(0.8)
                .tip_chord(0.45)
                .span(1.1)
                .sweep(30.0)
                .build(),
            tail_foil,
        )?
        .with_origin(Vector3::new(3.8, 0.0, 0.2));

        GeometryBuilder::new("Glider")
            .mach(0.0)
            .ref_pos(Vector3::new(0.25, 0.0, 0.0))
            .surface(wing)
            .surface(tail)
            .surface(fin)
            .reference_surface("Wing")
            .build()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
