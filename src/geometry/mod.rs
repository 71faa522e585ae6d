//! Parametric aircraft geometry: airfoils, controls, sections, surfaces and
//! the aircraft aggregate written to `.avl` files.

pub mod vector;
pub mod airfoil;
pub mod control;
pub mod section;
pub mod surface;
pub mod planform;
pub mod aircraft;

pub use vector::Vector3;
pub use airfoil::Airfoil;
pub use control::{Control, ControlKind};
pub use section::Section;
pub use surface::{ControlRange, Mechanization, Paneling, SpanAxis, Surface, SurfaceFlags, SurfaceType};
pub use planform::{delta, double_trapez, simple_tapered, twin, vertical_fin, Planform, PlanformBuilder};
pub use aircraft::{presets, Geometry, GeometryBuilder};
