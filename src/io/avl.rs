//! Reader and writer for the solver's `.avl` geometry format.
//!
//! Writing follows a fixed field order. Reading is tolerant: BODY blocks and
//! keywords the model cannot represent are logged and skipped.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use crate::error::{ParseError, ParseResult};
use crate::geometry::vector::{format_vector, scale, Vector3};
use crate::geometry::{Airfoil, Control, ControlKind, Geometry, Paneling, Section, Surface, SurfaceFlags};

const SURFACE_SEPARATOR: &str = "#==============================================================\n";

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Header block followed by every surface.
pub fn serialize_geometry(geometry: &Geometry) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", geometry.name));
    out.push_str(&format!("#Mach\n{}\n", geometry.mach));
    out.push_str("#IYsym IZsym Zsym\n0 0 0\n");
    out.push_str(&format!(
        "#Sref Cref Bref\n{} {} {}\n",
        geometry.ref_area, geometry.ref_chord, geometry.ref_span
    ));
    out.push_str(&format!("#Xref Yref Zref\n{}\n", format_vector(&geometry.ref_pos)));
    out.push_str(&format!("#CDp\n{}\n", geometry.cd_p));
    for surface in geometry.surfaces() {
        out.push_str(SURFACE_SEPARATOR);
        out.push_str(&surface.serialize());
    }
    out
}

pub fn write_geometry<W: Write>(writer: &mut W, geometry: &Geometry) -> io::Result<()> {
    writer.write_all(serialize_geometry(geometry).as_bytes())
}

pub fn write_geometry_file<P: AsRef<Path>>(path: P, geometry: &Geometry) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    write_geometry(&mut file, geometry)
}

// ---------------------------------------------------------------------------
// Lexing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Surface,
    Body,
    Component,
    YDuplicate,
    Scale,
    Translate,
    Angle,
    NoWake,
    NoAlbe,
    NoLoad,
    Cdcl,
    Section,
    Naca,
    Airfoil,
    Afile,
    Control,
    Claf,
    Design,
}

/// Keywords are recognised by their first four letters, case-insensitively.
fn keyword(text: &str) -> Option<Keyword> {
    let token = text.split_whitespace().next()?;
    let head: String = token.chars().take(4).collect::<String>().to_ascii_uppercase();
    let kw = match head.as_str() {
        "SURF" => Keyword::Surface,
        "BODY" => Keyword::Body,
        "COMP" | "INDE" => Keyword::Component,
        "YDUP" => Keyword::YDuplicate,
        "SCAL" => Keyword::Scale,
        "TRAN" => Keyword::Translate,
        "ANGL" => Keyword::Angle,
        "NOWA" => Keyword::NoWake,
        "NOAL" => Keyword::NoAlbe,
        "NOLO" => Keyword::NoLoad,
        "CDCL" => Keyword::Cdcl,
        "SECT" => Keyword::Section,
        "NACA" => Keyword::Naca,
        "AIRF" => Keyword::Airfoil,
        "AFIL" => Keyword::Afile,
        "CONT" => Keyword::Control,
        "CLAF" => Keyword::Claf,
        "DESI" => Keyword::Design,
        _ => return None,
    };
    Some(kw)
}

/// One meaningful input line with its 1-based line number.
#[derive(Debug, Clone)]
struct Line {
    number: usize,
    text: String,
}

/// Drop comment lines, blank lines and `|` annotations.
fn tokenize(text: &str) -> Vec<Line> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let trimmed = raw.trim_start();
            if trimmed.starts_with('#') || trimmed.starts_with('!') {
                return None;
            }
            let content = match trimmed.find('|') {
                Some(idx) => &trimmed[..idx],
                None => trimmed,
            };
            let content = content.trim();
            if content.is_empty() {
                None
            } else {
                Some(Line {
                    number: i + 1,
                    text: content.to_string(),
                })
            }
        })
        .collect()
}

struct Cursor {
    lines: Vec<Line>,
    pos: usize,
}

impl Cursor {
    fn next(&mut self, what: &'static str) -> ParseResult<Line> {
        let line = self
            .lines
            .get(self.pos)
            .cloned()
            .ok_or(ParseError::UnexpectedEof(what))?;
        self.pos += 1;
        Ok(line)
    }

    fn peek(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    fn peek_keyword(&self) -> Option<Keyword> {
        self.peek().and_then(|l| keyword(&l.text))
    }

    /// Next line as at least `n` numbers; extra tokens are ignored.
    fn numbers(&mut self, n: usize, what: &'static str) -> ParseResult<Vec<f64>> {
        let line = self.next(what)?;
        let values: Vec<f64> = line
            .text
            .split_whitespace()
            .map_while(|t| t.parse::<f64>().ok())
            .collect();
        if values.len() < n {
            return Err(ParseError::Malformed {
                line: line.number,
                expected: what,
                found: line.text,
            });
        }
        Ok(values)
    }

    fn vector(&mut self, what: &'static str) -> ParseResult<Vector3> {
        let v = self.numbers(3, what)?;
        Ok(Vector3::new(v[0], v[1], v[2]))
    }

    /// Skip to the next line starting a SURFACE or BODY block.
    fn skip_to_block(&mut self) {
        while self.peek().is_some()
            && !matches!(self.peek_keyword(), Some(Keyword::Surface | Keyword::Body))
        {
            self.pos += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

pub fn read_geometry_file<P: AsRef<Path>>(path: P) -> ParseResult<Geometry> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_geometry(&text)
}

/// Parse `.avl` text: fixed-order header, then SURFACE / BODY blocks.
pub fn parse_geometry(text: &str) -> ParseResult<Geometry> {
    let mut cur = Cursor {
        lines: tokenize(text),
        pos: 0,
    };

    let name = cur.next("configuration name")?.text;
    let mach = cur.numbers(1, "Mach number")?[0];
    let sym = cur.numbers(3, "IYsym IZsym Zsym")?;
    if sym.iter().any(|v| *v != 0.0) {
        log::warn!("symmetry flags {:?} are not supported, reading as 0 0 0", sym);
    }
    let refs = cur.numbers(3, "Sref Cref Bref")?;
    let ref_pos = cur.vector("Xref Yref Zref")?;

    let mut geometry = Geometry::new(name, refs[1], refs[2]);
    geometry.mach = mach;
    geometry.ref_area = refs[0];
    geometry.ref_pos = ref_pos;

    if let Some(line) = cur.peek() {
        if keyword(&line.text).is_none() {
            if let Ok(cd_p) = line.text.split_whitespace().next().unwrap_or("").parse::<f64>() {
                geometry.cd_p = cd_p;
                cur.pos += 1;
            }
        }
    }

    loop {
        match cur.peek_keyword() {
            Some(Keyword::Surface) => {
                cur.pos += 1;
                let surface = parse_surface(&mut cur)?;
                log::debug!("parsed surface '{}' ({} sections)", surface.name, surface.sections().len());
                geometry.add_surface(surface)?;
            }
            Some(Keyword::Body) => {
                let line = cur.next("BODY")?;
                log::warn!("line {}: BODY blocks are not supported, skipped", line.number);
                cur.skip_to_block();
            }
            _ => match cur.peek() {
                Some(line) => {
                    log::warn!("line {}: unexpected '{}', skipped", line.number, line.text);
                    cur.pos += 1;
                }
                None => break,
            },
        }
    }

    Ok(geometry)
}

/// Section data as read, before SCALE / ANGLE are applied.
struct RawSection {
    leading_edge: Vector3,
    chord: f64,
    inclination: f64,
    airfoil: Airfoil,
    control: Option<Control>,
}

fn parse_surface(cur: &mut Cursor) -> ParseResult<Surface> {
    let name = cur.next("surface name")?.text;
    let pan = cur.numbers(2, "Nchord Cspace")?;
    if pan.len() >= 4 {
        log::debug!("{}: spanwise paneling on the surface line ignored", name);
    }
    let paneling = Paneling {
        chordwise: pan[0].round().max(1.0) as u32,
        chord_spacing: pan[1],
    };

    let mut flags = SurfaceFlags::default();
    let mut y_duplicate = false;
    let mut scale_factors = Vector3::new(1.0, 1.0, 1.0);
    let mut origin = Vector3::zeros();
    let mut angle = 0.0;
    let mut raw_sections = Vec::new();

    while let Some(line) = cur.peek() {
        let kw = match keyword(&line.text) {
            Some(Keyword::Surface | Keyword::Body) => break,
            Some(kw) => kw,
            None => {
                log::warn!("line {}: '{}' ignored in surface {}", line.number, line.text, name);
                cur.pos += 1;
                continue;
            }
        };
        let line = cur.next("surface keyword")?;
        match kw {
            Keyword::Component => {
                flags.component = Some(cur.numbers(1, "component index")?[0] as u32);
            }
            Keyword::YDuplicate => {
                let offset = cur.numbers(1, "YDUPLICATE offset")?[0];
                if offset == 0.0 {
                    y_duplicate = true;
                } else {
                    log::warn!(
                        "line {}: YDUPLICATE about y = {} is not supported, ignored",
                        line.number,
                        offset
                    );
                }
            }
            Keyword::Scale => scale_factors = cur.vector("SCALE factors")?,
            Keyword::Translate => origin = cur.vector("TRANSLATE offset")?,
            Keyword::Angle => angle = cur.numbers(1, "ANGLE")?[0],
            Keyword::NoWake => flags.no_wake = true,
            Keyword::NoAlbe => flags.no_albe = true,
            Keyword::NoLoad => flags.no_load = true,
            Keyword::Cdcl => {
                log::warn!("line {}: CDCL polars are not supported, ignored", line.number);
                cur.next("CDCL data")?;
            }
            Keyword::Section => raw_sections.push(parse_section(cur)?),
            other => {
                log::warn!("line {}: {:?} outside of a section ignored", line.number, other);
            }
        }
    }

    let sections = raw_sections
        .into_iter()
        .map(|raw| -> ParseResult<Section> {
            let mut section = Section::new(
                scale(&raw.leading_edge, &scale_factors),
                raw.chord * scale_factors.x,
                raw.inclination + angle,
                Arc::new(raw.airfoil),
            )?;
            if let Some(control) = raw.control {
                section = section.with_control(control);
            }
            Ok(section)
        })
        .collect::<ParseResult<Vec<_>>>()?;

    let default_airfoil = sections
        .first()
        .map(|s| Arc::clone(&s.airfoil))
        .unwrap_or_default();
    let mut surface = Surface::new(name, sections, y_duplicate, origin, default_airfoil)?
        .with_paneling(paneling);
    surface.flags = flags;
    surface.adopt_control_runs();
    Ok(surface)
}

fn parse_section(cur: &mut Cursor) -> ParseResult<RawSection> {
    let v = cur.numbers(5, "Xle Yle Zle Chord Ainc")?;
    let mut raw = RawSection {
        leading_edge: Vector3::new(v[0], v[1], v[2]),
        chord: v[3],
        inclination: v[4],
        airfoil: Airfoil::Empty,
        control: None,
    };

    while let Some(kw) = cur.peek_keyword() {
        if !matches!(
            kw,
            Keyword::Naca | Keyword::Airfoil | Keyword::Afile | Keyword::Control | Keyword::Claf | Keyword::Design
        ) {
            break;
        }
        let line = cur.next("section keyword")?;
        let range = active_range(&line.text);
        match kw {
            Keyword::Naca => {
                let code = cur.next("NACA code")?;
                raw.airfoil = Airfoil::from_code(&code.text)?.with_active_range(range);
            }
            Keyword::Airfoil => {
                let mut coords = Vec::new();
                while let Some(next) = cur.peek() {
                    if keyword(&next.text).is_some() || !is_coordinate_line(&next.text) {
                        break;
                    }
                    coords.push(next.text.clone());
                    cur.pos += 1;
                }
                raw.airfoil = Airfoil::from_points(coords.iter().map(String::as_str)).with_active_range(range);
            }
            Keyword::Afile => {
                let file = cur.next("AFILE name")?;
                log::warn!(
                    "line {}: external airfoil file '{}' not loaded, using a flat plate",
                    file.number,
                    file.text
                );
            }
            Keyword::Control => {
                let control = parse_control(cur)?;
                if raw.control.is_some() {
                    log::warn!("line {}: only one control per section is kept", line.number);
                } else {
                    raw.control = Some(control);
                }
            }
            _ => {
                log::warn!("line {}: {:?} is not supported, ignored", line.number, kw);
                cur.next("keyword data")?;
            }
        }
    }
    Ok(raw)
}

/// `name gain Xhinge XYZhvec SgnDup`
fn parse_control(cur: &mut Cursor) -> ParseResult<Control> {
    let line = cur.next("CONTROL data")?;
    let tokens: Vec<&str> = line.text.split_whitespace().collect();
    let numbers: Vec<f64> = tokens.iter().skip(1).filter_map(|t| t.parse().ok()).collect();
    if tokens.len() < 3 || numbers.len() < 2 {
        return Err(ParseError::Malformed {
            line: line.number,
            expected: "control name, gain and hinge",
            found: line.text,
        });
    }
    let (name, gain, x_hinge) = (tokens[0], numbers[0], numbers[1]);
    let sign_duplicate = numbers.get(5).map_or(true, |s| *s >= 0.0);

    let preset = ControlKind::from_name(name).and_then(|k| Control::preset(k, x_hinge).ok());
    let mut control = match preset {
        Some(c) => c,
        None => Control::new(name, x_hinge, sign_duplicate)?,
    };
    control.sign_duplicate = sign_duplicate;
    Ok(control.with_gain(gain))
}

/// Optional `X1 X2` after NACA / AIRFOIL.
fn active_range(keyword_line: &str) -> (f64, f64) {
    let v: Vec<f64> = keyword_line
        .split_whitespace()
        .skip(1)
        .filter_map(|t| t.parse().ok())
        .collect();
    if v.len() >= 2 {
        (v[0], v[1])
    } else {
        crate::geometry::airfoil::FULL_CHORD
    }
}

fn is_coordinate_line(text: &str) -> bool {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .all(|t| t.parse::<f64>().is_ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
