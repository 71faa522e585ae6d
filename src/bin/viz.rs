use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};

use avl_bridge::geometry::vector::mirror_y;
use avl_bridge::geometry::{presets, Geometry, Surface, Vector3};

fn main() -> eframe::Result {
    let geometry = match std::env::args().nth(1) {
        Some(path) => Geometry::load(&path).unwrap_or_else(|e| {
            eprintln!("cannot load {}: {}", path, e);
            std::process::exit(1);
        }),
        None => presets::glider().unwrap_or_else(|e| {
            eprintln!("cannot build preset aircraft: {}", e);
            std::process::exit(1);
        }),
    };

    let app = GeometryViz { geometry };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("AVL Geometry", options, Box::new(|_| Ok(Box::new(app))))
}

struct GeometryViz {
    geometry: Geometry,
}

/// Both halves of a surface: the defined one and, if duplicated, its mirror.
fn halves(surface: &Surface) -> Vec<Vec<(Vector3, Vector3)>> {
    let edges: Vec<(Vector3, Vector3)> = surface
        .sections()
        .iter()
        .map(|s| (s.leading_edge + surface.origin, s.trailing_edge() + surface.origin))
        .collect();
    let mut out = vec![edges.clone()];
    if surface.y_duplicate {
        out.push(edges.iter().map(|(le, te)| (mirror_y(le), mirror_y(te))).collect());
    }
    out
}

/// Closed planform outline: leading edges out, trailing edges back.
fn outline(edges: &[(Vector3, Vector3)], project: impl Fn(&Vector3) -> [f64; 2]) -> PlotPoints {
    let mut points: Vec<[f64; 2]> = edges.iter().map(|(le, _)| project(le)).collect();
    points.extend(edges.iter().rev().map(|(_, te)| project(te)));
    if let Some(first) = points.first().copied() {
        points.push(first);
    }
    points.into_iter().collect()
}

/// Hinge lines of every control run, in the control's color.
fn hinge_lines(surface: &Surface) -> Vec<(String, egui::Color32, PlotPoints)> {
    let mut out = Vec::new();
    let sections = surface.sections();
    for pair in sections.windows(2) {
        let (Some(a), Some(_)) = (&pair[0].control, &pair[1].control) else {
            continue;
        };
        if !pair[0].shares_control_with(&pair[1]) {
            continue;
        }
        let p0 = pair[0].position_at(a.x_hinge.abs()) + surface.origin;
        let p1 = pair[1].position_at(a.x_hinge.abs()) + surface.origin;
        let [r, g, b] = a.color;
        let mut halves = vec![(p0, p1)];
        if surface.y_duplicate {
            halves.push((mirror_y(&p0), mirror_y(&p1)));
        }
        for (q0, q1) in halves {
            let points: PlotPoints = [[q0.y, -q0.x], [q1.y, -q1.x]].into_iter().collect();
            out.push((a.name.clone(), egui::Color32::from_rgb(r, g, b), points));
        }
    }
    out
}

impl eframe::App for GeometryViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let g = &self.geometry;

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Aircraft: {}", g.name));
            ui.label(format!(
                "Sref: {:.3} m^2  |  Cref: {:.3} m  |  Bref: {:.3} m  |  Surfaces: {}",
                g.ref_area,
                g.ref_chord,
                g.ref_span,
                g.len(),
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;

            ui.horizontal(|ui| {
                // Top view: span to the right, nose up
                ui.vertical(|ui| {
                    ui.label("Top view (m)");
                    Plot::new("top")
                        .width(half_w)
                        .height(available.y - 24.0)
                        .x_axis_label("y (m)")
                        .data_aspect(1.0)
                        .show(ui, |plot_ui| {
                            for s in g.surfaces() {
                                for edges in halves(s) {
                                    plot_ui.line(Line::new(s.name.clone(), outline(&edges, |v| [v.y, -v.x])));
                                }
                                for (name, color, points) in hinge_lines(s) {
                                    plot_ui.line(Line::new(name, points).color(color));
                                }
                            }
                        });
                });

                // Front view
                ui.vertical(|ui| {
                    ui.label("Front view (m)");
                    Plot::new("front")
                        .width(half_w)
                        .height(available.y - 24.0)
                        .x_axis_label("y (m)")
                        .data_aspect(1.0)
                        .show(ui, |plot_ui| {
                            for s in g.surfaces() {
                                for edges in halves(s) {
                                    let points: PlotPoints =
                                        edges.iter().map(|(le, _)| [le.y, le.z]).collect();
                                    plot_ui.line(Line::new(s.name.clone(), points));
                                }
                            }
                        });
                });
            });
        });
    }
}
