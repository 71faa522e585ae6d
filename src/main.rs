use avl_bridge::atmosphere;
use avl_bridge::geometry::presets;
use avl_bridge::io::csv;
use avl_bridge::{run_series, AbortFlag, SolverConfig};

fn main() {
    let config = SolverConfig::from_env();

    // -----------------------------------------------------------------------
    // Aircraft
    // -----------------------------------------------------------------------
    let mut geometry = match presets::glider() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("cannot build preset aircraft: {}", e);
            std::process::exit(1);
        }
    };
    let names: Vec<String> = geometry.surface_names().map(str::to_string).collect();
    for name in &names {
        if let Some(surface) = geometry.surface_mut(name) {
            surface.paneling = config.paneling();
        }
    }

    // -----------------------------------------------------------------------
    // Geometry summary
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  AVL GEOMETRY: {}", geometry.name);
    println!("====================================================================");
    println!();
    println!(
        "  Sref: {:>8.3} m^2   Cref: {:>7.3} m   Bref: {:>7.3} m",
        geometry.ref_area, geometry.ref_chord, geometry.ref_span
    );
    println!();
    println!(
        "  {:<10} {:<15} {:<10} {:>4} {:>8} {:>8} {:>7} {:>7}  Controls",
        "Surface", "Type", "Airfoil", "Secs", "Span", "Area", "AR", "Taper"
    );
    println!("  ─────────────────────────────────────────────────────────────────────────────");
    for s in geometry.surfaces() {
        let kind = s
            .get_type(config.classification_tolerance)
            .map_or("irregular".to_string(), |t| t.to_string());
        let controls: Vec<String> = s
            .mechanization()
            .iter()
            .flat_map(|(kind, ranges)| {
                ranges
                    .iter()
                    .map(move |r| format!("{} {:.2}..{:.2}", kind, r.start, r.end))
            })
            .collect();
        println!(
            "  {:<10} {:<15} {:<10} {:>4} {:>8.3} {:>8.3} {:>7.2} {:>7.2}  {}",
            s.name,
            kind,
            s.airfoil.label(),
            s.sections().len(),
            s.span(),
            s.area(),
            s.aspect_ratio(),
            s.taper_ratio(),
            controls.join(", ")
        );
    }
    println!();

    // -----------------------------------------------------------------------
    // Write the .avl file
    // -----------------------------------------------------------------------
    let out_path = "glider.avl";
    match geometry.save(out_path) {
        Ok(()) => println!("  Geometry written to {}", out_path),
        Err(e) => eprintln!("  Failed to write {}: {}", out_path, e),
    }

    // -----------------------------------------------------------------------
    // Alpha sweep (only with a configured solver)
    // -----------------------------------------------------------------------
    if std::env::var_os("AVL_EXECUTABLE").is_none() {
        println!("  Set AVL_EXECUTABLE to run an alpha sweep.");
        println!();
        return;
    }

    let altitude = 500.0;
    let alphas: Vec<f64> = (0..=5).map(|i| i as f64 * 2.0).collect();
    let conditions = vec![("alpha".to_string(), alphas)];
    println!(
        "  Alpha sweep at {:.0} m (rho = {:.4} kg/m^3) with {}",
        altitude,
        atmosphere::isa(altitude).density,
        config.executable.display()
    );
    let outcome = run_series(&config, &geometry, &conditions, altitude, &AbortFlag::new());

    if let Some(w) = &outcome.warnings {
        println!("  Solver warnings:\n{}", w);
    }
    if let Some(e) = &outcome.error {
        eprintln!("  Series failed: {}", e);
        std::process::exit(1);
    }

    for (i, case) in outcome.results.iter().enumerate() {
        println!();
        println!("  Case {}", i + 1);
        println!("  ─────────────────────────────────────────────────────────────────────────────");
        for group in case.grouped_forces() {
            let values: Vec<String> = group
                .values
                .iter()
                .map(|(k, v)| format!("{} = {:.5}", k, v))
                .collect();
            println!("  {:<18} {}", group.name, values.join("   "));
        }
    }

    let csv_path = "alpha_sweep.csv";
    match csv::write_series_file(csv_path, &outcome.results) {
        Ok(()) => println!("\n  Forces written to {}", csv_path),
        Err(e) => eprintln!("\n  Failed to write {}: {}", csv_path, e),
    }
    println!();
}
