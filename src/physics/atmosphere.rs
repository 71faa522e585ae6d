use super::G0;

// ---------------------------------------------------------------------------
// ISA 1976 standard atmosphere, table driven (sea level to 86 km)
// ---------------------------------------------------------------------------

const R_AIR: f64 = 287.052_87; // J/(kg·K)
const GAMMA: f64 = 1.4;

/// Base of one atmospheric layer.
#[derive(Debug, Clone, Copy)]
struct Layer {
    base: f64,        // m
    temperature: f64, // K at the base
    lapse: f64,       // K/m
    pressure: f64,    // Pa at the base
}

const LAYERS: [Layer; 7] = [
    Layer { base: 0.0, temperature: 288.15, lapse: -0.0065, pressure: 101_325.0 },
    Layer { base: 11_000.0, temperature: 216.65, lapse: 0.0, pressure: 22_632.1 },
    Layer { base: 20_000.0, temperature: 216.65, lapse: 0.001, pressure: 5_474.89 },
    Layer { base: 32_000.0, temperature: 228.65, lapse: 0.0028, pressure: 868.019 },
    Layer { base: 47_000.0, temperature: 270.65, lapse: 0.0, pressure: 110.906 },
    Layer { base: 51_000.0, temperature: 270.65, lapse: -0.0028, pressure: 66.9389 },
    Layer { base: 71_000.0, temperature: 214.65, lapse: -0.002, pressure: 3.956_42 },
];

/// Highest altitude covered by the table; the top layer is held above it.
pub const CEILING: f64 = 86_000.0;

/// Air state at one altitude.
#[derive(Debug, Clone, Copy)]
pub struct Atmo {
    pub density: f64,      // kg/m^3
    pub pressure: f64,     // Pa
    pub temperature: f64,  // K
    pub sound_speed: f64,  // m/s
}

/// Standard atmosphere at `altitude_m`, clamped to [0, CEILING].
pub fn isa(altitude_m: f64) -> Atmo {
    let h = altitude_m.clamp(0.0, CEILING);
    let layer = LAYERS
        .iter()
        .rev()
        .find(|l| h >= l.base)
        .unwrap_or(&LAYERS[0]);

    let dh = h - layer.base;
    let temperature = layer.temperature + layer.lapse * dh;
    let pressure = if layer.lapse == 0.0 {
        layer.pressure * (-G0 * dh / (R_AIR * layer.temperature)).exp()
    } else {
        layer.pressure * (temperature / layer.temperature).powf(-G0 / (layer.lapse * R_AIR))
    };

    Atmo {
        density: pressure / (R_AIR * temperature),
        pressure,
        temperature,
        sound_speed: (GAMMA * R_AIR * temperature).sqrt(),
    }
}

/// Density only, for the run-case file.
pub fn density(altitude_m: f64) -> f64 {
    isa(altitude_m).density
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sea_level() {
        let a = isa(0.0);
        assert!((a.temperature - 288.15).abs() < 0.01);
        assert!((a.density - 1.225).abs() < 0.001);
        assert!((a.sound_speed - 340.29).abs() < 0.1);
    }

    #[test]
    fn layer_boundaries_are_continuous() {
        for l in &LAYERS[1..] {
            let below = isa(l.base - 1e-3);
            let above = isa(l.base);
            assert!((below.pressure - above.pressure).abs() / above.pressure < 1e-3);
            assert!((below.temperature - above.temperature).abs() < 0.01);
        }
    }

    #[test]
    fn density_decreases_with_altitude() {
        let samples: Vec<f64> = [0.0, 1_000.0, 5_000.0, 11_000.0, 25_000.0, 60_000.0]
            .iter()
            .map(|h| density(*h))
            .collect();
        assert!(samples.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn out_of_table_altitudes_clamp() {
        assert_eq!(density(-300.0), density(0.0));
        assert_eq!(density(120_000.0), density(CEILING));
    }
}
