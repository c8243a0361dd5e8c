//! The ideal Shockley diode, drawn as a reference next to the simulated curves.
//!
//! `I = Is * (exp(V / (n * Vt)) - 1)` with `Vt = k * T / q`.

use serde::{Deserialize, Serialize};

/// Boltzmann constant, in J/K.
pub const BOLTZMANN: f64 = 1.380649e-23;
/// Elementary charge, in C.
pub const ELEMENTARY_CHARGE: f64 = 1.602176634e-19;
/// 0 °C in kelvin.
pub const ZERO_CELSIUS: f64 = 273.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShockleyDiode {
    /// Saturation current, in amperes.
    pub is: f64,
    /// Ideality factor.
    pub n: f64,
    /// Junction temperature, in degrees Celsius.
    pub temperature: f64,
}

impl Default for ShockleyDiode {
    /// Is = 4 nA, n = 1 at 25 °C.
    fn default() -> Self {
        Self {
            is: 4e-9,
            n: 1.0,
            temperature: 25.0,
        }
    }
}

impl ShockleyDiode {
    pub fn new(is: f64) -> Self {
        Self {
            is,
            ..Default::default()
        }
    }

    /// `k * T / q`, in volts.
    pub fn thermal_voltage(&self) -> f64 {
        BOLTZMANN * (self.temperature + ZERO_CELSIUS) / ELEMENTARY_CHARGE
    }

    pub fn current(&self, voltage: f64) -> f64 {
        self.is * ((voltage / (self.n * self.thermal_voltage())).exp() - 1.0)
    }

    pub fn currents(&self, voltages: &[f64]) -> Vec<f64> {
        voltages.iter().map(|&v| self.current(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;

    #[test]
    fn test_thermal_voltage() {
        let diode = ShockleyDiode::default();
        assert_float_eq!(diode.thermal_voltage(), 0.025693, abs <= 1e-6);

        let cold = ShockleyDiode {
            temperature: 0.0,
            ..diode
        };
        assert!(cold.thermal_voltage() < diode.thermal_voltage());
    }

    #[test]
    fn test_current() {
        let diode = ShockleyDiode::new(4e-9);
        assert_eq!(diode.current(0.0), 0.0);
        // Deep reverse bias saturates at -Is.
        assert_float_eq!(diode.current(-2.0), -4e-9, r2nd <= 1e-12);

        let vt = diode.thermal_voltage();
        assert_float_eq!(
            diode.current(vt),
            4e-9 * (std::f64::consts::E - 1.0),
            r2nd <= 1e-12
        );
        assert_eq!(diode.currents(&[0.0, 0.1, 0.2]).len(), 3);
    }
}
