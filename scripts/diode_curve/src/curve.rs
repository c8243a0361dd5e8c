//! Post-processing of the simulated diode arrays.
//!
//! Reverse currents are many orders of magnitude smaller than forward
//! currents, so both are scaled onto one axis with a different factor:
//! reverse samples are shown in units of 10 pA, forward samples in mA.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use subcurve::error::{ErrorSource, Result};

/// Scale factor applied to currents at non-positive voltages.
pub const REVERSE_SCALE: f64 = 1e11;
/// Scale factor applied to currents at positive voltages.
pub const FORWARD_SCALE: f64 = 1e3;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BiasRegion {
    Reverse,
    Forward,
}

impl BiasRegion {
    /// The region a diode voltage falls in. Zero counts as reverse bias.
    #[inline]
    pub fn of(voltage: f64) -> Self {
        if voltage <= 0.0 {
            Self::Reverse
        } else {
            Self::Forward
        }
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        match self {
            Self::Reverse => REVERSE_SCALE,
            Self::Forward => FORWARD_SCALE,
        }
    }
}

#[inline]
pub fn scale_current(voltage: f64, current: f64) -> f64 {
    current * BiasRegion::of(voltage).scale()
}

fn check_lengths(voltages: &[f64], currents: &[f64]) -> Result<()> {
    if voltages.len() != currents.len() {
        return Err(ErrorSource::InvalidArgs(format!(
            "got {} voltages but {} currents",
            voltages.len(),
            currents.len()
        ))
        .into());
    }
    Ok(())
}

/// Scales each current by the factor of the region its voltage falls in.
pub fn scale_currents(voltages: &[f64], currents: &[f64]) -> Result<Vec<f64>> {
    check_lengths(voltages, currents)?;
    Ok(voltages
        .iter()
        .zip(currents)
        .map(|(&v, &i)| scale_current(v, i))
        .collect())
}

/// `v / i` at every sample.
///
/// Samples with zero current give an infinite or NaN resistance.
pub fn static_resistance(voltages: &[f64], currents: &[f64]) -> Result<Vec<f64>> {
    check_lengths(voltages, currents)?;
    Ok(voltages
        .iter()
        .zip(currents)
        .map(|(v, i)| v / i)
        .collect())
}

/// A resistance value and the diode voltage it is plotted against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResistancePoint {
    pub voltage: f64,
    pub resistance: f64,
}

/// The slope `dv / di` between consecutive samples.
///
/// Returns one point fewer than there are samples. Each slope is paired with
/// the voltage of the later sample of its pair.
pub fn dynamic_resistance(voltages: &[f64], currents: &[f64]) -> Result<Vec<ResistancePoint>> {
    check_lengths(voltages, currents)?;
    Ok(voltages
        .iter()
        .zip(currents)
        .tuple_windows()
        .map(|((v0, i0), (v1, i1))| ResistancePoint {
            voltage: *v1,
            resistance: (v1 - v0) / (i1 - i0),
        })
        .collect())
}

/// Whether a resistance can be drawn on a logarithmic axis.
#[inline]
pub fn is_plottable(resistance: f64) -> bool {
    resistance.is_finite() && resistance > 0.0
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;

    #[test]
    fn test_bias_region() {
        assert_eq!(BiasRegion::of(-1.0), BiasRegion::Reverse);
        assert_eq!(BiasRegion::of(0.0), BiasRegion::Reverse);
        assert_eq!(BiasRegion::of(-0.0), BiasRegion::Reverse);
        assert_eq!(BiasRegion::of(1e-12), BiasRegion::Forward);
    }

    #[test]
    fn test_scale_currents() {
        let voltages = [-2.0, 0.0, 0.5, 0.8];
        let currents = [-4e-9, 0.0, 1e-6, 0.2];
        let scaled = scale_currents(&voltages, &currents).unwrap();
        assert_eq!(scaled.len(), voltages.len());
        assert_float_eq!(scaled[0], -400.0, r2nd <= 1e-12);
        assert_eq!(scaled[1], 0.0);
        assert_float_eq!(scaled[2], 1e-3, r2nd <= 1e-12);
        assert_float_eq!(scaled[3], 200.0, r2nd <= 1e-12);
    }

    #[test]
    fn test_scale_factor_follows_sign() {
        let voltages = (-200..=500).map(|i| i as f64 * 0.01).collect::<Vec<_>>();
        let currents = vec![1.0; voltages.len()];
        let scaled = scale_currents(&voltages, &currents).unwrap();
        assert_eq!(scaled.len(), voltages.len());
        for (v, s) in voltages.iter().zip(scaled) {
            let expected = if *v <= 0.0 { 1e11 } else { 1e3 };
            assert_eq!(s, expected, "voltage {v}");
        }
    }

    #[test]
    fn test_static_resistance() {
        let r = static_resistance(&[0.7, 0.0, -1.0], &[0.07, 0.0, -1e-9]).unwrap();
        assert_float_eq!(r[0], 10.0, r2nd <= 1e-12);
        assert!(r[1].is_nan());
        assert_float_eq!(r[2], 1e9, r2nd <= 1e-12);
        assert!(is_plottable(r[0]));
        assert!(!is_plottable(r[1]));
    }

    #[test]
    fn test_dynamic_resistance() {
        let voltages = [0.6, 0.7, 0.75, 0.75];
        let currents = [0.0, 0.01, 0.06, 0.06];
        let r = dynamic_resistance(&voltages, &currents).unwrap();
        assert_eq!(r.len(), voltages.len() - 1);
        assert_float_eq!(r[0].voltage, 0.7, abs <= 1e-15);
        assert_float_eq!(r[0].resistance, 10.0, r2nd <= 1e-9);
        assert_float_eq!(r[1].voltage, 0.75, abs <= 1e-15);
        assert_float_eq!(r[1].resistance, 1.0, r2nd <= 1e-9);
        // Repeated samples have no slope.
        assert!(!is_plottable(r[2].resistance));
    }

    #[test]
    fn test_short_series() {
        assert!(dynamic_resistance(&[], &[]).unwrap().is_empty());
        assert!(dynamic_resistance(&[0.5], &[1e-3]).unwrap().is_empty());
        assert!(scale_currents(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_lengths() {
        for err in [
            scale_currents(&[0.0, 1.0], &[0.0]).unwrap_err(),
            static_resistance(&[0.0], &[]).unwrap_err(),
            dynamic_resistance(&[0.0, 1.0, 2.0], &[0.0, 1.0]).unwrap_err(),
        ] {
            assert!(matches!(err.source(), ErrorSource::InvalidArgs(_)));
        }
    }
}
