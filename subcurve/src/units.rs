use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SiValue {
    value: i64,
    prefix: SiPrefix,
}

impl SiValue {
    #[inline]
    pub fn zero() -> Self {
        Self::default()
    }

    #[inline]
    pub fn new(value: i64, prefix: SiPrefix) -> Self {
        Self { value, prefix }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn prefix(&self) -> SiPrefix {
        self.prefix
    }

    /// Creates a new [`SiValue`] by rounding to the given precision.
    ///
    /// For example, if [`SiPrefix::Micro`] is given, and `value` is given in Volts,
    /// `value` will be rounded to the nearest microvolt before being stored in the
    /// resulting [`SiValue`].
    pub fn with_precision(value: f64, precision: SiPrefix) -> Self {
        let value = (value / precision.multiplier()).round() as i64;
        Self {
            value,
            prefix: precision,
        }
    }
}

impl From<SiValue> for f64 {
    #[inline]
    fn from(value: SiValue) -> Self {
        value.value as f64 * value.prefix.multiplier()
    }
}

#[derive(
    Copy, Clone, Default, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum SiPrefix {
    Yocto,
    Zepto,
    Atto,
    Femto,
    Pico,
    Nano,
    Micro,
    Milli,
    #[default]
    None,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
    Zetta,
    Yotta,
}

impl SiPrefix {
    pub fn multiplier(&self) -> f64 {
        10f64.powi(self.exponent())
    }

    /// The power of ten this prefix stands for.
    pub fn exponent(&self) -> i32 {
        match self {
            SiPrefix::Yocto => -24,
            SiPrefix::Zepto => -21,
            SiPrefix::Atto => -18,
            SiPrefix::Femto => -15,
            SiPrefix::Pico => -12,
            SiPrefix::Nano => -9,
            SiPrefix::Micro => -6,
            SiPrefix::Milli => -3,
            SiPrefix::None => 0,
            SiPrefix::Kilo => 3,
            SiPrefix::Mega => 6,
            SiPrefix::Giga => 9,
            SiPrefix::Tera => 12,
            SiPrefix::Peta => 15,
            SiPrefix::Exa => 18,
            SiPrefix::Zetta => 21,
            SiPrefix::Yotta => 24,
        }
    }

    /// The SPICE scale suffix, if SPICE has one for this prefix.
    pub fn spice_suffix(&self) -> Option<&'static str> {
        Some(match *self {
            Self::Femto => "f",
            Self::Pico => "p",
            Self::Nano => "n",
            Self::Micro => "u",
            Self::Milli => "m",
            Self::None => "",
            Self::Kilo => "K",
            Self::Mega => "MEG",
            Self::Giga => "G",
            Self::Tera => "T",
            _ => return None,
        })
    }
}

impl Display for SiValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.value, self.prefix)
    }
}

impl Display for SiPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.spice_suffix() {
            Some(s) => write!(f, "{s}"),
            None => write!(f, "e{}", self.exponent()),
        }
    }
}
