//! Tracked ions and concentration profiles.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{OptError, OptResult};

/// Number of tracked ions.
pub const ION_COUNT: usize = 6;

/// An ion tracked by the optimizer, in matrix row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ion {
    /// Ca²⁺
    Calcium,
    /// Mg²⁺
    Magnesium,
    /// Na⁺
    Sodium,
    /// SO₄²⁻
    Sulfate,
    /// Cl⁻
    Chloride,
    /// HCO₃⁻
    Bicarbonate,
}

impl Ion {
    /// All ions in row order.
    pub const ALL: [Ion; ION_COUNT] = [
        Ion::Calcium,
        Ion::Magnesium,
        Ion::Sodium,
        Ion::Sulfate,
        Ion::Chloride,
        Ion::Bicarbonate,
    ];

    /// Row index of this ion in the contribution matrix.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Field name used in serialized profiles and error messages.
    pub fn key(self) -> &'static str {
        match self {
            Ion::Calcium => "calcium",
            Ion::Magnesium => "magnesium",
            Ion::Sodium => "sodium",
            Ion::Sulfate => "sulfate",
            Ion::Chloride => "chloride",
            Ion::Bicarbonate => "bicarbonate",
        }
    }

    /// Chemical symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Ion::Calcium => "Ca",
            Ion::Magnesium => "Mg",
            Ion::Sodium => "Na",
            Ion::Sulfate => "SO4",
            Ion::Chloride => "Cl",
            Ion::Bicarbonate => "HCO3",
        }
    }
}

impl fmt::Display for Ion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Concentrations in ppm (mg/L) for every tracked ion.
///
/// Profiles are values: there are no setters, arithmetic returns new
/// profiles. Base and target profiles must be finite and nonnegative (see
/// [`IonProfile::validate`]); derived profiles such as deviations may be
/// negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IonProfile {
    calcium: f64,
    magnesium: f64,
    sodium: f64,
    sulfate: f64,
    chloride: f64,
    bicarbonate: f64,
}

impl IonProfile {
    /// Create a profile from concentrations in row order.
    pub const fn new(
        calcium: f64,
        magnesium: f64,
        sodium: f64,
        sulfate: f64,
        chloride: f64,
        bicarbonate: f64,
    ) -> Self {
        Self {
            calcium,
            magnesium,
            sodium,
            sulfate,
            chloride,
            bicarbonate,
        }
    }

    /// Create a profile from an array in [`Ion::ALL`] order.
    pub const fn from_array(values: [f64; ION_COUNT]) -> Self {
        Self::new(values[0], values[1], values[2], values[3], values[4], values[5])
    }

    /// Concentrations in [`Ion::ALL`] order.
    pub fn to_array(&self) -> [f64; ION_COUNT] {
        [
            self.calcium,
            self.magnesium,
            self.sodium,
            self.sulfate,
            self.chloride,
            self.bicarbonate,
        ]
    }

    /// Concentration of one ion.
    pub fn get(&self, ion: Ion) -> f64 {
        self[ion]
    }

    /// Iterate `(ion, concentration)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (Ion, f64)> + '_ {
        Ion::ALL.into_iter().map(move |ion| (ion, self[ion]))
    }

    /// Apply `f` to every concentration.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::from_array(self.to_array().map(f))
    }

    /// `self - other`, per ion.
    pub fn difference(&self, other: &IonProfile) -> Self {
        let (a, b) = (self.to_array(), other.to_array());
        Self::from_array(std::array::from_fn(|i| a[i] - b[i]))
    }

    /// Sum of squared concentrations.
    pub fn squared_norm(&self) -> f64 {
        self.to_array().iter().map(|v| v * v).sum()
    }

    /// Largest absolute concentration.
    pub fn max_abs(&self) -> f64 {
        self.to_array().iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    /// Reject non-finite or negative concentrations.
    ///
    /// `field` names the profile in the error, e.g. `base` yields
    /// `base.sulfate`.
    pub fn validate(&self, field: &str) -> OptResult<()> {
        for (ion, value) in self.iter() {
            if !value.is_finite() {
                return Err(OptError::invalid_input(
                    format!("{}.{}", field, ion.key()),
                    format!("must be finite, got {}", value),
                ));
            }
            if value < 0.0 {
                return Err(OptError::invalid_input(
                    format!("{}.{}", field, ion.key()),
                    format!("must be nonnegative, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

impl Index<Ion> for IonProfile {
    type Output = f64;

    fn index(&self, ion: Ion) -> &f64 {
        match ion {
            Ion::Calcium => &self.calcium,
            Ion::Magnesium => &self.magnesium,
            Ion::Sodium => &self.sodium,
            Ion::Sulfate => &self.sulfate,
            Ion::Chloride => &self.chloride,
            Ion::Bicarbonate => &self.bicarbonate,
        }
    }
}

impl fmt::Display for IonProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (ion, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("  ")?;
            }
            write!(f, "{} {:.1}", ion.symbol(), value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ion_order_matches_index() {
        for (i, ion) in Ion::ALL.iter().enumerate() {
            assert_eq!(ion.index(), i);
        }
    }

    #[test]
    fn test_profile_accessors() {
        let p = IonProfile::new(22.0, 2.7, 12.0, 6.0, 14.0, 50.0);
        assert_eq!(p[Ion::Calcium], 22.0);
        assert_eq!(p.get(Ion::Bicarbonate), 50.0);
        assert_eq!(IonProfile::from_array(p.to_array()), p);
    }

    #[test]
    fn test_difference_and_norm() {
        let base = IonProfile::new(22.0, 2.7, 12.0, 6.0, 14.0, 50.0);
        let target = IonProfile::new(48.0, 2.7, 12.0, 60.0, 40.0, 50.0);
        let needed = target.difference(&base);

        assert_eq!(needed.to_array(), [26.0, 0.0, 0.0, 54.0, 26.0, 0.0]);
        assert!((needed.squared_norm() - (26.0 * 26.0 * 2.0 + 54.0 * 54.0)).abs() < 1e-9);
        assert_eq!(needed.max_abs(), 54.0);
    }

    #[test]
    fn test_validate_names_offending_ion() {
        let p = IonProfile::new(1.0, 1.0, 1.0, -0.5, 1.0, 1.0);
        let err = p.validate("target").unwrap_err();
        assert_eq!(err.field(), Some("target.sulfate"));

        let p = IonProfile::new(1.0, f64::NAN, 1.0, 1.0, 1.0, 1.0);
        assert_eq!(p.validate("base").unwrap_err().field(), Some("base.magnesium"));

        assert!(IonProfile::default().validate("base").is_ok());
    }

    #[test]
    fn test_serde_uses_ion_names() {
        let p = IonProfile::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["sulfate"], 4.0);
        let back: IonProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_display() {
        let p = IonProfile::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.04);
        assert_eq!(
            p.to_string(),
            "Ca 1.0  Mg 2.0  Na 3.0  SO4 4.0  Cl 5.0  HCO3 6.0"
        );
    }
}
