//! Additive masses and their rounded display copies.
//!
//! [`AdditiveMasses`] carries full precision and is the only form used for
//! profile arithmetic. [`DisplayMasses`] and [`DisplayProfile`] are derived
//! from full-precision values and cannot be turned back into them.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::catalog::{catalog, AdditiveId, ADDITIVE_COUNT};
use super::ion::{Ion, IonProfile, ION_COUNT};

/// Round to one decimal; anything that rounds below 0.1 in magnitude is 0.
///
/// Idempotent: `round_for_display(round_for_display(v)) == round_for_display(v)`.
pub fn round_for_display(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.abs() < 0.1 {
        0.0
    } else {
        rounded
    }
}

/// Grams of each catalog additive, full precision.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdditiveMasses([f64; ADDITIVE_COUNT]);

impl AdditiveMasses {
    /// No additions.
    pub fn zeros() -> Self {
        Self([0.0; ADDITIVE_COUNT])
    }

    /// Masses in [`AdditiveId::ALL`] order.
    pub fn from_grams(grams: [f64; ADDITIVE_COUNT]) -> Self {
        Self(grams)
    }

    /// Grams of one additive.
    pub fn grams(&self, id: AdditiveId) -> f64 {
        self.0[id.index()]
    }

    /// Masses in column order.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Iterate `(additive, grams)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (AdditiveId, f64)> + '_ {
        AdditiveId::ALL.into_iter().map(move |id| (id, self.0[id.index()]))
    }

    /// Total grams added.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// True if nothing is added.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&g| g == 0.0)
    }

    /// Dissolve these masses in `volume_l` liters of `base` water.
    ///
    /// Walks the catalog directly rather than a contribution matrix, so it
    /// can be used to cross-check a solver result.
    pub fn apply_to(&self, base: &IonProfile, volume_l: f64) -> IonProfile {
        let mut ppm = base.to_array();
        for additive in catalog() {
            let grams = self.grams(additive.id);
            for &(ion, per_gram) in additive.contributions() {
                ppm[ion.index()] += grams * per_gram / volume_l;
            }
        }
        IonProfile::from_array(ppm)
    }

    /// Rounded copy for presentation.
    pub fn to_display(&self) -> DisplayMasses {
        DisplayMasses(self.0.map(round_for_display))
    }
}

/// Grams of each additive, rounded for presentation only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMasses([f64; ADDITIVE_COUNT]);

impl DisplayMasses {
    /// Rounded grams of one additive.
    pub fn grams(&self, id: AdditiveId) -> f64 {
        self.0[id.index()]
    }

    /// Iterate `(additive, rounded grams)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (AdditiveId, f64)> + '_ {
        AdditiveId::ALL.into_iter().map(move |id| (id, self.0[id.index()]))
    }
}

/// An ion profile rounded for presentation only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayProfile([f64; ION_COUNT]);

impl DisplayProfile {
    /// Round every concentration of `profile`.
    pub fn from_profile(profile: &IonProfile) -> Self {
        Self(profile.to_array().map(round_for_display))
    }

    /// Rounded concentration of one ion.
    pub fn get(&self, ion: Ion) -> f64 {
        self.0[ion.index()]
    }

    /// Iterate `(ion, rounded ppm)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (Ion, f64)> + '_ {
        Ion::ALL.into_iter().map(move |ion| (ion, self.0[ion.index()]))
    }
}

fn serialize_keyed<'a, S, I>(serializer: S, entries: I) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    I: ExactSizeIterator<Item = (&'a str, f64)>,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, &value)?;
    }
    map.end()
}

impl Serialize for AdditiveMasses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_keyed(serializer, AdditiveId::ALL.iter().map(|id| (id.key(), self.grams(*id))))
    }
}

impl Serialize for DisplayMasses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_keyed(serializer, AdditiveId::ALL.iter().map(|id| (id.key(), self.grams(*id))))
    }
}

impl Serialize for DisplayProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_keyed(serializer, Ion::ALL.iter().map(|ion| (ion.key(), self.get(*ion))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_for_display() {
        assert_eq!(round_for_display(1.2345), 1.2);
        assert_eq!(round_for_display(1.25001), 1.3);
        assert_eq!(round_for_display(0.06), 0.1);
        assert_eq!(round_for_display(0.04), 0.0);
        assert_eq!(round_for_display(-0.04), 0.0);
        assert!(round_for_display(-0.04).is_sign_positive());
        assert_eq!(round_for_display(-3.46), -3.5);
    }

    #[test]
    fn test_round_for_display_is_idempotent() {
        // Simple LCG random number generator
        let mut rng_state: u64 = 42;
        let mut rand = || -> f64 {
            rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((rng_state >> 33) as f64) / (u32::MAX as f64)
        };

        for _ in 0..10_000 {
            let v = 400.0 * rand() - 200.0;
            let once = round_for_display(v);
            assert_eq!(round_for_display(once), once, "v = {}", v);
        }
    }

    #[test]
    fn test_apply_to_adds_per_liter_contribution() {
        let base = IonProfile::default();
        let masses = AdditiveMasses::from_grams([2.0, 0.0, 0.0, 0.0, 0.0]);
        let achieved = masses.apply_to(&base, 4.0);

        // 2 g in 4 L = 0.5 g/L gypsum
        assert!((achieved[Ion::Calcium] - 0.5 * 232.78).abs() < 1e-9);
        assert!((achieved[Ion::Sulfate] - 0.5 * 557.95).abs() < 1e-9);
        assert_eq!(achieved[Ion::Sodium], 0.0);
    }

    #[test]
    fn test_display_copy_is_independent() {
        let masses = AdditiveMasses::from_grams([1.3745, 0.8994, 0.0499, 0.1000, 0.0]);
        let display = masses.to_display();

        assert_eq!(display.grams(AdditiveId::Gypsum), 1.4);
        assert_eq!(display.grams(AdditiveId::CalciumChloride), 0.9);
        assert_eq!(display.grams(AdditiveId::EpsomSalt), 0.0);
        assert_eq!(display.grams(AdditiveId::TableSalt), 0.1);
        // precise values untouched
        assert_eq!(masses.grams(AdditiveId::EpsomSalt), 0.0499);
        assert!(!masses.is_zero());
        assert!(AdditiveMasses::zeros().is_zero());
    }

    #[test]
    fn test_serialize_by_key() {
        let masses = AdditiveMasses::from_grams([1.0, 2.0, 3.0, 4.0, 5.0]);
        let json = serde_json::to_value(masses).unwrap();
        assert_eq!(json["baking_soda"], 5.0);

        let display = DisplayProfile::from_profile(&IonProfile::new(1.04, 0.0, 0.0, 0.0, 0.0, 0.0));
        let json = serde_json::to_value(display).unwrap();
        assert_eq!(json["calcium"], 1.0);
    }
}
