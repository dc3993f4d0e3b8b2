//! The fixed catalog of brewing salts.
//!
//! Each contribution is `ion mass / compound molar mass * 1000`, i.e. the ppm
//! of that ion produced by dissolving 1 g of the salt in 1 L of water,
//! fixed to two decimals. Hydrated forms are used where that is how the salt
//! is sold (gypsum, calcium chloride dihydrate, epsom salt).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ion::Ion;
use crate::error::OptError;

/// Number of additives in the catalog.
pub const ADDITIVE_COUNT: usize = 5;

/// Identifies a catalog additive; doubles as its column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditiveId {
    /// CaSO4·2H2O
    Gypsum,
    /// CaCl2·2H2O
    CalciumChloride,
    /// MgSO4·7H2O
    EpsomSalt,
    /// NaCl
    TableSalt,
    /// NaHCO3
    BakingSoda,
}

impl AdditiveId {
    /// All additives in column order.
    pub const ALL: [AdditiveId; ADDITIVE_COUNT] = [
        AdditiveId::Gypsum,
        AdditiveId::CalciumChloride,
        AdditiveId::EpsomSalt,
        AdditiveId::TableSalt,
        AdditiveId::BakingSoda,
    ];

    /// Column index in the contribution matrix.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Catalog entry for this id.
    pub fn additive(self) -> &'static Additive {
        &CATALOG[self.index()]
    }

    /// Snake-case key used in serialized output and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            AdditiveId::Gypsum => "gypsum",
            AdditiveId::CalciumChloride => "calcium_chloride",
            AdditiveId::EpsomSalt => "epsom_salt",
            AdditiveId::TableSalt => "table_salt",
            AdditiveId::BakingSoda => "baking_soda",
        }
    }
}

impl fmt::Display for AdditiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.additive().name)
    }
}

impl FromStr for AdditiveId {
    type Err = OptError;

    /// Accepts the key (`calcium_chloride`), the display name
    /// (`Calcium chloride`), or the formula (`CaCl2`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        AdditiveId::ALL
            .into_iter()
            .find(|id| {
                let additive = id.additive();
                id.key() == wanted
                    || additive.name.to_lowercase().replace(' ', "_") == wanted
                    || additive.formula.to_lowercase() == wanted
            })
            .ok_or_else(|| OptError::UnknownAdditive(s.to_string()))
    }
}

/// A salt that can be dissolved into the water.
#[derive(Debug, Clone, PartialEq)]
pub struct Additive {
    /// Catalog id
    pub id: AdditiveId,
    /// Common brewing name
    pub name: &'static str,
    /// Formula of the anhydrous salt
    pub formula: &'static str,
    /// ppm of each ion per g/L dissolved
    contributions: [(Ion, f64); 2],
    /// Maximum dissolved mass, g/L at room temperature
    pub solubility_g_per_l: f64,
}

impl Additive {
    /// ppm of `ion` contributed by 1 g of this additive in 1 L; 0 if none.
    pub fn contribution(&self, ion: Ion) -> f64 {
        self.contributions
            .iter()
            .find(|(i, _)| *i == ion)
            .map_or(0.0, |(_, ppm)| *ppm)
    }

    /// The ions this additive contributes to.
    pub fn contributions(&self) -> &[(Ion, f64)] {
        &self.contributions
    }
}

static CATALOG: [Additive; ADDITIVE_COUNT] = [
    Additive {
        id: AdditiveId::Gypsum,
        name: "Gypsum",
        formula: "CaSO4",
        contributions: [(Ion::Calcium, 232.78), (Ion::Sulfate, 557.95)],
        solubility_g_per_l: 2.4,
    },
    Additive {
        id: AdditiveId::CalciumChloride,
        name: "Calcium chloride",
        formula: "CaCl2",
        contributions: [(Ion::Calcium, 272.61), (Ion::Chloride, 482.31)],
        solubility_g_per_l: 745.0,
    },
    Additive {
        id: AdditiveId::EpsomSalt,
        name: "Epsom salt",
        formula: "MgSO4",
        contributions: [(Ion::Magnesium, 98.61), (Ion::Sulfate, 389.75)],
        solubility_g_per_l: 710.0,
    },
    Additive {
        id: AdditiveId::TableSalt,
        name: "Table salt",
        formula: "NaCl",
        contributions: [(Ion::Sodium, 393.37), (Ion::Chloride, 606.63)],
        solubility_g_per_l: 359.0,
    },
    Additive {
        id: AdditiveId::BakingSoda,
        name: "Baking soda",
        formula: "NaHCO3",
        contributions: [(Ion::Sodium, 273.67), (Ion::Bicarbonate, 726.33)],
        solubility_g_per_l: 96.0,
    },
];

/// The process-wide additive table, in column order.
pub fn catalog() -> &'static [Additive; ADDITIVE_COUNT] {
    &CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Standard atomic weights (g/mol).
    const CA: f64 = 40.078;
    const MG: f64 = 24.305;
    const NA: f64 = 22.990;
    const CL: f64 = 35.453;
    const S: f64 = 32.065;
    const O: f64 = 15.999;
    const H: f64 = 1.008;
    const C: f64 = 12.011;

    fn ppm(ion_mass: f64, molar_mass: f64) -> f64 {
        ion_mass / molar_mass * 1000.0
    }

    #[test]
    fn test_ids_match_positions() {
        for (i, additive) in catalog().iter().enumerate() {
            assert_eq!(additive.id.index(), i);
            assert_eq!(AdditiveId::ALL[i], additive.id);
        }
    }

    #[test]
    fn test_contributions_match_molar_masses() {
        let so4 = S + 4.0 * O;
        let hco3 = H + C + 3.0 * O;
        let water = 2.0 * H + O;

        let gypsum = CA + so4 + 2.0 * water;
        let cacl2 = CA + 2.0 * CL + 2.0 * water;
        let epsom = MG + so4 + 7.0 * water;
        let nacl = NA + CL;
        let nahco3 = NA + hco3;

        let expected = [
            (AdditiveId::Gypsum, Ion::Calcium, ppm(CA, gypsum)),
            (AdditiveId::Gypsum, Ion::Sulfate, ppm(so4, gypsum)),
            (AdditiveId::CalciumChloride, Ion::Calcium, ppm(CA, cacl2)),
            (AdditiveId::CalciumChloride, Ion::Chloride, ppm(2.0 * CL, cacl2)),
            (AdditiveId::EpsomSalt, Ion::Magnesium, ppm(MG, epsom)),
            (AdditiveId::EpsomSalt, Ion::Sulfate, ppm(so4, epsom)),
            (AdditiveId::TableSalt, Ion::Sodium, ppm(NA, nacl)),
            (AdditiveId::TableSalt, Ion::Chloride, ppm(CL, nacl)),
            (AdditiveId::BakingSoda, Ion::Sodium, ppm(NA, nahco3)),
            (AdditiveId::BakingSoda, Ion::Bicarbonate, ppm(hco3, nahco3)),
        ];

        for (id, ion, want) in expected {
            let got = id.additive().contribution(ion);
            assert!(
                (got - want).abs() < 0.1,
                "{} -> {}: {} vs {}",
                id,
                ion,
                got,
                want
            );
        }
    }

    #[test]
    fn test_each_additive_contributes_two_ions() {
        for additive in catalog() {
            let nonzero = Ion::ALL
                .iter()
                .filter(|&&ion| additive.contribution(ion) > 0.0)
                .count();
            assert_eq!(nonzero, 2, "{}", additive.name);
            assert!(additive.solubility_g_per_l > 0.0);
        }
        assert_eq!(AdditiveId::Gypsum.additive().contribution(Ion::Sodium), 0.0);
    }

    #[test]
    fn test_parse_additive_names() {
        assert_eq!("gypsum".parse::<AdditiveId>().unwrap(), AdditiveId::Gypsum);
        assert_eq!(
            "Calcium chloride".parse::<AdditiveId>().unwrap(),
            AdditiveId::CalciumChloride
        );
        assert_eq!("epsom-salt".parse::<AdditiveId>().unwrap(), AdditiveId::EpsomSalt);
        assert_eq!("NaHCO3".parse::<AdditiveId>().unwrap(), AdditiveId::BakingSoda);
        assert_eq!(
            "chalk".parse::<AdditiveId>().unwrap_err(),
            OptError::UnknownAdditive("chalk".to_string())
        );
    }
}
