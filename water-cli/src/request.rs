//! Loading solve requests from files or command-line lists.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use water_opt::{IonProfile, ION_COUNT};

/// One optimization request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    /// Water volume in liters
    pub volume: f64,
    /// Starting water
    pub base: IonProfile,
    /// Desired water
    pub target: IonProfile,
}

impl SolveRequest {
    /// Load from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open file {}", path.as_ref().display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse JSON from {}", path.as_ref().display()))
    }
}

/// Parse `Ca,Mg,Na,SO4,Cl,HCO3` as a profile.
pub fn parse_profile(list: &str) -> Result<IonProfile> {
    let values = list
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid concentration: {:?}", part.trim()))
        })
        .collect::<Result<Vec<_>>>()?;

    let Ok(values) = <[f64; ION_COUNT]>::try_from(values.as_slice()) else {
        bail!(
            "Expected {} comma-separated values (Ca,Mg,Na,SO4,Cl,HCO3), got {}",
            ION_COUNT,
            values.len()
        );
    };
    Ok(IonProfile::from_array(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use water_opt::Ion;

    #[test]
    fn test_parse_profile() {
        let p = parse_profile("22, 2.7,12,6,14,50").unwrap();
        assert_eq!(p[Ion::Magnesium], 2.7);
        assert_eq!(p[Ion::Bicarbonate], 50.0);

        assert!(parse_profile("1,2,3").is_err());
        assert!(parse_profile("1,2,3,4,5,x").is_err());
    }

    #[test]
    fn test_request_json() {
        let json = r#"{
            "volume": 20.0,
            "base": {"calcium": 22, "magnesium": 2.7, "sodium": 12,
                     "sulfate": 6, "chloride": 14, "bicarbonate": 50},
            "target": {"calcium": 48, "magnesium": 2.7, "sodium": 12,
                       "sulfate": 60, "chloride": 40, "bicarbonate": 50}
        }"#;
        let req: SolveRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.volume, 20.0);
        assert_eq!(req.target[Ion::Sulfate], 60.0);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = SolveRequest::load_json("/nonexistent/request.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/request.json"));
    }
}
