//! Analysis result records
//!
//! These serialize to the JSON shape consumed by the job frontend:
//!
//! ```json
//! {
//!   "thumbnail_url": "/gcode_previews/42.png",
//!   "per_part_analysis": {
//!     "total_bounding_box_volume": 1125.0,
//!     "parts": [{ "name": "A", "energy_percentage": 0.8889 }]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Number of decimal places kept in a part's volume fraction
pub const FRACTION_DECIMALS: usize = 4;

/// One object's share of the total bounding-box volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartShare {
    /// Trimmed object name from the start marker
    pub name: String,
    /// Volume fraction in `[0, 1]`, rounded to [`FRACTION_DECIMALS`] places
    pub energy_percentage: f64,
}

/// Per-object volume attribution for one job
///
/// Only built when the total volume is strictly positive. Fractions are
/// rounded individually and are not renormalized, so their sum may drift
/// from 1.0 by a few ten-thousandths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeReport {
    pub total_bounding_box_volume: f64,
    pub parts: Vec<PartShare>,
}

impl VolumeReport {
    /// Build a report from `(name, volume)` pairs in discovery order
    ///
    /// Returns `None` when the volumes sum to zero.
    pub fn from_volumes<I, S>(volumes: I) -> Option<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let volumes: Vec<(String, f64)> = volumes
            .into_iter()
            .map(|(name, volume)| (name.into(), volume))
            .collect();

        let total: f64 = volumes.iter().map(|(_, volume)| volume).sum();
        if total <= 0.0 {
            return None;
        }

        let parts = volumes
            .into_iter()
            .map(|(name, volume)| PartShare {
                name,
                energy_percentage: round_fraction(volume / total),
            })
            .collect();

        Some(Self {
            total_bounding_box_volume: total,
            parts,
        })
    }

    /// Look up a part by name
    pub fn part(&self, name: &str) -> Option<&PartShare> {
        self.parts.iter().find(|p| p.name == name)
    }
}

/// Round a fraction to [`FRACTION_DECIMALS`] decimal places
///
/// Rounds the exact binary value with ties to even, so `1/32` becomes
/// `0.0312` rather than `0.0313`.
pub fn round_fraction(value: f64) -> f64 {
    format!("{:.*}", FRACTION_DECIMALS, value)
        .parse()
        .unwrap_or(value)
}

/// The combined output of one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Public reference to the extracted preview image, if any
    pub thumbnail_url: Option<String>,
    /// Per-object volume attribution, if any object had positive volume
    pub per_part_analysis: Option<VolumeReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_fraction() {
        assert_eq!(round_fraction(1000.0 / 1125.0), 0.8889);
        assert_eq!(round_fraction(125.0 / 1125.0), 0.1111);
        assert_eq!(round_fraction(0.0), 0.0);
        assert_eq!(round_fraction(1.0), 1.0);
    }

    #[test]
    fn test_round_fraction_ties_to_even() {
        assert_eq!(round_fraction(1.0 / 32.0), 0.0312);
        assert_eq!(round_fraction(31.0 / 32.0), 0.9688);
        assert_eq!(round_fraction(0.00005), 0.0001);
        assert_eq!(round_fraction(0.00015), 0.0001);
    }

    #[test]
    fn test_zero_total_yields_no_report() {
        assert!(VolumeReport::from_volumes(vec![("a", 0.0), ("b", 0.0)]).is_none());
        assert!(VolumeReport::from_volumes(Vec::<(String, f64)>::new()).is_none());
    }

    #[test]
    fn test_report_preserves_order_and_zero_parts() {
        let report =
            VolumeReport::from_volumes(vec![("frame", 300.0), ("shim", 0.0), ("knob", 100.0)])
                .expect("positive total");

        assert_eq!(report.total_bounding_box_volume, 400.0);
        let names: Vec<&str> = report.parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["frame", "shim", "knob"]);
        assert_eq!(report.part("frame").map(|p| p.energy_percentage), Some(0.75));
        assert_eq!(report.part("shim").map(|p| p.energy_percentage), Some(0.0));
        assert_eq!(report.part("knob").map(|p| p.energy_percentage), Some(0.25));
    }

    #[test]
    fn test_result_serializes_nulls() {
        let json = serde_json::to_value(AnalysisResult::default()).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "thumbnail_url": null, "per_part_analysis": null })
        );
    }

    #[test]
    fn test_result_serializes_report_shape() {
        let result = AnalysisResult {
            thumbnail_url: Some("/gcode_previews/7.png".to_string()),
            per_part_analysis: VolumeReport::from_volumes(vec![("A", 1.0)]),
        };
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["thumbnail_url"], "/gcode_previews/7.png");
        assert_eq!(json["per_part_analysis"]["total_bounding_box_volume"], 1.0);
        assert_eq!(json["per_part_analysis"]["parts"][0]["name"], "A");
        assert_eq!(json["per_part_analysis"]["parts"][0]["energy_percentage"], 1.0);
    }
}
