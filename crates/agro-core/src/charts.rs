//! Chart-ready series derived from prediction results
//!
//! All functions here are pure. The comparison multipliers and the parameter
//! impact values are presentation constants; renderers depend on them as-is.

use serde::{Deserialize, Serialize};

use crate::history::HistoryEntry;
use crate::types::PredictionResult;

pub const POOR_MULTIPLIER: f64 = 0.6;
pub const NORMAL_MULTIPLIER: f64 = 1.0;
pub const OPTIMAL_MULTIPLIER: f64 = 1.3;

/// Growing condition a comparison bar stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Poor,
    Normal,
    Optimal,
}

impl Condition {
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Poor => "Poor",
            Condition::Normal => "Normal",
            Condition::Optimal => "Optimal",
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            Condition::Poor => POOR_MULTIPLIER,
            Condition::Normal => NORMAL_MULTIPLIER,
            Condition::Optimal => OPTIMAL_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPoint {
    pub condition: Condition,
    pub yield_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub label: String,
    pub yield_value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCrop {
    pub rank: usize,
    pub crop: String,
}

/// One axis of the parameter impact radar
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactPoint {
    pub parameter: &'static str,
    pub impact: f64,
    pub optimal: f64,
}

pub const PARAMETER_IMPACT: [ImpactPoint; 5] = [
    ImpactPoint { parameter: "Temperature", impact: 0.85, optimal: 0.9 },
    ImpactPoint { parameter: "Humidity", impact: 0.75, optimal: 0.85 },
    ImpactPoint { parameter: "Water", impact: 0.8, optimal: 0.95 },
    ImpactPoint { parameter: "Soil", impact: 0.7, optimal: 0.8 },
    ImpactPoint { parameter: "Location", impact: 0.65, optimal: 0.75 },
];

/// Poor, normal and optimal bars for one prediction
pub fn comparison_series(result: &PredictionResult) -> [ComparisonPoint; 3] {
    [Condition::Poor, Condition::Normal, Condition::Optimal].map(|condition| ComparisonPoint {
        condition,
        yield_value: result.predicted_yield * condition.multiplier(),
    })
}

/// Trend line over the stored history, in stored (newest first) order.
/// The newest entry is labelled `P{len}`, the oldest `P1`.
pub fn history_series<'a, I>(history: I) -> Vec<HistoryPoint>
where
    I: IntoIterator<Item = &'a HistoryEntry>,
    I::IntoIter: ExactSizeIterator,
{
    let entries = history.into_iter();
    let len = entries.len();
    entries
        .enumerate()
        .map(|(index, entry)| HistoryPoint {
            label: format!("P{}", len - index),
            yield_value: entry.result.predicted_yield,
        })
        .collect()
}

/// Recommended crops with 1-based ranks; rank 1 is the most suitable.
pub fn recommendation_ranking(result: &PredictionResult) -> Vec<RankedCrop> {
    result
        .recommended_crops
        .iter()
        .enumerate()
        .map(|(index, crop)| RankedCrop {
            rank: index + 1,
            crop: crop.clone(),
        })
        .collect()
}

pub fn parameter_impact_series() -> &'static [ImpactPoint] {
    &PARAMETER_IMPACT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryStore;
    use crate::types::{CropType, FormInput, SoilType};

    fn result(predicted_yield: f64, crops: &[&str]) -> PredictionResult {
        PredictionResult {
            predicted_yield,
            recommended_crops: crops.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_comparison_multipliers() {
        let series = comparison_series(&result(10.0, &[]));
        let values: Vec<f64> = series.iter().map(|p| p.yield_value).collect();
        assert_eq!(values, vec![6.0, 10.0, 13.0]);
        assert_eq!(series[0].condition, Condition::Poor);
        assert_eq!(series[2].condition, Condition::Optimal);
    }

    #[test]
    fn test_comparison_of_zero_yield() {
        let series = comparison_series(&result(0.0, &[]));
        assert!(series.iter().all(|p| p.yield_value == 0.0));
    }

    #[test]
    fn test_ranking_is_stable() {
        let prediction = result(4.5, &["Wheat", "Maize", "Soybean"]);
        let first = recommendation_ranking(&prediction);
        let second = recommendation_ranking(&prediction);
        assert_eq!(first, second);
        assert_eq!(first[0], RankedCrop { rank: 1, crop: "Wheat".to_string() });
        assert_eq!(first[2].rank, 3);
    }

    #[test]
    fn test_ranking_of_empty_list() {
        assert!(recommendation_ranking(&result(1.0, &[])).is_empty());
    }

    #[test]
    fn test_history_series_keeps_stored_order() {
        let inputs = FormInput {
            temperature: 22.0,
            humidity: 70.0,
            soil_type: SoilType::Clay,
            crop_type: CropType::Rice,
            water_flow: 80.0,
            latitude: 10.0,
            longitude: 20.0,
        };
        let mut store = HistoryStore::new();
        store.record(result(3.0, &["Rice"]), inputs.clone());
        store.record(result(4.0, &["Rice"]), inputs.clone());
        store.record(result(5.0, &["Rice"]), inputs);

        let series = history_series(store.iter());
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        let values: Vec<f64> = series.iter().map(|p| p.yield_value).collect();
        assert_eq!(labels, vec!["P3", "P2", "P1"]);
        assert_eq!(values, vec![5.0, 4.0, 3.0]);
    }

    #[test]
    fn test_parameter_impact_axes() {
        let axes = parameter_impact_series();
        assert_eq!(axes.len(), 5);
        assert!(axes.iter().all(|axis| axis.impact <= axis.optimal));
    }
}
