// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::collections::BTreeMap;

/// Operator type -> (abbreviation, parameters shown in the label, in order).
const LABELS: &[(&str, &str, &[&str])] = &[
    ("Input", "IN", &[]),
    ("Output", "OUT", &[]),
    ("Identity", "ID", &[]),
    ("MovingAverage", "MA", &["window_size"]),
    ("StandardDeviation", "STD", &["window_size"]),
    ("FiniteImpulseResponse", "FIR", &[]),
    ("InfiniteImpulseResponse", "IIR", &[]),
    ("PeakDetector", "PEAK", &["window_size"]),
    ("CumulativeSum", "CSUM", &[]),
    ("Count", "COUNT", &[]),
    ("Difference", "DIFF", &[]),
    ("Join", "JOIN", &[]),
    ("Linear", "LIN", &[]),
    ("Scale", "SCALE", &["value"]),
    ("Add", "ADD", &["value"]),
    ("Power", "POW", &["value"]),
    ("Constant", "CONST", &["value"]),
    ("LessThan", "LT", &["value"]),
    ("GreaterThan", "GT", &["value"]),
    ("EqualTo", "EQ", &["value"]),
    ("ResamplerConstant", "RESAMPLE", &["interval"]),
    ("ResamplerHermite", "HERMITE", &["interval"]),
    ("Variable", "VAR", &[]),
];

fn short_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Short human-readable label for an operator, e.g. `MA(3)` for a three-sample
/// moving average. Unknown types are labelled with the raw type name.
pub fn operator_label(op_type: &str, parameters: &BTreeMap<String, Value>) -> String {
    let Some((_, abbreviation, keys)) = LABELS.iter().find(|(name, _, _)| *name == op_type) else {
        return op_type.to_string();
    };

    let shown: Vec<String> = keys
        .iter()
        .filter_map(|key| parameters.get(*key))
        .map(short_value)
        .collect();

    if shown.is_empty() {
        abbreviation.to_string()
    } else {
        format!("{}({})", abbreviation, shown.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(entries: &[(&str, Value)]) -> BTreeMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn known_types_are_abbreviated() {
        assert_eq!(operator_label("Input", &BTreeMap::new()), "IN");
        assert_eq!(
            operator_label("MovingAverage", &params(&[("window_size", json!(3))])),
            "MA(3)"
        );
        assert_eq!(operator_label("Scale", &params(&[("value", json!(2.5))])), "SCALE(2.5)");
    }

    #[test]
    fn missing_key_parameters_leave_the_bare_abbreviation() {
        assert_eq!(operator_label("MovingAverage", &BTreeMap::new()), "MA");
        assert_eq!(
            operator_label("FiniteImpulseResponse", &params(&[("coeff", json!([0.5, 0.5]))])),
            "FIR"
        );
    }

    #[test]
    fn unknown_types_fall_back_to_the_type_name() {
        assert_eq!(
            operator_label("KalmanFilter", &params(&[("q", json!(0.1))])),
            "KalmanFilter"
        );
    }
}
