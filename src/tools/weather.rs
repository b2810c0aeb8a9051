//! Simulated weather tools. Values are random draws, not real observations.

use super::{required_str, SharedRng, Tool};
use crate::error::Result;
use async_trait::async_trait;
use rand::Rng;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Base temperature range in degrees Celsius (inclusive).
pub const CELSIUS_RANGE: (i64, i64) = (15, 30);

pub struct CurrentTemperature {
    rng: SharedRng,
}

impl CurrentTemperature {
    pub fn new(rng: SharedRng) -> Self {
        Self { rng }
    }
}

#[async_trait]
impl Tool for CurrentTemperature {
    fn name(&self) -> &str {
        "get_current_temperature"
    }

    fn description(&self) -> &str {
        "Get the current temperature for a specific location"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The city and state, e.g., San Francisco, CA"
                },
                "unit": {
                    "type": "string",
                    "enum": ["Celsius", "Fahrenheit"],
                    "description": "The temperature unit to use"
                }
            },
            "required": ["location", "unit"]
        })
    }

    async fn execute(&self, args: &Map<String, Value>) -> Result<Value> {
        let location = required_str(self.name(), args, "location")?;
        let unit = required_str(self.name(), args, "unit")?;

        let base = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.gen_range(CELSIUS_RANGE.0..=CELSIUS_RANGE.1)
        };
        debug!("Simulated temperature for {}: {} C", location, base);

        // Anything other than Fahrenheit is reported unconverted.
        if unit == "Fahrenheit" {
            Ok(json!(base as f64 * 9.0 / 5.0 + 32.0))
        } else {
            Ok(json!(base))
        }
    }
}

pub struct RainProbability {
    rng: SharedRng,
}

impl RainProbability {
    pub fn new(rng: SharedRng) -> Self {
        Self { rng }
    }
}

#[async_trait]
impl Tool for RainProbability {
    fn name(&self) -> &str {
        "get_rain_probability"
    }

    fn description(&self) -> &str {
        "Get the probability of rain for a specific location"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The city and state, e.g., San Francisco, CA"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: &Map<String, Value>) -> Result<Value> {
        let location = required_str(self.name(), args, "location")?;
        let percent: u8 = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.gen_range(0..=100)
        };
        debug!("Simulated rain probability for {}: {}%", location, percent);
        Ok(json!(percent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolCallError;
    use crate::tools::seeded_rng;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_celsius_stays_in_range() {
        let tool = CurrentTemperature::new(seeded_rng(7));
        for _ in 0..200 {
            let v = tool
                .execute(&args(json!({"location": "Beijing", "unit": "Celsius"})))
                .await
                .unwrap();
            let c = v.as_i64().unwrap();
            assert!((15..=30).contains(&c), "out of range: {}", c);
        }
    }

    #[tokio::test]
    async fn test_fahrenheit_stays_in_range() {
        let tool = CurrentTemperature::new(seeded_rng(11));
        for _ in 0..200 {
            let v = tool
                .execute(&args(json!({"location": "Austin, TX", "unit": "Fahrenheit"})))
                .await
                .unwrap();
            let f = v.as_f64().unwrap();
            assert!((59.0..=86.0).contains(&f), "out of range: {}", f);
        }
    }

    #[tokio::test]
    async fn test_unknown_unit_is_unconverted() {
        let tool = CurrentTemperature::new(seeded_rng(3));
        let v = tool
            .execute(&args(json!({"location": "Oslo", "unit": "Kelvin"})))
            .await
            .unwrap();
        assert!((15..=30).contains(&v.as_i64().unwrap()));
    }

    #[tokio::test]
    async fn test_same_seed_same_value() {
        let a = CurrentTemperature::new(seeded_rng(42));
        let b = CurrentTemperature::new(seeded_rng(42));
        let input = args(json!({"location": "Paris", "unit": "Celsius"}));
        assert_eq!(a.execute(&input).await.unwrap(), b.execute(&input).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_unit_rejected() {
        let tool = CurrentTemperature::new(seeded_rng(1));
        let err = tool
            .execute(&args(json!({"location": "Paris"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolCallError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_rain_probability_in_range() {
        let tool = RainProbability::new(seeded_rng(5));
        for _ in 0..200 {
            let v = tool
                .execute(&args(json!({"location": "Seattle, WA"})))
                .await
                .unwrap();
            assert!(v.as_u64().unwrap() <= 100);
        }
    }

    #[tokio::test]
    async fn test_rain_probability_requires_string_location() {
        let tool = RainProbability::new(seeded_rng(5));
        let err = tool
            .execute(&args(json!({"location": 12})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolCallError::InvalidArguments { .. }));
    }
}
