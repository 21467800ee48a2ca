//! Canned weather tools used by the weather-bot demo assistant.

use crate::error::RegistryError;
use crate::tools::schema::{ParamType, ParameterSchema};
use crate::tools::traits::ToolDefinition;
use crate::tools::ToolRegistry;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Deserialize)]
pub struct TemperatureArgs {
    pub location: String,
    pub unit: TemperatureUnit,
}

#[derive(Debug, Deserialize)]
pub struct RainArgs {
    pub location: String,
}

fn location_param(schema: ParameterSchema) -> ParameterSchema {
    schema.required(
        "location",
        ParamType::String,
        "The city and state, e.g., San Francisco, CA",
    )
}

/// Register `getCurrentTemperature` and `getRainProbability`.
pub fn register_all(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register_fn(
        ToolDefinition::new(
            "getCurrentTemperature",
            "Get the current temperature for a specific location",
            location_param(ParameterSchema::empty()).required(
                "unit",
                ParamType::Enum(vec!["Celsius".into(), "Fahrenheit".into()]),
                "The temperature unit to use. Infer this from the user's location.",
            ),
        ),
        |args: TemperatureArgs| async move {
            tracing::debug!("Temperature lookup for {} ({:?})", args.location, args.unit);
            anyhow::Ok(57)
        },
    )?;

    registry.register_fn(
        ToolDefinition::new(
            "getRainProbability",
            "Get the probability of rain for a specific location",
            location_param(ParameterSchema::empty()),
        ),
        |args: RainArgs| async move {
            tracing::debug!("Rain probability lookup for {}", args.location);
            anyhow::Ok(0.06)
        },
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::dispatch::resolve_batch;
    use crate::types::PendingCall;

    #[tokio::test]
    async fn test_weather_outputs() {
        let mut reg = ToolRegistry::new();
        register_all(&mut reg).unwrap();

        let calls = vec![
            PendingCall {
                call_id: "t".into(),
                tool_name: "getCurrentTemperature".into(),
                raw_arguments: r#"{"location":"San Francisco, CA","unit":"Fahrenheit"}"#.into(),
            },
            PendingCall {
                call_id: "r".into(),
                tool_name: "getRainProbability".into(),
                raw_arguments: r#"{"location":"San Francisco, CA"}"#.into(),
            },
            PendingCall {
                call_id: "bad".into(),
                tool_name: "getCurrentTemperature".into(),
                raw_arguments: r#"{"location":"Oslo","unit":"Kelvin"}"#.into(),
            },
        ];
        let out = resolve_batch(&reg, &calls).await;

        assert_eq!(out[0].payload, "57");
        assert_eq!(out[1].payload, "0.06");
        assert!(out[2].payload.contains("argument_parse"));
    }
}
