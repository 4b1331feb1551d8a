//! Canned weather lookup
//!
//! A fixed table stands in for a real weather service; there is deliberately
//! no network access here.

use crate::error::{Result, ToolError};
use crate::impl_tool_factory;
use crate::tools::{Tool, ToolCall, ToolExample, ToolResult};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::fmt;

/// Temperature unit requested by the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Parse a unit name, ignoring case
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "celsius" => Some(Self::Celsius),
            "fahrenheit" => Some(Self::Fahrenheit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TemperatureUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::parse(&name).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown unit '{}', expected 'celsius' or 'fahrenheit'",
                name
            ))
        })
    }
}

/// Arguments accepted by `get_current_weather`
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherArgs {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub unit: Option<TemperatureUnit>,
}

struct CityWeather {
    keyword: &'static str,
    display_name: &'static str,
    celsius: i32,
    fahrenheit: i32,
    condition: &'static str,
    icon: &'static str,
}

const KNOWN_CITIES: &[CityWeather] = &[
    CityWeather {
        keyword: "tokyo",
        display_name: "Tokyo",
        celsius: 15,
        fahrenheit: 59,
        condition: "sunny",
        icon: "☀️",
    },
    CityWeather {
        keyword: "london",
        display_name: "London",
        celsius: 8,
        fahrenheit: 46,
        condition: "cloudy",
        icon: "☁️",
    },
];

/// Look up the canned weather for `city`.
///
/// Matching is a case-insensitive substring test, so "Tokyo, Japan" hits the
/// Tokyo entry. Unknown cities get a "not available" message, which is still
/// a successful answer.
pub fn get_current_weather(city: &str, unit: TemperatureUnit) -> String {
    let needle = city.to_lowercase();

    match KNOWN_CITIES.iter().find(|c| needle.contains(c.keyword)) {
        Some(entry) => {
            let temperature = match unit {
                TemperatureUnit::Celsius => entry.celsius,
                TemperatureUnit::Fahrenheit => entry.fahrenheit,
            };
            format!(
                "The weather in {} is {}°{} and {} {}.",
                entry.display_name, temperature, unit, entry.condition, entry.icon
            )
        }
        None => format!("Weather data for {} not available.", city),
    }
}

pub struct WeatherTool;

impl WeatherTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_current_weather"
    }

    fn description(&self) -> &str {
        "Gets the current weather for a city."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The city to look up, e.g. Tokyo."
                },
                "unit": {
                    "type": "string",
                    "enum": ["celsius", "fahrenheit"],
                    "description": "Temperature unit. Defaults to celsius."
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let args: WeatherArgs = call.parse_arguments()?;
        let city = args
            .city
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ToolError::MissingArguments {
                tool: self.name().to_string(),
                missing: vec!["city".to_string()],
                required: vec!["city".to_string()],
            })?;

        let report = get_current_weather(&city, args.unit.unwrap_or_default());
        Ok(ToolResult::success(call.id, report))
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![
            ToolExample {
                description: "Weather in Tokyo".to_string(),
                parameters: json!({"city": "Tokyo"}),
                expected_result: "The weather in Tokyo is 15°celsius and sunny ☀️.".to_string(),
            },
            ToolExample {
                description: "Weather in London in fahrenheit".to_string(),
                parameters: json!({"city": "London", "unit": "fahrenheit"}),
                expected_result: "The weather in London is 46°fahrenheit and cloudy ☁️."
                    .to_string(),
            },
        ]
    }
}

impl_tool_factory!(
    WeatherToolFactory,
    WeatherTool,
    "get_current_weather",
    "Gets the current weather for a city."
);
