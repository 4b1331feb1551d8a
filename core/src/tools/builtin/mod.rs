//! Built-in tools

pub mod arithmetic;
pub mod weather;

pub use arithmetic::{add, subtract, AddTool, AddToolFactory, SubtractTool, SubtractToolFactory};
pub use weather::{get_current_weather, TemperatureUnit, WeatherTool, WeatherToolFactory};
