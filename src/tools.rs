//! Sample host functions for the weather demo

use crate::functions::FunctionRegistry;
use crate::schema::SchemaError;

const BERLIN_LAT: &str = "52.520008";
const BERLIN_LONG: &str = "13.405";

fn normalize_city(city: &str) -> String {
    city.trim().to_lowercase()
}

#[allow(clippy::needless_pass_by_value)]
pub fn lookup_city_latitude(city: String) -> String {
    match normalize_city(&city).as_str() {
        "berlin" => BERLIN_LAT.to_string(),
        _ => "0.0".to_string(),
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn lookup_city_longitude(city: String) -> String {
    match normalize_city(&city).as_str() {
        "berlin" => BERLIN_LONG.to_string(),
        _ => "0.01".to_string(),
    }
}

/// Coordinates are compared as text, exactly as the lookups return them
#[allow(clippy::needless_pass_by_value)]
pub fn lookup_weather_by_coordinate(lat: String, long: String) -> String {
    let forecast = match (lat.as_str(), long.as_str()) {
        (BERLIN_LAT, BERLIN_LONG) => "bright and sunny weather out there",
        (BERLIN_LONG, BERLIN_LAT) => "high chance of hurricanes in the area",
        _ => "overcast and grey, with a chance of hail",
    };
    forecast.to_string()
}

/// Register the three weather functions, in menu order
///
/// # Errors
///
/// Propagates schema derivation failures; none are expected for these
/// signatures.
pub fn register_sample_tools(registry: &mut FunctionRegistry) -> Result<(), SchemaError> {
    registry.register(lookup_city_latitude, "returns the latitude of a given city")?;
    registry.register(lookup_city_longitude, "returns the longitude of a given city")?;
    registry.register(
        lookup_weather_by_coordinate,
        "returns the weather for a given latitude and longitude",
    )?;
    Ok(())
}
