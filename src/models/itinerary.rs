use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `POST /landing/trip/enhance`.
#[derive(Debug, Clone, Deserialize)]
pub struct EnhanceRequest {
    #[serde(default)]
    pub destination: String,
    pub duration: Option<u32>,
    #[serde(default)]
    pub activities: Vec<Value>,
    pub hotel: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryDay {
    #[serde(default, deserialize_with = "day_number")]
    pub day: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub schedule: Vec<ScheduleItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The JSON object the completion model is asked to return.
#[derive(Debug, Deserialize)]
pub struct GeneratedItinerary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub days: Vec<ItineraryDay>,
}

/// Model output sometimes carries `null` where a value is expected.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Day number given as an integer or a numeric string; anything else is 0.
fn day_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let day = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(day.unwrap_or(0))
}
