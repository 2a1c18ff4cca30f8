use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A city or airport returned by a location search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    pub provider_place_id: String,
    pub name: String,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Place {
    /// Normalize one Amadeus `reference-data/locations` item.
    ///
    /// Items with neither an identifier nor a name yield `None`; when only one
    /// of the two is present it stands in for the other.
    pub fn from_amadeus(item: &Value) -> Option<Self> {
        let id = non_empty_str(&item["iataCode"]).or_else(|| non_empty_str(&item["id"]));
        let name = non_empty_str(&item["name"]);

        let (provider_place_id, name) = match (id, name) {
            (Some(id), Some(name)) => (id, name),
            (Some(id), None) => (id.clone(), id),
            (None, Some(name)) => (name.clone(), name),
            (None, None) => return None,
        };

        Some(Self {
            provider_place_id,
            name,
            country: non_empty_str(&item["address"]["countryCode"]),
            lat: as_f64(&item["geoCode"]["latitude"]),
            lon: as_f64(&item["geoCode"]["longitude"]),
        })
    }

    /// Search phrase used to find a representative photo of this place.
    pub fn image_query(&self) -> String {
        match &self.country {
            Some(country) => format!("{} {} travel", self.name, country),
            None => format!("{} travel", self.name),
        }
    }
}

/// A destination card as served to the landing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Destination {
    pub provider: String,
    pub provider_place_id: Option<String>,
    pub name: String,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub image_url: Option<String>,
    pub image_source: Option<String>,
}

impl Destination {
    pub fn from_place(place: Place, image: Option<super::media::Image>) -> Self {
        Self {
            provider: "amadeus".to_string(),
            provider_place_id: Some(place.provider_place_id),
            name: place.name,
            country: place.country,
            lat: place.lat,
            lon: place.lon,
            image_source: image.as_ref().map(|_| "pexels".to_string()),
            image_url: image.map(|img| img.url),
        }
    }
}

pub(crate) fn non_empty_str(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_amadeus_city() {
        let item = json!({
            "type": "location",
            "subType": "CITY",
            "name": "PARIS",
            "iataCode": "PAR",
            "geoCode": {"latitude": 48.85341, "longitude": 2.3488},
            "address": {"cityName": "PARIS", "countryCode": "FR"}
        });
        let place = Place::from_amadeus(&item).unwrap();
        assert_eq!(place.provider_place_id, "PAR");
        assert_eq!(place.name, "PARIS");
        assert_eq!(place.country.as_deref(), Some("FR"));
        assert_eq!(place.lat, Some(48.85341));
        assert_eq!(place.image_query(), "PARIS FR travel");
    }

    #[test]
    fn test_from_amadeus_partial_items() {
        let only_id = Place::from_amadeus(&json!({"id": "CMUC"})).unwrap();
        assert_eq!(only_id.name, "CMUC");

        let only_name = Place::from_amadeus(&json!({"name": "GOA"})).unwrap();
        assert_eq!(only_name.provider_place_id, "GOA");
        assert!(only_name.country.is_none());
        assert!(only_name.lat.is_none());

        assert!(Place::from_amadeus(&json!({"name": "  ", "geoCode": {}})).is_none());
        assert!(Place::from_amadeus(&json!(null)).is_none());
    }
}
