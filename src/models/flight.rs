use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::location::{as_f64, non_empty_str};

/// Parameters of an Amadeus flight-offers search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub adults: u32,
    pub limit: usize,
}

/// Flat summary of one flight offer, as shown on trip and chat cards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightOffer {
    pub id: String,
    pub airline: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_at: Option<String>,
    pub arrival_at: Option<String>,
    pub duration: Option<String>,
    pub stops: usize,
    pub round_trip: bool,
}

impl FlightOffer {
    pub fn from_amadeus(offer: &Value) -> Option<Self> {
        let id = non_empty_str(&offer["id"])?;
        let itineraries = offer["itineraries"].as_array();
        let outbound = itineraries.and_then(|its| its.first());
        let segments = outbound
            .and_then(|it| it["segments"].as_array())
            .cloned()
            .unwrap_or_default();
        let first = segments.first();
        let last = segments.last();

        let airline = offer["validatingAirlineCodes"]
            .as_array()
            .and_then(|codes| codes.first())
            .and_then(non_empty_str)
            .or_else(|| first.and_then(|s| non_empty_str(&s["carrierCode"])));

        let price = as_f64(&offer["price"]["grandTotal"]).or_else(|| as_f64(&offer["price"]["total"]));

        Some(Self {
            id,
            airline,
            price,
            currency: non_empty_str(&offer["price"]["currency"]),
            origin: first.and_then(|s| non_empty_str(&s["departure"]["iataCode"])),
            destination: last.and_then(|s| non_empty_str(&s["arrival"]["iataCode"])),
            departure_at: first.and_then(|s| non_empty_str(&s["departure"]["at"])),
            arrival_at: last.and_then(|s| non_empty_str(&s["arrival"]["at"])),
            duration: outbound.and_then(|it| non_empty_str(&it["duration"])),
            stops: segments.len().saturating_sub(1),
            round_trip: itineraries.map(|its| its.len() > 1).unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summarizes_connecting_offer() {
        let offer = json!({
            "id": "7",
            "itineraries": [{
                "duration": "PT5H30M",
                "segments": [
                    {"departure": {"iataCode": "DEL", "at": "2026-11-01T06:00:00"},
                     "arrival": {"iataCode": "BOM", "at": "2026-11-01T08:10:00"},
                     "carrierCode": "AI"},
                    {"departure": {"iataCode": "BOM", "at": "2026-11-01T09:30:00"},
                     "arrival": {"iataCode": "GOI", "at": "2026-11-01T11:30:00"},
                     "carrierCode": "AI"}
                ]
            }],
            "price": {"currency": "USD", "total": "120.50", "grandTotal": "131.00"},
            "validatingAirlineCodes": ["AI"]
        });

        let summary = FlightOffer::from_amadeus(&offer).unwrap();
        assert_eq!(summary.id, "7");
        assert_eq!(summary.airline.as_deref(), Some("AI"));
        assert_eq!(summary.price, Some(131.0));
        assert_eq!(summary.origin.as_deref(), Some("DEL"));
        assert_eq!(summary.destination.as_deref(), Some("GOI"));
        assert_eq!(summary.arrival_at.as_deref(), Some("2026-11-01T11:30:00"));
        assert_eq!(summary.stops, 1);
        assert!(!summary.round_trip);
    }

    #[test]
    fn test_offer_without_id_is_skipped() {
        assert!(FlightOffer::from_amadeus(&json!({"price": {"total": "1"}})).is_none());
    }
}
