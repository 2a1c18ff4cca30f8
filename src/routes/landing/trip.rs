use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::param;
use crate::error::ApiError;
use crate::models::flight::{FlightOffer, FlightQuery};
use crate::models::hotel::Hotel;
use crate::models::itinerary::{EnhanceRequest, ItineraryDay};
use crate::services::http_service::UpstreamError;
use crate::state::AppState;

const FLIGHT_RESULT_LIMIT: usize = 5;
const MAX_ADULTS: u32 = 9;
const MAX_TRIP_DAYS: u32 = 14;

#[derive(Deserialize)]
pub struct FlightParams {
    origin: Option<String>,
    destination: Option<String>,
    departure_date: Option<String>,
    return_date: Option<String>,
    adults: Option<String>,
}

#[derive(Deserialize)]
pub struct HotelParams {
    city: Option<String>,
    check_in: Option<String>,
    check_out: Option<String>,
}

/// Collects per-field problems so one response reports all of them.
#[derive(Default)]
struct FieldErrors(Map<String, Value>);

impl FieldErrors {
    fn required<'a>(&mut self, field: &str, value: &'a Option<String>) -> Option<&'a str> {
        let value = param(value);
        if value.is_none() {
            self.add(field, "This field is required.");
        }
        value
    }

    fn date(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDate> {
        let raw = value?;
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.add(field, "Expected a date in YYYY-MM-DD format.");
                None
            }
        }
    }

    fn add(&mut self, field: &str, problem: &str) {
        self.0.insert(field.to_string(), Value::String(problem.to_string()));
    }

    fn finish(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::invalid_fields(self.0))
        }
    }
}

/*
    /landing/trip/flights?origin=&destination=&departure_date=&return_date=&adults=
*/
pub async fn search_flights(
    state: web::Data<AppState>,
    params: web::Query<FlightParams>,
) -> Result<HttpResponse, ApiError> {
    let mut errors = FieldErrors::default();
    let origin = errors.required("origin", &params.origin);
    let destination = errors.required("destination", &params.destination);
    let departure_raw = errors.required("departure_date", &params.departure_date);
    let departure = errors.date("departure_date", departure_raw);
    let return_date = errors.date("return_date", param(&params.return_date));
    if let (Some(departure), Some(return_date)) = (departure, return_date) {
        if return_date < departure {
            errors.add("return_date", "Return date must not be before the departure date.");
        }
    }
    let adults = match param(&params.adults) {
        None => 1,
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if (1..=MAX_ADULTS).contains(&n) => n,
            _ => {
                errors.add("adults", "Expected a number of adults between 1 and 9.");
                1
            }
        },
    };
    errors.finish()?;

    let (Some(origin), Some(destination), Some(departure)) = (origin, destination, departure) else {
        return Err(ApiError::validation("validation_error", "Validation error"));
    };

    if !state.integrations().amadeus {
        return Err(ApiError::ServiceUnavailable(
            "Flight search is temporarily unavailable. Please try again later.".to_string(),
        ));
    }

    let query = FlightQuery {
        origin: origin.to_uppercase(),
        destination: destination.to_uppercase(),
        departure_date: departure.to_string(),
        return_date: return_date.map(|d| d.to_string()),
        adults,
        limit: FLIGHT_RESULT_LIMIT,
    };

    let (results, cached): (Vec<FlightOffer>, bool) = state
        .cached("flights", json!(query), || async {
            let offers = state.amadeus.search_flight_offers(&query).await?;
            Ok::<_, UpstreamError>(offers.iter().filter_map(FlightOffer::from_amadeus).collect())
        })
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "cached": cached,
        "query": query,
        "results": results,
    })))
}

/*
    /landing/trip/hotels?city=&check_in=&check_out=
*/
pub async fn search_hotels(
    state: web::Data<AppState>,
    params: web::Query<HotelParams>,
) -> Result<HttpResponse, ApiError> {
    let mut errors = FieldErrors::default();
    let city = errors.required("city", &params.city);
    let check_in_raw = errors.required("check_in", &params.check_in);
    let check_out_raw = errors.required("check_out", &params.check_out);
    let check_in = errors.date("check_in", check_in_raw);
    let check_out = errors.date("check_out", check_out_raw);
    if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
        if check_out <= check_in {
            errors.add("check_out", "Check-out must be after check-in.");
        }
    }
    errors.finish()?;

    let (Some(city), Some(check_in), Some(check_out)) = (city, check_in, check_out) else {
        return Err(ApiError::validation("validation_error", "Validation error"));
    };

    if !state.integrations().serpapi {
        return Err(ApiError::ServiceUnavailable(
            "Hotel search is temporarily unavailable. Please try again later.".to_string(),
        ));
    }

    let (check_in, check_out) = (check_in.to_string(), check_out.to_string());
    let (results, cached): (Vec<Hotel>, bool) = state
        .cached(
            "hotels",
            json!({ "city": city.to_lowercase(), "check_in": check_in, "check_out": check_out }),
            || state.serpapi.search_hotels(city, &check_in, &check_out),
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "cached": cached,
        "city": city,
        "check_in": check_in,
        "check_out": check_out,
        "results": results,
    })))
}

/*
    POST /landing/trip/enhance
*/
pub async fn enhance(
    state: web::Data<AppState>,
    body: web::Json<EnhanceRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();

    let mut errors = FieldErrors::default();
    let destination = request.destination.trim().to_string();
    if destination.is_empty() {
        errors.add("destination", "This field is required.");
    }
    let duration = match request.duration {
        Some(days) if (1..=MAX_TRIP_DAYS).contains(&days) => days,
        Some(_) => {
            errors.add("duration", "Duration must be between 1 and 14 days.");
            0
        }
        None => {
            errors.add("duration", "This field is required.");
            0
        }
    };
    errors.finish()?;

    if !state.integrations().groq {
        return Err(ApiError::ServiceUnavailable(
            "AI itinerary enhancement is temporarily unavailable. Please try again later.".to_string(),
        ));
    }

    let hotel = request.hotel.as_deref().map(str::trim).filter(|h| !h.is_empty());
    let payload = json!({
        "destination": destination.to_lowercase(),
        "duration": duration,
        "activities": request.activities,
        "hotel": hotel,
    });

    let (days, cached): (Vec<ItineraryDay>, bool) = state
        .cached("enhance", payload, || {
            state
                .groq
                .enhance_itinerary(&destination, duration, &request.activities, hotel)
        })
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "cached": cached,
        "destination": destination,
        "duration": duration,
        "days": days,
    })))
}
