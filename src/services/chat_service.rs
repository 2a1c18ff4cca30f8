use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::chat::{ChatCards, ChatMessage, ChatReply, Intent};
use crate::models::flight::{FlightOffer, FlightQuery};
use crate::models::location::Destination;
use crate::services::amadeus_service::AmadeusService;
use crate::services::groq_service::GroqService;
use crate::services::http_service::UpstreamError;
use crate::services::pexels_service::PexelsService;
use crate::services::serpapi_service::SerpApiService;

const DEFAULT_LEAD_DAYS: i64 = 14;
const CHAT_FLIGHT_LIMIT: usize = 5;
const CHAT_DESTINATION_LIMIT: usize = 6;

/// Conversational assistant: classify, look up matching data, otherwise talk.
///
/// Provider failures during the lookup never reach the user; they only turn
/// the reply into a plain conversational one.
#[derive(Clone)]
pub struct ChatService {
    groq: GroqService,
    amadeus: AmadeusService,
    serpapi: SerpApiService,
    pexels: PexelsService,
    default_origin: String,
}

impl ChatService {
    pub fn new(
        groq: GroqService,
        amadeus: AmadeusService,
        serpapi: SerpApiService,
        pexels: PexelsService,
        default_origin: String,
    ) -> Self {
        Self {
            groq,
            amadeus,
            serpapi,
            pexels,
            default_origin,
        }
    }

    pub async fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<ChatReply, UpstreamError> {
        let intent = self.groq.detect_intent(message).await;
        log::info!("Chat intent detected: {}", intent.name());

        match self.lookup(&intent).await {
            Ok(Some((response, cards))) => {
                return Ok(ChatReply {
                    response,
                    intent: intent.name().to_string(),
                    data: Some(cards),
                })
            }
            Ok(None) => {}
            Err(e) => log::warn!(
                "{} lookup failed, answering conversationally: {}",
                intent.name(),
                e
            ),
        }

        let response = self.groq.converse(message, history).await?;
        Ok(ChatReply {
            response,
            intent: intent.name().to_string(),
            data: None,
        })
    }

    /// Provider data for `intent`; `None` when there is nothing to show.
    async fn lookup(&self, intent: &Intent) -> Result<Option<(String, ChatCards)>, UpstreamError> {
        match intent {
            Intent::Flight {
                origin,
                destination,
                date,
            } => {
                let query = FlightQuery {
                    origin: origin
                        .as_deref()
                        .unwrap_or(&self.default_origin)
                        .to_uppercase(),
                    destination: destination.to_uppercase(),
                    departure_date: upcoming_date(date.as_deref(), today()).to_string(),
                    return_date: None,
                    adults: 1,
                    limit: CHAT_FLIGHT_LIMIT,
                };
                let offers: Vec<FlightOffer> = self
                    .amadeus
                    .search_flight_offers(&query)
                    .await?
                    .iter()
                    .filter_map(FlightOffer::from_amadeus)
                    .collect();
                if offers.is_empty() {
                    return Ok(None);
                }
                let text = format!(
                    "Here are {} flight options from {} to {} on {}.",
                    offers.len(),
                    query.origin,
                    query.destination,
                    query.departure_date
                );
                Ok(Some((text, cards("flights", &offers))))
            }
            Intent::Hotel {
                city,
                check_in,
                check_out,
            } => {
                let (check_in, check_out) = stay_dates(check_in.as_deref(), check_out.as_deref(), today());
                let hotels = self
                    .serpapi
                    .search_hotels(city, &check_in.to_string(), &check_out.to_string())
                    .await?;
                if hotels.is_empty() {
                    return Ok(None);
                }
                let text = format!(
                    "I found {} hotels in {} from {} to {}.",
                    hotels.len(),
                    city,
                    check_in,
                    check_out
                );
                Ok(Some((text, cards("hotels", &hotels))))
            }
            Intent::Destination { keyword } => {
                let places = self
                    .amadeus
                    .search_cities(keyword, CHAT_DESTINATION_LIMIT)
                    .await?;
                if places.is_empty() {
                    return Ok(None);
                }
                let mut destinations = Vec::with_capacity(places.len());
                for place in places {
                    let image = self.pexels.find_image(&place.image_query()).await;
                    destinations.push(Destination::from_place(place, image));
                }
                let text = format!("Here are some destinations matching \"{}\".", keyword);
                Ok(Some((text, cards("destinations", &destinations))))
            }
            Intent::General => Ok(None),
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn cards<T: Serialize>(kind: &str, items: &[T]) -> ChatCards {
    ChatCards {
        kind: kind.to_string(),
        items: items
            .iter()
            .filter_map(|item| serde_json::to_value(item).ok())
            .collect::<Vec<Value>>(),
    }
}

/// A requested date if it parses and is not in the past, else two weeks out.
fn upcoming_date(requested: Option<&str>, today: NaiveDate) -> NaiveDate {
    requested
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .filter(|d| *d >= today)
        .unwrap_or(today + Duration::days(DEFAULT_LEAD_DAYS))
}

/// Check-in per `upcoming_date`; check-out must follow it, else one night.
fn stay_dates(check_in: Option<&str>, check_out: Option<&str>, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let check_in = upcoming_date(check_in, today);
    let check_out = check_out
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .filter(|d| *d > check_in)
        .unwrap_or(check_in + Duration::days(1));
    (check_in, check_out)
}
