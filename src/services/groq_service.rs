use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::config::LandingConfig;
use crate::models::chat::{ChatMessage, Intent, IntentClassification, MAX_HISTORY_TURNS};
use crate::models::itinerary::{GeneratedItinerary, ItineraryDay};
use crate::services::http_service::{HttpClient, UpstreamError};
use crate::services::pexels_service::PexelsService;

const ITINERARY_SYSTEM_PROMPT: &str =
    "You are an expert travel itinerary generator. You must return a JSON object with the key 'days'.";

const CHAT_SYSTEM_PROMPT: &str = "You are the GlobeTrotter travel assistant. Answer travel questions \
concisely and warmly, suggest concrete places, seasons and budgets when relevant, and keep replies \
under 150 words.";

const INTENT_SYSTEM_PROMPT: &str = "You classify travel chat messages. Reply with a JSON object only.";

/// Chat-completions client for Groq's OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct GroqService {
    http: Arc<dyn HttpClient>,
    pexels: PexelsService,
    url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GroqService {
    pub fn new(config: &LandingConfig, http: Arc<dyn HttpClient>, pexels: PexelsService) -> Self {
        Self {
            http,
            pexels,
            url: config.groq_url.clone(),
            api_key: config.groq_api_key.clone(),
            model: config.groq_model.clone(),
            timeout: config.ai_timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// One completion call; returns the first choice's message content.
    async fn complete(
        &self,
        messages: Vec<Value>,
        temperature: f64,
        json_mode: bool,
    ) -> Result<String, UpstreamError> {
        if !self.is_configured() {
            return Err(UpstreamError::new("Groq API key not configured").with_status(503));
        }

        let mut payload = json!({
            "model": self.model,
            "messages": messages,
            "temperature": temperature,
        });
        if json_mode {
            payload["response_format"] = json!({"type": "json_object"});
        }

        let headers = [("Authorization", format!("Bearer {}", self.api_key))];
        let response = self
            .http
            .post_json(&self.url, &payload, &headers, self.timeout)
            .await?;

        response.data["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                UpstreamError::new("Groq response had no message content")
                    .with_status(502)
                    .with_details(response.data.clone())
            })
    }

    /// Hour-by-hour plan for `duration` days, each item decorated with a photo
    /// when Pexels has one.
    pub async fn enhance_itinerary(
        &self,
        destination: &str,
        duration: u32,
        activities: &[Value],
        hotel: Option<&str>,
    ) -> Result<Vec<ItineraryDay>, UpstreamError> {
        if !self.is_configured() {
            return Err(UpstreamError::new("Groq API key not configured").with_status(503));
        }

        let prompt = itinerary_prompt(destination, duration, activities, hotel);
        let messages = vec![
            json!({"role": "system", "content": ITINERARY_SYSTEM_PROMPT}),
            json!({"role": "user", "content": prompt}),
        ];

        let content = self
            .complete(messages, 0.7, true)
            .await
            .map_err(|e| ai_failure(&e.to_string(), e.details))?;
        let generated: GeneratedItinerary = serde_json::from_str(&content)
            .map_err(|e| ai_failure(&format!("invalid itinerary JSON: {}", e), None))?;

        let mut days = generated.days;
        for day in days.iter_mut() {
            for item in day.schedule.iter_mut() {
                let query = format!("{} {}", item.title, destination);
                if let Some(image) = self.pexels.find_image(&query).await {
                    item.image = Some(image.url);
                }
            }
        }

        Ok(days)
    }

    /// Classify `message`. Any failure to get or parse a classification reads
    /// as `Intent::General`.
    pub async fn detect_intent(&self, message: &str) -> Intent {
        let messages = vec![
            json!({"role": "system", "content": INTENT_SYSTEM_PROMPT}),
            json!({"role": "user", "content": intent_prompt(message)}),
        ];

        let content = match self.complete(messages, 0.0, true).await {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Intent classification failed: {}", e);
                return Intent::General;
            }
        };

        match serde_json::from_str::<IntentClassification>(&content) {
            Ok(classification) => Intent::from(classification),
            Err(e) => {
                log::warn!("Unreadable intent classification: {}", e);
                Intent::General
            }
        }
    }

    /// Plain conversational reply using the last few history turns.
    pub async fn converse(&self, message: &str, history: &[ChatMessage]) -> Result<String, UpstreamError> {
        let messages = conversation(message, history);
        self.complete(messages, 0.7, false).await
    }
}

fn ai_failure(reason: &str, details: Option<Value>) -> UpstreamError {
    let mut err = UpstreamError::new(format!("AI generation failed: {}", reason)).with_status(502);
    err.details = details;
    err
}

fn itinerary_prompt(destination: &str, duration: u32, activities: &[Value], hotel: Option<&str>) -> String {
    let hotel_context = hotel
        .filter(|h| !h.trim().is_empty())
        .map(|h| format!(" Staying at: {}.", h.trim()))
        .unwrap_or_default();
    let selected = serde_json::to_string(activities).unwrap_or_else(|_| "[]".to_string());

    format!(
        "You are a travel planning assistant for GlobeTrotter.\n\
         The user is visiting {destination} for {duration} days.{hotel_context}\n\
         They have already selected these major attractions: {selected}.\n\n\
         TASK: Build a dense, hour-by-hour plan for every day between 9:00 AM and 9:00 PM, \
         covering logistics (hotel check-in on day 1), meals and local hidden gems.\n\n\
         FORMAT: Return a JSON object with a 'days' array. Each element has a 'day' integer \
         (1 to {duration}) and a 'schedule' array. Each schedule item has:\n\
         - time: string such as \"10:30 AM\"\n\
         - type: one of TRAVEL, DINING, SIGHTSEEING, CULTURE, LEISURE, FOOD\n\
         - title: short descriptive string\n\
         - description: one evocative sentence\n\n\
         Use 6-8 items per day. Day 1 starts with arrival and check-in; the last day ends with departure."
    )
}

fn intent_prompt(message: &str) -> String {
    let today = Utc::now().date_naive();
    format!(
        "Today is {today}. Classify the travel request below.\n\
         Return JSON with keys: intent (one of flight, hotel, destination, general), \
         origin (IATA airport or city code or null), destination (IATA code for flights, \
         otherwise a place name, or null), date (YYYY-MM-DD or null), city (or null), \
         check_in (YYYY-MM-DD or null), check_out (YYYY-MM-DD or null), keyword (or null).\n\n\
         Message: {message}"
    )
}

/// System prompt, the last `MAX_HISTORY_TURNS` user/assistant turns, then
/// the new message.
fn conversation(message: &str, history: &[ChatMessage]) -> Vec<Value> {
    let mut messages = vec![json!({"role": "system", "content": CHAT_SYSTEM_PROMPT})];
    let turns: Vec<&ChatMessage> = history
        .iter()
        .filter(|turn| matches!(turn.role.as_str(), "user" | "assistant") && !turn.content.trim().is_empty())
        .collect();
    let skip = turns.len().saturating_sub(MAX_HISTORY_TURNS);
    messages.extend(
        turns
            .into_iter()
            .skip(skip)
            .map(|turn| json!({"role": turn.role, "content": turn.content})),
    );
    messages.push(json!({"role": "user", "content": message}));
    messages
}
