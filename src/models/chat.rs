use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MAX_HISTORY_TURNS: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Body of `POST /landing/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

/// Slots extracted by the classification completion. Every field is optional
/// because the model is free to omit them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntentClassification {
    #[serde(default)]
    pub intent: String,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<String>,
    pub city: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Flight {
        origin: Option<String>,
        destination: String,
        date: Option<String>,
    },
    Hotel {
        city: String,
        check_in: Option<String>,
        check_out: Option<String>,
    },
    Destination {
        keyword: String,
    },
    General,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Flight { .. } => "flight",
            Intent::Hotel { .. } => "hotel",
            Intent::Destination { .. } => "destination",
            Intent::General => "general",
        }
    }
}

impl From<IntentClassification> for Intent {
    /// An intent whose mandatory slot is missing degrades to `General`.
    fn from(c: IntentClassification) -> Self {
        let slot = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        match c.intent.trim().to_lowercase().as_str() {
            "flight" | "flights" => match slot(c.destination) {
                Some(destination) => Intent::Flight {
                    origin: slot(c.origin),
                    destination,
                    date: slot(c.date),
                },
                None => Intent::General,
            },
            "hotel" | "hotels" => match slot(c.city).or_else(|| slot(c.destination)) {
                Some(city) => Intent::Hotel {
                    city,
                    check_in: slot(c.check_in).or_else(|| slot(c.date)),
                    check_out: slot(c.check_out),
                },
                None => Intent::General,
            },
            "destination" | "destinations" => {
                match slot(c.keyword).or_else(|| slot(c.destination)).or_else(|| slot(c.city)) {
                    Some(keyword) => Intent::Destination { keyword },
                    None => Intent::General,
                }
            }
            _ => Intent::General,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCards {
    #[serde(rename = "type")]
    pub kind: String,
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub intent: String,
    pub data: Option<ChatCards>,
}
