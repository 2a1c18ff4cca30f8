use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attraction {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub source: String,
}
