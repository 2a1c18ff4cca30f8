use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub url: String,
    pub photographer: Option<String>,
}

/// Banner block of the landing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Banner {
    pub query: String,
    pub image_url: Option<String>,
    pub source: Option<String>,
}

impl Banner {
    pub fn new(query: &str, image: Option<Image>) -> Self {
        Self {
            query: query.to_string(),
            source: image.as_ref().map(|_| "pexels".to_string()),
            image_url: image.map(|img| img.url),
        }
    }
}
