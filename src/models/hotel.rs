use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::location::{as_f64, non_empty_str};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hotel {
    pub name: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub rate_per_night: Option<String>,
    pub price_per_night: Option<f64>,
    pub total_rate: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Option<u64>,
    pub hotel_class: Option<String>,
    pub image_url: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Hotel {
    /// Normalize one SerpApi Google Hotels `properties` entry.
    pub fn from_serpapi(property: &Value) -> Option<Self> {
        let name = non_empty_str(&property["name"])?;
        let image_url = property["images"]
            .as_array()
            .and_then(|images| images.first())
            .and_then(|img| {
                non_empty_str(&img["original_image"]).or_else(|| non_empty_str(&img["thumbnail"]))
            });

        Some(Self {
            name,
            description: non_empty_str(&property["description"]),
            link: non_empty_str(&property["link"]),
            rate_per_night: non_empty_str(&property["rate_per_night"]["lowest"]),
            price_per_night: as_f64(&property["rate_per_night"]["extracted_lowest"]),
            total_rate: non_empty_str(&property["total_rate"]["lowest"]),
            rating: as_f64(&property["overall_rating"]),
            reviews: property["reviews"].as_u64(),
            hotel_class: non_empty_str(&property["hotel_class"]),
            image_url,
            lat: as_f64(&property["gps_coordinates"]["latitude"]),
            lon: as_f64(&property["gps_coordinates"]["longitude"]),
        })
    }
}
