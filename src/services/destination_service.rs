use std::collections::HashSet;

use crate::models::location::{Destination, Place};
use crate::services::amadeus_service::AmadeusService;
use crate::services::http_service::UpstreamError;
use crate::services::pexels_service::PexelsService;

/// Number of cards the destination discovery endpoint always returns.
pub const DESTINATION_COUNT: usize = 8;

const DISCOVERY_SEARCH_LIMIT: usize = 15;

pub struct DefaultCity {
    pub name: &'static str,
    pub country: &'static str,
}

/// Popular destinations used for the trending list and to pad sparse searches.
pub const DEFAULT_DESTINATIONS: [DefaultCity; DESTINATION_COUNT] = [
    DefaultCity { name: "Chennai", country: "IN" },
    DefaultCity { name: "Mumbai", country: "IN" },
    DefaultCity { name: "Bangalore", country: "IN" },
    DefaultCity { name: "Delhi", country: "IN" },
    DefaultCity { name: "Hyderabad", country: "IN" },
    DefaultCity { name: "Kolkata", country: "IN" },
    DefaultCity { name: "Goa", country: "IN" },
    DefaultCity { name: "Jaipur", country: "IN" },
];

/// Builds destination cards from Amadeus places and Pexels photos. All
/// lookups run one after another.
#[derive(Clone)]
pub struct DestinationService {
    amadeus: AmadeusService,
    pexels: PexelsService,
}

impl DestinationService {
    pub fn new(amadeus: AmadeusService, pexels: PexelsService) -> Self {
        Self { amadeus, pexels }
    }

    async fn describe(&self, place: Place) -> Destination {
        let image = self.pexels.find_image(&place.image_query()).await;
        Destination::from_place(place, image)
    }

    async fn describe_default(&self, city: &DefaultCity) -> Destination {
        let image = self
            .pexels
            .find_image(&format!("{} {} travel", city.name, city.country))
            .await;
        Destination {
            provider: "default".to_string(),
            provider_place_id: None,
            name: city.name.to_string(),
            country: Some(city.country.to_string()),
            lat: None,
            lon: None,
            image_source: image.as_ref().map(|_| "pexels".to_string()),
            image_url: image.map(|img| img.url),
        }
    }

    /// First Amadeus match for a default city, if the lookup works.
    async fn lookup_default(&self, city: &DefaultCity) -> Option<Place> {
        match self.amadeus.search_cities(city.name, 1).await {
            Ok(places) => places.into_iter().next(),
            Err(e) => {
                log::warn!("Lookup for default city {} failed: {}", city.name, e);
                None
            }
        }
    }

    /// Trending list: the first `limit` default cities, resolved through
    /// Amadeus where possible and shown as static cards otherwise.
    pub async fn trending(&self, limit: usize) -> Vec<Destination> {
        let mut results = Vec::with_capacity(limit.min(DESTINATION_COUNT));
        for city in DEFAULT_DESTINATIONS.iter().take(limit) {
            let card = match self.lookup_default(city).await {
                Some(place) => self.describe(place).await,
                None => self.describe_default(city).await,
            };
            results.push(card);
        }
        results
    }

    /// Plain search: Amadeus order, at most `limit` cards.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Destination>, UpstreamError> {
        let places = self.amadeus.search_cities(query, limit).await?;
        let mut results = Vec::with_capacity(places.len());
        for place in places {
            results.push(self.describe(place).await);
        }
        Ok(results)
    }

    /// Discovery search returning exactly `DESTINATION_COUNT` cards with
    /// unique names: best match first, then other results, then default
    /// cities as padding.
    pub async fn discover(&self, query: &str) -> Result<Vec<Destination>, UpstreamError> {
        let places = self.amadeus.search_cities(query, DISCOVERY_SEARCH_LIMIT).await?;
        let ranked = rank_places(places, query);

        let mut seen: HashSet<String> = HashSet::new();
        let mut results = Vec::with_capacity(DESTINATION_COUNT);
        for place in ranked.into_iter().take(DESTINATION_COUNT) {
            seen.insert(place.name.to_lowercase());
            results.push(self.describe(place).await);
        }

        for city in DEFAULT_DESTINATIONS.iter() {
            if results.len() >= DESTINATION_COUNT {
                break;
            }
            if seen.contains(&city.name.to_lowercase()) {
                continue;
            }

            // A resolved name may not take the slot of another default city.
            let card = match self.lookup_default(city).await {
                Some(place) if !collides(&place.name, city, &seen) => self.describe(place).await,
                _ => self.describe_default(city).await,
            };
            seen.insert(city.name.to_lowercase());
            seen.insert(card.name.to_lowercase());
            results.push(card);
        }

        Ok(results)
    }
}

/// True when `name` is already listed or belongs to a default city other
/// than `city`.
fn collides(name: &str, city: &DefaultCity, seen: &HashSet<String>) -> bool {
    let name = name.to_lowercase();
    seen.contains(&name)
        || DEFAULT_DESTINATIONS
            .iter()
            .any(|other| other.name != city.name && other.name.to_lowercase() == name)
}

/// Drop case-insensitive duplicate names and move the best match to the
/// front: an exact name match, otherwise the first name starting with the
/// query.
pub fn rank_places(places: Vec<Place>, query: &str) -> Vec<Place> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Place> = places
        .into_iter()
        .filter(|p| seen.insert(p.name.to_lowercase()))
        .collect();

    let needle = query.trim().to_lowercase();
    let best = unique
        .iter()
        .position(|p| p.name.to_lowercase() == needle)
        .or_else(|| {
            unique
                .iter()
                .position(|p| p.name.to_lowercase().starts_with(&needle))
        });

    if let Some(idx) = best {
        let place = unique.remove(idx);
        unique.insert(0, place);
    }
    unique
}
