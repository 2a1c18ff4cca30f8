use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::LandingConfig;
use crate::models::attraction::Attraction;
use crate::services::http_service::{build_url, HttpClient, UpstreamError};

const MAX_SEARCH_RESULTS: usize = 50;

/// Attraction lookup through the public MediaWiki search generator.
#[derive(Clone)]
pub struct WikipediaService {
    http: Arc<dyn HttpClient>,
    base: String,
    timeout: Duration,
}

impl WikipediaService {
    pub fn new(config: &LandingConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            base: config.wikipedia_base.trim_end_matches('/').to_string(),
            timeout: config.outbound_timeout,
        }
    }

    pub async fn search_attractions(&self, city: &str, limit: usize) -> Result<Vec<Attraction>, UpstreamError> {
        // Over-fetch: filtering usually drops a few pages.
        let fetch = (limit * 2 + 4).min(MAX_SEARCH_RESULTS);
        let url = build_url(
            &format!("{}/w/api.php", self.base),
            &[
                ("action", "query".to_string()),
                ("format", "json".to_string()),
                ("formatversion", "2".to_string()),
                ("generator", "search".to_string()),
                ("gsrsearch", format!("tourist attractions in {}", city)),
                ("gsrnamespace", "0".to_string()),
                ("gsrlimit", fetch.to_string()),
                ("prop", "extracts|pageimages|info".to_string()),
                ("exintro", "1".to_string()),
                ("explaintext", "1".to_string()),
                ("exsentences", "2".to_string()),
                ("exlimit", "max".to_string()),
                ("piprop", "thumbnail".to_string()),
                ("pithumbsize", "640".to_string()),
                ("pilimit", "max".to_string()),
                ("inprop", "url".to_string()),
            ],
        )?;
        let response = self.http.get(&url, &[], self.timeout).await?;

        Ok(attractions_from(&response.data, city, limit, &self.base))
    }
}

/// Pages in search order, keeping only those about places in `city`.
///
/// Dropped: the city's own article, "List(s) of ..." articles, and pages whose
/// title and extract never mention the city.
fn attractions_from(data: &Value, city: &str, limit: usize, base: &str) -> Vec<Attraction> {
    let mut pages: Vec<&Value> = match &data["query"]["pages"] {
        Value::Array(pages) => pages.iter().collect(),
        Value::Object(pages) => pages.values().collect(),
        _ => Vec::new(),
    };
    pages.sort_by_key(|page| page["index"].as_u64().unwrap_or(u64::MAX));

    let city_lower = city.trim().to_lowercase();

    pages
        .into_iter()
        .filter_map(|page| {
            let title = page["title"].as_str()?.trim();
            let title_lower = title.to_lowercase();
            let extract = page["extract"].as_str().map(str::trim).filter(|s| !s.is_empty());

            if title.is_empty() || title_lower == city_lower || is_list_page(&title_lower) {
                return None;
            }
            let mentions_city = title_lower.contains(&city_lower)
                || extract
                    .map(|e| e.to_lowercase().contains(&city_lower))
                    .unwrap_or(false);
            if !mentions_city {
                return None;
            }

            let source_url = page["fullurl"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}/wiki/{}", base, title.replace(' ', "_")));

            Some(Attraction {
                name: title.to_string(),
                description: extract.map(str::to_string),
                image_url: page["thumbnail"]["source"].as_str().map(str::to_string),
                source_url: Some(source_url),
                source: "wikipedia".to_string(),
            })
        })
        .take(limit)
        .collect()
}

fn is_list_page(title_lower: &str) -> bool {
    title_lower.starts_with("list of") || title_lower.starts_with("lists of")
}
