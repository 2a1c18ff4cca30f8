use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::{clamp_limit, param};
use crate::error::ApiError;
use crate::models::attraction::Attraction;
use crate::services::http_service::UpstreamError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AttractionParams {
    city: Option<String>,
    limit: Option<String>,
}

/*
    /landing/attractions?city=&limit=
*/
pub async fn get_attractions(
    state: web::Data<AppState>,
    params: web::Query<AttractionParams>,
) -> Result<HttpResponse, ApiError> {
    let city = param(&params.city).ok_or_else(|| ApiError::validation("missing_city", "City is required."))?;
    let limit = clamp_limit(&params.limit, 18, 1, 30);

    let (results, cached): (Vec<Attraction>, bool) = state
        .cached(
            "attractions",
            json!({ "city": city.to_lowercase(), "limit": limit }),
            || async {
                let mut attractions = state.wikipedia.search_attractions(city, limit).await?;
                for attraction in attractions.iter_mut().filter(|a| a.image_url.is_none()) {
                    let query = format!("{} {}", attraction.name, city);
                    attraction.image_url = state.pexels.find_image(&query).await.map(|img| img.url);
                }
                Ok::<_, UpstreamError>(attractions)
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "cached": cached,
        "city": city,
        "results": results,
    })))
}
