use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;

use super::{clamp_limit, param};
use crate::error::ApiError;
use crate::models::location::Destination;
use crate::models::media::Banner;
use crate::services::destination_service::DESTINATION_COUNT;
use crate::state::AppState;

const DEFAULT_BANNER_QUERY: &str = "travel landscape";
const HOME_DESTINATION_LIMIT: usize = 6;

#[derive(Deserialize)]
pub struct LandingParams {
    q: Option<String>,
    banner_q: Option<String>,
    limit: Option<String>,
}

fn destination_search_unavailable() -> ApiError {
    ApiError::ServiceUnavailable(
        "Destination search is temporarily unavailable. Please try again later.".to_string(),
    )
}

async fn banner_for(state: &AppState, prefix: &str, query: &str) -> (Banner, bool) {
    let computed: Result<(Banner, bool), Infallible> = state
        .cached(prefix, json!({ "q": query }), || async {
            Ok(Banner::new(query, state.pexels.find_image(query).await))
        })
        .await;
    match computed {
        Ok(banner) => banner,
        Err(never) => match never {},
    }
}

/*
    /landing/banner?q=
*/
pub async fn banner(
    state: web::Data<AppState>,
    params: web::Query<LandingParams>,
) -> Result<HttpResponse, ApiError> {
    let query = param(&params.q).unwrap_or(DEFAULT_BANNER_QUERY);
    let (banner, cached) = banner_for(&state, "banner", query).await;

    Ok(HttpResponse::Ok().json(json!({
        "cached": cached,
        "banner": banner,
    })))
}

/*
    /landing/home?banner_q=&q=
    Banner and destinations are cached separately, so changing `q` still
    reuses the banner.
*/
pub async fn home(
    state: web::Data<AppState>,
    params: web::Query<LandingParams>,
) -> Result<HttpResponse, ApiError> {
    let banner_query = param(&params.banner_q).unwrap_or(DEFAULT_BANNER_QUERY);
    let query = param(&params.q);

    if query.is_some() && !state.integrations().amadeus {
        return Err(destination_search_unavailable());
    }

    let (banner, banner_cached) = banner_for(&state, "home_banner", banner_query).await;

    let (destinations, destinations_cached) = match query {
        Some(q) => {
            state
                .cached("home_destinations", json!({ "q": q.to_lowercase() }), || {
                    state.destinations.search(q, HOME_DESTINATION_LIMIT)
                })
                .await?
        }
        None => (Vec::<Destination>::new(), false),
    };

    Ok(HttpResponse::Ok().json(json!({
        "banner": banner,
        "banner_cached": banner_cached,
        "destinations": destinations,
        "destinations_cached": destinations_cached,
    })))
}

/*
    /landing/trending?limit=
*/
pub async fn trending(
    state: web::Data<AppState>,
    params: web::Query<LandingParams>,
) -> Result<HttpResponse, ApiError> {
    if !state.integrations().amadeus {
        return Err(destination_search_unavailable());
    }
    let limit = clamp_limit(&params.limit, 8, 4, 12);

    let (results, cached) = state
        .cached("trending", json!({ "limit": limit }), || async {
            Ok::<_, ApiError>(state.destinations.trending(limit).await)
        })
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "cached": cached,
        "results": results,
    })))
}

/*
    /landing/destinations?q=
    Always answers with exactly eight destinations.
*/
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<LandingParams>,
) -> Result<HttpResponse, ApiError> {
    let query = param(&params.q).ok_or_else(|| {
        ApiError::validation(
            "missing_query",
            "Search query is required. Please enter a city or destination name.",
        )
    })?;
    if !state.integrations().amadeus {
        return Err(destination_search_unavailable());
    }

    let (results, cached): (Vec<Destination>, bool) = state
        .cached(
            "destinations",
            json!({ "q": query.to_lowercase(), "count": DESTINATION_COUNT }),
            || state.destinations.discover(query),
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "cached": cached,
        "query": query,
        "results": results,
    })))
}
