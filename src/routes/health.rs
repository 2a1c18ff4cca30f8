use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::config::Integrations;
use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
}

#[derive(Serialize)]
struct IntegrationsStatus {
    integrations: Integrations,
}

/*
    /landing/health
*/
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok".to_string(),
    })
}

/*
    /landing/config
    Reports which providers are configured, never their keys.
*/
pub async fn integrations(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(IntegrationsStatus {
        integrations: state.integrations(),
    })
}
