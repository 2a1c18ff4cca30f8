use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::models::chat::ChatRequest;
use crate::state::AppState;

/*
    POST /landing/chat
    Not cached: replies depend on the conversation so far.
*/
pub async fn chat(
    state: web::Data<AppState>,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::validation("missing_message", "Message is required."));
    }
    if !state.integrations().groq {
        return Err(ApiError::ServiceUnavailable(
            "The travel assistant is temporarily unavailable. Please try again later.".to_string(),
        ));
    }

    let reply = state.chat.chat(message, &request.history).await?;
    Ok(HttpResponse::Ok().json(reply))
}
