use actix_web::{web, HttpResponse};
use log::error;

use crate::models::chat::{ChatReply, ChatRequest};
use crate::routes::AppState;

pub async fn chatbot(state: web::Data<AppState>, body: Option<web::Json<ChatRequest>>) -> HttpResponse {
    let message = body
        .and_then(|body| body.into_inner().message)
        .filter(|message| !message.trim().is_empty());

    let Some(message) = message else {
        return HttpResponse::BadRequest().json(ChatReply::new("⚠️ Please provide a message."));
    };

    match state.chatbot.reply(&message).await {
        Ok(reply) => HttpResponse::Ok().json(ChatReply::new(reply)),
        Err(e) => {
            error!("Chatbot error: {}", e);
            HttpResponse::InternalServerError().json(ChatReply::new("⚠️ Server error, please try again."))
        }
    }
}
