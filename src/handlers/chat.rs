use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::ChatService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Respuesta del asistente", body = ChatResponse)
    )
)]
pub async fn chat(
    chat_service: web::Data<ChatService>,
    request: web::Json<ChatRequest>,
) -> Result<HttpResponse> {
    match chat_service.chat(request.into_inner()).await {
        Ok(respuesta) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": respuesta
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/chat/pedido/{numero}",
    tag = "chat",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Estado del pedido para el widget de soporte", body = OrderLookupResponse),
        (status = 403, description = "El pedido es de otro usuario"),
        (status = 404, description = "Pedido no encontrado")
    )
)]
pub async fn order_lookup(
    chat_service: web::Data<ChatService>,
    user: AuthUser,
    numero: web::Path<i64>,
) -> Result<HttpResponse> {
    match chat_service.order_lookup(&user, *numero).await {
        Ok(estado) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": estado
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn chat_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/chat", web::post().to(chat))
        .route("/chat/pedido/{numero}", web::get().to(order_lookup));
}
