use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::PaymentService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/crear-pago",
    tag = "pagos",
    request_body = CreatePaymentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Transacción creada en la pasarela", body = CreatePaymentResponse),
        (status = 400, description = "Método no soportado o datos incompletos")
    )
)]
pub async fn create_payment(
    payment_service: web::Data<PaymentService>,
    user: AuthUser,
    request: web::Json<CreatePaymentRequest>,
) -> Result<HttpResponse> {
    match payment_service.create_payment(&user, request.into_inner()).await {
        Ok(pago) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": pago
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/tokenizar-tarjeta",
    tag = "pagos",
    request_body = TokenizeCardRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token de la tarjeta para crear el pago")
    )
)]
pub async fn tokenize_card(
    payment_service: web::Data<PaymentService>,
    _user: AuthUser,
    request: web::Json<TokenizeCardRequest>,
) -> Result<HttpResponse> {
    match payment_service.tokenize_card(request.into_inner()).await {
        Ok(token) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "token": token }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/verificar-pago/{transaction_id}",
    tag = "pagos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Estado del pago una vez resuelto por el webhook, o el de la pasarela", body = PaymentStatusResponse)
    )
)]
pub async fn check_payment(
    payment_service: web::Data<PaymentService>,
    _user: AuthUser,
    transaction_id: web::Path<String>,
) -> Result<HttpResponse> {
    match payment_service.check_payment(&transaction_id).await {
        Ok(estado) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": estado
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/guardar-carrito-temporal",
    tag = "pagos",
    request_body = SaveTempCartRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Carrito guardado bajo la referencia de pago")
    )
)]
pub async fn save_temp_cart(
    payment_service: web::Data<PaymentService>,
    user: AuthUser,
    request: web::Json<SaveTempCartRequest>,
) -> Result<HttpResponse> {
    match payment_service.save_temp_cart(user.id, request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Carrito guardado"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/crear-pago", web::post().to(create_payment))
        .route("/api/tokenizar-tarjeta", web::post().to(tokenize_card))
        .route("/api/verificar-pago/{transaction_id}", web::get().to(check_payment))
        .route("/api/guardar-carrito-temporal", web::post().to(save_temp_cart));
}
