use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::PromoService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/validar-codigo-promocional",
    tag = "promociones",
    request_body = ValidatePromoCodeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Validez y porcentaje del código", body = PromoCodeValidation)
    )
)]
pub async fn validate_code(
    promo_service: web::Data<PromoService>,
    user: AuthUser,
    request: web::Json<ValidatePromoCodeRequest>,
) -> Result<HttpResponse> {
    match promo_service.validate(user.id, &request.codigo).await {
        Ok(validacion) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": validacion
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/aplicar-codigo-promocional",
    tag = "promociones",
    request_body = ApplyPromoCodeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Código marcado como usado"),
        (status = 400, description = "Código no válido o ya usado")
    )
)]
pub async fn apply_code(
    promo_service: web::Data<PromoService>,
    user: AuthUser,
    request: web::Json<ApplyPromoCodeRequest>,
) -> Result<HttpResponse> {
    match promo_service.apply(user.id, request.into_inner()).await {
        Ok(promo) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": promo
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/codigos-promocionales/generar",
    tag = "admin",
    request_body = GeneratePromoCodesRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Lote generado", body = GeneratePromoCodesResponse)
    )
)]
pub async fn generate_codes(
    promo_service: web::Data<PromoService>,
    user: AuthUser,
    request: web::Json<GeneratePromoCodesRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match promo_service.generate(request.into_inner()).await {
        Ok(resultado) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resultado
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/codigos-promocionales/lista",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Códigos promocionales paginados")
    )
)]
pub async fn list_codes(
    promo_service: web::Data<PromoService>,
    user: AuthUser,
    params: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match promo_service.list(&params).await {
        Ok(pagina) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": pagina
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/codigos-promocionales/stats",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Totales de códigos generados y usados", body = PromoCodeStats)
    )
)]
pub async fn code_stats(
    promo_service: web::Data<PromoService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match promo_service.stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/admin/codigos-promocionales/eliminar",
    tag = "admin",
    request_body = DeletePromoCodesRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Códigos eliminados según el modo pedido"),
        (status = 400, description = "Modo de eliminación no válido")
    )
)]
pub async fn delete_codes(
    promo_service: web::Data<PromoService>,
    user: AuthUser,
    request: web::Json<DeletePromoCodesRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match promo_service.delete_codes(request.into_inner()).await {
        Ok(eliminados) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "eliminados": eliminados }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn promo_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/validar-codigo-promocional", web::post().to(validate_code))
        .route("/api/aplicar-codigo-promocional", web::post().to(apply_code))
        .service(
            web::scope("/api/admin/codigos-promocionales")
                .route("/generar", web::post().to(generate_codes))
                .route("/lista", web::get().to(list_codes))
                .route("/stats", web::get().to(code_stats))
                .route("/eliminar", web::delete().to(delete_codes)),
        );
}
