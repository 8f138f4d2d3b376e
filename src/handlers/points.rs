use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::PointsService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/puntos/mi-saldo",
    tag = "puntos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Saldo, nivel y progreso al siguiente nivel", body = PointsBalance)
    )
)]
pub async fn balance(
    points_service: web::Data<PointsService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match points_service.get_balance(user.id).await {
        Ok(balance) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": balance
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/puntos/historial",
    tag = "puntos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Movimientos de puntos del usuario")
    )
)]
pub async fn history(
    points_service: web::Data<PointsService>,
    user: AuthUser,
    params: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match points_service.history(user.id, &params).await {
        Ok(transacciones) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": transacciones
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/puntos/opciones-canje",
    tag = "puntos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Opciones de canje y saldo disponible")
    )
)]
pub async fn redemption_options(
    points_service: web::Data<PointsService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match points_service.redemption_options(user.id).await {
        Ok((disponibles, opciones)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "puntos_disponibles": disponibles,
                "opciones": opciones
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/puntos/canjear",
    tag = "puntos",
    request_body = RedeemPointsRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Código de canje generado", body = RedeemPointsResponse),
        (status = 400, description = "Saldo insuficiente o cantidad inválida")
    )
)]
pub async fn redeem(
    points_service: web::Data<PointsService>,
    user: AuthUser,
    request: web::Json<RedeemPointsRequest>,
) -> Result<HttpResponse> {
    match points_service.redeem(user.id, request.puntos).await {
        Ok(canje) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": canje
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/puntos/recompensas",
    tag = "puntos",
    params(("categoria" = Option<String>, Query, description = "Filtra por categoría; 'todos' lista todo")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Catálogo de recompensas vigentes", body = [RecompensaView])
    )
)]
pub async fn rewards_catalog(
    points_service: web::Data<PointsService>,
    user: AuthUser,
    params: web::Query<RewardCatalogQuery>,
) -> Result<HttpResponse> {
    match points_service
        .rewards_catalog(user.id, params.categoria.as_deref())
        .await
    {
        Ok(recompensas) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": recompensas
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/puntos/canjear/{recompensa_id}",
    tag = "puntos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Recompensa canjeada", body = RewardRedeemedResponse),
        (status = 400, description = "Puntos o nivel insuficiente, o recompensa agotada"),
        (status = 404, description = "Recompensa no encontrada")
    )
)]
pub async fn redeem_reward(
    points_service: web::Data<PointsService>,
    user: AuthUser,
    recompensa_id: web::Path<i64>,
) -> Result<HttpResponse> {
    match points_service.redeem_reward(user.id, *recompensa_id).await {
        Ok(canje) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "canje": canje
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/puntos/mis-canjes",
    tag = "puntos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Canjes activos del usuario")
    )
)]
pub async fn my_redemptions(
    points_service: web::Data<PointsService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match points_service.my_redemptions(user.id).await {
        Ok(canjes) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": canjes
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/puntos/cancelar-canje",
    tag = "puntos",
    request_body = RedemptionCodeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Canje cancelado"),
        (status = 404, description = "Canje no encontrado")
    )
)]
pub async fn cancel_redemption(
    points_service: web::Data<PointsService>,
    user: AuthUser,
    request: web::Json<RedemptionCodeRequest>,
) -> Result<HttpResponse> {
    match points_service.cancel_redemption(user.id, &request.codigo_canje).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Canje cancelado"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/puntos/validar-canje",
    tag = "puntos",
    request_body = RedemptionCodeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Validez y valor del código de canje", body = RedemptionValidation)
    )
)]
pub async fn validate_redemption(
    points_service: web::Data<PointsService>,
    user: AuthUser,
    request: web::Json<RedemptionCodeRequest>,
) -> Result<HttpResponse> {
    match points_service.validate_redemption(user.id, &request.codigo_canje).await {
        Ok(validacion) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": validacion
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/puntos/otorgar",
    tag = "admin",
    request_body = GrantPointsRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Puntos otorgados manualmente")
    )
)]
pub async fn grant_points(
    points_service: web::Data<PointsService>,
    user: AuthUser,
    request: web::Json<GrantPointsRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match points_service.grant_points(request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Puntos otorgados"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/puntos/dashboard",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Métricas del programa de puntos", body = PointsDashboard)
    )
)]
pub async fn dashboard(
    points_service: web::Data<PointsService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match points_service.dashboard().await {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": dashboard
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn points_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/puntos")
            .route("/mi-saldo", web::get().to(balance))
            .route("/historial", web::get().to(history))
            .route("/opciones-canje", web::get().to(redemption_options))
            .route("/recompensas", web::get().to(rewards_catalog))
            .route("/canjear", web::post().to(redeem))
            .route("/canjear/{recompensa_id}", web::post().to(redeem_reward))
            .route("/mis-canjes", web::get().to(my_redemptions))
            .route("/cancelar-canje", web::post().to(cancel_redemption))
            .route("/validar-canje", web::post().to(validate_redemption)),
    )
    .route("/api/admin/puntos/otorgar", web::post().to(grant_points))
    .route("/api/admin/puntos/dashboard", web::get().to(dashboard));
}
