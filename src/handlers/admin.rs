use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::AdminService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Contadores del panel", body = AdminStats),
        (status = 403, description = "Requiere rol admin")
    )
)]
pub async fn stats(
    admin_service: web::Data<AdminService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match admin_service.stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Usuarios registrados, paginados")
    )
)]
pub async fn list_users(
    admin_service: web::Data<AdminService>,
    user: AuthUser,
    params: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match admin_service.list_users(&params).await {
        Ok(pagina) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": pagina
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/stats/residential",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Actividad por torre y piso", body = ResidentialStats)
    )
)]
pub async fn residential_stats(
    admin_service: web::Data<AdminService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match admin_service.residential_stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/stats", web::get().to(stats))
            .route("/stats/residential", web::get().to(residential_stats))
            .route("/users", web::get().to(list_users)),
    );
}
