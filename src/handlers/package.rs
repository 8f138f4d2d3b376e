use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::PackageService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/paquetes",
    tag = "paquetes",
    responses(
        (status = 200, description = "Paquetes activos y vigentes", body = Vec<PackageWithProducts>)
    )
)]
pub async fn list_packages(package_service: web::Data<PackageService>) -> Result<HttpResponse> {
    match package_service.list_active().await {
        Ok(paquetes) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": paquetes
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/paquetes/{id}",
    tag = "paquetes",
    responses(
        (status = 200, description = "Paquete con sus productos", body = PackageWithProducts),
        (status = 404, description = "Paquete no encontrado")
    )
)]
pub async fn get_package(
    package_service: web::Data<PackageService>,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match package_service.get(*id).await {
        Ok(paquete) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": paquete
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/paquetes",
    tag = "paquetes",
    request_body = CreatePackageRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Paquete creado", body = PackageWithProducts),
        (status = 403, description = "Requiere rol admin")
    )
)]
pub async fn create_package(
    package_service: web::Data<PackageService>,
    user: AuthUser,
    request: web::Json<CreatePackageRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match package_service.create(request.into_inner()).await {
        Ok(paquete) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": paquete
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/paquetes/{id}",
    tag = "paquetes",
    request_body = UpdatePackageRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Paquete actualizado", body = PackageWithProducts)
    )
)]
pub async fn update_package(
    package_service: web::Data<PackageService>,
    user: AuthUser,
    id: web::Path<i64>,
    request: web::Json<UpdatePackageRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match package_service.update(*id, request.into_inner()).await {
        Ok(paquete) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": paquete
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/paquetes/{id}",
    tag = "paquetes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Paquete desactivado")
    )
)]
pub async fn delete_package(
    package_service: web::Data<PackageService>,
    user: AuthUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match package_service.delete(*id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Paquete desactivado"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/paquetes/estadisticas",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ventas e inventario de paquetes", body = PackageStats)
    )
)]
pub async fn package_stats(
    package_service: web::Data<PackageService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match package_service.stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn package_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/paquetes", web::get().to(list_packages))
        .route("/paquetes", web::post().to(create_package))
        .route("/paquetes/{id}", web::get().to(get_package))
        .route("/paquetes/{id}", web::put().to(update_package))
        .route("/paquetes/{id}", web::delete().to(delete_package))
        .route("/api/admin/paquetes/estadisticas", web::get().to(package_stats));
}
