use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::ProductService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/productos",
    tag = "productos",
    responses(
        (status = 200, description = "Catálogo completo", body = Vec<Product>)
    )
)]
pub async fn list_products(product_service: web::Data<ProductService>) -> Result<HttpResponse> {
    match product_service.list().await {
        Ok(productos) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": productos
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/productos-con-descuentos",
    tag = "productos",
    responses(
        (status = 200, description = "Catálogo con precio final calculado", body = Vec<ProductWithDiscount>)
    )
)]
pub async fn list_with_discounts(
    product_service: web::Data<ProductService>,
) -> Result<HttpResponse> {
    match product_service.list_with_discounts().await {
        Ok(productos) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": productos
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/productos/buscar/{termino}",
    tag = "productos",
    params(("termino" = String, Path, description = "Texto a buscar en nombre, categoría o código")),
    responses(
        (status = 200, description = "Productos que coinciden", body = Vec<Product>)
    )
)]
pub async fn search_products(
    product_service: web::Data<ProductService>,
    termino: web::Path<String>,
) -> Result<HttpResponse> {
    match product_service.search(&termino).await {
        Ok(productos) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": productos
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/productos",
    tag = "productos",
    request_body = CreateProductRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Producto creado", body = Product),
        (status = 403, description = "Requiere rol admin")
    )
)]
pub async fn create_product(
    product_service: web::Data<ProductService>,
    user: AuthUser,
    request: web::Json<CreateProductRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match product_service.create(request.into_inner()).await {
        Ok(producto) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": producto
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/productos/{id}",
    tag = "productos",
    request_body = UpdateProductRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Producto actualizado", body = Product),
        (status = 404, description = "Producto no encontrado")
    )
)]
pub async fn update_product(
    product_service: web::Data<ProductService>,
    user: AuthUser,
    id: web::Path<i64>,
    request: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match product_service.update(*id, request.into_inner()).await {
        Ok(producto) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": producto
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/productos/{id}",
    tag = "productos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Producto eliminado"),
        (status = 404, description = "Producto no encontrado")
    )
)]
pub async fn delete_product(
    product_service: web::Data<ProductService>,
    user: AuthUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match product_service.delete(*id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Producto eliminado"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/admin/productos/{id}/descuento",
    tag = "admin",
    request_body = UpdateDiscountRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Descuento actualizado", body = Product)
    )
)]
pub async fn update_discount(
    product_service: web::Data<ProductService>,
    user: AuthUser,
    id: web::Path<i64>,
    request: web::Json<UpdateDiscountRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match product_service.update_discount(*id, request.into_inner()).await {
        Ok(producto) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": producto
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/admin/productos/{id}/costo",
    tag = "admin",
    request_body = UpdateCostRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Costo actualizado", body = Product)
    )
)]
pub async fn update_cost(
    product_service: web::Data<ProductService>,
    user: AuthUser,
    id: web::Path<i64>,
    request: web::Json<UpdateCostRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match product_service.update_cost(*id, request.into_inner()).await {
        Ok(producto) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": producto
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn product_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/productos", web::get().to(list_products))
        .route("/productos", web::post().to(create_product))
        .route("/productos-con-descuentos", web::get().to(list_with_discounts))
        .route("/productos/buscar/{termino}", web::get().to(search_products))
        .route("/productos/{id}", web::put().to(update_product))
        .route("/productos/{id}", web::delete().to(delete_product))
        .route("/api/admin/productos/{id}/descuento", web::put().to(update_discount))
        .route("/api/admin/productos/{id}/costo", web::put().to(update_cost));
}
