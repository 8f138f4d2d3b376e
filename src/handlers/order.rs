use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::{NotificationService, OrderService};
use crate::utils::calcular_costo_envio;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalcShippingRequest {
    pub subtotal: i64,
    #[serde(rename = "metodoPago")]
    pub metodo_pago: String,
}

#[utoipa::path(
    post,
    path = "/orders",
    tag = "pedidos",
    request_body = CreateOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pedido creado", body = OrderCreatedResponse),
        (status = 400, description = "Stock insuficiente o datos inválidos")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    notifications: web::Data<NotificationService>,
    user: AuthUser,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    match order_service.create_order(&user, request.into_inner()).await {
        Ok(creado) => {
            notifications.notify_order_confirmed(creado.pedido_id).await;
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": creado
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "pedidos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pedidos del usuario autenticado")
    )
)]
pub async fn list_orders(
    order_service: web::Data<OrderService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    if user.is_admin() {
        return match order_service.admin_list(&AdminOrderQuery::default()).await {
            Ok(pagina) => Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": pagina
            }))),
            Err(e) => Ok(e.error_response()),
        };
    }
    match order_service.list_user_orders(user.id).await {
        Ok(pedidos) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": pedidos
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "pedidos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Detalle del pedido"),
        (status = 404, description = "Pedido no encontrado")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    user: AuthUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match order_service.get_order(*id).await {
        Ok(pedido) => {
            if pedido.usuario_id != user.id && !user.is_admin() {
                return Ok(crate::error::AppError::PermissionDenied.error_response());
            }
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": pedido
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/admin/pedidos/{id}/estado",
    tag = "admin",
    request_body = UpdateOrderStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Estado actualizado; cancelar repone stock")
    )
)]
pub async fn update_order_status(
    order_service: web::Data<OrderService>,
    user: AuthUser,
    id: web::Path<i64>,
    request: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match order_service.update_status(*id, request.estado).await {
        Ok(pedido) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": pedido
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/orders/{id}/entrega",
    tag = "pedidos",
    request_body = DeliverOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pedido marcado como entregado")
    )
)]
pub async fn deliver_order(
    order_service: web::Data<OrderService>,
    notifications: web::Data<NotificationService>,
    user: AuthUser,
    id: web::Path<i64>,
    request: web::Json<DeliverOrderRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    let entregado_por = request.entregado_por.clone();
    match order_service.mark_delivered(*id, request.into_inner()).await {
        Ok(pedido) => {
            notifications.notify_order_dispatched(&pedido, &entregado_por).await;
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": pedido
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/orders/{id}/payment",
    tag = "pedidos",
    request_body = UpdatePaymentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Estado del pago aplicado"),
        (status = 400, description = "Transición de pago inválida")
    )
)]
pub async fn update_order_payment(
    order_service: web::Data<OrderService>,
    user: AuthUser,
    id: web::Path<i64>,
    request: web::Json<UpdatePaymentRequest>,
) -> Result<HttpResponse> {
    match order_service.update_payment(*id, &user, request.into_inner()).await {
        Ok(pedido) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": pedido
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/pedidos",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pedidos filtrados con datos del cliente")
    )
)]
pub async fn admin_list_orders(
    order_service: web::Data<OrderService>,
    user: AuthUser,
    query: web::Query<AdminOrderQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }
    match order_service.admin_list(&query).await {
        Ok(pagina) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": pagina
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/calcular-envio",
    tag = "pedidos",
    request_body = CalcShippingRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Costo de envío según subtotal y método de pago")
    )
)]
pub async fn calc_shipping(request: web::Json<CalcShippingRequest>) -> Result<HttpResponse> {
    match calcular_costo_envio(request.subtotal, &request.metodo_pago) {
        Ok(quote) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": quote
        }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": { "code": e.codigo, "message": e.mensaje }
        }))),
    }
}

#[utoipa::path(
    get,
    path = "/api/verificar-pedido-reciente",
    tag = "pedidos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Último pedido de los últimos 10 minutos, si existe", body = RecentOrderResponse)
    )
)]
pub async fn recent_order(
    order_service: web::Data<OrderService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match order_service.recent_order(user.id).await {
        Ok(reciente) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": reciente
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/orders", web::post().to(create_order))
        .route("/orders", web::get().to(list_orders))
        .route("/orders/{id}", web::get().to(get_order))
        .route("/orders/{id}/entrega", web::put().to(deliver_order))
        .route("/orders/{id}/payment", web::put().to(update_order_payment))
        .route("/api/admin/pedidos", web::get().to(admin_list_orders))
        .route("/api/admin/pedidos/{id}/estado", web::put().to(update_order_status))
        .route("/api/calcular-envio", web::post().to(calc_shipping))
        .route("/api/verificar-pedido-reciente", web::get().to(recent_order));
}
