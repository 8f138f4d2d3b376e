use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_profile,
        handlers::auth::update_profile,
        handlers::product::list_products,
        handlers::product::list_with_discounts,
        handlers::product::search_products,
        handlers::product::create_product,
        handlers::product::update_product,
        handlers::product::delete_product,
        handlers::product::update_discount,
        handlers::product::update_cost,
        handlers::package::list_packages,
        handlers::package::get_package,
        handlers::package::create_package,
        handlers::package::update_package,
        handlers::package::delete_package,
        handlers::package::package_stats,
        handlers::order::create_order,
        handlers::order::list_orders,
        handlers::order::get_order,
        handlers::order::update_order_status,
        handlers::order::deliver_order,
        handlers::order::update_order_payment,
        handlers::order::admin_list_orders,
        handlers::order::calc_shipping,
        handlers::order::recent_order,
        handlers::points::balance,
        handlers::points::history,
        handlers::points::redemption_options,
        handlers::points::rewards_catalog,
        handlers::points::redeem,
        handlers::points::redeem_reward,
        handlers::points::my_redemptions,
        handlers::points::cancel_redemption,
        handlers::points::validate_redemption,
        handlers::points::grant_points,
        handlers::points::dashboard,
        handlers::promo::validate_code,
        handlers::promo::apply_code,
        handlers::promo::generate_codes,
        handlers::promo::list_codes,
        handlers::promo::code_stats,
        handlers::promo::delete_codes,
        handlers::payment::create_payment,
        handlers::payment::tokenize_card,
        handlers::payment::check_payment,
        handlers::payment::save_temp_cart,
        handlers::webhook::wompi_webhook,
        handlers::webhook::whatsapp_webhook,
        handlers::webhook::whatsapp_status_webhook,
        handlers::chat::chat,
        handlers::chat::order_lookup,
        handlers::admin::stats,
        handlers::admin::list_users,
        handlers::admin::residential_stats,
    ),
    components(
        schemas(
            UserRol,
            RegisterRequest,
            LoginRequest,
            UpdateProfileRequest,
            UserProfile,
            AuthResponse,
            Product,
            ProductWithDiscount,
            CreateProductRequest,
            UpdateProductRequest,
            UpdateDiscountRequest,
            UpdateCostRequest,
            Package,
            PackageProduct,
            PackageWithProducts,
            PackageItemRequest,
            CreatePackageRequest,
            UpdatePackageRequest,
            PackageStats,
            PedidoEstado,
            ItemKind,
            SnapshotComponent,
            OrderItem,
            OrderItems,
            CartItemRequest,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            DeliverOrderRequest,
            UpdatePaymentRequest,
            OrderCreatedResponse,
            RecentOrderResponse,
            handlers::order::CalcShippingRequest,
            PaymentStatus,
            CreatePaymentRequest,
            CreatePaymentResponse,
            TokenizeCardRequest,
            PaymentStatusResponse,
            SaveTempCartRequest,
            PromoTipo,
            PromoCode,
            GeneratePromoCodesRequest,
            GeneratePromoCodesResponse,
            ValidatePromoCodeRequest,
            PromoCodeValidation,
            ApplyPromoCodeRequest,
            DeletePromoCodesRequest,
            PromoCodeStats,
            PointsBalance,
            SiguienteNivel,
            RedeemPointsRequest,
            RedeemPointsResponse,
            RedemptionCodeRequest,
            RedemptionValidation,
            RedemptionOption,
            GrantPointsRequest,
            RecompensaTipo,
            Recompensa,
            RecompensaView,
            RewardRedeemedResponse,
            PointsDashboard,
            NivelStats,
            Canje,
            TransaccionPuntos,
            ChatRequest,
            ChatMessage,
            ChatResponse,
            OrderLookupResponse,
            AdminStats,
            TowerStats,
            FloorStats,
            ResidentialStats,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registro y sesión de residentes"),
        (name = "productos", description = "Catálogo y descuentos"),
        (name = "paquetes", description = "Combos de productos"),
        (name = "pedidos", description = "Pedidos y entregas"),
        (name = "puntos", description = "Programa de fidelidad"),
        (name = "promociones", description = "Códigos promocionales"),
        (name = "pagos", description = "Pasarela de pagos Wompi"),
        (name = "webhooks", description = "Notificaciones de la pasarela y de Twilio"),
        (name = "chat", description = "Asistente virtual"),
        (name = "admin", description = "Panel de administración"),
    ),
    info(
        title = "SuperCasa Backend API",
        version = "1.0.0",
        description = "API del supermercado a domicilio del conjunto SuperCasa"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    // Las rutas documentadas son las que el frontend ya consume; un rename
    // accidental rompe la app sin que el backend se entere.
    #[test]
    fn test_documented_paths_match_frontend() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/auth/profile"));
        assert!(paths.contains_key("/api/admin/codigos-promocionales/lista"));
        assert!(paths.contains_key("/api/admin/codigos-promocionales/generar"));
        assert!(paths.contains_key("/api/admin/codigos-promocionales/stats"));
        assert!(paths.contains_key("/api/admin/codigos-promocionales/eliminar"));
        assert!(paths.contains_key("/api/puntos/recompensas"));
        assert!(paths.contains_key("/api/puntos/canjear/{recompensa_id}"));
        assert!(!paths.contains_key("/auth/perfil"));
    }
}

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
