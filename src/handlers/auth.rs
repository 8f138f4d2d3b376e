use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::AuthService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Usuario registrado", body = AuthResponse),
        (status = 400, description = "Datos inválidos o duplicados")
    )
)]
pub async fn register(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    match auth_service.register(request.into_inner()).await {
        Ok(respuesta) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": respuesta
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Sesión iniciada", body = AuthResponse),
        (status = 401, description = "Credenciales no coinciden")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(request.into_inner()).await {
        Ok(respuesta) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": respuesta
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Perfil del usuario", body = UserProfile),
        (status = 401, description = "No autorizado")
    )
)]
pub async fn get_profile(
    auth_service: web::Data<AuthService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match auth_service.get_profile(user.id).await {
        Ok(perfil) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": perfil
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    request_body = UpdateProfileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Perfil actualizado", body = UserProfile),
        (status = 401, description = "No autorizado")
    )
)]
pub async fn update_profile(
    auth_service: web::Data<AuthService>,
    user: AuthUser,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    match auth_service.update_profile(user.id, request.into_inner()).await {
        Ok(perfil) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": perfil
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::put().to(update_profile)),
    );
}
