use crate::error::AppError;
use crate::models::UserRol;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// Usuario autenticado, insertado en las extensiones del request por el
/// middleware y extraíble directamente en los handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub rol: UserRol,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.rol == UserRol::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<AuthUser>().cloned();
        ready(user.ok_or_else(|| {
            AppError::AuthError(
                "Su sesión ha expirado. Por favor inicie sesión nuevamente".to_string(),
            )
            .into()
        }))
    }
}

struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    get_exact_paths: Vec<&'static str>,
    get_prefix_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec![
                "/auth/register",
                "/auth/login",
                "/chat",
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
            ],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/", "/webhook/"],
            // El catálogo es público solo para lectura; crear o modificar
            // productos y paquetes exige token de admin.
            get_exact_paths: vec!["/productos", "/productos-con-descuentos", "/paquetes"],
            get_prefix_paths: vec!["/productos/buscar/", "/paquetes/"],
        }
    }

    fn is_public(&self, method: &Method, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }
        if self.prefix_paths.iter().any(|&prefix| path.starts_with(prefix)) {
            return true;
        }
        if *method == Method::GET {
            if self.get_exact_paths.contains(&path) {
                return true;
            }
            if self.get_prefix_paths.iter().any(|&prefix| path.starts_with(prefix)) {
                return true;
            }
        }
        false
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Preflight CORS
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        if self.public_paths.is_public(req.method(), req.path()) {
            return Box::pin(self.service.call(req));
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let Some(token) = token else {
            let error = AppError::AuthError(
                "Su sesión ha expirado. Por favor inicie sesión nuevamente".to_string(),
            );
            return Box::pin(async move { Err(error.into()) });
        };

        match self.jwt_service.verify_token(token) {
            Ok(claims) => {
                let rol = match claims.rol.as_str() {
                    "admin" => UserRol::Admin,
                    _ => UserRol::Cliente,
                };
                let user = AuthUser {
                    id: claims.sub.parse::<i64>().unwrap_or(0),
                    email: claims.email,
                    rol,
                };
                req.extensions_mut().insert(user);
                Box::pin(self.service.call(req))
            }
            Err(_) => {
                let error = AppError::AuthError(
                    "Su sesión ha expirado. Por favor inicie sesión nuevamente".to_string(),
                );
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_public_only_for_get() {
        let paths = PublicPaths::new();
        assert!(paths.is_public(&Method::GET, "/productos"));
        assert!(paths.is_public(&Method::GET, "/paquetes/3"));
        assert!(paths.is_public(&Method::GET, "/productos/buscar/arroz"));
        assert!(!paths.is_public(&Method::POST, "/productos"));
        assert!(!paths.is_public(&Method::DELETE, "/productos/9"));
    }

    #[test]
    fn test_auth_and_webhook_paths_public() {
        let paths = PublicPaths::new();
        assert!(paths.is_public(&Method::POST, "/auth/login"));
        assert!(paths.is_public(&Method::POST, "/auth/register"));
        assert!(paths.is_public(&Method::POST, "/webhook/wompi"));
        assert!(paths.is_public(&Method::POST, "/chat"));
        assert!(!paths.is_public(&Method::GET, "/auth/profile"));
        assert!(!paths.is_public(&Method::GET, "/orders"));
    }
}
