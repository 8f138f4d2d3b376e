use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub rol: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, token_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expires_in,
        }
    }

    pub fn generate_token(&self, user_id: i64, email: &str, rol: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.token_expires_in);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            rol: rol.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Sin margen sobre `exp`: un token vencido se rechaza de inmediato.
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| {
                AppError::AuthError(
                    "Su sesión ha expirado. Por favor inicie sesión nuevamente".to_string(),
                )
            })
    }

    pub fn get_token_expires_in(&self) -> i64 {
        self.token_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let service = JwtService::new("test-secret", 3600);
        let token = service.generate_token(42, "test@example.com", "cliente").unwrap();
        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.rol, "cliente");
    }

    #[test]
    fn test_token_wrong_secret_rejected() {
        let service = JwtService::new("secret-a", 3600);
        let other = JwtService::new("secret-b", 3600);
        let token = service.generate_token(1, "a@b.com", "admin").unwrap();
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = JwtService::new("test-secret", -60);
        let token = service.generate_token(1, "a@b.com", "cliente").unwrap();
        assert!(service.verify_token(&token).is_err());
    }
}
