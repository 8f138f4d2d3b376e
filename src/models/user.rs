use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_rol", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRol {
    Cliente,
    Admin,
}

impl UserRol {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRol::Cliente => "cliente",
            UserRol::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub cedula: String,
    pub telefono: String,
    pub telefono_alternativo: Option<String>,
    pub torre: Option<String>,
    pub piso: Option<i32>,
    pub apartamento: Option<String>,
    pub notas_entrega: Option<String>,
    pub rol: UserRol,
    pub privacy_accepted: bool,
    pub privacy_date: Option<DateTime<Utc>>,
    pub privacy_version: Option<String>,
    pub marketing_accepted: bool,
    pub marketing_date: Option<DateTime<Utc>>,
    pub fecha_registro: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub nombre: String,
    pub email: String,
    pub cedula: String,
    pub telefono: String,
    pub telefono_alternativo: Option<String>,
    pub torre: String,
    pub piso: i32,
    pub apartamento: String,
    pub notas_entrega: Option<String>,
    #[serde(default)]
    pub privacy_accepted: bool,
    #[serde(default)]
    pub marketing_accepted: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub cedula: String,
    pub telefono: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub telefono_alternativo: Option<String>,
    pub torre: Option<String>,
    pub piso: Option<i32>,
    pub apartamento: Option<String>,
    pub notas_entrega: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub cedula: String,
    pub telefono: String,
    pub telefono_alternativo: Option<String>,
    pub torre: Option<String>,
    pub piso: Option<i32>,
    pub apartamento: Option<String>,
    pub direccion: Option<String>,
    pub notas_entrega: Option<String>,
    pub rol: UserRol,
    pub privacy_accepted: bool,
    pub marketing_accepted: bool,
    pub fecha_registro: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        let direccion = match (&u.torre, u.piso, &u.apartamento) {
            (Some(torre), Some(piso), Some(apto)) => {
                Some(format!("Torre {torre}, Piso {piso}, Apt {apto}"))
            }
            _ => None,
        };
        Self {
            id: u.id,
            nombre: u.nombre,
            email: u.email,
            cedula: u.cedula,
            telefono: u.telefono,
            telefono_alternativo: u.telefono_alternativo,
            torre: u.torre,
            piso: u.piso,
            apartamento: u.apartamento,
            direccion,
            notas_entrega: u.notas_entrega,
            rol: u.rol,
            privacy_accepted: u.privacy_accepted,
            marketing_accepted: u.marketing_accepted,
            fecha_registro: u.fecha_registro,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            nombre: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            cedula: "123456".to_string(),
            telefono: "3001234567".to_string(),
            telefono_alternativo: None,
            torre: Some("2".to_string()),
            piso: Some(14),
            apartamento: Some("1402".to_string()),
            notas_entrega: None,
            rol: UserRol::Cliente,
            privacy_accepted: true,
            privacy_date: None,
            privacy_version: Some("1.0".to_string()),
            marketing_accepted: false,
            marketing_date: None,
            fecha_registro: Utc::now(),
        }
    }

    #[test]
    fn test_profile_builds_address() {
        let profile = UserProfile::from(sample_user());
        assert_eq!(profile.direccion.as_deref(), Some("Torre 2, Piso 14, Apt 1402"));
    }

    #[test]
    fn test_profile_without_full_address() {
        let mut user = sample_user();
        user.apartamento = None;
        let profile = UserProfile::from(user);
        assert!(profile.direccion.is_none());
    }
}
