use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "promo_tipo", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PromoTipo {
    Bienvenida,
    UsuarioUnico,
    General,
}

impl PromoTipo {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromoTipo::Bienvenida => "bienvenida",
            PromoTipo::UsuarioUnico => "usuario_unico",
            PromoTipo::General => "general",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PromoCode {
    pub id: i64,
    pub codigo: String,
    pub descuento_porcentaje: f64,
    pub tipo: PromoTipo,
    pub usado: bool,
    pub usuario_id: Option<i64>,
    pub fecha_uso: Option<DateTime<Utc>>,
    pub fecha_creacion: DateTime<Utc>,
    pub activo: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GeneratePromoCodesRequest {
    #[serde(default = "default_cantidad")]
    pub cantidad: i64,
    #[serde(default = "default_descuento")]
    pub descuento: f64,
    #[serde(default = "default_tipo")]
    pub tipo: PromoTipo,
}

fn default_cantidad() -> i64 {
    100
}

fn default_descuento() -> f64 {
    10.0
}

fn default_tipo() -> PromoTipo {
    PromoTipo::Bienvenida
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratePromoCodesResponse {
    pub nuevos: i64,
    pub duplicados: i64,
    pub tipo: PromoTipo,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidatePromoCodeRequest {
    pub codigo: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PromoCodeValidation {
    pub valido: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descuento: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<PromoTipo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PromoCodeValidation {
    pub fn valid(codigo: String, descuento: f64, tipo: PromoTipo) -> Self {
        Self {
            valido: true,
            codigo: Some(codigo),
            descuento: Some(descuento),
            tipo: Some(tipo),
            mensaje: Some(format!("¡Código válido! {descuento}% de descuento aplicado")),
            error: None,
        }
    }

    pub fn invalid(error: &str) -> Self {
        Self {
            valido: false,
            codigo: None,
            descuento: None,
            tipo: None,
            mensaje: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyPromoCodeRequest {
    pub codigo: String,
    pub pedido_id: Option<i64>,
}

/// Borrado de códigos sin usar: todos, por tipo o una lista puntual.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeletePromoCodesRequest {
    pub tipo_eliminacion: String,
    pub tipo: Option<PromoTipo>,
    #[serde(default)]
    pub codigos: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PromoCodeStats {
    pub total: i64,
    pub usados: i64,
    pub disponibles: i64,
}
