use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Carrito guardado antes de redirigir a la pasarela. El webhook lo usa para
/// materializar el pedido cuando llega la confirmación del pago.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TempCart {
    pub id: i64,
    pub referencia: String,
    pub usuario_id: i64,
    pub productos: serde_json::Value,
    pub datos_entrega: serde_json::Value,
    pub fecha: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveTempCartRequest {
    pub referencia: String,
    pub productos: serde_json::Value,
    #[serde(rename = "datosEntrega")]
    pub datos_entrega: serde_json::Value,
}

/// Datos de entrega tal como los guarda el frontend en el carrito temporal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeliveryData {
    pub torre_entrega: String,
    pub piso_entrega: i32,
    pub apartamento_entrega: String,
    #[serde(default)]
    pub instrucciones_entrega: Option<String>,
    #[serde(default)]
    pub horario_preferido: Option<String>,
    #[serde(default)]
    pub telefono_contacto: Option<String>,
    #[serde(default)]
    pub codigo_promocional: Option<String>,
    #[serde(default)]
    pub codigo_canje: Option<String>,
    #[serde(default)]
    pub total: Option<i64>,
}
