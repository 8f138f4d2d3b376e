use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub mensaje: String,
    #[serde(default)]
    pub historial: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    /// "user" o "assistant"
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub respuesta: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLookupResponse {
    pub pedido_id: i64,
    pub estado: String,
    pub total: i64,
    pub fecha: String,
    pub minutos_transcurridos: i64,
    pub mensaje: String,
}
