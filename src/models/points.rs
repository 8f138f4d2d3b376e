use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaccion_tipo", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransaccionTipo {
    Ganado,
    Canjeado,
    Expirado,
    Bonus,
    Ajuste,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "canje_estado", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CanjeEstado {
    Activo,
    Usado,
    Expirado,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ProgramaPuntos {
    pub id: i64,
    pub usuario_id: i64,
    pub puntos_totales: i64,
    pub puntos_disponibles: i64,
    pub puntos_canjeados: i64,
    pub puntos_expirados: i64,
    pub nivel: String,
    pub fecha_inicio: DateTime<Utc>,
    pub ultima_actualizacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct NivelPrograma {
    pub id: i64,
    pub nombre: String,
    pub puntos_minimos: i64,
    pub multiplicador_puntos: f64,
    pub color_hex: Option<String>,
    pub icono: Option<String>,
    pub orden: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TransaccionPuntos {
    pub id: i64,
    pub usuario_id: i64,
    pub pedido_id: Option<i64>,
    pub tipo: TransaccionTipo,
    pub puntos: i64,
    pub descripcion: Option<String>,
    pub saldo_anterior: i64,
    pub saldo_nuevo: i64,
    pub fecha: DateTime<Utc>,
    pub expira_en: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Canje {
    pub id: i64,
    pub usuario_id: i64,
    pub puntos_usados: i64,
    pub codigo_canje: String,
    pub estado: CanjeEstado,
    pub valor_descuento: i64,
    pub fecha_canje: DateTime<Utc>,
    pub fecha_uso: Option<DateTime<Utc>>,
    pub fecha_expiracion: DateTime<Utc>,
    pub pedido_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "recompensa_tipo", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecompensaTipo {
    DescuentoPorcentaje,
    DescuentoMonto,
    EnvioGratis,
    ProductoGratis,
}

/// Recompensa del catálogo de puntos. `stock` NULL significa sin límite;
/// `stock_usado` lleva la cuenta de los canjes.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Recompensa {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub categoria: Option<String>,
    pub tipo: RecompensaTipo,
    pub valor: i64,
    pub puntos_requeridos: i64,
    pub nivel_minimo: Option<String>,
    pub stock: Option<i64>,
    pub stock_usado: i64,
    pub validez_dias: i32,
    pub activo: bool,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Recompensa del catálogo con la marca de si el nivel del usuario alcanza.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct RecompensaView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub recompensa: Recompensa,
    pub disponible_para_usuario: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RewardCatalogQuery {
    pub categoria: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RewardRedeemedResponse {
    pub id: i64,
    pub codigo: String,
    pub recompensa: String,
    pub tipo: RecompensaTipo,
    pub valor: i64,
    pub expira: DateTime<Utc>,
    pub puntos_usados: i64,
}

/// Configuración del programa, leída de la tabla configuracion_puntos.
#[derive(Debug, Clone, Copy)]
pub struct PointsConfig {
    pub puntos_por_mil: i64,
    pub monto_minimo: i64,
    pub bonus_compra_grande: i64,
    pub dias_expiracion: i64,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            puntos_por_mil: 10,
            monto_minimo: 15_000,
            bonus_compra_grande: 50,
            dias_expiracion: 365,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SiguienteNivel {
    pub nombre: String,
    pub puntos_faltantes: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PointsBalance {
    pub puntos_disponibles: i64,
    pub puntos_totales: i64,
    pub puntos_canjeados: i64,
    pub nivel: String,
    pub multiplicador: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub siguiente_nivel: Option<SiguienteNivel>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemPointsRequest {
    pub puntos: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RedeemPointsResponse {
    pub codigo_canje: String,
    pub puntos_usados: i64,
    pub valor_descuento: i64,
    pub fecha_expiracion: DateTime<Utc>,
    pub puntos_restantes: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RedemptionCodeRequest {
    pub codigo_canje: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RedemptionValidation {
    pub valido: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo_canje: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_descuento: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Opciones predefinidas mostradas en el frontend para canjear puntos.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedemptionOption {
    pub puntos: i64,
    pub valor: i64,
    pub descripcion: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GrantPointsRequest {
    pub usuario_id: i64,
    pub puntos: i64,
    pub descripcion: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PointsDashboard {
    pub usuarios_en_programa: i64,
    pub puntos_emitidos: i64,
    pub puntos_canjeados: i64,
    pub puntos_disponibles: i64,
    pub canjes_activos: i64,
    pub usuarios_por_nivel: Vec<NivelStats>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct NivelStats {
    pub nivel: String,
    pub usuarios: i64,
}
