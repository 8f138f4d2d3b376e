use crate::models::payment::PaymentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const SNAPSHOT_VERSION: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "pedido_estado", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PedidoEstado {
    Pendiente,
    Procesando,
    Enviado,
    Entregado,
    Cancelado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Producto,
    Paquete,
}

/// Componente de un paquete congelado en el snapshot: producto y unidades
/// por cada paquete comprado. La cancelación repone stock con estos datos,
/// no con la composición vigente del paquete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SnapshotComponent {
    pub producto_id: i64,
    pub nombre: String,
    pub cantidad: i64,
}

/// Línea de pedido congelada al momento de la compra. El precio es el precio
/// unitario efectivamente cobrado, con descuento si lo hubo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: i64,
    pub tipo: ItemKind,
    pub nombre: String,
    pub precio: i64,
    pub cantidad: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    /// Composición del paquete al momento de la compra; vacío en productos
    /// sueltos y en snapshots version 1.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub componentes: Vec<SnapshotComponent>,
}

/// Snapshot versionado de los productos de un pedido, almacenado como JSONB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItems {
    pub version: i32,
    pub items: Vec<OrderItem>,
}

impl OrderItems {
    pub fn new(items: Vec<OrderItem>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            items,
        }
    }

    pub fn subtotal(&self) -> i64 {
        self.items.iter().map(|i| i.precio * i.cantidad).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub usuario_id: i64,
    pub productos: sqlx::types::Json<OrderItems>,
    pub total: i64,
    pub subtotal: Option<i64>,
    pub descuento_monto: i64,
    pub costo_envio: i64,
    pub estado: PedidoEstado,
    pub torre_entrega: Option<String>,
    pub piso_entrega: Option<i32>,
    pub apartamento_entrega: Option<String>,
    pub instrucciones_entrega: Option<String>,
    pub horario_preferido: Option<String>,
    pub telefono_contacto: String,
    pub entregado_por: Option<String>,
    pub fecha: DateTime<Utc>,
    pub fecha_entrega: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_transaction_id: Option<String>,
    pub payment_amount_cents: Option<i64>,
    pub codigo_promocional: Option<String>,
    pub codigo_canje: Option<String>,
    pub whatsapp_status: String,
    pub whatsapp_message_sid: Option<String>,
    pub whatsapp_sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartItemRequest {
    pub id: i64,
    #[serde(default = "default_cantidad")]
    pub cantidad: i64,
}

fn default_cantidad() -> i64 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub productos: Vec<CartItemRequest>,
    #[serde(default)]
    pub paquetes: Vec<CartItemRequest>,
    pub total: i64,
    pub codigo_promocional: Option<String>,
    pub codigo_canje: Option<String>,
    pub torre_entrega: String,
    pub piso_entrega: i32,
    pub apartamento_entrega: String,
    pub instrucciones_entrega: Option<String>,
    pub horario_preferido: Option<String>,
    pub telefono_contacto: Option<String>,
    pub payment_reference: Option<String>,
    pub payment_method: Option<String>,
    pub payment_transaction_id: Option<String>,
    pub payment_amount_cents: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub estado: PedidoEstado,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeliverOrderRequest {
    pub entregado_por: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
    pub payment_transaction_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdminOrderQuery {
    pub estado: Option<PedidoEstado>,
    pub torre: Option<String>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub busqueda: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderCreatedResponse {
    pub pedido_id: i64,
    pub total: i64,
    pub subtotal: i64,
    pub descuento_monto: i64,
    pub costo_envio: i64,
    pub puntos_ganados: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nivel_nuevo: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminOrderView {
    #[serde(flatten)]
    pub pedido: Order,
    pub cliente_nombre: String,
    pub cliente_email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentOrderResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pedido_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> OrderItems {
        OrderItems::new(vec![
            OrderItem {
                id: 1,
                tipo: ItemKind::Producto,
                nombre: "Café 250g".to_string(),
                precio: 12_000,
                cantidad: 2,
                codigo: Some("P010".to_string()),
                componentes: Vec::new(),
            },
            OrderItem {
                id: 4,
                tipo: ItemKind::Paquete,
                nombre: "Combo aseo".to_string(),
                precio: 25_000,
                cantidad: 1,
                codigo: None,
                componentes: vec![
                    SnapshotComponent {
                        producto_id: 7,
                        nombre: "Jabón líquido".to_string(),
                        cantidad: 2,
                    },
                    SnapshotComponent {
                        producto_id: 9,
                        nombre: "Esponja".to_string(),
                        cantidad: 3,
                    },
                ],
            },
        ])
    }

    #[test]
    fn test_snapshot_subtotal() {
        assert_eq!(snapshot().subtotal(), 49_000);
    }

    #[test]
    fn test_snapshot_serialization_carries_version() {
        let value = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(value["version"], SNAPSHOT_VERSION);
        assert_eq!(value["items"][0]["tipo"], "producto");
        assert_eq!(value["items"][1]["tipo"], "paquete");

        let parsed: OrderItems = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, snapshot());
    }

    #[test]
    fn test_package_line_freezes_components() {
        let value = serde_json::to_value(snapshot()).unwrap();

        // El producto suelto no serializa componentes.
        assert!(value["items"][0].get("componentes").is_none());

        let componentes = value["items"][1]["componentes"].as_array().unwrap();
        assert_eq!(componentes.len(), 2);
        assert_eq!(componentes[0]["producto_id"], 7);
        assert_eq!(componentes[0]["cantidad"], 2);
        assert_eq!(componentes[1]["producto_id"], 9);
        assert_eq!(componentes[1]["cantidad"], 3);
    }

    #[test]
    fn test_v1_snapshot_without_components_still_parses() {
        let v1 = serde_json::json!({
            "version": 1,
            "items": [
                {"id": 4, "tipo": "paquete", "nombre": "Combo aseo", "precio": 25_000, "cantidad": 1}
            ]
        });
        let parsed: OrderItems = serde_json::from_value(v1).unwrap();
        assert_eq!(parsed.version, 1);
        assert!(parsed.items[0].componentes.is_empty());
    }
}
