use serde::Serialize;
use utoipa::ToSchema;

/// Tablero principal del panel de administración.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    pub total_usuarios: i64,
    pub total_productos: i64,
    pub productos_sin_stock: i64,
    pub valor_inventario: i64,
    pub total_pedidos: i64,
    pub pedidos_hoy: i64,
    pub pedidos_pendientes: i64,
    pub ventas_totales: i64,
    pub ventas_hoy: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct TowerStats {
    pub torre: String,
    pub usuarios: i64,
    pub pedidos: i64,
    pub ventas: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct FloorStats {
    pub torre: String,
    pub piso: i32,
    pub pedidos: i64,
    pub ventas: i64,
}

/// Actividad por torre y los pisos que más piden.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResidentialStats {
    pub torres: Vec<TowerStats>,
    pub pisos_top: Vec<FloorStats>,
}
