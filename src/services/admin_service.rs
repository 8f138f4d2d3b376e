use crate::error::AppResult;
use crate::models::*;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Contadores del panel. "Hoy" es el día calendario del servidor; los
    /// pedidos cancelados no cuentan como venta.
    pub async fn stats(&self) -> AppResult<AdminStats> {
        let total_usuarios: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&self.pool)
            .await?;
        let total_productos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM productos")
            .fetch_one(&self.pool)
            .await?;
        let productos_sin_stock: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM productos WHERE stock <= 0")
                .fetch_one(&self.pool)
                .await?;
        let valor_inventario: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(precio * stock), 0) FROM productos",
        )
        .fetch_one(&self.pool)
        .await?;

        let total_pedidos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pedidos")
            .fetch_one(&self.pool)
            .await?;
        let pedidos_hoy: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pedidos WHERE fecha::date = CURRENT_DATE")
                .fetch_one(&self.pool)
                .await?;
        let pedidos_pendientes: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pedidos WHERE estado IN ('pendiente', 'procesando')",
        )
        .fetch_one(&self.pool)
        .await?;

        let ventas_totales: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total), 0) FROM pedidos WHERE estado != 'cancelado'",
        )
        .fetch_one(&self.pool)
        .await?;
        let ventas_hoy: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total), 0) FROM pedidos
            WHERE estado != 'cancelado' AND fecha::date = CURRENT_DATE
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AdminStats {
            total_usuarios,
            total_productos,
            productos_sin_stock,
            valor_inventario,
            total_pedidos,
            pedidos_hoy,
            pedidos_pendientes,
            ventas_totales,
            ventas_hoy,
        })
    }

    pub async fn list_users(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<UserProfile>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&self.pool)
            .await?;

        let usuarios = sqlx::query_as::<_, User>(
            "SELECT * FROM usuarios ORDER BY fecha_registro DESC LIMIT $1 OFFSET $2",
        )
        .bind(params.get_limit())
        .bind(params.get_offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(PaginatedResponse::new(
            usuarios.into_iter().map(UserProfile::from).collect(),
            params.page.unwrap_or(1),
            params.get_limit(),
            total,
        ))
    }

    /// Actividad por torre (residentes, pedidos y ventas) y los diez pisos
    /// que más compran.
    pub async fn residential_stats(&self) -> AppResult<ResidentialStats> {
        let torres = sqlx::query_as::<_, TowerStats>(
            r#"
            SELECT
                u.torre,
                COUNT(DISTINCT u.id) AS usuarios,
                COUNT(p.id) AS pedidos,
                COALESCE(SUM(p.total) FILTER (WHERE p.estado != 'cancelado'), 0) AS ventas
            FROM usuarios u
            LEFT JOIN pedidos p ON p.usuario_id = u.id
            GROUP BY u.torre
            ORDER BY u.torre
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let pisos_top = sqlx::query_as::<_, FloorStats>(
            r#"
            SELECT
                torre_entrega AS torre,
                piso_entrega AS piso,
                COUNT(*) AS pedidos,
                COALESCE(SUM(total), 0) AS ventas
            FROM pedidos
            WHERE estado != 'cancelado'
              AND torre_entrega IS NOT NULL
              AND piso_entrega IS NOT NULL
            GROUP BY torre_entrega, piso_entrega
            ORDER BY pedidos DESC, ventas DESC
            LIMIT 10
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ResidentialStats { torres, pisos_top })
    }
}
