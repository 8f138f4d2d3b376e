use crate::error::{AppError, AppResult};
use crate::models::*;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PackageService {
    pool: PgPool,
}

impl PackageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Paquetes activos y vigentes, con sus productos y el ahorro calculado.
    pub async fn list_active(&self) -> AppResult<Vec<PackageWithProducts>> {
        let paquetes = sqlx::query_as::<_, Package>(
            r#"
            SELECT * FROM paquetes
            WHERE activo = TRUE
              AND (fecha_inicio IS NULL OR fecha_inicio <= NOW())
              AND (fecha_fin IS NULL OR fecha_fin >= NOW())
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(paquetes.len());
        for paquete in paquetes {
            let productos = self.package_products(paquete.id).await?;
            result.push(PackageWithProducts::new(paquete, productos));
        }
        Ok(result)
    }

    pub async fn get(&self, id: i64) -> AppResult<PackageWithProducts> {
        let paquete = sqlx::query_as::<_, Package>("SELECT * FROM paquetes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Paquete {id} no encontrado")))?;

        let productos = self.package_products(id).await?;
        Ok(PackageWithProducts::new(paquete, productos))
    }

    async fn package_products(&self, paquete_id: i64) -> AppResult<Vec<PackageProduct>> {
        let productos = sqlx::query_as::<_, PackageProduct>(
            r#"
            SELECT pp.producto_id, p.nombre, p.precio, pp.cantidad, p.stock
            FROM paquete_productos pp
            JOIN productos p ON p.id = pp.producto_id
            WHERE pp.paquete_id = $1
            ORDER BY pp.id
            "#,
        )
        .bind(paquete_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(productos)
    }

    pub async fn create(&self, request: CreatePackageRequest) -> AppResult<PackageWithProducts> {
        if request.nombre.trim().is_empty() {
            return Err(AppError::ValidationError("El nombre es obligatorio".to_string()));
        }
        if request.precio_paquete <= 0 {
            return Err(AppError::ValidationError("El precio debe ser mayor a cero".to_string()));
        }
        if request.productos.is_empty() {
            return Err(AppError::ValidationError(
                "El paquete debe incluir al menos un producto".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let paquete = sqlx::query_as::<_, Package>(
            r#"
            INSERT INTO paquetes (nombre, descripcion, precio_paquete, categoria, imagen, fecha_inicio, fecha_fin)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(request.nombre.trim())
        .bind(&request.descripcion)
        .bind(request.precio_paquete)
        .bind(&request.categoria)
        .bind(&request.imagen)
        .bind(request.fecha_inicio)
        .bind(request.fecha_fin)
        .fetch_one(&mut *tx)
        .await?;

        for item in &request.productos {
            if item.cantidad <= 0 {
                return Err(AppError::ValidationError(
                    "Las cantidades del paquete deben ser mayores a cero".to_string(),
                ));
            }
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM productos WHERE id = $1")
                .bind(item.producto_id)
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(AppError::ValidationError(format!(
                    "Producto {} no existe",
                    item.producto_id
                )));
            }

            sqlx::query(
                "INSERT INTO paquete_productos (paquete_id, producto_id, cantidad) VALUES ($1, $2, $3)",
            )
            .bind(paquete.id)
            .bind(item.producto_id)
            .bind(item.cantidad)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        log::info!("Paquete creado: {} ({})", paquete.nombre, paquete.id);
        self.get(paquete.id).await
    }

    pub async fn update(&self, id: i64, request: UpdatePackageRequest) -> AppResult<PackageWithProducts> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Package>(
            r#"
            UPDATE paquetes SET
                nombre = $1, descripcion = $2, precio_paquete = $3, categoria = $4,
                imagen = $5, activo = $6, fecha_inicio = $7, fecha_fin = $8,
                updated_at = NOW()
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(request.nombre.trim())
        .bind(&request.descripcion)
        .bind(request.precio_paquete)
        .bind(&request.categoria)
        .bind(&request.imagen)
        .bind(request.activo)
        .bind(request.fecha_inicio)
        .bind(request.fecha_fin)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Err(AppError::NotFound(format!("Paquete {id} no encontrado")));
        }

        if let Some(productos) = &request.productos {
            if productos.is_empty() {
                return Err(AppError::ValidationError(
                    "El paquete debe incluir al menos un producto".to_string(),
                ));
            }

            sqlx::query("DELETE FROM paquete_productos WHERE paquete_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            for item in productos {
                sqlx::query(
                    "INSERT INTO paquete_productos (paquete_id, producto_id, cantidad) VALUES ($1, $2, $3)",
                )
                .bind(id)
                .bind(item.producto_id)
                .bind(item.cantidad)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        self.get(id).await
    }

    /// Desactiva el paquete; los pedidos históricos conservan su snapshot.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("UPDATE paquetes SET activo = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Paquete {id} no encontrado")));
        }

        log::info!("Paquete {id} desactivado");
        Ok(())
    }

    pub async fn stats(&self) -> AppResult<PackageStats> {
        let total_paquetes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM paquetes")
            .fetch_one(&self.pool)
            .await?;
        let paquetes_activos: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM paquetes WHERE activo = TRUE")
                .fetch_one(&self.pool)
                .await?;

        // Ventas de paquetes contadas desde los snapshots de pedidos no cancelados
        let (paquetes_vendidos, ingresos_paquetes): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM((item->>'cantidad')::BIGINT), 0),
                COALESCE(SUM((item->>'precio')::BIGINT * (item->>'cantidad')::BIGINT), 0)
            FROM pedidos, jsonb_array_elements(productos->'items') AS item
            WHERE item->>'tipo' = 'paquete' AND estado != 'cancelado'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(PackageStats {
            total_paquetes,
            paquetes_activos,
            paquetes_vendidos,
            ingresos_paquetes,
        })
    }
}
