use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sqlx::PgPool;

#[derive(Clone)]
pub struct ProductService {
    pool: PgPool,
}

impl ProductService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Product>> {
        let productos = sqlx::query_as::<_, Product>("SELECT * FROM productos ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(productos)
    }

    /// Los cinco mejores candidatos en stock, priorizando disponibilidad.
    pub async fn search(&self, termino: &str) -> AppResult<Vec<Product>> {
        let pattern = format!("%{}%", termino.trim());
        let productos = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM productos
            WHERE (nombre ILIKE $1 OR categoria ILIKE $1 OR codigo ILIKE $1)
              AND stock > 0
            ORDER BY stock DESC, precio ASC
            LIMIT 5
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(productos)
    }

    /// Catálogo con el precio final ya calculado para descuentos vigentes.
    pub async fn list_with_discounts(&self) -> AppResult<Vec<ProductWithDiscount>> {
        let now = Utc::now();
        let productos = self.list().await?;
        Ok(productos
            .into_iter()
            .map(|p| ProductWithDiscount::from_product(p, now))
            .collect())
    }

    pub async fn get(&self, id: i64) -> AppResult<Product> {
        sqlx::query_as::<_, Product>("SELECT * FROM productos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Producto {id} no encontrado")))
    }

    pub async fn create(&self, request: CreateProductRequest) -> AppResult<Product> {
        if request.nombre.trim().is_empty() {
            return Err(AppError::ValidationError("El nombre es obligatorio".to_string()));
        }
        if request.precio <= 0 {
            return Err(AppError::ValidationError("El precio debe ser mayor a cero".to_string()));
        }

        let producto = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO productos (nombre, precio, descripcion, nutricional, categoria, imagen, stock, codigo, costo)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(request.nombre.trim())
        .bind(request.precio)
        .bind(&request.descripcion)
        .bind(&request.nutricional)
        .bind(&request.categoria)
        .bind(&request.imagen)
        .bind(request.stock)
        .bind(&request.codigo)
        .bind(request.costo)
        .fetch_one(&self.pool)
        .await?;

        log::info!("Producto creado: {} ({})", producto.nombre, producto.id);
        Ok(producto)
    }

    pub async fn update(&self, id: i64, request: UpdateProductRequest) -> AppResult<Product> {
        let producto = sqlx::query_as::<_, Product>(
            r#"
            UPDATE productos SET
                nombre = $1, precio = $2, descripcion = $3, nutricional = $4,
                categoria = $5, imagen = $6, stock = $7, codigo = $8
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(request.nombre.trim())
        .bind(request.precio)
        .bind(&request.descripcion)
        .bind(&request.nutricional)
        .bind(&request.categoria)
        .bind(&request.imagen)
        .bind(request.stock)
        .bind(&request.codigo)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Producto {id} no encontrado")))?;

        Ok(producto)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM productos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Producto {id} no encontrado")));
        }

        log::info!("Producto {id} eliminado");
        Ok(())
    }

    pub async fn update_discount(&self, id: i64, request: UpdateDiscountRequest) -> AppResult<Product> {
        if request.descuento_activo
            && !(0.0..=100.0).contains(&request.descuento_porcentaje)
        {
            return Err(AppError::ValidationError(
                "El porcentaje de descuento debe estar entre 0 y 100".to_string(),
            ));
        }

        let producto = sqlx::query_as::<_, Product>(
            r#"
            UPDATE productos SET
                descuento_activo = $1,
                descuento_porcentaje = $2,
                descuento_badge_texto = $3,
                descuento_fecha_inicio = $4,
                descuento_fecha_fin = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(request.descuento_activo)
        .bind(request.descuento_porcentaje)
        .bind(&request.descuento_badge_texto)
        .bind(request.descuento_fecha_inicio)
        .bind(request.descuento_fecha_fin)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Producto {id} no encontrado")))?;

        log::info!(
            "Descuento de producto {id} actualizado: activo={}, {}%",
            producto.descuento_activo,
            producto.descuento_porcentaje
        );
        Ok(producto)
    }

    pub async fn update_cost(&self, id: i64, request: UpdateCostRequest) -> AppResult<Product> {
        if request.costo < 0 {
            return Err(AppError::ValidationError("El costo no puede ser negativo".to_string()));
        }

        sqlx::query_as::<_, Product>(
            "UPDATE productos SET costo = $1 WHERE id = $2 RETURNING *",
        )
        .bind(request.costo)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Producto {id} no encontrado")))
    }
}
