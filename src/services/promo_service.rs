use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::generate_promo_code;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PromoService {
    pool: PgPool,
}

impl PromoService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Genera lotes consecutivos SC{año}{letra}{0001..}. Los códigos que ya
    /// existen se cuentan como duplicados y no interrumpen el lote.
    pub async fn generate(
        &self,
        request: GeneratePromoCodesRequest,
    ) -> AppResult<GeneratePromoCodesResponse> {
        if request.cantidad <= 0 || request.cantidad > 10_000 {
            return Err(AppError::ValidationError(
                "La cantidad debe estar entre 1 y 10000".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&request.descuento) {
            return Err(AppError::ValidationError(
                "El descuento debe estar entre 0 y 100".to_string(),
            ));
        }

        let mut nuevos = 0;
        let mut duplicados = 0;

        for i in 1..=request.cantidad {
            let codigo = generate_promo_code(request.tipo.as_str(), i);
            let result = sqlx::query(
                r#"
                INSERT INTO codigos_promocionales (codigo, descuento_porcentaje, tipo, activo)
                VALUES ($1, $2, $3, TRUE)
                ON CONFLICT (codigo) DO NOTHING
                "#,
            )
            .bind(&codigo)
            .bind(request.descuento)
            .bind(request.tipo)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() > 0 {
                nuevos += 1;
            } else {
                duplicados += 1;
            }
        }

        log::info!(
            "Generación de códigos {} completada: {nuevos} nuevos, {duplicados} duplicados",
            request.tipo.as_str()
        );

        Ok(GeneratePromoCodesResponse {
            nuevos,
            duplicados,
            tipo: request.tipo,
        })
    }

    pub async fn list(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<PromoCode>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM codigos_promocionales")
            .fetch_one(&self.pool)
            .await?;

        let codigos = sqlx::query_as::<_, PromoCode>(
            "SELECT * FROM codigos_promocionales ORDER BY fecha_creacion DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(params.get_limit())
        .bind(params.get_offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(PaginatedResponse::new(
            codigos,
            params.page.unwrap_or(1),
            params.get_limit(),
            total,
        ))
    }

    pub async fn stats(&self) -> AppResult<PromoCodeStats> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM codigos_promocionales")
            .fetch_one(&self.pool)
            .await?;
        let usados: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM codigos_promocionales WHERE usado = TRUE")
                .fetch_one(&self.pool)
                .await?;
        let disponibles: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM codigos_promocionales WHERE usado = FALSE AND activo = TRUE",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(PromoCodeStats {
            total,
            usados,
            disponibles,
        })
    }

    /// Valida según el tipo: bienvenida exige primera compra, usuario_unico
    /// exige que el usuario no haya usado ningún código antes, general no
    /// tiene restricciones adicionales.
    pub async fn validate(&self, user_id: i64, codigo: &str) -> AppResult<PromoCodeValidation> {
        let codigo = codigo.trim().to_uppercase();
        if codigo.is_empty() {
            return Err(AppError::ValidationError("Código requerido".to_string()));
        }

        let promo = sqlx::query_as::<_, PromoCode>(
            "SELECT * FROM codigos_promocionales WHERE codigo = $1",
        )
        .bind(&codigo)
        .fetch_optional(&self.pool)
        .await?;

        let Some(promo) = promo else {
            return Ok(PromoCodeValidation::invalid("Código no válido"));
        };

        if promo.usado {
            return Ok(PromoCodeValidation::invalid("Este código ya fue utilizado"));
        }
        if !promo.activo {
            return Ok(PromoCodeValidation::invalid("Código no disponible"));
        }

        match promo.tipo {
            PromoTipo::Bienvenida => {
                let pedidos: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM pedidos WHERE usuario_id = $1 AND estado != 'cancelado'",
                )
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

                if pedidos > 0 {
                    return Ok(PromoCodeValidation::invalid(
                        "Este descuento es solo para tu primera compra",
                    ));
                }
            }
            PromoTipo::UsuarioUnico => {
                let usados: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM codigos_promocionales WHERE usuario_id = $1 AND usado = TRUE",
                )
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

                if usados > 0 {
                    return Ok(PromoCodeValidation::invalid(
                        "Ya has usado un código promocional anteriormente",
                    ));
                }
            }
            PromoTipo::General => {}
        }

        Ok(PromoCodeValidation::valid(
            promo.codigo,
            promo.descuento_porcentaje,
            promo.tipo,
        ))
    }

    pub async fn apply(&self, user_id: i64, request: ApplyPromoCodeRequest) -> AppResult<PromoCode> {
        let codigo = request.codigo.trim().to_uppercase();

        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            UPDATE codigos_promocionales
            SET usado = TRUE, usuario_id = $1, fecha_uso = NOW()
            WHERE codigo = $2 AND usado = FALSE
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&codigo)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::ValidationError("Código no válido o ya usado".to_string()))?;

        log::info!(
            "Código {codigo} marcado como usado para pedido {:?}",
            request.pedido_id
        );
        Ok(promo)
    }

    /// Borra solo códigos sin usar de un lote (por tipo).
    /// Borra códigos según el modo pedido: todos los no usados, los no usados
    /// de un tipo, o una lista puntual de códigos.
    pub async fn delete_codes(&self, request: DeletePromoCodesRequest) -> AppResult<i64> {
        let result = match request.tipo_eliminacion.as_str() {
            "todos_no_usados" => {
                sqlx::query("DELETE FROM codigos_promocionales WHERE usado = FALSE")
                    .execute(&self.pool)
                    .await?
            }
            "por_tipo" => {
                let tipo = request.tipo.ok_or_else(|| {
                    AppError::ValidationError("Falta el tipo de código a eliminar".to_string())
                })?;
                sqlx::query(
                    "DELETE FROM codigos_promocionales WHERE tipo = $1 AND usado = FALSE",
                )
                .bind(tipo)
                .execute(&self.pool)
                .await?
            }
            "especificos" => {
                if request.codigos.is_empty() {
                    return Err(AppError::ValidationError(
                        "Falta la lista de códigos a eliminar".to_string(),
                    ));
                }
                sqlx::query("DELETE FROM codigos_promocionales WHERE codigo = ANY($1)")
                    .bind(&request.codigos)
                    .execute(&self.pool)
                    .await?
            }
            otro => {
                return Err(AppError::ValidationError(format!(
                    "Tipo de eliminación no válido: {otro}"
                )));
            }
        };

        let eliminados = result.rows_affected() as i64;
        log::info!(
            "{eliminados} códigos promocionales eliminados ({})",
            request.tipo_eliminacion
        );
        Ok(eliminados)
    }
}
