use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{generate_redemption_code, generate_reward_code};
use chrono::{Duration, Utc};
use sqlx::{PgConnection, PgPool};

pub const MIN_PUNTOS_CANJE: i64 = 50;
pub const MULTIPLO_CANJE: i64 = 10;
pub const PESOS_POR_PUNTO: i64 = 10;
pub const DIAS_EXPIRACION_CANJE: i64 = 30;
pub const UMBRAL_COMPRA_GRANDE: i64 = 50_000;

/// Puntos ganados por un pedido: base por cada $1.000, multiplicador del
/// nivel y bonus por compra grande. Por debajo del monto mínimo no se otorga nada.
pub fn compute_points(total: i64, multiplicador: f64, config: &PointsConfig) -> i64 {
    if total < config.monto_minimo {
        return 0;
    }
    let base = (total / 1000) * config.puntos_por_mil;
    let mut puntos = (base as f64 * multiplicador).floor() as i64;
    if total >= UMBRAL_COMPRA_GRANDE {
        puntos += config.bonus_compra_grande;
    }
    puntos
}

/// Reglas de canje: mínimo 50 puntos, en múltiplos de 10, sin exceder el saldo.
pub fn validate_redemption_amount(puntos: i64, disponibles: i64) -> Result<(), String> {
    if puntos < MIN_PUNTOS_CANJE {
        return Err(format!("Mínimo {MIN_PUNTOS_CANJE} puntos para canjear"));
    }
    if puntos % MULTIPLO_CANJE != 0 {
        return Err(format!("Solo puedes canjear múltiplos de {MULTIPLO_CANJE} puntos"));
    }
    if puntos > disponibles {
        return Err(format!("Solo tienes {disponibles} puntos disponibles"));
    }
    Ok(())
}

/// Reglas para canjear una recompensa del catálogo: stock disponible, saldo
/// suficiente y nivel del programa igual o superior al exigido.
pub fn validate_reward_claim(
    recompensa: &Recompensa,
    puntos_disponibles: i64,
    orden_usuario: i32,
    orden_requerido: Option<i32>,
) -> Result<(), String> {
    if let Some(stock) = recompensa.stock {
        if recompensa.stock_usado >= stock {
            return Err("Recompensa agotada".to_string());
        }
    }
    if puntos_disponibles < recompensa.puntos_requeridos {
        return Err(format!(
            "Puntos insuficientes: tienes {puntos_disponibles} y se requieren {}",
            recompensa.puntos_requeridos
        ));
    }
    if let (Some(requerido), Some(nivel)) = (orden_requerido, recompensa.nivel_minimo.as_deref()) {
        if orden_usuario < requerido {
            return Err(format!("Esta recompensa requiere nivel {nivel}"));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct PointsService {
    pool: PgPool,
}

impl PointsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn load_config(&self) -> AppResult<PointsConfig> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT clave, valor FROM configuracion_puntos")
                .fetch_all(&self.pool)
                .await?;

        let mut config = PointsConfig::default();
        for (clave, valor) in rows {
            let Ok(n) = valor.parse::<i64>() else { continue };
            match clave.as_str() {
                "PUNTOS_POR_MIL_PESOS" => config.puntos_por_mil = n,
                "MONTO_MINIMO_PUNTOS" => config.monto_minimo = n,
                "BONUS_COMPRA_GRANDE" => config.bonus_compra_grande = n,
                "DIAS_EXPIRACION" => config.dias_expiracion = n,
                _ => {}
            }
        }
        Ok(config)
    }

    pub async fn get_balance(&self, user_id: i64) -> AppResult<PointsBalance> {
        let profile = self.ensure_profile(user_id).await?;

        let nivel = sqlx::query_as::<_, NivelPrograma>(
            "SELECT * FROM niveles_programa WHERE nombre = $1",
        )
        .bind(&profile.nivel)
        .fetch_one(&self.pool)
        .await?;

        let siguiente: Option<NivelPrograma> = sqlx::query_as(
            "SELECT * FROM niveles_programa WHERE orden = $1",
        )
        .bind(nivel.orden + 1)
        .fetch_optional(&self.pool)
        .await?;

        let siguiente_nivel = siguiente.map(|n| SiguienteNivel {
            puntos_faltantes: (n.puntos_minimos - profile.puntos_totales).max(0),
            nombre: n.nombre,
        });

        Ok(PointsBalance {
            puntos_disponibles: profile.puntos_disponibles,
            puntos_totales: profile.puntos_totales,
            puntos_canjeados: profile.puntos_canjeados,
            nivel: profile.nivel,
            multiplicador: nivel.multiplicador_puntos,
            siguiente_nivel,
        })
    }

    async fn ensure_profile(&self, user_id: i64) -> AppResult<ProgramaPuntos> {
        let profile = sqlx::query_as::<_, ProgramaPuntos>(
            r#"
            INSERT INTO programa_puntos (usuario_id) VALUES ($1)
            ON CONFLICT (usuario_id) DO UPDATE SET usuario_id = EXCLUDED.usuario_id
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    /// Multiplicador del nivel del usuario, 1.0 si aún no tiene perfil.
    pub async fn user_multiplier(&self, conn: &mut PgConnection, user_id: i64) -> AppResult<f64> {
        let multiplicador: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT np.multiplicador_puntos
            FROM programa_puntos pp
            JOIN niveles_programa np ON pp.nivel = np.nombre
            WHERE pp.usuario_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(multiplicador.unwrap_or(1.0))
    }

    /// Acredita puntos dentro de una transacción ya abierta: crea el perfil si
    /// falta, registra la transacción con saldos y recalcula el nivel.
    pub async fn assign_points(
        &self,
        conn: &mut PgConnection,
        user_id: i64,
        pedido_id: Option<i64>,
        puntos: i64,
        tipo: TransaccionTipo,
        descripcion: &str,
        config: &PointsConfig,
    ) -> AppResult<String> {
        if puntos <= 0 {
            return Err(AppError::ValidationError("Los puntos deben ser positivos".to_string()));
        }

        sqlx::query(
            "INSERT INTO programa_puntos (usuario_id) VALUES ($1) ON CONFLICT (usuario_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        let saldo_anterior: i64 = sqlx::query_scalar(
            "SELECT puntos_disponibles FROM programa_puntos WHERE usuario_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        let saldo_nuevo = saldo_anterior + puntos;
        let expira_en = (Utc::now() + Duration::days(config.dias_expiracion)).date_naive();

        sqlx::query(
            r#"
            INSERT INTO transacciones_puntos
                (usuario_id, pedido_id, tipo, puntos, descripcion, saldo_anterior, saldo_nuevo, expira_en)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user_id)
        .bind(pedido_id)
        .bind(tipo)
        .bind(puntos)
        .bind(descripcion)
        .bind(saldo_anterior)
        .bind(saldo_nuevo)
        .bind(expira_en)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            UPDATE programa_puntos SET
                puntos_disponibles = puntos_disponibles + $1,
                puntos_totales = puntos_totales + $1,
                ultima_actualizacion = NOW()
            WHERE usuario_id = $2
            "#,
        )
        .bind(puntos)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        let nivel = self.update_level(conn, user_id).await?;
        log::info!("{puntos} puntos asignados a usuario {user_id}, nivel {nivel}");
        Ok(nivel)
    }

    async fn update_level(&self, conn: &mut PgConnection, user_id: i64) -> AppResult<String> {
        let puntos_totales: i64 = sqlx::query_scalar(
            "SELECT puntos_totales FROM programa_puntos WHERE usuario_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        let nuevo_nivel: String = sqlx::query_scalar(
            r#"
            SELECT nombre FROM niveles_programa
            WHERE puntos_minimos <= $1
            ORDER BY puntos_minimos DESC
            LIMIT 1
            "#,
        )
        .bind(puntos_totales)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query("UPDATE programa_puntos SET nivel = $1 WHERE usuario_id = $2")
            .bind(&nuevo_nivel)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        Ok(nuevo_nivel)
    }

    /// Crea un canje ACTIVO sin debitar puntos: el débito ocurre cuando el
    /// código se usa en un pedido. Cancelarlo devuelve el cupo sin más.
    pub async fn redeem(&self, user_id: i64, puntos: i64) -> AppResult<RedeemPointsResponse> {
        let profile = self.ensure_profile(user_id).await?;

        validate_redemption_amount(puntos, profile.puntos_disponibles)
            .map_err(AppError::ValidationError)?;

        let valor_descuento = puntos * PESOS_POR_PUNTO;
        let codigo_canje = generate_redemption_code();
        let fecha_expiracion = Utc::now() + Duration::days(DIAS_EXPIRACION_CANJE);

        let canje = sqlx::query_as::<_, Canje>(
            r#"
            INSERT INTO canjes (usuario_id, puntos_usados, codigo_canje, estado, valor_descuento, fecha_expiracion)
            VALUES ($1, $2, $3, 'ACTIVO', $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(puntos)
        .bind(&codigo_canje)
        .bind(valor_descuento)
        .bind(fecha_expiracion)
        .fetch_one(&self.pool)
        .await?;

        log::info!("Canje ACTIVO creado: {puntos} puntos = ${valor_descuento} para usuario {user_id}");

        Ok(RedeemPointsResponse {
            codigo_canje: canje.codigo_canje,
            puntos_usados: canje.puntos_usados,
            valor_descuento: canje.valor_descuento,
            fecha_expiracion: canje.fecha_expiracion,
            puntos_restantes: profile.puntos_disponibles - puntos,
        })
    }

    pub async fn cancel_redemption(&self, user_id: i64, codigo_canje: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE canjes SET estado = 'EXPIRADO'
            WHERE codigo_canje = $1 AND usuario_id = $2 AND estado = 'ACTIVO'
            "#,
        )
        .bind(codigo_canje)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "Canje no encontrado o ya fue usado".to_string(),
            ));
        }

        log::info!("Canje {codigo_canje} cancelado por usuario {user_id}");
        Ok(())
    }

    pub async fn my_redemptions(&self, user_id: i64) -> AppResult<Vec<Canje>> {
        let canjes = sqlx::query_as::<_, Canje>(
            r#"
            SELECT * FROM canjes
            WHERE usuario_id = $1 AND estado = 'ACTIVO'
            ORDER BY fecha_canje DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(canjes)
    }

    pub async fn history(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<Vec<TransaccionPuntos>> {
        let transacciones = sqlx::query_as::<_, TransaccionPuntos>(
            r#"
            SELECT * FROM transacciones_puntos
            WHERE usuario_id = $1
            ORDER BY fecha DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(params.get_limit())
        .bind(params.get_offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(transacciones)
    }

    pub async fn redemption_options(&self, user_id: i64) -> AppResult<(i64, Vec<RedemptionOption>)> {
        let profile = self.ensure_profile(user_id).await?;
        let opciones = vec![
            RedemptionOption {
                puntos: 50,
                valor: 500,
                descripcion: "$500 de descuento".to_string(),
            },
            RedemptionOption {
                puntos: 100,
                valor: 1_000,
                descripcion: "$1,000 de descuento".to_string(),
            },
            RedemptionOption {
                puntos: 200,
                valor: 2_200,
                descripcion: "$2,200 de descuento (10% extra)".to_string(),
            },
            RedemptionOption {
                puntos: 500,
                valor: 6_000,
                descripcion: "$6,000 de descuento (20% extra)".to_string(),
            },
        ];
        Ok((profile.puntos_disponibles, opciones))
    }

    pub async fn validate_redemption(
        &self,
        user_id: i64,
        codigo_canje: &str,
    ) -> AppResult<RedemptionValidation> {
        let canje = sqlx::query_as::<_, Canje>(
            "SELECT * FROM canjes WHERE codigo_canje = $1 AND usuario_id = $2",
        )
        .bind(codigo_canje)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(canje) = canje else {
            return Ok(RedemptionValidation {
                valido: false,
                codigo_canje: None,
                valor_descuento: None,
                error: Some("Código no válido o no pertenece a tu cuenta".to_string()),
            });
        };

        let error = match canje.estado {
            CanjeEstado::Usado => Some("Este código ya fue utilizado"),
            CanjeEstado::Expirado => Some("Este código ha expirado"),
            CanjeEstado::Activo if canje.fecha_expiracion < Utc::now() => {
                Some("Este código ha expirado")
            }
            CanjeEstado::Activo => None,
        };

        Ok(match error {
            Some(e) => RedemptionValidation {
                valido: false,
                codigo_canje: None,
                valor_descuento: None,
                error: Some(e.to_string()),
            },
            None => RedemptionValidation {
                valido: true,
                codigo_canje: Some(canje.codigo_canje),
                valor_descuento: Some(canje.valor_descuento),
                error: None,
            },
        })
    }

    /// Consume un canje dentro de la transacción del pedido: lo marca USADO,
    /// debita los puntos y deja el rastro CANJEADO. Devuelve el descuento.
    pub async fn apply_redemption(
        &self,
        conn: &mut PgConnection,
        user_id: i64,
        codigo_canje: &str,
        pedido_id: i64,
    ) -> AppResult<i64> {
        let canje = sqlx::query_as::<_, Canje>(
            r#"
            SELECT * FROM canjes
            WHERE codigo_canje = $1 AND usuario_id = $2 AND estado = 'ACTIVO'
              AND fecha_expiracion >= NOW()
            FOR UPDATE
            "#,
        )
        .bind(codigo_canje)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            AppError::ValidationError("Código de canje no válido o expirado".to_string())
        })?;

        sqlx::query(
            "UPDATE canjes SET estado = 'USADO', fecha_uso = NOW(), pedido_id = $1 WHERE id = $2",
        )
        .bind(pedido_id)
        .bind(canje.id)
        .execute(&mut *conn)
        .await?;

        let saldo_anterior: i64 = sqlx::query_scalar(
            "SELECT puntos_disponibles FROM programa_puntos WHERE usuario_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            UPDATE programa_puntos SET
                puntos_disponibles = puntos_disponibles - $1,
                puntos_canjeados = puntos_canjeados + $1,
                ultima_actualizacion = NOW()
            WHERE usuario_id = $2
            "#,
        )
        .bind(canje.puntos_usados)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO transacciones_puntos
                (usuario_id, pedido_id, tipo, puntos, descripcion, saldo_anterior, saldo_nuevo)
            VALUES ($1, $2, 'CANJEADO', $3, $4, $5, $6)
            "#,
        )
        .bind(user_id)
        .bind(pedido_id)
        .bind(-canje.puntos_usados)
        .bind(format!("Canje {codigo_canje} aplicado a pedido"))
        .bind(saldo_anterior)
        .bind(saldo_anterior - canje.puntos_usados)
        .execute(&mut *conn)
        .await?;

        Ok(canje.valor_descuento)
    }

    /// Catálogo de recompensas vigentes, con la marca de si el nivel del
    /// usuario alcanza cada una. `categoria` filtra; "todos" es sin filtro.
    pub async fn rewards_catalog(
        &self,
        user_id: i64,
        categoria: Option<&str>,
    ) -> AppResult<Vec<RecompensaView>> {
        let orden_usuario: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT np.orden
            FROM programa_puntos pp
            JOIN niveles_programa np ON pp.nivel = np.nombre
            WHERE pp.usuario_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let categoria = categoria
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "todos");

        let recompensas = sqlx::query_as::<_, RecompensaView>(
            r#"
            SELECT r.*,
                   COALESCE(np.orden <= $1, TRUE) AS disponible_para_usuario
            FROM recompensas r
            LEFT JOIN niveles_programa np ON r.nivel_minimo = np.nombre
            WHERE r.activo = TRUE
              AND (r.fecha_fin IS NULL OR r.fecha_fin > NOW())
              AND (r.stock IS NULL OR r.stock_usado < r.stock)
              AND ($2::VARCHAR IS NULL OR r.categoria = $2)
            ORDER BY r.puntos_requeridos ASC
            "#,
        )
        .bind(orden_usuario.unwrap_or(1))
        .bind(categoria)
        .fetch_all(&self.pool)
        .await?;
        Ok(recompensas)
    }

    /// Canjea una recompensa del catálogo. A diferencia de los canjes por
    /// descuento, aquí los puntos se debitan de inmediato y la recompensa
    /// descuenta stock si lo tiene.
    pub async fn redeem_reward(
        &self,
        user_id: i64,
        recompensa_id: i64,
    ) -> AppResult<RewardRedeemedResponse> {
        let mut tx = self.pool.begin().await?;

        let recompensa = sqlx::query_as::<_, Recompensa>(
            "SELECT * FROM recompensas WHERE id = $1 AND activo = TRUE FOR UPDATE",
        )
        .bind(recompensa_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Recompensa no encontrada".to_string()))?;

        let perfil = sqlx::query_as::<_, ProgramaPuntos>(
            "SELECT * FROM programa_puntos WHERE usuario_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::ValidationError("Usuario sin programa de puntos".to_string())
        })?;

        let (orden_usuario, orden_requerido): (Option<i32>, Option<i32>) = sqlx::query_as(
            r#"
            SELECT
                (SELECT orden FROM niveles_programa WHERE nombre = $1),
                (SELECT orden FROM niveles_programa WHERE nombre = $2)
            "#,
        )
        .bind(&perfil.nivel)
        .bind(&recompensa.nivel_minimo)
        .fetch_one(&mut *tx)
        .await?;

        validate_reward_claim(
            &recompensa,
            perfil.puntos_disponibles,
            orden_usuario.unwrap_or(1),
            orden_requerido,
        )
        .map_err(AppError::ValidationError)?;

        let codigo = generate_reward_code();
        let fecha_expiracion = Utc::now() + Duration::days(i64::from(recompensa.validez_dias.max(1)));

        let canje_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO canjes_recompensas
                (usuario_id, recompensa_id, puntos_usados, codigo_canje, fecha_expiracion)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(recompensa.id)
        .bind(recompensa.puntos_requeridos)
        .bind(&codigo)
        .bind(fecha_expiracion)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO transacciones_puntos
                (usuario_id, tipo, puntos, descripcion, saldo_anterior, saldo_nuevo)
            VALUES ($1, 'CANJEADO', $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(-recompensa.puntos_requeridos)
        .bind(format!("Canje: {}", recompensa.nombre))
        .bind(perfil.puntos_disponibles)
        .bind(perfil.puntos_disponibles - recompensa.puntos_requeridos)
        .execute(&mut *tx)
        .await?;

        if recompensa.stock.is_some() {
            sqlx::query("UPDATE recompensas SET stock_usado = stock_usado + 1 WHERE id = $1")
                .bind(recompensa.id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            UPDATE programa_puntos SET
                puntos_disponibles = puntos_disponibles - $1,
                puntos_canjeados = puntos_canjeados + $1,
                ultima_actualizacion = NOW()
            WHERE usuario_id = $2
            "#,
        )
        .bind(recompensa.puntos_requeridos)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        log::info!(
            "Recompensa {} canjeada por usuario {user_id} con código {codigo}",
            recompensa.nombre
        );

        Ok(RewardRedeemedResponse {
            id: canje_id,
            codigo,
            recompensa: recompensa.nombre,
            tipo: recompensa.tipo,
            valor: recompensa.valor,
            expira: fecha_expiracion,
            puntos_usados: recompensa.puntos_requeridos,
        })
    }

    pub async fn grant_points(&self, request: GrantPointsRequest) -> AppResult<()> {
        if request.puntos <= 0 {
            return Err(AppError::ValidationError("Usuario y puntos requeridos".to_string()));
        }

        let config = self.load_config().await?;
        let descripcion = request
            .descripcion
            .unwrap_or_else(|| "Puntos otorgados por administrador".to_string());

        let mut tx = self.pool.begin().await?;
        self.assign_points(
            &mut *tx,
            request.usuario_id,
            None,
            request.puntos,
            TransaccionTipo::Ajuste,
            &descripcion,
            &config,
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn dashboard(&self) -> AppResult<PointsDashboard> {
        let usuarios_en_programa: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM programa_puntos")
            .fetch_one(&self.pool)
            .await?;

        let (puntos_emitidos, puntos_canjeados): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(puntos_totales), 0), COALESCE(SUM(puntos_canjeados), 0) FROM programa_puntos",
        )
        .fetch_one(&self.pool)
        .await?;

        let canjes_activos: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM canjes WHERE estado = 'ACTIVO'")
                .fetch_one(&self.pool)
                .await?;

        let usuarios_por_nivel = sqlx::query_as::<_, NivelStats>(
            "SELECT nivel, COUNT(*) AS usuarios FROM programa_puntos GROUP BY nivel ORDER BY nivel",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(PointsDashboard {
            usuarios_en_programa,
            puntos_emitidos,
            puntos_canjeados,
            puntos_disponibles: puntos_emitidos - puntos_canjeados,
            canjes_activos,
            usuarios_por_nivel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_below_minimum_earn_nothing() {
        let config = PointsConfig::default();
        assert_eq!(compute_points(14_999, 1.0, &config), 0);
        assert_eq!(compute_points(0, 1.5, &config), 0);
    }

    #[test]
    fn test_points_base_calculation() {
        let config = PointsConfig::default();
        // 23_456 -> 23 millares * 10 puntos
        assert_eq!(compute_points(23_456, 1.0, &config), 230);
        assert_eq!(compute_points(15_000, 1.0, &config), 150);
    }

    #[test]
    fn test_points_multiplier_floors() {
        let config = PointsConfig::default();
        // PLATA: 23 * 10 * 1.2 = 276
        assert_eq!(compute_points(23_000, 1.2, &config), 276);
        // ORO: 15 * 10 * 1.5 = 225
        assert_eq!(compute_points(15_999, 1.5, &config), 225);
    }

    #[test]
    fn test_big_purchase_bonus() {
        let config = PointsConfig::default();
        // 50 * 10 + 50 bonus
        assert_eq!(compute_points(50_000, 1.0, &config), 550);
        assert_eq!(compute_points(49_999, 1.0, &config), 490);
    }

    fn recompensa(puntos: i64, stock: Option<i64>, stock_usado: i64) -> Recompensa {
        Recompensa {
            id: 1,
            nombre: "Envío gratis por un mes".to_string(),
            descripcion: None,
            categoria: Some("envios".to_string()),
            tipo: RecompensaTipo::EnvioGratis,
            valor: 0,
            puntos_requeridos: puntos,
            nivel_minimo: Some("PLATA".to_string()),
            stock,
            stock_usado,
            validez_dias: 30,
            activo: true,
            fecha_inicio: None,
            fecha_fin: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_reward_claim_requires_points_and_level() {
        let r = recompensa(200, None, 0);
        // PLATA (orden 2) exigido: BRONCE no alcanza aunque tenga puntos.
        let err = validate_reward_claim(&r, 500, 1, Some(2)).unwrap_err();
        assert!(err.contains("requiere nivel PLATA"));

        let err = validate_reward_claim(&r, 150, 2, Some(2)).unwrap_err();
        assert!(err.contains("Puntos insuficientes"));

        assert!(validate_reward_claim(&r, 200, 2, Some(2)).is_ok());
        assert!(validate_reward_claim(&r, 200, 3, Some(2)).is_ok());
    }

    #[test]
    fn test_reward_claim_stock_rules() {
        // Stock NULL = ilimitado.
        assert!(validate_reward_claim(&recompensa(50, None, 9_999), 100, 2, Some(2)).is_ok());

        let agotada = recompensa(50, Some(10), 10);
        let err = validate_reward_claim(&agotada, 100, 2, Some(2)).unwrap_err();
        assert!(err.contains("agotada"));

        assert!(validate_reward_claim(&recompensa(50, Some(10), 9), 100, 2, Some(2)).is_ok());
    }

    #[test]
    fn test_redemption_amount_rules() {
        assert!(validate_redemption_amount(45, 1_000).is_err());
        assert!(validate_redemption_amount(55, 1_000).is_err());
        assert!(validate_redemption_amount(100, 80).is_err());
        assert!(validate_redemption_amount(50, 50).is_ok());
        assert!(validate_redemption_amount(200, 1_000).is_ok());
    }
}
