use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::points_service::{PointsService, compute_points};
use crate::utils::{calcular_costo_envio, validate_delivery_address};
use sqlx::{PgConnection, PgPool};

#[derive(Clone)]
pub struct OrderService {
    pool: PgPool,
    points_service: PointsService,
}

impl OrderService {
    pub fn new(pool: PgPool, points_service: PointsService) -> Self {
        Self {
            pool,
            points_service,
        }
    }

    /// Crea un pedido completo en una sola transacción: valida dirección y
    /// stock, congela precios en el snapshot, aplica promoción y canje,
    /// calcula envío, descuenta inventario y acredita puntos. Si cualquier
    /// paso falla no queda ningún efecto parcial.
    pub async fn create_order(
        &self,
        user: &crate::middlewares::AuthUser,
        request: CreateOrderRequest,
    ) -> AppResult<OrderCreatedResponse> {
        let errores = validate_delivery_address(
            &request.torre_entrega,
            request.piso_entrega,
            &request.apartamento_entrega,
        );
        if !errores.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Datos de entrega: {}",
                errores.join(", ")
            )));
        }

        if request.productos.is_empty() && request.paquetes.is_empty() {
            return Err(AppError::ValidationError(
                "El pedido debe tener al menos un producto o paquete".to_string(),
            ));
        }

        let telefono_contacto = request
            .telefono_contacto
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::ValidationError("El teléfono de contacto es obligatorio".to_string())
            })?
            .to_string();

        let config = self.points_service.load_config().await?;

        let mut tx = self.pool.begin().await?;

        let (snapshot, errores_stock) =
            build_snapshot(&mut *tx, &request.productos, &request.paquetes).await?;
        if !errores_stock.is_empty() {
            return Err(AppError::StockShortfall(errores_stock));
        }

        let subtotal = snapshot.subtotal();

        // Descuento por código promocional
        let mut descuento_monto: i64 = 0;
        let codigo_promocional = request
            .codigo_promocional
            .as_deref()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());
        if let Some(codigo) = &codigo_promocional {
            let promo = sqlx::query_as::<_, PromoCode>(
                "SELECT * FROM codigos_promocionales WHERE codigo = $1 AND usado = FALSE AND activo = TRUE FOR UPDATE",
            )
            .bind(codigo)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError("Código promocional no válido o ya usado".to_string())
            })?;

            descuento_monto = (subtotal as f64 * promo.descuento_porcentaje / 100.0).round() as i64;
        }

        // Envío según método de pago
        let payment_method = request.payment_method.clone().unwrap_or_else(|| "efectivo".to_string());
        let metodo_envio = if payment_method == "efectivo" { "efectivo" } else { "digital" };
        let quote = calcular_costo_envio(subtotal, metodo_envio)
            .map_err(|e| AppError::ValidationError(e.mensaje))?;

        let codigo_canje = request
            .codigo_canje
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string());

        // El pedido se inserta antes de consumir el canje para poder
        // referenciarlo; el total se corrige después si hay descuento de canje.
        let total_sin_canje = (subtotal - descuento_monto + quote.costo_envio).max(0);
        if request.total != 0 && request.total != total_sin_canje {
            log::warn!(
                "Total del cliente ({}) difiere del calculado ({}) para usuario {}",
                request.total,
                total_sin_canje,
                user.id
            );
        }

        let pedido_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO pedidos (
                usuario_id, productos, total, subtotal, descuento_monto, costo_envio,
                torre_entrega, piso_entrega, apartamento_entrega, instrucciones_entrega,
                horario_preferido, telefono_contacto,
                payment_reference, payment_method, payment_transaction_id, payment_amount_cents,
                codigo_promocional, codigo_canje
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING id
            "#,
        )
        .bind(user.id)
        .bind(sqlx::types::Json(&snapshot))
        .bind(total_sin_canje)
        .bind(subtotal)
        .bind(descuento_monto)
        .bind(quote.costo_envio)
        .bind(&request.torre_entrega)
        .bind(request.piso_entrega)
        .bind(request.apartamento_entrega.trim())
        .bind(&request.instrucciones_entrega)
        .bind(&request.horario_preferido)
        .bind(&telefono_contacto)
        .bind(&request.payment_reference)
        .bind(&payment_method)
        .bind(&request.payment_transaction_id)
        .bind(request.payment_amount_cents)
        .bind(&codigo_promocional)
        .bind(&codigo_canje)
        .fetch_one(&mut *tx)
        .await?;

        // Descuento por canje de puntos
        let mut descuento_canje: i64 = 0;
        if let Some(codigo) = &codigo_canje {
            descuento_canje = self
                .points_service
                .apply_redemption(&mut *tx, user.id, codigo, pedido_id)
                .await?;

            let total_final = (total_sin_canje - descuento_canje).max(0);
            sqlx::query(
                "UPDATE pedidos SET total = $1, descuento_monto = descuento_monto + $2 WHERE id = $3",
            )
            .bind(total_final)
            .bind(descuento_canje)
            .bind(pedido_id)
            .execute(&mut *tx)
            .await?;
        }

        let total_final = (total_sin_canje - descuento_canje).max(0);

        // Descontar inventario
        decrement_stock(&mut *tx, &request.productos, &request.paquetes).await?;

        // Consumir el código promocional
        if let Some(codigo) = &codigo_promocional {
            let result = sqlx::query(
                r#"
                UPDATE codigos_promocionales
                SET usado = TRUE, usuario_id = $1, fecha_uso = NOW()
                WHERE codigo = $2 AND usado = FALSE
                "#,
            )
            .bind(user.id)
            .bind(codigo)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::ValidationError(
                    "Código no válido o ya usado".to_string(),
                ));
            }
        }

        // Puntos del programa: un pedido pagado con canje no vuelve a generar
        // puntos, para que el ciclo canje-compra no se realimente.
        let multiplicador = self.points_service.user_multiplier(&mut *tx, user.id).await?;
        let puntos_ganados = if descuento_canje > 0 {
            0
        } else {
            compute_points(total_final, multiplicador, &config)
        };
        let mut nivel_nuevo = None;
        if puntos_ganados > 0 {
            let nivel = self
                .points_service
                .assign_points(
                    &mut *tx,
                    user.id,
                    Some(pedido_id),
                    puntos_ganados,
                    TransaccionTipo::Ganado,
                    "Compra en SuperCasa",
                    &config,
                )
                .await?;
            nivel_nuevo = Some(nivel);
        }

        tx.commit().await?;

        log::info!(
            "Pedido {pedido_id} creado: total={total_final}, envío={}, puntos={puntos_ganados}",
            quote.costo_envio
        );

        Ok(OrderCreatedResponse {
            pedido_id,
            total: total_final,
            subtotal,
            descuento_monto: descuento_monto + descuento_canje,
            costo_envio: quote.costo_envio,
            puntos_ganados,
            nivel_nuevo,
        })
    }

    pub async fn list_user_orders(&self, user_id: i64) -> AppResult<Vec<Order>> {
        let pedidos = sqlx::query_as::<_, Order>(
            "SELECT * FROM pedidos WHERE usuario_id = $1 ORDER BY fecha DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(pedidos)
    }

    pub async fn get_order(&self, id: i64) -> AppResult<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM pedidos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Pedido no encontrado".to_string()))
    }

    pub async fn admin_list(&self, query: &AdminOrderQuery) -> AppResult<PaginatedResponse<AdminOrderView>> {
        let params = PaginationParams {
            page: query.page,
            page_size: query.page_size,
        };

        // Filtros opcionales resueltos en SQL con binds posicionales fijos
        let sql_base = r#"
            FROM pedidos p
            JOIN usuarios u ON u.id = p.usuario_id
            WHERE ($1::pedido_estado IS NULL OR p.estado = $1)
              AND ($2::VARCHAR IS NULL OR p.torre_entrega = $2)
              AND ($3::TIMESTAMPTZ IS NULL OR p.fecha >= $3)
              AND ($4::TIMESTAMPTZ IS NULL OR p.fecha <= $4)
              AND ($5::TEXT IS NULL OR u.nombre ILIKE '%' || $5 || '%' OR u.email ILIKE '%' || $5 || '%')
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {sql_base}"))
            .bind(query.estado)
            .bind(&query.torre)
            .bind(query.fecha_inicio)
            .bind(query.fecha_fin)
            .bind(&query.busqueda)
            .fetch_one(&self.pool)
            .await?;

        let rows: Vec<(sqlx::types::Json<Order>, String, String)> = sqlx::query_as(&format!(
            r#"
            SELECT to_jsonb(p.*), u.nombre, u.email
            {sql_base}
            ORDER BY p.fecha DESC
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(query.estado)
        .bind(&query.torre)
        .bind(query.fecha_inicio)
        .bind(query.fecha_fin)
        .bind(&query.busqueda)
        .bind(params.get_limit())
        .bind(params.get_offset())
        .fetch_all(&self.pool)
        .await?;

        let data = rows
            .into_iter()
            .map(|(pedido, cliente_nombre, cliente_email)| AdminOrderView {
                pedido: pedido.0,
                cliente_nombre,
                cliente_email,
            })
            .collect();

        Ok(PaginatedResponse::new(
            data,
            params.page.unwrap_or(1),
            params.get_limit(),
            total,
        ))
    }

    /// Cambia el estado. Cancelar un pedido devuelve el stock congelado en el
    /// snapshot; los paquetes reponen los componentes que tenían al comprarse,
    /// aunque el paquete se haya editado después.
    pub async fn update_status(&self, id: i64, estado: PedidoEstado) -> AppResult<Order> {
        let mut tx = self.pool.begin().await?;

        let pedido = sqlx::query_as::<_, Order>("SELECT * FROM pedidos WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Pedido no encontrado".to_string()))?;

        if estado == PedidoEstado::Cancelado && pedido.estado != PedidoEstado::Cancelado {
            restore_stock(&mut *tx, &pedido.productos.0).await?;
        }

        let fecha_entrega = (estado == PedidoEstado::Entregado).then(chrono::Utc::now);

        let actualizado = sqlx::query_as::<_, Order>(
            "UPDATE pedidos SET estado = $1, fecha_entrega = $2 WHERE id = $3 RETURNING *",
        )
        .bind(estado)
        .bind(fecha_entrega)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        log::info!("Pedido {id} actualizado a estado {estado:?}");
        Ok(actualizado)
    }

    pub async fn mark_delivered(&self, id: i64, request: DeliverOrderRequest) -> AppResult<Order> {
        let pedido = sqlx::query_as::<_, Order>(
            r#"
            UPDATE pedidos SET
                estado = 'entregado',
                fecha_entrega = NOW(),
                entregado_por = $1
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(&request.entregado_por)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Pedido no encontrado".to_string()))?;

        Ok(pedido)
    }

    /// El dueño del pedido (o un admin) reporta el estado del pago. La máquina
    /// de estados rechaza retrocesos; un estado repetido no hace nada.
    pub async fn update_payment(
        &self,
        id: i64,
        user: &crate::middlewares::AuthUser,
        request: UpdatePaymentRequest,
    ) -> AppResult<Order> {
        let mut tx = self.pool.begin().await?;

        let pedido = sqlx::query_as::<_, Order>("SELECT * FROM pedidos WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Pedido no encontrado".to_string()))?;

        if pedido.usuario_id != user.id && !user.is_admin() {
            return Err(AppError::PermissionDenied);
        }

        match pedido
            .payment_status
            .transition(request.payment_status)
            .map_err(AppError::ValidationError)?
        {
            StatusTransition::AlreadyApplied => {
                tx.commit().await?;
                return Ok(pedido);
            }
            StatusTransition::Applied(nuevo) => {
                let estado = match nuevo {
                    PaymentStatus::Declined | PaymentStatus::Error | PaymentStatus::Voided => {
                        PedidoEstado::Cancelado
                    }
                    _ => pedido.estado,
                };

                let actualizado = sqlx::query_as::<_, Order>(
                    r#"
                    UPDATE pedidos SET
                        payment_status = $1,
                        payment_transaction_id = COALESCE($2, payment_transaction_id),
                        estado = $3
                    WHERE id = $4
                    RETURNING *
                    "#,
                )
                .bind(nuevo)
                .bind(&request.payment_transaction_id)
                .bind(estado)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

                if estado == PedidoEstado::Cancelado && pedido.estado != PedidoEstado::Cancelado {
                    restore_stock(&mut *tx, &pedido.productos.0).await?;
                }

                tx.commit().await?;
                Ok(actualizado)
            }
        }
    }

    /// Pedido del usuario en los últimos 10 minutos, para que el frontend
    /// confirme un pago recién hecho.
    pub async fn recent_order(&self, user_id: i64) -> AppResult<RecentOrderResponse> {
        let pedido = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM pedidos
            WHERE usuario_id = $1
              AND fecha > NOW() - INTERVAL '10 minutes'
              AND (payment_status = 'APPROVED' OR estado != 'cancelado')
            ORDER BY fecha DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match pedido {
            Some(p) => RecentOrderResponse {
                found: true,
                pedido_id: Some(p.id),
                payment_status: Some(p.payment_status),
                total: Some(p.total),
                fecha: Some(p.fecha),
            },
            None => RecentOrderResponse {
                found: false,
                pedido_id: None,
                payment_status: None,
                total: None,
                fecha: None,
            },
        })
    }
}

/// Congela las líneas del pedido con los precios vigentes (descuento incluido)
/// y acumula todos los faltantes de stock en lugar de cortar en el primero.
pub(crate) async fn build_snapshot(
    conn: &mut PgConnection,
    productos: &[CartItemRequest],
    paquetes: &[CartItemRequest],
) -> AppResult<(OrderItems, Vec<String>)> {
    let now = chrono::Utc::now();
    let mut items = Vec::new();
    let mut errores = Vec::new();

    for item in productos {
        if item.cantidad <= 0 {
            errores.push(format!("Cantidad inválida para producto ID {}", item.id));
            continue;
        }

        let producto = sqlx::query_as::<_, Product>(
            "SELECT * FROM productos WHERE id = $1 FOR UPDATE",
        )
        .bind(item.id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(producto) = producto else {
            errores.push(format!("Producto ID {} no encontrado", item.id));
            continue;
        };

        if producto.stock < item.cantidad {
            errores.push(format!(
                "{}: Stock insuficiente (disponible: {}, solicitado: {})",
                producto.nombre, producto.stock, item.cantidad
            ));
            continue;
        }

        items.push(OrderItem {
            id: producto.id,
            tipo: ItemKind::Producto,
            nombre: producto.nombre.clone(),
            precio: producto.precio_final(now),
            cantidad: item.cantidad,
            codigo: producto.codigo.clone(),
            componentes: Vec::new(),
        });
    }

    for item in paquetes {
        if item.cantidad <= 0 {
            errores.push(format!("Cantidad inválida para paquete ID {}", item.id));
            continue;
        }

        let paquete = sqlx::query_as::<_, Package>(
            "SELECT * FROM paquetes WHERE id = $1 AND activo = TRUE",
        )
        .bind(item.id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(paquete) = paquete else {
            errores.push(format!("Paquete ID {} no encontrado o inactivo", item.id));
            continue;
        };

        let componentes: Vec<(i64, String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT p.id, p.nombre, p.stock, pp.cantidad
            FROM paquete_productos pp
            JOIN productos p ON p.id = pp.producto_id
            WHERE pp.paquete_id = $1
            FOR UPDATE OF p
            "#,
        )
        .bind(item.id)
        .fetch_all(&mut *conn)
        .await?;

        let mut faltantes = false;
        for (_, nombre, stock, cantidad_componente) in &componentes {
            let requerido = cantidad_componente * item.cantidad;
            if *stock < requerido {
                errores.push(format!(
                    "{} (paquete {}): Stock insuficiente (disponible: {stock}, requerido: {requerido})",
                    nombre, paquete.nombre
                ));
                faltantes = true;
            }
        }
        if faltantes {
            continue;
        }

        items.push(OrderItem {
            id: paquete.id,
            tipo: ItemKind::Paquete,
            nombre: paquete.nombre.clone(),
            precio: paquete.precio_paquete,
            cantidad: item.cantidad,
            codigo: None,
            componentes: componentes
                .into_iter()
                .map(|(producto_id, nombre, _, cantidad)| SnapshotComponent {
                    producto_id,
                    nombre,
                    cantidad,
                })
                .collect(),
        });
    }

    Ok((OrderItems::new(items), errores))
}

pub(crate) async fn decrement_stock(
    conn: &mut PgConnection,
    productos: &[CartItemRequest],
    paquetes: &[CartItemRequest],
) -> AppResult<()> {
    for item in productos {
        sqlx::query("UPDATE productos SET stock = GREATEST(stock - $1, 0) WHERE id = $2")
            .bind(item.cantidad)
            .bind(item.id)
            .execute(&mut *conn)
            .await?;
    }

    for item in paquetes {
        sqlx::query(
            r#"
            UPDATE productos p SET stock = GREATEST(p.stock - (pp.cantidad * $1), 0)
            FROM paquete_productos pp
            WHERE pp.paquete_id = $2 AND p.id = pp.producto_id
            "#,
        )
        .bind(item.cantidad)
        .bind(item.id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub(crate) async fn restore_stock(conn: &mut PgConnection, snapshot: &OrderItems) -> AppResult<()> {
    for item in &snapshot.items {
        match item.tipo {
            ItemKind::Producto => {
                sqlx::query("UPDATE productos SET stock = stock + $1 WHERE id = $2")
                    .bind(item.cantidad)
                    .bind(item.id)
                    .execute(&mut *conn)
                    .await?;
            }
            ItemKind::Paquete if !item.componentes.is_empty() => {
                for comp in &item.componentes {
                    sqlx::query("UPDATE productos SET stock = stock + $1 WHERE id = $2")
                        .bind(comp.cantidad * item.cantidad)
                        .bind(comp.producto_id)
                        .execute(&mut *conn)
                        .await?;
                }
            }
            // Snapshots version 1: sin componentes congelados, se repone con
            // la composición vigente del paquete.
            ItemKind::Paquete => {
                sqlx::query(
                    r#"
                    UPDATE productos p SET stock = p.stock + (pp.cantidad * $1)
                    FROM paquete_productos pp
                    WHERE pp.paquete_id = $2 AND p.id = pp.producto_id
                    "#,
                )
                .bind(item.cantidad)
                .bind(item.id)
                .execute(&mut *conn)
                .await?;
            }
        }
    }
    Ok(())
}
