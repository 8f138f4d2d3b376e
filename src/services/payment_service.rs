use crate::error::{AppError, AppResult};
use crate::external::{PaymentMethod, WompiGateway, extract_method_url};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::notification_service::NotificationService;
use crate::services::order_service::{OrderService, restore_stock};
use crate::utils::generate_payment_reference;
use serde::Deserialize;
use sqlx::PgPool;
use std::time::Duration;

/// Ítem del carrito tal como lo guarda el frontend en el carrito temporal.
#[derive(Debug, Deserialize)]
struct StoredCartItem {
    id: i64,
    #[serde(default = "default_cantidad")]
    cantidad: i64,
    #[serde(default)]
    tipo: Option<String>,
}

fn default_cantidad() -> i64 {
    1
}

#[derive(Clone)]
pub struct PaymentService {
    pool: PgPool,
    wompi: WompiGateway,
    order_service: OrderService,
    notifications: NotificationService,
}

impl PaymentService {
    pub fn new(
        pool: PgPool,
        wompi: WompiGateway,
        order_service: OrderService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            pool,
            wompi,
            order_service,
            notifications,
        }
    }

    /// Crea la transacción en la pasarela y guarda el carrito temporal bajo la
    /// referencia generada. El pedido real se materializa cuando el webhook
    /// confirma el pago.
    pub async fn create_payment(
        &self,
        user: &AuthUser,
        request: CreatePaymentRequest,
    ) -> AppResult<CreatePaymentResponse> {
        if request.monto <= 0 {
            return Err(AppError::ValidationError(
                "El monto debe ser mayor a cero".to_string(),
            ));
        }

        let usuario = sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE id = $1")
            .bind(user.id)
            .fetch_one(&self.pool)
            .await?;

        let telefono = request
            .telefono
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| usuario.telefono.clone());
        let cedula = request
            .cedula
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| usuario.cedula.clone());

        let metodo = match request.metodo_pago.to_uppercase().as_str() {
            "DAVIPLATA" => PaymentMethod::Daviplata {
                phone: telefono,
                cedula,
            },
            "NEQUI" => PaymentMethod::Nequi { phone: telefono },
            "PSE" => {
                let banco = request.banco.clone().filter(|b| !b.trim().is_empty()).ok_or_else(
                    || AppError::ValidationError("El banco es obligatorio para PSE".to_string()),
                )?;
                PaymentMethod::Pse {
                    cedula,
                    banco,
                    phone: telefono,
                    full_name: usuario.nombre.clone(),
                }
            }
            "CARD" => {
                let token = request
                    .payment_source_id
                    .clone()
                    .filter(|t| !t.trim().is_empty())
                    .ok_or_else(|| {
                        AppError::ValidationError(
                            "Falta el token de la tarjeta".to_string(),
                        )
                    })?;
                PaymentMethod::Card {
                    token,
                    installments: request.installments.unwrap_or(1),
                }
            }
            otro => {
                return Err(AppError::ValidationError(format!(
                    "Método de pago no soportado: {otro}"
                )));
            }
        };

        let reference = generate_payment_reference(metodo.code());
        let amount_in_cents = request.monto * 100;

        let transaction = self
            .wompi
            .create_transaction(&reference, amount_in_cents, &usuario.email, &metodo)
            .await?;

        self.save_temp_cart_internal(
            user.id,
            &reference,
            &request.productos,
            &request.datos_entrega,
        )
        .await?;

        // Los detalles traen las URLs de redirección propias del método
        // (Daviplata y PSE); la pasarela tarda un instante en publicarlas.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let mut detalles = self
            .wompi
            .get_transaction(&transaction.id)
            .await
            .unwrap_or_else(|_| transaction.clone());

        let mut daviplata_url = extract_method_url("DAVIPLATA", &detalles);
        if daviplata_url.is_none() && matches!(metodo, PaymentMethod::Daviplata { .. }) {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            if let Ok(reintento) = self.wompi.get_transaction(&transaction.id).await {
                detalles = reintento;
                daviplata_url = extract_method_url("DAVIPLATA", &detalles);
            }
        }
        let pse_url = extract_method_url("PSE", &detalles);

        Ok(CreatePaymentResponse {
            transaction_id: transaction.id,
            reference,
            status: transaction.status,
            metodo_pago: metodo.code().to_string(),
            monto: request.monto,
            redirect_url: detalles.redirect_url.or_else(|| Some(self.wompi.redirect_url().to_string())),
            daviplata_url,
            pse_url,
        })
    }

    pub async fn tokenize_card(&self, request: TokenizeCardRequest) -> AppResult<String> {
        self.wompi
            .tokenize_card(
                &request.number,
                &request.cvc,
                &request.exp_month,
                &request.exp_year,
                &request.card_holder,
            )
            .await
    }

    pub async fn save_temp_cart(
        &self,
        user_id: i64,
        request: SaveTempCartRequest,
    ) -> AppResult<()> {
        if request.referencia.trim().is_empty() {
            return Err(AppError::ValidationError("Referencia requerida".to_string()));
        }
        self.save_temp_cart_internal(
            user_id,
            request.referencia.trim(),
            &request.productos,
            &request.datos_entrega,
        )
        .await
    }

    async fn save_temp_cart_internal(
        &self,
        user_id: i64,
        referencia: &str,
        productos: &serde_json::Value,
        datos_entrega: &serde_json::Value,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO carrito_temporal (referencia, usuario_id, productos, datos_entrega)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (referencia) DO UPDATE SET
                productos = EXCLUDED.productos,
                datos_entrega = EXCLUDED.datos_entrega,
                fecha = NOW()
            "#,
        )
        .bind(referencia)
        .bind(user_id)
        .bind(productos)
        .bind(datos_entrega)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Espera a que el webhook resuelva el pago. El webhook es la única vía
    /// que muta el estado; aquí solo se sondea la base y, si no llegó dentro
    /// de la ventana, se reporta lo que diga la pasarela sin tocar nada.
    pub async fn check_payment(&self, transaction_id: &str) -> AppResult<PaymentStatusResponse> {
        for intento in 0..15 {
            if intento > 0 {
                tokio::time::sleep(Duration::from_secs(2)).await;
            }

            let pedido = sqlx::query_as::<_, Order>(
                "SELECT * FROM pedidos WHERE payment_transaction_id = $1",
            )
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(pedido) = pedido {
                if pedido.payment_status.is_terminal() {
                    return Ok(PaymentStatusResponse {
                        transaction_id: transaction_id.to_string(),
                        reference: pedido.payment_reference.clone(),
                        status: pedido.payment_status.as_str().to_string(),
                        pedido_id: Some(pedido.id),
                    });
                }
            }
        }

        let transaction = self.wompi.get_transaction(transaction_id).await?;
        let pedido_id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM pedidos
            WHERE payment_transaction_id = $1 OR payment_reference = $2
            ORDER BY fecha DESC
            LIMIT 1
            "#,
        )
        .bind(transaction_id)
        .bind(&transaction.reference)
        .fetch_optional(&self.pool)
        .await?;

        Ok(PaymentStatusResponse {
            transaction_id: transaction_id.to_string(),
            reference: Some(transaction.reference),
            status: transaction.status,
            pedido_id,
        })
    }

    /// Webhook de la pasarela. Solo reacciona a transaction.updated; cualquier
    /// otro evento se reconoce sin efectos para que la pasarela no reintente.
    pub async fn process_webhook(&self, payload: serde_json::Value) -> AppResult<()> {
        let evento = payload["event"].as_str().unwrap_or_default();
        if evento != "transaction.updated" {
            log::info!("Webhook ignorado: evento {evento}");
            return Ok(());
        }

        let transaction = &payload["data"]["transaction"];
        let transaction_id = transaction["id"].as_str().unwrap_or_default();
        let reference = transaction["reference"].as_str().unwrap_or_default();
        let status_str = transaction["status"].as_str().unwrap_or_default();

        if transaction_id.is_empty() || reference.is_empty() {
            return Err(AppError::ValidationError(
                "Webhook sin id o referencia de transacción".to_string(),
            ));
        }

        let Some(status) = PaymentStatus::parse(status_str) else {
            log::warn!("Webhook con estado desconocido: {status_str}");
            return Ok(());
        };

        log::info!("Webhook: transacción {transaction_id} ({reference}) -> {status_str}");

        let pedido_id = self.reconcile(transaction_id, reference, status).await?;

        // Sin pedido existente: materializar desde el carrito temporal solo si
        // el pago fue aprobado. La referencia es la única llave de búsqueda.
        // Un pago aprobado que no se pudo convertir en pedido queda como
        // incidencia para revisión manual; al webhook siempre se le responde
        // OK para cortar los reintentos.
        if pedido_id.is_none() && status == PaymentStatus::Approved {
            let resultado = self.materialize_from_cart(reference, transaction_id).await;
            if let Ok(Some(id)) = &resultado {
                self.notifications.notify_order_confirmed(*id).await;
            }
            if let Some(detalle) = incident_for(&resultado, reference) {
                log::error!("{detalle}");
                self.record_incident(reference, transaction_id, &detalle).await;
            }
        }

        Ok(())
    }

    /// Deja constancia de un pago aprobado que no terminó en pedido. Si la
    /// inserción falla solo queda el log; el webhook no debe fallar por esto.
    async fn record_incident(&self, reference: &str, transaction_id: &str, detalle: &str) {
        let resultado = sqlx::query(
            r#"
            INSERT INTO incidencias_pago (referencia, transaction_id, detalle)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(reference)
        .bind(transaction_id)
        .bind(detalle)
        .execute(&self.pool)
        .await;

        if let Err(e) = resultado {
            log::error!("No se pudo registrar la incidencia de pago {reference}: {e}");
        }
    }

    /// Aplica un estado de la pasarela al pedido que lo referencia. Devuelve el
    /// id del pedido afectado, o None si no existe.
    async fn reconcile(
        &self,
        transaction_id: &str,
        reference: &str,
        status: PaymentStatus,
    ) -> AppResult<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        let pedido = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM pedidos
            WHERE payment_transaction_id = $1 OR payment_reference = $2
            ORDER BY fecha DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(transaction_id)
        .bind(reference)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(pedido) = pedido else {
            tx.commit().await?;
            return Ok(None);
        };

        match pedido.payment_status.transition(status) {
            Ok(StatusTransition::AlreadyApplied) => {
                tx.commit().await?;
                Ok(Some(pedido.id))
            }
            Ok(StatusTransition::Applied(nuevo)) => {
                let estado = match nuevo {
                    PaymentStatus::Declined | PaymentStatus::Error | PaymentStatus::Voided => {
                        PedidoEstado::Cancelado
                    }
                    _ => pedido.estado,
                };

                sqlx::query(
                    r#"
                    UPDATE pedidos SET
                        payment_status = $1,
                        payment_transaction_id = $2,
                        estado = $3
                    WHERE id = $4
                    "#,
                )
                .bind(nuevo)
                .bind(transaction_id)
                .bind(estado)
                .bind(pedido.id)
                .execute(&mut *tx)
                .await?;

                if estado == PedidoEstado::Cancelado && pedido.estado != PedidoEstado::Cancelado {
                    restore_stock(&mut *tx, &pedido.productos.0).await?;
                }

                tx.commit().await?;

                if nuevo == PaymentStatus::Approved {
                    self.notifications.notify_order_confirmed(pedido.id).await;
                }
                Ok(Some(pedido.id))
            }
            Err(motivo) => {
                // Webhook tardío sobre un pago ya resuelto: se registra y se
                // responde OK para cortar los reintentos.
                tx.commit().await?;
                log::warn!("Webhook descartado para pedido {}: {motivo}", pedido.id);
                Ok(Some(pedido.id))
            }
        }
    }

    /// Crea el pedido a partir del carrito temporal guardado al iniciar el
    /// pago, marca el pago como aprobado y descarta el carrito.
    async fn materialize_from_cart(
        &self,
        reference: &str,
        transaction_id: &str,
    ) -> AppResult<Option<i64>> {
        let carrito = sqlx::query_as::<_, TempCart>(
            "SELECT * FROM carrito_temporal WHERE referencia = $1",
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;

        let Some(carrito) = carrito else {
            return Ok(None);
        };

        let usuario = sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE id = $1")
            .bind(carrito.usuario_id)
            .fetch_one(&self.pool)
            .await?;

        let items: Vec<StoredCartItem> = serde_json::from_value(carrito.productos.clone())?;
        let (paquetes, productos): (Vec<_>, Vec<_>) = items
            .into_iter()
            .partition(|i| i.tipo.as_deref() == Some("paquete"));

        let entrega: DeliveryData = serde_json::from_value(carrito.datos_entrega.clone())?;

        let request = CreateOrderRequest {
            productos: productos
                .into_iter()
                .map(|i| CartItemRequest { id: i.id, cantidad: i.cantidad })
                .collect(),
            paquetes: paquetes
                .into_iter()
                .map(|i| CartItemRequest { id: i.id, cantidad: i.cantidad })
                .collect(),
            total: entrega.total.unwrap_or(0),
            codigo_promocional: entrega.codigo_promocional.clone(),
            codigo_canje: entrega.codigo_canje.clone(),
            torre_entrega: entrega.torre_entrega.clone(),
            piso_entrega: entrega.piso_entrega,
            apartamento_entrega: entrega.apartamento_entrega.clone(),
            instrucciones_entrega: entrega.instrucciones_entrega.clone(),
            horario_preferido: entrega.horario_preferido.clone(),
            telefono_contacto: entrega
                .telefono_contacto
                .clone()
                .filter(|t| !t.trim().is_empty())
                .or(Some(usuario.telefono.clone())),
            payment_reference: Some(reference.to_string()),
            payment_method: Some("wompi".to_string()),
            payment_transaction_id: Some(transaction_id.to_string()),
            payment_amount_cents: None,
        };

        let auth_user = AuthUser {
            id: usuario.id,
            email: usuario.email.clone(),
            rol: usuario.rol,
        };

        let creado = self.order_service.create_order(&auth_user, request).await?;

        // El pedido nace PENDING; el webhook que lo originó ya lo aprobó.
        sqlx::query("UPDATE pedidos SET payment_status = 'APPROVED' WHERE id = $1")
            .bind(creado.pedido_id)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM carrito_temporal WHERE referencia = $1")
            .bind(reference)
            .execute(&self.pool)
            .await?;

        log::info!(
            "Pedido {} materializado desde carrito temporal {reference}",
            creado.pedido_id
        );
        Ok(Some(creado.pedido_id))
    }
}

/// Describe la incidencia de un pago aprobado según cómo terminó la
/// materialización; None cuando sí hubo pedido.
fn incident_for(outcome: &AppResult<Option<i64>>, reference: &str) -> Option<String> {
    match outcome {
        Ok(Some(_)) => None,
        Ok(None) => Some(format!(
            "Pago aprobado {reference} sin pedido ni carrito temporal"
        )),
        Err(e) => Some(format!(
            "Pago aprobado {reference} no se pudo convertir en pedido: {e}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_cart_items_partition() {
        let raw = serde_json::json!([
            { "id": 1, "cantidad": 2 },
            { "id": 7, "cantidad": 1, "tipo": "paquete" },
            { "id": 3, "tipo": "producto" }
        ]);
        let items: Vec<StoredCartItem> = serde_json::from_value(raw).unwrap();
        let (paquetes, productos): (Vec<_>, Vec<_>) = items
            .into_iter()
            .partition(|i| i.tipo.as_deref() == Some("paquete"));

        assert_eq!(paquetes.len(), 1);
        assert_eq!(paquetes[0].id, 7);
        assert_eq!(productos.len(), 2);
        assert_eq!(productos[1].cantidad, 1);
    }

    #[test]
    fn test_approved_payment_without_order_is_an_incident() {
        let sin_carrito: AppResult<Option<i64>> = Ok(None);
        let detalle = incident_for(&sin_carrito, "SUP_NEQUI_123").unwrap();
        assert!(detalle.contains("SUP_NEQUI_123"));
        assert!(detalle.contains("sin pedido ni carrito temporal"));

        let fallo: AppResult<Option<i64>> =
            Err(AppError::ValidationError("Stock insuficiente".to_string()));
        let detalle = incident_for(&fallo, "SUP_PSE_9").unwrap();
        assert!(detalle.contains("no se pudo convertir en pedido"));
        assert!(detalle.contains("Stock insuficiente"));
    }

    #[test]
    fn test_materialized_payment_is_not_an_incident() {
        let ok: AppResult<Option<i64>> = Ok(Some(44));
        assert!(incident_for(&ok, "SUP_CARD_1").is_none());
    }
}
