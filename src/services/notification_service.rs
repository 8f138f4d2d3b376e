use crate::error::AppResult;
use crate::external::TwilioWhatsApp;
use crate::models::*;
use crate::services::chat_service::{ChatService, extract_order_number};
use sqlx::PgPool;

#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
    twilio: TwilioWhatsApp,
    chat: ChatService,
}

impl NotificationService {
    pub fn new(pool: PgPool, twilio: TwilioWhatsApp, chat: ChatService) -> Self {
        Self { pool, twilio, chat }
    }

    /// Confirmación de pedido por WhatsApp. El envío es best-effort: el
    /// resultado queda en whatsapp_logs y en el pedido, pero un fallo de
    /// Twilio nunca tumba la operación que lo disparó.
    pub async fn notify_order_confirmed(&self, pedido_id: i64) {
        if let Err(e) = self.send_order_confirmation(pedido_id).await {
            log::warn!("No se pudo notificar el pedido {pedido_id} por WhatsApp: {e}");
        }
    }

    async fn send_order_confirmation(&self, pedido_id: i64) -> AppResult<()> {
        let pedido = sqlx::query_as::<_, Order>("SELECT * FROM pedidos WHERE id = $1")
            .bind(pedido_id)
            .fetch_one(&self.pool)
            .await?;

        let (nombre, telefono): (String, String) =
            sqlx::query_as("SELECT nombre, telefono FROM usuarios WHERE id = $1")
                .bind(pedido.usuario_id)
                .fetch_one(&self.pool)
                .await?;

        let telefono = if pedido.telefono_contacto.trim().is_empty() {
            telefono
        } else {
            pedido.telefono_contacto.clone()
        };

        let direccion = format!(
            "Torre {}, Piso {}, Apt {}",
            pedido.torre_entrega.as_deref().unwrap_or("-"),
            pedido.piso_entrega.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
            pedido.apartamento_entrega.as_deref().unwrap_or("-"),
        );

        // Variables de la plantilla aprobada: pedido, total, dirección y
        // cantidad de ítems, en ese orden.
        let content_variables = serde_json::json!({
            "1": format!("SUP-{:03}", pedido.id),
            "2": format!("${}", pedido.total),
            "3": direccion,
            "4": pedido.productos.0.items.len().to_string(),
        });

        let detalle: Vec<String> = pedido
            .productos
            .0
            .items
            .iter()
            .map(|i| format!("- {} x{} (${})", i.nombre, i.cantidad, i.precio * i.cantidad))
            .collect();

        let fallback_body = format!(
            "¡Hola {nombre}! 🏠 Tu pedido #{} en SuperCasa fue confirmado.\n\n{}\n\nTotal: ${}\nEntrega: {direccion}\n\nTe avisaremos cuando salga en camino. ⏱️ Máximo 20 minutos.",
            pedido.id,
            detalle.join("\n"),
            pedido.total,
        );

        let resultado = self
            .twilio
            .send_order_confirmation(&telefono, &content_variables, &fallback_body)
            .await;

        match resultado {
            Ok(respuesta) => {
                self.log_message(
                    Some(pedido.id),
                    &telefono,
                    &fallback_body,
                    "confirmacion",
                    &respuesta.status,
                    Some(&respuesta.sid),
                )
                .await?;

                sqlx::query(
                    r#"
                    UPDATE pedidos SET
                        whatsapp_status = 'enviado',
                        whatsapp_message_sid = $1,
                        whatsapp_sent_at = NOW()
                    WHERE id = $2
                    "#,
                )
                .bind(&respuesta.sid)
                .bind(pedido.id)
                .execute(&self.pool)
                .await?;
                Ok(())
            }
            Err(e) => {
                self.log_message(
                    Some(pedido.id),
                    &telefono,
                    &fallback_body,
                    "confirmacion",
                    "error",
                    None,
                )
                .await?;

                sqlx::query("UPDATE pedidos SET whatsapp_status = 'error' WHERE id = $1")
                    .bind(pedido.id)
                    .execute(&self.pool)
                    .await?;
                Err(e)
            }
        }
    }

    /// Aviso de pedido en camino, con el nombre de quien lo lleva.
    pub async fn notify_order_dispatched(&self, pedido: &Order, entregado_por: &str) {
        let body = format!(
            "🛵 Tu pedido #{} va en camino con {entregado_por}. ¡Llega en minutos!",
            pedido.id
        );

        match self.twilio.send_freeform(&pedido.telefono_contacto, &body).await {
            Ok(respuesta) => {
                if let Err(e) = self
                    .log_message(
                        Some(pedido.id),
                        &pedido.telefono_contacto,
                        &body,
                        "despacho",
                        &respuesta.status,
                        Some(&respuesta.sid),
                    )
                    .await
                {
                    log::warn!("No se pudo registrar el log de WhatsApp: {e}");
                }
            }
            Err(e) => {
                log::warn!("Aviso de despacho del pedido {} falló: {e}", pedido.id);
            }
        }
    }

    /// Bot de mensajes entrantes. Contesta estado de pedido si el texto trae
    /// un número; para lo demás hay respuestas fijas con las dudas frecuentes.
    pub async fn handle_incoming(
        &self,
        from: &str,
        body: &str,
        message_sid: &str,
    ) -> AppResult<()> {
        let telefono = from.strip_prefix("whatsapp:").unwrap_or(from);
        self.log_message(None, telefono, body, "entrante", "recibido", Some(message_sid))
            .await?;

        let texto = body.trim().to_lowercase();
        let respuesta = if let Some(pedido_id) = extract_order_number(body) {
            match self.chat.order_status_message(pedido_id).await? {
                Some((_, lookup)) => lookup.mensaje,
                None => format!(
                    "No encontramos el pedido #{pedido_id}. Revisa el número e intenta de nuevo."
                ),
            }
        } else if texto.contains("catálogo") || texto.contains("catalogo") || texto.contains("productos") {
            "Mira el catálogo completo y haz tu pedido desde la app de SuperCasa 🏠".to_string()
        } else if texto.contains("horario") {
            "Entregamos todos los días dentro del conjunto, en máximo 20 minutos. ⏱️".to_string()
        } else if texto.contains("hola") || texto.contains("buenas") || texto.contains("buenos") {
            "¡Hola! 👋 Soy el asistente de SuperCasa. Envíame tu número de pedido \
             (SUP-123) para ver su estado, o escribe \"catálogo\"."
                .to_string()
        } else {
            "Puedo ayudarte con el estado de tu pedido: envíame el número (SUP-123). \
             También puedes escribir \"catálogo\" u \"horario\"."
                .to_string()
        };

        let envio = self.twilio.send_freeform(telefono, &respuesta).await?;
        self.log_message(
            None,
            telefono,
            &respuesta,
            "respuesta_bot",
            &envio.status,
            Some(&envio.sid),
        )
        .await?;
        Ok(())
    }

    /// Callback de estado de Twilio (queued, sent, delivered, read, failed).
    pub async fn handle_status_callback(&self, message_sid: &str, status: &str) -> AppResult<()> {
        sqlx::query("UPDATE whatsapp_logs SET status = $1 WHERE message_sid = $2")
            .bind(status)
            .bind(message_sid)
            .execute(&self.pool)
            .await?;

        let actualizado = sqlx::query(
            "UPDATE pedidos SET whatsapp_status = $1 WHERE whatsapp_message_sid = $2",
        )
        .bind(status)
        .bind(message_sid)
        .execute(&self.pool)
        .await?;

        if actualizado.rows_affected() == 0 {
            log::info!("Callback de estado {status} para sid {message_sid} sin pedido asociado");
        }
        Ok(())
    }

    async fn log_message(
        &self,
        pedido_id: Option<i64>,
        telefono: &str,
        mensaje: &str,
        tipo: &str,
        status: &str,
        message_sid: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO whatsapp_logs (pedido_id, telefono, mensaje, tipo, status, message_sid)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(pedido_id)
        .bind(telefono)
        .bind(mensaje)
        .bind(tipo)
        .bind(status)
        .bind(message_sid)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
