use crate::error::{AppError, AppResult};
use crate::external::{CompletionMessage, OpenAiClient};
use crate::middlewares::AuthUser;
use crate::models::*;
use regex::Regex;
use sqlx::PgPool;

/// Minutos de entrega prometidos; pasado ese plazo el asistente escala.
const MINUTOS_ENTREGA: i64 = 20;

#[derive(Clone)]
pub struct ChatService {
    pool: PgPool,
    openai: OpenAiClient,
}

impl ChatService {
    pub fn new(pool: PgPool, openai: OpenAiClient) -> Self {
        Self { pool, openai }
    }

    /// Asistente de la tienda. Si el mensaje menciona un número de pedido
    /// (SUP-123 o #123) se responde con el estado real sin pasar por el
    /// modelo; todo lo demás va a OpenAI con el catálogo como contexto.
    pub async fn chat(&self, request: ChatRequest) -> AppResult<ChatResponse> {
        let mensaje = request.mensaje.trim();
        if mensaje.is_empty() {
            return Err(AppError::ValidationError("Mensaje requerido".to_string()));
        }

        if let Some(pedido_id) = extract_order_number(mensaje) {
            if let Some((_, lookup)) = self.order_status_message(pedido_id).await? {
                return Ok(ChatResponse {
                    respuesta: lookup.mensaje,
                });
            }
        }

        let catalogo = self.catalog_context().await?;
        let system_prompt = format!(
            "Eres el asistente virtual de SuperCasa, un supermercado a domicilio \
             dentro de un conjunto residencial de 5 torres. Entregas en máximo 20 \
             minutos, solo dentro del conjunto. Responde en español, corto y \
             amable. Si preguntan por un pedido, pide el número (formato SUP-123).\n\n\
             Catálogo disponible:\n{catalogo}"
        );

        let mut messages = vec![CompletionMessage {
            role: "system".to_string(),
            content: system_prompt,
        }];
        // Solo los últimos seis turnos; el catálogo ya ocupa buena parte del
        // contexto.
        for msg in request.historial.iter().rev().take(6).rev() {
            messages.push(CompletionMessage {
                role: msg.role.clone(),
                content: msg.content.clone(),
            });
        }
        messages.push(CompletionMessage {
            role: "user".to_string(),
            content: mensaje.to_string(),
        });

        // Si el modelo no responde, el chat no se cae: respuesta fija.
        let respuesta = match self.openai.chat_completion(messages).await {
            Ok(respuesta) => respuesta,
            Err(e) => {
                log::warn!("Asistente sin respuesta del modelo: {e}");
                "En este momento no puedo responderte 😔. Escríbenos por \
                 WhatsApp o intenta de nuevo en unos minutos."
                    .to_string()
            }
        };
        Ok(ChatResponse { respuesta })
    }

    /// Estado de un pedido propio para el widget de soporte, con mensaje de
    /// escalamiento cuando se venció la promesa de entrega.
    pub async fn order_lookup(&self, user: &AuthUser, pedido_id: i64) -> AppResult<OrderLookupResponse> {
        let (usuario_id, lookup) = self
            .order_status_message(pedido_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pedido {pedido_id} no encontrado")))?;

        if usuario_id != user.id && !user.is_admin() {
            return Err(AppError::PermissionDenied);
        }
        Ok(lookup)
    }

    pub(crate) async fn order_status_message(
        &self,
        pedido_id: i64,
    ) -> AppResult<Option<(i64, OrderLookupResponse)>> {
        let pedido = sqlx::query_as::<_, Order>("SELECT * FROM pedidos WHERE id = $1")
            .bind(pedido_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(pedido) = pedido else {
            return Ok(None);
        };

        let minutos = (chrono::Utc::now() - pedido.fecha).num_minutes();

        let mensaje = match pedido.estado {
            PedidoEstado::Entregado => format!(
                "Tu pedido #{} ya fue entregado. ¡Gracias por comprar en SuperCasa! 🏠",
                pedido.id
            ),
            PedidoEstado::Cancelado => format!(
                "Tu pedido #{} fue cancelado. Si tienes dudas escríbenos por WhatsApp.",
                pedido.id
            ),
            _ if minutos > MINUTOS_ENTREGA => format!(
                "Tu pedido #{} lleva {minutos} minutos en preparación, más de lo \
                 normal. Ya avisamos al equipo de entregas para que lo priorice. 🙏",
                pedido.id
            ),
            _ => format!(
                "Tu pedido #{} está en camino. Llevamos {minutos} minutos; la \
                 entrega tarda máximo {MINUTOS_ENTREGA}. 🛵",
                pedido.id
            ),
        };

        Ok(Some((
            pedido.usuario_id,
            OrderLookupResponse {
                pedido_id: pedido.id,
                estado: format!("{:?}", pedido.estado).to_lowercase(),
                total: pedido.total,
                fecha: pedido.fecha.to_rfc3339(),
                minutos_transcurridos: minutos,
                mensaje,
            },
        )))
    }

    /// Resumen del catálogo vigente para el prompt del asistente.
    async fn catalog_context(&self) -> AppResult<String> {
        let productos = sqlx::query_as::<_, Product>(
            "SELECT * FROM productos WHERE stock > 0 ORDER BY categoria, nombre LIMIT 100",
        )
        .fetch_all(&self.pool)
        .await?;

        let now = chrono::Utc::now();
        let lineas: Vec<String> = productos
            .iter()
            .map(|p| {
                format!(
                    "- {} ({}): ${}",
                    p.nombre,
                    p.categoria.as_deref().unwrap_or("general"),
                    p.precio_final(now)
                )
            })
            .collect();
        Ok(lineas.join("\n"))
    }
}

/// Busca un número de pedido en el texto: "SUP-123", "sup 123" o "#123".
pub fn extract_order_number(texto: &str) -> Option<i64> {
    let re = Regex::new(r"(?i)(?:sup[\s-]*|#)(\d+)").ok()?;
    re.captures(texto)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_order_number() {
        assert_eq!(extract_order_number("¿Dónde va mi pedido SUP-482?"), Some(482));
        assert_eq!(extract_order_number("pedido #17 por favor"), Some(17));
        assert_eq!(extract_order_number("sup 33"), Some(33));
        assert_eq!(extract_order_number("hola, quiero café"), None);
    }
}
