use crate::services::{NotificationService, PaymentService};
use actix_web::{HttpResponse, Result, web};
use serde::Deserialize;
use serde_json::json;

/// La pasarela reintenta si no recibe 200, así que los fallos de conciliación
/// se responden OK y quedan en el log para revisión.
#[utoipa::path(
    post,
    path = "/webhook/wompi",
    tag = "webhooks",
    responses(
        (status = 200, description = "Evento recibido")
    )
)]
pub async fn wompi_webhook(
    payment_service: web::Data<PaymentService>,
    payload: web::Json<serde_json::Value>,
) -> Result<HttpResponse> {
    if let Err(e) = payment_service.process_webhook(payload.into_inner()).await {
        log::error!("Error procesando webhook de Wompi: {e}");
    }
    Ok(HttpResponse::Ok().json(json!({ "received": true })))
}

#[derive(Debug, Deserialize)]
pub struct IncomingWhatsAppForm {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "MessageSid", default)]
    pub message_sid: String,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppStatusForm {
    #[serde(rename = "MessageSid")]
    pub message_sid: String,
    #[serde(rename = "MessageStatus")]
    pub message_status: String,
}

/// Mensajes entrantes de WhatsApp. Twilio reintenta ante errores, así que
/// siempre se responde 200 y el fallo queda en el log.
#[utoipa::path(
    post,
    path = "/webhook/whatsapp",
    tag = "webhooks",
    responses(
        (status = 200, description = "Mensaje recibido")
    )
)]
pub async fn whatsapp_webhook(
    notifications: web::Data<NotificationService>,
    form: web::Form<IncomingWhatsAppForm>,
) -> Result<HttpResponse> {
    if let Err(e) = notifications
        .handle_incoming(&form.from, &form.body, &form.message_sid)
        .await
    {
        log::error!("Error atendiendo mensaje de WhatsApp de {}: {e}", form.from);
    }
    Ok(HttpResponse::Ok().finish())
}

#[utoipa::path(
    post,
    path = "/webhook/whatsapp/status",
    tag = "webhooks",
    responses(
        (status = 200, description = "Estado registrado")
    )
)]
pub async fn whatsapp_status_webhook(
    notifications: web::Data<NotificationService>,
    form: web::Form<WhatsAppStatusForm>,
) -> Result<HttpResponse> {
    if let Err(e) = notifications
        .handle_status_callback(&form.message_sid, &form.message_status)
        .await
    {
        log::error!("Error registrando estado de WhatsApp {}: {e}", form.message_sid);
    }
    Ok(HttpResponse::Ok().finish())
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/webhook/wompi", web::post().to(wompi_webhook))
        .route("/webhook/whatsapp", web::post().to(whatsapp_webhook))
        .route("/webhook/whatsapp/status", web::post().to(whatsapp_status_webhook));
}
