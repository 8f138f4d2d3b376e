use crate::config::TwilioConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    pub sid: String,
    pub status: String,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
}

/// Normaliza un celular colombiano al formato whatsapp:+57XXXXXXXXXX.
pub fn to_whatsapp_address(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let national = digits.strip_prefix("57").filter(|rest| rest.len() == 10).unwrap_or(&digits);
    format!("whatsapp:+57{national}")
}

#[derive(Clone)]
pub struct TwilioWhatsApp {
    client: Client,
    config: TwilioConfig,
}

impl TwilioWhatsApp {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn has_template(&self) -> bool {
        self.config.template_sid.is_some()
    }

    /// Envía por plantilla aprobada cuando hay ContentSid configurado; de lo
    /// contrario usa mensaje libre (solo llega dentro de la ventana de 24h).
    pub async fn send_order_confirmation(
        &self,
        phone: &str,
        content_variables: &serde_json::Value,
        fallback_body: &str,
    ) -> AppResult<SendMessageResponse> {
        if let Some(template_sid) = self.config.template_sid.clone() {
            let variables = serde_json::to_string(content_variables)?;
            let params = [
                ("To", to_whatsapp_address(phone)),
                ("From", self.config.whatsapp_from.clone()),
                ("ContentSid", template_sid),
                ("ContentVariables", variables),
            ];
            match self.send(&params).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    log::warn!("Plantilla WhatsApp falló, reintentando con mensaje libre: {e}");
                }
            }
        }

        self.send_freeform(phone, fallback_body).await
    }

    pub async fn send_freeform(&self, phone: &str, body: &str) -> AppResult<SendMessageResponse> {
        let params = [
            ("To", to_whatsapp_address(phone)),
            ("From", self.config.whatsapp_from.clone()),
            ("Body", body.to_string()),
        ];
        self.send(&params).await
    }

    async fn send(&self, params: &[(&str, String)]) -> AppResult<SendMessageResponse> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(params)
            .send()
            .await?;

        if response.status().is_success() {
            let body: SendMessageResponse = response.json().await?;
            log::info!("WhatsApp enviado: sid={}, status={}", body.sid, body.status);
            Ok(body)
        } else {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Error enviando WhatsApp: {error_text}");
            Err(AppError::ExternalApiError(format!(
                "Error enviando WhatsApp: {error_text}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatsapp_address_normalization() {
        assert_eq!(to_whatsapp_address("3001234567"), "whatsapp:+573001234567");
        assert_eq!(to_whatsapp_address("+57 300 123 4567"), "whatsapp:+573001234567");
        assert_eq!(to_whatsapp_address("573001234567"), "whatsapp:+573001234567");
        assert_eq!(to_whatsapp_address("300-123-4567"), "whatsapp:+573001234567");
    }
}
