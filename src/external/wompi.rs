use crate::config::WompiConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

#[derive(Debug, Deserialize)]
pub struct WompiEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MerchantTokens {
    pub acceptance_token: String,
    pub personal_data_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WompiTransaction {
    pub id: String,
    pub status: String,
    pub reference: String,
    pub amount_in_cents: i64,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub payment_method_type: Option<String>,
    #[serde(default)]
    pub payment_method: Option<serde_json::Value>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// Método de pago soportado por la pasarela, con los datos que cada uno exige.
#[derive(Debug, Clone)]
pub enum PaymentMethod {
    Daviplata { phone: String, cedula: String },
    Nequi { phone: String },
    Pse {
        cedula: String,
        banco: String,
        phone: String,
        full_name: String,
    },
    Card { token: String, installments: i64 },
}

impl PaymentMethod {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Daviplata { .. } => "DAVIPLATA",
            PaymentMethod::Nequi { .. } => "NEQUI",
            PaymentMethod::Pse { .. } => "PSE",
            PaymentMethod::Card { .. } => "CARD",
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        match self {
            PaymentMethod::Daviplata { phone, cedula } => json!({
                "type": "DAVIPLATA",
                "phone": phone,
                "user_legal_id_type": "CC",
                "user_legal_id": cedula,
            }),
            PaymentMethod::Nequi { phone } => json!({
                "type": "NEQUI",
                "phone_number": phone,
            }),
            PaymentMethod::Pse { cedula, banco, .. } => json!({
                "type": "PSE",
                "user_type": "0",
                "user_legal_id_type": "CC",
                "user_legal_id": cedula,
                "financial_institution_code": banco,
                "payment_description": "Compra SuperCasa",
            }),
            PaymentMethod::Card { token, installments } => json!({
                "type": "CARD",
                "token": token,
                "installments": installments,
            }),
        }
    }
}

/// Firma de integridad exigida por la pasarela:
/// sha256(referencia + monto_en_centavos + "COP" + llave_de_integridad) en hex.
pub fn integrity_signature(reference: &str, amount_in_cents: i64, integrity_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(reference.as_bytes());
    hasher.update(amount_in_cents.to_string().as_bytes());
    hasher.update(b"COP");
    hasher.update(integrity_key.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Clone)]
pub struct WompiGateway {
    client: Client,
    config: WompiConfig,
}

impl WompiGateway {
    pub fn new(config: WompiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn redirect_url(&self) -> &str {
        &self.config.redirect_url
    }

    /// Tokens de aceptación frescos del comercio; la pasarela los exige en
    /// cada transacción.
    pub async fn fetch_merchant_tokens(&self) -> AppResult<MerchantTokens> {
        let url = format!("{}/merchants/{}", self.config.base_url, self.config.public_key);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApiError(format!(
                "Error obteniendo datos del comercio: {error_text}"
            )));
        }

        let body: serde_json::Value = response.json().await?;
        let acceptance_token = body["data"]["presigned_acceptance"]["acceptance_token"]
            .as_str()
            .ok_or_else(|| {
                AppError::ExternalApiError("Respuesta del comercio sin acceptance_token".to_string())
            })?
            .to_string();
        let personal_data_token = body["data"]["presigned_personal_data_auth"]["acceptance_token"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(MerchantTokens {
            acceptance_token,
            personal_data_token,
        })
    }

    pub async fn create_transaction(
        &self,
        reference: &str,
        amount_in_cents: i64,
        customer_email: &str,
        method: &PaymentMethod,
    ) -> AppResult<WompiTransaction> {
        let tokens = self.fetch_merchant_tokens().await?;
        let signature = integrity_signature(reference, amount_in_cents, &self.config.integrity_key);

        let mut body = json!({
            "amount_in_cents": amount_in_cents,
            "currency": "COP",
            "signature": signature,
            "customer_email": customer_email,
            "payment_method": method.to_payload(),
            "reference": reference,
            "redirect_url": self.config.redirect_url,
            "acceptance_token": tokens.acceptance_token,
            "personal_data_auth_token": tokens.personal_data_token,
        });

        if let PaymentMethod::Pse { phone, full_name, .. } = method {
            body["customer_data"] = json!({
                "phone_number": phone,
                "full_name": full_name,
            });
        }

        let url = format!("{}/transactions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.private_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("Wompi rechazó la transacción {reference}: {error_text}");
            return Err(AppError::ExternalApiError(format!(
                "Error creando pago: {error_text}"
            )));
        }

        let envelope: WompiEnvelope<WompiTransaction> = response.json().await?;
        log::info!("Transacción Wompi creada: {}", envelope.data.id);
        Ok(envelope.data)
    }

    pub async fn get_transaction(&self, transaction_id: &str) -> AppResult<WompiTransaction> {
        let url = format!("{}/transactions/{}", self.config.base_url, transaction_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.private_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApiError(format!(
                "Error consultando transacción {transaction_id}: {error_text}"
            )));
        }

        let envelope: WompiEnvelope<WompiTransaction> = response.json().await?;
        Ok(envelope.data)
    }

    /// Tokeniza una tarjeta con la llave pública. El token resultante se usa
    /// luego como payment_source en la transacción.
    pub async fn tokenize_card(
        &self,
        number: &str,
        cvc: &str,
        exp_month: &str,
        exp_year: &str,
        card_holder: &str,
    ) -> AppResult<String> {
        let url = format!("{}/tokens/cards", self.config.base_url);
        let body = json!({
            "number": number,
            "cvc": cvc,
            "exp_month": exp_month,
            "exp_year": exp_year,
            "card_holder": card_holder,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.public_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApiError(format!(
                "Error tokenizando tarjeta: {error_text}"
            )));
        }

        let body: serde_json::Value = response.json().await?;
        body["data"]["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::ExternalApiError("Token de tarjeta ausente".to_string()))
    }
}

/// URL de redirección específica del método, cuando la pasarela la publica en
/// los detalles de la transacción.
pub fn extract_method_url(method: &str, transaction: &WompiTransaction) -> Option<String> {
    let extra = transaction.payment_method.as_ref()?.get("extra")?;
    let key = match method {
        "DAVIPLATA" => "url",
        "PSE" => "pseURL",
        _ => return None,
    };
    extra.get(key)?.as_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_signature_matches_known_vector() {
        // sha256("sk8-438k4-xmxm392-sn2m2490000COPprod_integrity_Z5mMke9x0k8gpErbDqwrJXMqsI6SdOqd")
        let signature = integrity_signature(
            "sk8-438k4-xmxm392-sn2m",
            2490000,
            "prod_integrity_Z5mMke9x0k8gpErbDqwrJXMqsI6SdOqd",
        );
        assert_eq!(
            signature,
            "59ad3d5ce6881f4fa8aa32c9ab040e498decad067a6cb9777c03d12a4d43d878"
        );
    }

    #[test]
    fn test_payment_method_payloads() {
        let pse = PaymentMethod::Pse {
            cedula: "123".to_string(),
            banco: "1007".to_string(),
            phone: "3000000000".to_string(),
            full_name: "Ana".to_string(),
        };
        let payload = pse.to_payload();
        assert_eq!(payload["type"], "PSE");
        assert_eq!(payload["financial_institution_code"], "1007");
        assert_eq!(payload["user_type"], "0");

        let nequi = PaymentMethod::Nequi {
            phone: "3001234567".to_string(),
        };
        assert_eq!(nequi.to_payload()["phone_number"], "3001234567");
        assert_eq!(nequi.code(), "NEQUI");
    }

    #[test]
    fn test_extract_method_url() {
        let tx = WompiTransaction {
            id: "1".to_string(),
            status: "PENDING".to_string(),
            reference: "SUP_PSE_1".to_string(),
            amount_in_cents: 100,
            customer_email: None,
            payment_method_type: Some("PSE".to_string()),
            payment_method: Some(serde_json::json!({
                "extra": { "pseURL": "https://pse.example/pay" }
            })),
            status_message: None,
            redirect_url: None,
        };
        assert_eq!(
            extract_method_url("PSE", &tx).as_deref(),
            Some("https://pse.example/pay")
        );
        assert!(extract_method_url("DAVIPLATA", &tx).is_none());
        assert!(extract_method_url("NEQUI", &tx).is_none());
    }
}
