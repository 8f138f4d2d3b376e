use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Declined,
    Error,
    Voided,
}

/// Resultado de aplicar un estado reportado por la pasarela sobre el estado
/// almacenado del pedido.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// El estado cambia y debe persistirse.
    Applied(PaymentStatus),
    /// El mismo estado llegó de nuevo (reintento de webhook); no hay nada que hacer.
    AlreadyApplied,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    /// Un pago solo avanza de PENDING a un estado terminal. Un estado terminal
    /// repetido se acepta como reintento; cualquier otro cambio se rechaza para
    /// que un webhook tardío no pueda revertir un pago ya resuelto.
    pub fn transition(self, next: PaymentStatus) -> Result<StatusTransition, String> {
        if self == next {
            return Ok(StatusTransition::AlreadyApplied);
        }
        match self {
            PaymentStatus::Pending => Ok(StatusTransition::Applied(next)),
            _ => Err(format!(
                "Transición de pago inválida: {self:?} -> {next:?}"
            )),
        }
    }

    pub fn parse(s: &str) -> Option<PaymentStatus> {
        match s {
            "PENDING" => Some(PaymentStatus::Pending),
            "APPROVED" => Some(PaymentStatus::Approved),
            "DECLINED" => Some(PaymentStatus::Declined),
            "ERROR" => Some(PaymentStatus::Error),
            "VOIDED" => Some(PaymentStatus::Voided),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Approved => "APPROVED",
            PaymentStatus::Declined => "DECLINED",
            PaymentStatus::Error => "ERROR",
            PaymentStatus::Voided => "VOIDED",
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    /// DAVIPLATA, NEQUI, PSE o CARD
    #[serde(rename = "metodoPago")]
    pub metodo_pago: String,
    pub monto: i64,
    pub productos: serde_json::Value,
    #[serde(rename = "datosEntrega")]
    pub datos_entrega: serde_json::Value,
    pub telefono: Option<String>,
    pub cedula: Option<String>,
    /// Código de institución financiera, solo PSE
    pub banco: Option<String>,
    /// Token de tarjeta, solo CARD
    pub payment_source_id: Option<String>,
    pub installments: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatePaymentResponse {
    pub transaction_id: String,
    pub reference: String,
    pub status: String,
    #[serde(rename = "metodoPago")]
    pub metodo_pago: String,
    pub monto: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daviplata_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pse_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenizeCardRequest {
    pub number: String,
    pub cvc: String,
    pub exp_month: String,
    pub exp_year: String,
    pub card_holder: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentStatusResponse {
    pub transaction_id: String,
    pub reference: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pedido_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_moves_to_terminal() {
        let t = PaymentStatus::Pending.transition(PaymentStatus::Approved).unwrap();
        assert_eq!(t, StatusTransition::Applied(PaymentStatus::Approved));
        let t = PaymentStatus::Pending.transition(PaymentStatus::Declined).unwrap();
        assert_eq!(t, StatusTransition::Applied(PaymentStatus::Declined));
    }

    #[test]
    fn test_repeated_status_is_idempotent() {
        let t = PaymentStatus::Approved.transition(PaymentStatus::Approved).unwrap();
        assert_eq!(t, StatusTransition::AlreadyApplied);
        let t = PaymentStatus::Pending.transition(PaymentStatus::Pending).unwrap();
        assert_eq!(t, StatusTransition::AlreadyApplied);
    }

    #[test]
    fn test_terminal_cannot_change() {
        assert!(PaymentStatus::Approved.transition(PaymentStatus::Declined).is_err());
        assert!(PaymentStatus::Declined.transition(PaymentStatus::Approved).is_err());
        assert!(PaymentStatus::Voided.transition(PaymentStatus::Pending).is_err());
    }

    #[test]
    fn test_parse_round_trip() {
        for s in ["PENDING", "APPROVED", "DECLINED", "ERROR", "VOIDED"] {
            assert_eq!(PaymentStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(PaymentStatus::parse("REFUNDED").is_none());
    }
}
