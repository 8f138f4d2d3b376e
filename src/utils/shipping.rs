use serde::Serialize;

pub const MONTO_MINIMO: i64 = 5_000;
pub const MINIMO_DIGITAL: i64 = 20_000;
pub const ENVIO_GRATIS_EFECTIVO: i64 = 15_000;
pub const COSTO_ENVIO: i64 = 2_000;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShippingQuote {
    pub costo_envio: i64,
    pub envio_gratis: bool,
    pub mensaje: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faltante_envio_gratis: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShippingError {
    pub codigo: &'static str,
    pub mensaje: String,
}

/// Reglas de envío:
/// - toda compra exige un subtotal mínimo de $5.000
/// - pago digital exige mínimo $20.000 y el envío es siempre gratis
/// - pago en efectivo: gratis desde $15.000, $2.000 por debajo
pub fn calcular_costo_envio(subtotal: i64, metodo_pago: &str) -> Result<ShippingQuote, ShippingError> {
    if subtotal < MONTO_MINIMO {
        return Err(ShippingError {
            codigo: "MONTO_MINIMO",
            mensaje: "Monto mínimo de compra: $5,000".to_string(),
        });
    }

    match metodo_pago {
        "digital" => {
            if subtotal < MINIMO_DIGITAL {
                Err(ShippingError {
                    codigo: "MONTO_MINIMO_DIGITAL",
                    mensaje: "Monto mínimo para pago digital: $20,000".to_string(),
                })
            } else {
                Ok(ShippingQuote {
                    costo_envio: 0,
                    envio_gratis: true,
                    mensaje: "Envío gratis - Pago digital".to_string(),
                    faltante_envio_gratis: None,
                })
            }
        }
        "efectivo" => {
            if subtotal >= ENVIO_GRATIS_EFECTIVO {
                Ok(ShippingQuote {
                    costo_envio: 0,
                    envio_gratis: true,
                    mensaje: "Envío gratis - Pago efectivo".to_string(),
                    faltante_envio_gratis: None,
                })
            } else {
                Ok(ShippingQuote {
                    costo_envio: COSTO_ENVIO,
                    envio_gratis: false,
                    mensaje: "Costo de envío".to_string(),
                    faltante_envio_gratis: Some(ENVIO_GRATIS_EFECTIVO - subtotal),
                })
            }
        }
        _ => Err(ShippingError {
            codigo: "METODO_INVALIDO",
            mensaje: "Método de pago no válido".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_absolute_minimum() {
        let err = calcular_costo_envio(4_999, "efectivo").unwrap_err();
        assert_eq!(err.codigo, "MONTO_MINIMO");
    }

    #[test]
    fn test_digital_below_minimum() {
        let err = calcular_costo_envio(19_999, "digital").unwrap_err();
        assert_eq!(err.codigo, "MONTO_MINIMO_DIGITAL");
    }

    #[test]
    fn test_digital_free_shipping() {
        let quote = calcular_costo_envio(20_000, "digital").unwrap();
        assert_eq!(quote.costo_envio, 0);
        assert!(quote.envio_gratis);
    }

    #[test]
    fn test_cash_charged_below_threshold() {
        let quote = calcular_costo_envio(14_999, "efectivo").unwrap();
        assert_eq!(quote.costo_envio, 2_000);
        assert!(!quote.envio_gratis);
        assert_eq!(quote.faltante_envio_gratis, Some(1));
    }

    #[test]
    fn test_cash_free_at_threshold() {
        let quote = calcular_costo_envio(15_000, "efectivo").unwrap();
        assert_eq!(quote.costo_envio, 0);
        assert!(quote.envio_gratis);
    }

    #[test]
    fn test_unknown_method() {
        let err = calcular_costo_envio(30_000, "cheque").unwrap_err();
        assert_eq!(err.codigo, "METODO_INVALIDO");
    }
}
