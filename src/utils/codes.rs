use chrono::{Datelike, Utc};

/// Codigo promocional: SC + año + letra de tipo + consecutivo de 4 digitos.
/// Ej: SC2025A0001
pub fn generate_promo_code(tipo: &str, sequence: i64) -> String {
    let letter = match tipo {
        "bienvenida" => 'A',
        "usuario_unico" => 'U',
        _ => 'G',
    };
    format!("SC{}{}{:04}", Utc::now().year(), letter, sequence)
}

/// Codigo de canje de puntos: PTS + timestamp en base36 mayusculas.
pub fn generate_redemption_code() -> String {
    let millis = Utc::now().timestamp_millis();
    format!("PTS{}", to_base36(millis as u64))
}

/// Codigo de canje de recompensa: CJ + timestamp en base36 mayusculas.
pub fn generate_reward_code() -> String {
    let millis = Utc::now().timestamp_millis();
    format!("CJ{}", to_base36(millis as u64))
}

/// Referencia de pago: SUP_{METODO}_{timestamp_ms}.
pub fn generate_payment_reference(method: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    format!("SUP_{}_{}", method.to_uppercase(), millis)
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_promo_code_format() {
        let year = Utc::now().year();
        assert_eq!(generate_promo_code("bienvenida", 1), format!("SC{year}A0001"));
        assert_eq!(generate_promo_code("usuario_unico", 42), format!("SC{year}U0042"));
        assert_eq!(generate_promo_code("general", 1234), format!("SC{year}G1234"));
    }

    #[test]
    fn test_redemption_code_format() {
        let code = generate_redemption_code();
        assert!(code.starts_with("PTS"));
        assert!(code[3..].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_reward_code_format() {
        let code = generate_reward_code();
        assert!(code.starts_with("CJ"));
        assert!(code[2..].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_payment_reference_format() {
        let reference = generate_payment_reference("card");
        assert!(reference.starts_with("SUP_CARD_"));
        let millis: i64 = reference["SUP_CARD_".len()..].parse().unwrap();
        assert!(millis > 0);
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(46655), "ZZZ");
    }
}
