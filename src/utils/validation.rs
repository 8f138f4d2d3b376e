pub const TORRES_VALIDAS: [&str; 5] = ["1", "2", "3", "4", "5"];
pub const PISO_MIN: i32 = 1;
pub const PISO_MAX: i32 = 30;

/// Valida una dirección de entrega dentro del conjunto residencial.
/// Devuelve la lista completa de problemas, no solo el primero.
pub fn validate_delivery_address(torre: &str, piso: i32, apartamento: &str) -> Vec<String> {
    let mut errores = Vec::new();

    if !TORRES_VALIDAS.contains(&torre) {
        errores.push(format!("Torre inválida: {torre}. Debe ser 1, 2, 3, 4 o 5"));
    }
    if !(PISO_MIN..=PISO_MAX).contains(&piso) {
        errores.push(format!("Piso inválido: {piso}. Debe estar entre 1 y 30"));
    }
    if apartamento.trim().is_empty() {
        errores.push("Apartamento es requerido".to_string());
    }

    errores
}

/// Mismo patrón que valida el frontend: algo@dominio.tld, sin espacios.
pub fn is_valid_email(email: &str) -> bool {
    regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map(|re| re.is_match(email.trim()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_address() {
        assert!(validate_delivery_address("3", 15, "1504").is_empty());
    }

    #[test]
    fn test_invalid_tower() {
        let errores = validate_delivery_address("6", 15, "1504");
        assert_eq!(errores.len(), 1);
        assert!(errores[0].contains("Torre inválida"));
    }

    #[test]
    fn test_floor_out_of_range() {
        assert!(!validate_delivery_address("1", 0, "101").is_empty());
        assert!(!validate_delivery_address("1", 31, "101").is_empty());
        assert!(validate_delivery_address("1", 1, "101").is_empty());
        assert!(validate_delivery_address("1", 30, "101").is_empty());
    }

    #[test]
    fn test_errors_accumulate() {
        let errores = validate_delivery_address("9", 99, "  ");
        assert_eq!(errores.len(), 3);
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("vecino@torre3.com"));
        assert!(!is_valid_email("sin-arroba"));
        assert!(!is_valid_email("a@dominio"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("con espacio@dominio.com"));
        assert!(is_valid_email("  con.borde@dominio.com  "));
    }
}
