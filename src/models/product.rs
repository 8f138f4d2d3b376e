use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Product {
    pub id: i64,
    pub nombre: String,
    pub precio: i64,
    pub descripcion: Option<String>,
    pub nutricional: Option<String>,
    pub categoria: Option<String>,
    pub imagen: Option<String>,
    pub stock: i64,
    pub codigo: Option<String>,
    pub costo: Option<i64>,
    pub descuento_activo: bool,
    pub descuento_porcentaje: f64,
    pub descuento_badge_texto: Option<String>,
    pub descuento_fecha_inicio: Option<DateTime<Utc>>,
    pub descuento_fecha_fin: Option<DateTime<Utc>>,
}

impl Product {
    /// Descuento vigente: activo, con porcentaje positivo y dentro de la ventana
    /// de fechas cuando esta existe.
    pub fn discount_in_effect(&self, now: DateTime<Utc>) -> bool {
        if !self.descuento_activo || self.descuento_porcentaje <= 0.0 {
            return false;
        }
        if let Some(inicio) = self.descuento_fecha_inicio
            && now < inicio
        {
            return false;
        }
        if let Some(fin) = self.descuento_fecha_fin
            && now > fin
        {
            return false;
        }
        true
    }

    pub fn precio_final(&self, now: DateTime<Utc>) -> i64 {
        if self.discount_in_effect(now) {
            let descontado = self.precio as f64 * (1.0 - self.descuento_porcentaje / 100.0);
            descontado.round() as i64
        } else {
            self.precio
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithDiscount {
    #[serde(flatten)]
    pub product: Product,
    pub precio_original: i64,
    pub precio_final: i64,
    pub tiene_descuento: bool,
}

impl ProductWithDiscount {
    pub fn from_product(product: Product, now: DateTime<Utc>) -> Self {
        let precio_original = product.precio;
        let precio_final = product.precio_final(now);
        let tiene_descuento = product.discount_in_effect(now);
        Self {
            product,
            precio_original,
            precio_final,
            tiene_descuento,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub nombre: String,
    pub precio: i64,
    pub descripcion: Option<String>,
    pub nutricional: Option<String>,
    pub categoria: Option<String>,
    pub imagen: Option<String>,
    #[serde(default)]
    pub stock: i64,
    pub codigo: Option<String>,
    pub costo: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub nombre: String,
    pub precio: i64,
    pub descripcion: Option<String>,
    pub nutricional: Option<String>,
    pub categoria: Option<String>,
    pub imagen: Option<String>,
    pub stock: i64,
    pub codigo: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDiscountRequest {
    pub descuento_activo: bool,
    #[serde(default)]
    pub descuento_porcentaje: f64,
    pub descuento_badge_texto: Option<String>,
    pub descuento_fecha_inicio: Option<DateTime<Utc>>,
    pub descuento_fecha_fin: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCostRequest {
    pub costo: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_product() -> Product {
        Product {
            id: 1,
            nombre: "Arroz 500g".to_string(),
            precio: 3_000,
            descripcion: None,
            nutricional: None,
            categoria: Some("despensa".to_string()),
            imagen: None,
            stock: 10,
            codigo: Some("P001".to_string()),
            costo: Some(2_200),
            descuento_activo: false,
            descuento_porcentaje: 0.0,
            descuento_badge_texto: None,
            descuento_fecha_inicio: None,
            descuento_fecha_fin: None,
        }
    }

    #[test]
    fn test_no_discount_returns_base_price() {
        let p = base_product();
        assert_eq!(p.precio_final(Utc::now()), 3_000);
    }

    #[test]
    fn test_active_discount_applies() {
        let mut p = base_product();
        p.descuento_activo = true;
        p.descuento_porcentaje = 10.0;
        assert_eq!(p.precio_final(Utc::now()), 2_700);
    }

    #[test]
    fn test_discount_outside_window_ignored() {
        let now = Utc::now();
        let mut p = base_product();
        p.descuento_activo = true;
        p.descuento_porcentaje = 50.0;
        p.descuento_fecha_fin = Some(now - Duration::days(1));
        assert_eq!(p.precio_final(now), 3_000);

        p.descuento_fecha_fin = None;
        p.descuento_fecha_inicio = Some(now + Duration::days(1));
        assert_eq!(p.precio_final(now), 3_000);
    }
}
