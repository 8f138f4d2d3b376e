use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Package {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio_paquete: i64,
    pub categoria: Option<String>,
    pub imagen: Option<String>,
    pub activo: bool,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PackageProduct {
    pub producto_id: i64,
    pub nombre: String,
    pub precio: i64,
    pub cantidad: i64,
    pub stock: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PackageWithProducts {
    #[serde(flatten)]
    pub package: Package,
    pub productos: Vec<PackageProduct>,
    pub precio_normal: i64,
    pub ahorro: i64,
}

impl PackageWithProducts {
    pub fn new(package: Package, productos: Vec<PackageProduct>) -> Self {
        let precio_normal: i64 = productos.iter().map(|p| p.precio * p.cantidad).sum();
        let ahorro = (precio_normal - package.precio_paquete).max(0);
        Self {
            package,
            productos,
            precio_normal,
            ahorro,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PackageItemRequest {
    pub producto_id: i64,
    #[serde(default = "default_cantidad")]
    pub cantidad: i64,
}

fn default_cantidad() -> i64 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePackageRequest {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio_paquete: i64,
    pub categoria: Option<String>,
    pub imagen: Option<String>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub productos: Vec<PackageItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePackageRequest {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio_paquete: i64,
    pub categoria: Option<String>,
    pub imagen: Option<String>,
    pub activo: bool,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub productos: Option<Vec<PackageItemRequest>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PackageStats {
    pub total_paquetes: i64,
    pub paquetes_activos: i64,
    pub paquetes_vendidos: i64,
    pub ingresos_paquetes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_savings_computed_from_item_prices() {
        let package = Package {
            id: 1,
            nombre: "Combo desayuno".to_string(),
            descripcion: None,
            precio_paquete: 10_000,
            categoria: None,
            imagen: None,
            activo: true,
            fecha_inicio: None,
            fecha_fin: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let productos = vec![
            PackageProduct {
                producto_id: 1,
                nombre: "Pan".to_string(),
                precio: 4_000,
                cantidad: 2,
                stock: 20,
            },
            PackageProduct {
                producto_id: 2,
                nombre: "Leche".to_string(),
                precio: 5_000,
                cantidad: 1,
                stock: 15,
            },
        ];
        let combo = PackageWithProducts::new(package, productos);
        assert_eq!(combo.precio_normal, 13_000);
        assert_eq!(combo.ahorro, 3_000);
    }
}
