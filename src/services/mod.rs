pub mod admin_service;
pub mod auth_service;
pub mod chat_service;
pub mod notification_service;
pub mod order_service;
pub mod package_service;
pub mod payment_service;
pub mod points_service;
pub mod product_service;
pub mod promo_service;

pub use admin_service::*;
pub use auth_service::*;
pub use chat_service::*;
pub use notification_service::*;
pub use order_service::*;
pub use package_service::*;
pub use payment_service::*;
pub use points_service::*;
pub use product_service::*;
pub use promo_service::*;
