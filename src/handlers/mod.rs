pub mod admin;
pub mod auth;
pub mod chat;
pub mod order;
pub mod package;
pub mod payment;
pub mod points;
pub mod product;
pub mod promo;
pub mod webhook;

pub use admin::admin_config;
pub use auth::auth_config;
pub use chat::chat_config;
pub use order::order_config;
pub use package::package_config;
pub use payment::payment_config;
pub use points::points_config;
pub use product::product_config;
pub use promo::promo_config;
pub use webhook::webhook_config;
