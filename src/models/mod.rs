pub mod admin;
pub mod cart;
pub mod chat;
pub mod order;
pub mod package;
pub mod pagination;
pub mod payment;
pub mod points;
pub mod product;
pub mod promo_code;
pub mod user;

pub use admin::*;
pub use cart::*;
pub use chat::*;
pub use order::*;
pub use package::*;
pub use pagination::*;
pub use payment::*;
pub use points::*;
pub use product::*;
pub use promo_code::*;
pub use user::*;
