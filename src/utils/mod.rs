pub mod codes;
pub mod jwt;
pub mod shipping;
pub mod validation;

pub use codes::{
    generate_payment_reference, generate_promo_code, generate_redemption_code,
    generate_reward_code,
};
pub use jwt::*;
pub use shipping::*;
pub use validation::*;
