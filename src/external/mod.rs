pub mod openai;
pub mod twilio;
pub mod wompi;

pub use openai::*;
pub use twilio::*;
pub use wompi::*;
