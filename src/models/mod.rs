//! Data models

pub mod user;
pub mod observation;
pub mod prediction;

pub use user::*;
pub use observation::*;
pub use prediction::*;
