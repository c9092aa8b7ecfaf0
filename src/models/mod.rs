pub mod enums;
pub mod prediction;
pub mod user;

pub use enums::*;
pub use prediction::*;
pub use user::*;
