pub mod billing;
pub mod enums;
