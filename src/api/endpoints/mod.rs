pub mod analyze;
pub mod cereals;
pub mod configure;
pub mod status;
