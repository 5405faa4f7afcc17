pub mod seed;
pub mod status;
