pub mod generator;
pub mod provider;
