pub mod aggregate;
pub mod overview;
