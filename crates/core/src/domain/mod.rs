pub mod contract;
pub mod dimension;
pub mod movement;
pub mod recommendation;
