pub mod integrate;
pub mod step;
