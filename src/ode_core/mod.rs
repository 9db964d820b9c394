pub mod derivative;
pub mod state;
