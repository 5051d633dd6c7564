pub mod agenda;
pub mod controller;
pub mod optimistic;
pub mod slot_index;
pub mod state;
pub mod store;
