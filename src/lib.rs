pub mod booking;
pub mod config;
pub mod directory;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod packages;
pub mod routes;
pub mod scheduling;
pub mod state;
pub mod store;
pub mod utils;
