pub mod auth;
pub mod automation;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
