pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod hasher;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod resource;
pub mod server;
pub mod services;
pub mod state;
pub mod validation;
