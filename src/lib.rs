// src/lib.rs
// DOCUMENTATION: Library root shared by the HTTP server and the load_places CLI

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
