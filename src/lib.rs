//! # Brand Directory Library
//!
//! This library provides the core functionality for the Brand Directory service:
//! brands with their offers and images, the admin authorization gate, uploads,
//! and the server wiring.

pub mod activity;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod password;
pub mod repositories;
pub mod server;
pub mod session;
pub mod storage;
pub mod telemetry;
pub mod validation;
pub use migration;
