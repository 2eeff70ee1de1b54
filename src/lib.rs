//! Telegram link directory
//!
//! Members submit links to Telegram channels and groups, file them under a
//! category, and like and comment on each other's links. Anyone can browse,
//! search and filter the catalog.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod listing;
pub mod middleware;
pub mod model;
pub mod route;
pub mod store;
pub mod validation;
