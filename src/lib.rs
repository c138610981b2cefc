//! Blogwire - a small blogging backend
//!
//! Users write blogs, blogs collect comments. Every record carries lists of
//! the ids that point back at it, and the services in this crate keep those
//! lists correct inside store transactions.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
