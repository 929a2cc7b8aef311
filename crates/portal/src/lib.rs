//! Tabledesk portal library.
//!
//! Restaurant registration and moderation portal: owners register a single
//! restaurant which goes through a pending/approved/suspended moderation
//! lifecycle; admins review, approve, suspend, and manage registrations.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Askama templates for server-side rendering
//! - `PostgreSQL` for users, restaurants, and sessions
//! - Session-cookie authentication with Argon2id password hashing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod routes;
pub mod services;
pub mod state;
