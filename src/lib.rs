//! Couplecard - Payment-Triggered Card Provisioning Backend
//!
//! This crate provisions personalized couple card pages after payment
//! confirmation: checkout session creation, signed webhook handling, media
//! upload, card persistence, and buyer notification.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
