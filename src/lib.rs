//! Vetrina: a small self-hosted brochure-site server.
//!
//! Pages are rendered server-side from two JSON content documents (page
//! descriptions and a product catalog). Form submissions become outbound
//! email: a `mailto:` draft redirect, or a JSON relay dispatched through an
//! HTTP mail-delivery endpoint.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
