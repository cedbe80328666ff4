//! Domains module containing business logic organized by bounded contexts.
//!
//! - `auth`: bearer token directory
//! - `upstream`: clients for the third-party services
//! - `itinerary`: the date planning pipeline
//! - `tools`: MCP tool definitions and dispatch

pub mod auth;
pub mod itinerary;
pub mod tools;
pub mod upstream;
