//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that request dispatchers use
//! - **Outbound (Driven)**: Chain state the preparator reads

pub mod inbound;
pub mod outbound;
