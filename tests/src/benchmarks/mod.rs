//! # Morph Notary Benchmarks
//!
//! `prepare` runs on every notary request the node sees, twice per accepted
//! request (once unsigned, once co-signed), so both paths are measured.

pub mod prepare;
