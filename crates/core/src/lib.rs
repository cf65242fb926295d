//! Core types and pure logic for reference-data caching.
//!
//! Everything in this crate is runtime-free: the item model, the indexed
//! collection, validity evaluation, filtering, and the traits that the
//! `refdata` crate implements (providers, repositories, cache stores).

pub mod cache;
pub mod filter;
pub mod provider;
pub mod reference;
pub mod storage;
