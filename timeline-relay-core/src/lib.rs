#![doc = "timeline-relay-core: core logic library for timeline-relay."]

//! This crate holds the domain model and the filter-and-forward pipeline:
//! fetching a timeline newer than a cursor, deciding which items to forward,
//! shaping the outgoing message and pacing the poll loop.
//! Destination-specific signing and the CLI live in the `timeline-relay` crate.
//!
//! # Usage
//! Depend on this crate for the contracts ([`contract`]), the source client
//! ([`source`]), filter policies ([`filter`]) and the loop itself ([`relay`]).

pub mod config;
pub mod contract;
pub mod error;
pub mod filter;
pub mod message;
pub mod relay;
pub mod schedule;
pub mod source;
