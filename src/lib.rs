//! PG Round Notify - PostgreSQL LISTEN/NOTIFY bridge for consensus rounds
//!
//! Keeps one dedicated database connection subscribed to the round channels,
//! survives connection loss with bounded retries, and turns each notification
//! into a `finishRound` message on the process bus.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
