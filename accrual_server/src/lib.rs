//! # Accrual service
//!
//! The reward engine of the loyalty platform. Operators feed it product
//! reward rules (`POST /api/goods`) and orders with their goods lines
//! (`POST /api/orders`); a background matcher pairs rules against unfinished
//! orders on a fixed interval and writes each order's final status and points
//! award. The mart service polls `GET /api/orders/{number}` for the result;
//! that endpoint sits behind a per-address rate limiter.
//!
//! ## Matching semantics
//!
//! A rule is a substring over goods descriptions plus a reward: `"%"` earns a
//! share of the line price, any other reward type earns a fixed amount per
//! matching line. All matching rules contribute and their awards sum. An
//! order whose numeric id fails the check digit is parked as `INVALID`;
//! orders no rule touches are closed out as `PROCESSED` with a zero award,
//! so every registered order reaches a terminal status in bounded time.

pub mod config;
pub mod db;
pub mod db_types;
pub mod errors;
pub mod matcher;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod service;

#[cfg(test)]
mod endpoint_tests;
