//! This crate provides a small HTTP service that loads a JSON array of user records from a local
//! file and answers aggregate queries over them from memory.
//!
//! * `POST /users` (re)loads the users file.
//! * `GET /superusers` lists active users with a score of at least 900.
//! * `GET /top-countries` ranks countries by number of superusers.
//! * `GET /team-insights` summarises each team.
//! * `GET /active-users-per-day` counts logins per date.
//! * `GET /evaluation` calls the endpoints above and reports how they performed.
//! * `GET /metrics` exposes Prometheus metrics.
//!
//! The service is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team on top of the [hyper] HTTP library.
//! * [Serde](serde) performs (de)serialisation of JSON request and response data.
//! * [arc-swap](arc_swap) holds the record set so that a reload never blocks readers.
//! * [reqwest] makes the evaluation requests.

pub mod app;
pub mod app_state;
pub mod cli;
pub mod error;
pub mod evaluation;
pub mod insights;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod server;
pub mod store;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
