// Library exports for the noticeboard server
// This allows integration tests to drive the router in-process

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod uploads;
