pub mod adapters;
pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod jobs;
pub mod ports;
