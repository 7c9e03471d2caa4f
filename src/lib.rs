//! Library crate for wavebeat-back, exposing modules for binaries and integration tests.

pub mod capture;
mod config;
pub mod dao;
mod dto;
mod error;
pub mod routes;
pub mod services;
pub mod songs;
pub mod state;
pub mod vision;
