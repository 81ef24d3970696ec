//! Integration test modules

mod config;
mod dashboard;
