//! Core module containing the lifecycle orchestrator and its inputs

pub mod builder;
pub mod config;
pub mod context;
pub mod workspace;
