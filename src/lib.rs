// Kasasagi edge image delivery proxy library

pub mod access;
pub mod background;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod metrics;
pub mod origin;
pub mod pipeline;
pub mod proxy;
pub mod transform;
