// Shukusho resizing image proxy library

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod origin;
pub mod pipeline;
pub mod policy;
pub mod proxy;
pub mod resize;
pub mod router;
pub mod server;
