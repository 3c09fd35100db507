pub mod archive;
pub mod commands;
pub mod host;
pub mod http;
pub mod managed_runtime;
pub mod model;
pub mod package;
pub mod platform;
pub mod progress;
pub mod runtime;
pub mod transfer;
