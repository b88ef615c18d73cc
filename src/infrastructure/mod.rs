//! Infrastructure layer - Cache implementation, parameter sources and logging

pub mod cache;
pub mod logging;
pub mod source;
