//! Sink implementations

pub mod console;
pub mod rotating_file;

pub use console::{ConsoleSink, ConsoleTarget};
pub use rotating_file::{
    RotatingFileSink, RotationPolicy, DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES,
};

pub use crate::core::Sink;
