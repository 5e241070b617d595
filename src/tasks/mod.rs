//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a pipeline is alive.
//!
//! # Tasks
//! - Cache invalidation: flushes the whole cache at a configured interval

mod invalidator;

pub use invalidator::{spawn_invalidation_task, PeriodicInvalidator, MIN_INTERVAL};
