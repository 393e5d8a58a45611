//! Background Tasks Module
//!
//! Optional background work for a shared cache.
//!
//! # Tasks
//! - Expiry sweep: discards entries whose values have been dropped, at a fixed interval

mod sweep;

pub use sweep::spawn_sweep_task;
