#![deny(missing_docs)]
//! # Handoff
//!
//! A blocking FIFO queue for handing messages between threads.
//!
//! Any number of producers and consumers share a [`Queue`] by cloning it.
//! The queue can be bounded to create back pressure, and closed to release
//! every thread blocked on it once no more messages will arrive.
//!
//! [`Queue`]: sync/queue/struct.Queue.html
#[macro_use] extern crate log;

mod array;
pub mod errors;
pub mod stress;
pub mod sync;

// Pub uses
pub use array::FixedArray;
pub use errors::{Error, PushError, Result};
pub use sync::queue::Queue;
pub use sync::Capacity;
