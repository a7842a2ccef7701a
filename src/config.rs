//! Configuration loader and schema types.
//!
//! Settings drive the worker (volume, channel capacity, tick), the queue
//! walk, and the terminal front-end.

mod load;
mod schema;

pub use schema::*;
