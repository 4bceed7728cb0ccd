//! Locally generated stand-ins for live data.
//!
//! Generators take the random source as a parameter so callers decide
//! between entropy and a fixed seed. Output obeys the same range
//! invariants as normalized upstream data.

pub mod flights;
pub mod satellites;
pub mod solar;
