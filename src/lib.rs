//! Arc Engine — multi-year branching storylines for life simulations.
//!
//! Schedules long-running narrative arcs against a character's state,
//! one simulated year at a time: arcs advance on their own clocks, new
//! arcs start when the character qualifies, and mutual-exclusion groups
//! plus a fixed capacity bound how many run at once.

pub mod core;
pub mod schema;
