// Tally: expense description categorization.
//
// This is the library root. The classification engine lives in `text`
// (vectorization) and `model` (Naive Bayes + pipeline); the remaining
// modules are the glue that trains, stores, and serves it.

pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod output;
pub mod service;
pub mod status;
pub mod store;
pub mod text;

#[cfg(feature = "web")]
pub mod web;
