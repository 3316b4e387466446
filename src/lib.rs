// src/lib.rs

//! Catalog feed library: a cached, stale-tolerant reader for a published
//! product spreadsheet.

pub mod error;
pub mod models;
pub mod parser;
pub mod services;
pub mod source;
pub mod utils;
