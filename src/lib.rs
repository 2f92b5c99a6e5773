//! # Brawl Meta
//!
//! A per-map Brawl Stars brawler meta tracker and ranker.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (observations, rankings)
//! - **calculate**: The aggregation and scoring engine
//! - **catalog**: Static game mode and map tables
//! - **fetch**: Cube API client (one concurrent query per trophy bracket)
//! - **auth**: Bearer token fetching and caching
//! - **render**: Console table output
//! - **config**: Configuration loading and validation

pub mod auth;
pub mod calculate;
pub mod catalog;
pub mod config;
pub mod fetch;
pub mod models;
pub mod render;

pub use models::*;
