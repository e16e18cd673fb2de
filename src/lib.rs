//! Terminal live map of airport-to-airport cargo flows.
//!
//! Flow snapshots are aggregated per ordered airport pair, classified by
//! screen direction, offset apart when both directions of a pair carry
//! traffic, and drawn with animated beads. Reporting stations are colored
//! by how recently they checked in.

pub mod airport;
pub mod api;
pub mod beads;
pub mod canvas;
pub mod colors;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod flow;
pub mod geo;
pub mod help;
pub mod map_view;
pub mod render;
pub mod report;
pub mod session;
pub mod settings;
pub mod station;
pub mod terminal;
