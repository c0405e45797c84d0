//! Builds CAZyme reference databases from dbCAN annotation output: for each
//! sample, a codon-aligned coding-sequence file plus a matching hierarchical
//! taxonomy-label file.

pub mod app;
pub mod codon;
pub mod domain;
pub mod error;
pub mod hits;
pub mod output;
pub mod pairing;
pub mod sequence;
pub mod store;
pub mod taxonomy;
