//! perfguard - performance degradation detection between profiles
//!
//! This library compares profiles of two versions of a program with a set of
//! pluggable detection strategies and classifies every measured location as
//! an optimization, a degradation or no change. A history-aware checker picks
//! baseline ancestors for a minor version, optionally re-collects missing
//! profiles through a job runner, and persists the verdicts per version.

pub mod cache;
pub mod change;
pub mod checker;
pub mod cli;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod memory;
pub mod pairing;
pub mod profile;
pub mod report;
pub mod rules;
pub mod stats;
pub mod strategy;
