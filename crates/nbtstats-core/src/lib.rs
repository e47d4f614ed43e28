//! Core infrastructure for nbtstats.
//!
//! This crate provides the save-data extraction pipeline:
//! - Identifier codec (UUID / four-int-array / known-name conversions)
//! - Source enumeration over files and directories
//! - Tag decoding (binary NBT and textual SNBT)
//! - Normalization into a JSON-compatible value tree
//! - Output path mapping that preserves source-relative layout
//! - Atomic persistence (structured writes, raw copies, JSON reports)
//! - The extraction orchestrator and the occurrence aggregator

pub mod error;
pub mod extract;
pub mod ident;
pub mod nbt;
pub mod normalize;
pub mod paths;
pub mod sources;
pub mod stats;
pub mod writer;
