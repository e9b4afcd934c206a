//! Shared types for the uniparse morphological analyzer.
//!
//! # Architecture
//!
//! - [`enums`] -- Gloss types, position flags, clitic sides and parser limits
//! - [`character`] -- Character classes of stems, flexes and raw tokens
//! - [`wordform`] -- Analysis results and their attribute view
//! - [`token`] -- Frequency lists and nested token groups

pub mod character;
pub mod enums;
pub mod token;
pub mod wordform;
