//! Declarative binary format analysis: format detection, template libraries, and tree decoding.

/// Value model, accessors, type templates, decoder, and module resolution.
pub mod engine;
