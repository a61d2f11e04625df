//! Yamaha RTX router configuration translation.
//!
//! This library translates between the line-oriented CLI text an RTX router
//! emits for `show config` and strongly-typed, validated records, in both
//! directions: parsing device output into a model, and synthesizing the exact
//! CLI commands needed to create, update, or delete configuration on the
//! device. Firmware families render semantically identical settings in
//! different textual layouts, so dialect-sensitive parsers are selected
//! through a model registry with family fallback.
//!
//! # Architecture
//!
//! - [`registry`]: (domain, device model) to parser dispatch with family
//!   aliasing (`RTX1220` resolves to a parser registered as `RTX12xx`)
//! - [`models`]: supported-model and command-support tables
//! - [`domain`]: one module per configuration domain, each with a parser,
//!   command builders, and a validator
//! - [`verify`]: whole-dump validation report across all domains
//! - [`report`]: terminal-friendly colored rendering
//!
//! # Workflow
//!
//! 1. **Resolve** a parser for the target device through the registry
//! 2. **Parse** the raw `show config` dump into typed records
//! 3. **Validate** records before any write-back
//! 4. **Build** the CLI command lines and hand them to the transport
//!
//! Parsing and validation are deliberately separate stages: partially valid
//! device state must still be inspectable even when it would be rejected on
//! write-back.
//!
//! # Built on cfgline-core
//!
//! Generic directive scanning, the option-grammar tokenizer, and network
//! notation conversion live in `cfgline-core`. Everything RTX-specific is in
//! this crate.

pub mod domain;
pub mod models;
pub mod registry;
pub mod report;
pub mod verify;
