//! # fontsift
//!
//! Encoding engine and session tracker for width-channel leak pages.
//!
//! A decoy page renders one hidden container per candidate character, each
//! with a unique width bound to one candidate index. The victim's layout
//! engine sizes exactly one container to the secret text, that container's
//! resource reference fires, and the observed width identifies the
//! candidate: one character (or one batch of positions) per step.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Serving / Rendering Layer (external)              │
//! ├─────────────────────────────────────────────────────────┤
//! │  Generation Modes (single-step, staging, batched, anim) │
//! ├─────────────────────────────────────────────────────────┤
//! │  Width Encoder + Step Map (pure table computation)      │
//! ├─────────────────────────────────────────────────────────┤
//! │  Session Store (RAM-only LeakState tracking)            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Goals
//!
//! 1. **Injective encoding**: every width maps to exactly one candidate
//!    index, and the widths cover the candidate space exactly once
//! 2. **Pure computation**: no I/O, rendering, or ambient state anywhere in
//!    the engine
//! 3. **Replay safety**: stale or repeated observations are rejected, never
//!    silently reordered or double-applied
//!
//! The engine computes mapping tables and state transitions only. Template
//! rendering, HTTP routing, and transport belong to external collaborators
//! consuming the [`RenderContext`] values this crate produces.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod alphabet;
pub mod config;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod session;

pub use alphabet::{Alphabet, DEFAULT_ALPHABET};
pub use config::{Browser, ConfigFile, LeakSetup, Parent, Settings};
pub use encoder::{generate, GenerationMode, RenderContext, StepMap, STEP_SENTINEL_BASE};
pub use error::{Error, Result};
pub use metrics::LeakMetrics;
pub use session::{BatchObservation, LeakState, LeakStatus, LeakStore};
