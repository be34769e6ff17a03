//! Auto-tuning for Takeoff
//!
//! Learns how users correct generated quantities and feeds that back into
//! later generations.
//!
//! # Architecture
//!
//! - [`AdjustmentLogStore`]: append-only audit of `(original, adjusted)` pairs
//! - [`TuningPatternStore`]: one learned factor per `(tenant, room|finish|item)`,
//!   written with optimistic version checks
//! - [`TuningEngine`]: clamps each observed factor to the policy bounds, keeps a
//!   rolling window and stores its median
//! - [`apply`]: pure, confidence-gated application of a factor to an item
//! - [`insights`]: human-readable summaries of what has been learned
//!
//! ```text
//! adjustment ──► log.append
//!            └─► engine.record ──► store.get ─► stats::observe ─► store.upsert(expected_version)
//!                                    ▲                                   │
//!                                    └──────── retry on conflict ◄───────┘
//! ```

#![deny(unsafe_code)]

pub mod applier;
pub mod engine;
pub mod error;
pub mod insights;
pub mod log;
pub mod policy;
pub mod stats;
pub mod store;

pub use applier::apply;
pub use engine::TuningEngine;
pub use error::{TuningError, TuningResult};
pub use insights::{build_insights, interpret, summarize_rule, PatternInsight, RuleSummary};
pub use log::{AdjustmentLogStore, JsonlAdjustmentLog, MemoryAdjustmentLog};
pub use policy::TuningPolicy;
pub use store::{InMemoryPatternStore, TuningPatternStore};
