//! Takeoff generation engine
//!
//! Turns project requirements into priced, tuned quote items.
//!
//! # Architecture
//!
//! ```text
//! requirements ──► TakeoffService ◄── adjustments
//!                   │          │
//!                   ▼          ▼
//!     QuantityGenerator      TuningEngine
//!       │         │              │
//!       ▼         ▼              ▼
//!  RuleStore  PricingCatalog  TuningPatternStore, AdjustmentLogStore
//! ```
//!
//! - [`QuantityGenerator`]: evaluates each rule expression and prices the item
//! - [`TakeoffService`]: applies learned factors, computes totals, records
//!   adjustments and serves insights
//! - Stores are traits; in-memory versions back the CLI and the tests
//!
//! Per-item problems never abort a generation. They are reported in the
//! [`GenerationReport::failures`] manifest; only a missing rule is fatal.
//!
//! # Example
//!
//! ```no_run
//! use takeoff_engine::{EngineConfig, SeedData};
//! use takeoff_types::{Decimal, FinishLevel, ProfileId, ProjectRequirements, QuoteId, RoomType};
//!
//! # async fn run(seed: SeedData) -> takeoff_engine::EngineResult<()> {
//! let service = seed.in_memory_service(EngineConfig::default()).await?;
//! let requirements = ProjectRequirements::new(
//!     RoomType::Bathroom,
//!     FinishLevel::Standard,
//!     Decimal::new(155, 1),
//! )
//! .with_plumbing(true);
//!
//! let report = service
//!     .generate_for_quote(&seed.tenant, &QuoteId::generate(), &requirements, &ProfileId::new("default"))
//!     .await?;
//! println!("total {} {}", report.totals.total, report.currency);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod generator;
pub mod quotes;
pub mod report;
pub mod rules;
pub mod seed;
pub mod service;

pub use catalog::{InMemoryCatalog, PricingCatalog};
pub use config::{AdjustmentPolicy, EngineConfig, LoggingConfig, PricingConfig};
pub use error::{EngineError, EngineResult};
pub use generator::{GeneratedQuantities, QuantityGenerator};
pub use quotes::{InMemoryQuoteContext, QuoteContextStore};
pub use report::{FailureStage, GenerationFailure, GenerationReport};
pub use rules::{InMemoryRuleStore, RuleStore};
pub use seed::{SeedData, SeedProfile, SeedRule};
pub use service::{AdjustmentOutcome, AdjustmentRequest, Stores, TakeoffService, TuningUpdate};
