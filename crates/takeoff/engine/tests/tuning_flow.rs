//! End-to-end auto-tuning: generate, adjust, learn, regenerate.
//!
//! Verifies:
//! - a first adjustment seeds a low-confidence pattern that is not applied
//! - three adjustments reach the application gate with their median factor
//! - factors stay inside the clamp bounds
//! - tuning-store outages never block generation or adjustment logging

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use takeoff_engine::{
    AdjustmentOutcome, AdjustmentRequest, EngineConfig, SeedData, Stores, TakeoffService,
    TuningUpdate,
};
use takeoff_tuning::{JsonlAdjustmentLog, TuningPatternStore};
use takeoff_types::{
    ConfidenceTier, FinishLevel, ItemKind, PatternKey, ProfileId, ProjectRequirements, QuoteId,
    RoomType, StoreError, StoreResult, TenantId, TuningPattern,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SEED: &str = include_str!("fixtures/seed.json");

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn acme() -> TenantId {
    TenantId::new("acme")
}

fn default_profile() -> ProfileId {
    ProfileId::new("default")
}

fn bathroom() -> ProjectRequirements {
    ProjectRequirements::new(RoomType::Bathroom, FinishLevel::Standard, d("15.5")).with_plumbing(true)
}

fn kitchen(area: &str) -> ProjectRequirements {
    ProjectRequirements::new(RoomType::Kitchen, FinishLevel::Basic, d(area))
}

async fn seeded_service(stores: Stores) -> TakeoffService {
    let seed = SeedData::from_json(SEED).unwrap();
    let catalog = Arc::new(takeoff_engine::InMemoryCatalog::new());
    seed.populate_catalog(&catalog).await;
    let svc = TakeoffService::new(Stores { catalog, ..stores }, EngineConfig::default()).unwrap();
    seed.install_rules(&svc).await.unwrap();
    svc
}

async fn adjust(
    svc: &TakeoffService,
    quote: &str,
    item_ref: &str,
    original: &str,
    adjusted: &str,
) -> AdjustmentOutcome {
    svc.record_adjustment(
        &acme(),
        AdjustmentRequest::new(
            QuoteId::new(quote),
            ItemKind::Labor,
            item_ref,
            d(original),
            d(adjusted),
        ),
    )
    .await
    .unwrap()
}

fn updated(outcome: AdjustmentOutcome) -> (Decimal, u32, ConfidenceTier) {
    match outcome {
        AdjustmentOutcome::Logged {
            tuning:
                TuningUpdate::Updated {
                    factor,
                    sample_count,
                    tier,
                },
            ..
        } => (factor, sample_count, tier),
        other => panic!("expected a tuning update, got {other:?}"),
    }
}

/// Pattern store whose backend is down
struct UnavailablePatterns;

#[async_trait]
impl TuningPatternStore for UnavailablePatterns {
    async fn get(&self, _: &TenantId, _: &PatternKey) -> StoreResult<Option<TuningPattern>> {
        Err(StoreError::Unavailable("pattern store offline".into()))
    }

    async fn upsert(&self, _: TuningPattern, _: u64) -> StoreResult<TuningPattern> {
        Err(StoreError::Unavailable("pattern store offline".into()))
    }

    async fn list(&self, _: &TenantId) -> StoreResult<Vec<TuningPattern>> {
        Err(StoreError::Unavailable("pattern store offline".into()))
    }

    async fn delete(&self, _: &TenantId, _: &PatternKey) -> StoreResult<bool> {
        Err(StoreError::Unavailable("pattern store offline".into()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_adjustment_seeds_pattern_without_applying_it() {
    let svc = seeded_service(Stores::in_memory()).await;
    let req = kitchen("8");
    svc.generate_for_quote(&acme(), &QuoteId::new("k-1"), &req, &default_profile())
        .await
        .unwrap();

    let outcome = svc
        .record_adjustment(
            &acme(),
            AdjustmentRequest::new(QuoteId::new("k-1"), ItemKind::Material, "floor_tile", d("8.0"), d("10.0"))
                .with_reason("customer wants spare tiles"),
        )
        .await
        .unwrap();
    let (factor, n, tier) = updated(outcome);
    assert_eq!(factor.to_string(), "1.200");
    assert_eq!(n, 1);
    assert_eq!(tier, ConfidenceTier::Low);

    let report = svc
        .generate(&acme(), &req.rule_key(), &req.bindings(), &default_profile())
        .await
        .unwrap();
    let tile = report.item("floor_tile").unwrap();
    assert_eq!(tile.qty.to_string(), "8.00");
    assert!(!tile.tuning.applied);
    assert_eq!(tile.tuning.factor, Some(d("1.200")));
    assert_eq!(tile.tuning.tier, ConfidenceTier::Low);
    assert_eq!(tile.tuning.sample_count, 1);

    let logged = svc
        .adjustments_for_quote(&acme(), &QuoteId::new("k-1"))
        .await
        .unwrap();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].reason.as_deref(), Some("customer wants spare tiles"));
}

#[tokio::test]
async fn median_factor_applies_once_the_gate_is_reached() {
    let svc = seeded_service(Stores::in_memory()).await;
    for quote in ["b-1", "b-2", "b-3"] {
        svc.generate_for_quote(&acme(), &QuoteId::new(quote), &bathroom(), &default_profile())
            .await
            .unwrap();
    }

    // raw factors 1.25, 0.75, 1.1
    adjust(&svc, "b-1", "tiling", "39.00", "48.75").await;
    adjust(&svc, "b-2", "tiling", "39.00", "29.25").await;
    let (factor, n, tier) = updated(adjust(&svc, "b-3", "tiling", "39.00", "42.90").await);
    assert_eq!(factor.to_string(), "1.100");
    assert_eq!(n, 3);
    assert_eq!(tier, ConfidenceTier::Medium);

    let req = bathroom();
    let report = svc
        .generate(&acme(), &req.rule_key(), &req.bindings(), &default_profile())
        .await
        .unwrap();
    let tiling = report.item("tiling").unwrap();
    assert!(tiling.tuning.applied);
    assert_eq!(tiling.base_qty.to_string(), "39.00");
    assert_eq!(tiling.qty.to_string(), "42.90");
    assert_eq!(tiling.line_total.to_string(), "19305.00");
    assert_eq!(tiling.tuning.tier, ConfidenceTier::Medium);
    assert_eq!(report.tuned_count(), 1);

    let summary = svc.rule_summary(&acme(), &req.rule_key()).await.unwrap();
    assert_eq!(summary.total_items, 1);
    assert_eq!(summary.medium_confidence_items, 1);
}

#[tokio::test]
async fn factors_stay_within_clamp_bounds() {
    let svc = seeded_service(Stores::in_memory()).await;
    svc.generate_for_quote(&acme(), &QuoteId::new("b-1"), &bathroom(), &default_profile())
        .await
        .unwrap();

    let (up, _, _) = updated(adjust(&svc, "b-1", "plumbing", "6", "60").await);
    assert_eq!(up.to_string(), "1.200");

    let (down, n, _) = updated(adjust(&svc, "b-1", "demolition", "5.17", "0.5").await);
    assert_eq!(down.to_string(), "0.800");
    assert_eq!(n, 1);
}

#[tokio::test]
async fn insights_describe_learned_patterns() {
    let svc = seeded_service(Stores::in_memory()).await;
    svc.generate_for_quote(&acme(), &QuoteId::new("b-1"), &bathroom(), &default_profile())
        .await
        .unwrap();

    adjust(&svc, "b-1", "tiling", "39", "46.8").await;
    adjust(&svc, "b-1", "tiling", "39", "46.8").await;
    adjust(&svc, "b-1", "plumbing", "6", "5").await;

    let insights = svc.insights(&acme()).await.unwrap();
    assert_eq!(insights.len(), 2);
    assert_eq!(insights[0].item_ref, "tiling");
    assert_eq!(insights[0].sample_count, 2);
    assert_eq!(
        insights[0].interpretation,
        "Users usually raise this quantity by about 20% (low reliability)"
    );
    assert_eq!(insights[1].item_ref, "plumbing");
    assert!(insights[1].interpretation.contains("lower this quantity by about 17%"));
}

#[tokio::test]
async fn reset_pattern_starts_learning_over() {
    let svc = seeded_service(Stores::in_memory()).await;
    svc.generate_for_quote(&acme(), &QuoteId::new("b-1"), &bathroom(), &default_profile())
        .await
        .unwrap();
    adjust(&svc, "b-1", "tiling", "39", "46.8").await;
    adjust(&svc, "b-1", "tiling", "39", "46.8").await;

    let key: PatternKey = "bathroom|standard|tiling".parse().unwrap();
    assert!(svc.reset_pattern(&acme(), &key).await.unwrap());
    assert!(!svc.reset_pattern(&acme(), &key).await.unwrap());

    let (_, n, _) = updated(adjust(&svc, "b-1", "tiling", "39", "40").await);
    assert_eq!(n, 1);
}

#[tokio::test]
async fn pattern_store_outage_fails_open() {
    let stores = Stores {
        patterns: Arc::new(UnavailablePatterns),
        ..Stores::in_memory()
    };
    let svc = seeded_service(stores).await;

    let report = svc
        .generate_for_quote(&acme(), &QuoteId::new("b-1"), &bathroom(), &default_profile())
        .await
        .unwrap();
    assert!(!report.tuning_available);
    assert_eq!(report.tuned_count(), 0);
    assert_eq!(report.item("tiling").unwrap().qty.to_string(), "39.00");

    match adjust(&svc, "b-1", "tiling", "39", "46.8").await {
        AdjustmentOutcome::Logged {
            tuning: TuningUpdate::Failed { error },
            ..
        } => assert!(error.contains("pattern store offline")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        svc.adjustments_for_quote(&acme(), &QuoteId::new("b-1"))
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn adjustments_persist_to_jsonl_log() {
    let path = std::env::temp_dir().join(format!("takeoff-adjustments-{}.jsonl", QuoteId::generate()));
    let stores = Stores {
        log: Arc::new(JsonlAdjustmentLog::open(&path).await.unwrap()),
        ..Stores::in_memory()
    };
    let svc = seeded_service(stores).await;
    svc.generate_for_quote(&acme(), &QuoteId::new("b-1"), &bathroom(), &default_profile())
        .await
        .unwrap();

    adjust(&svc, "b-1", "tiling", "39", "42").await;
    adjust(&svc, "b-1", "plumbing", "6", "8").await;
    assert_eq!(adjust(&svc, "b-1", "plumbing", "8", "8.01").await, AdjustmentOutcome::Ignored);

    let entries = svc
        .adjustments_for_quote(&acme(), &QuoteId::new("b-1"))
        .await
        .unwrap();
    let refs: Vec<_> = entries.iter().map(|e| e.item_ref.as_str()).collect();
    assert_eq!(refs, vec!["plumbing", "tiling"]);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 2);

    let _ = std::fs::remove_file(path);
}
