//! End-to-end generation against the seeded bathroom and kitchen rules.
//!
//! Verifies:
//! - evaluated quantities, catalog prices and totals (golden file)
//! - identical inputs give identical reports
//! - per-item failures degrade instead of aborting
//! - a missing rule is the only fatal error

use rust_decimal::Decimal;
use std::str::FromStr;
use takeoff_engine::{EngineConfig, EngineError, FailureStage, SeedData, TakeoffService};
use takeoff_types::{
    FinishLevel, GenerationRule, PriceConfidence, ProfileId, ProjectRequirements, QuoteId,
    RoomType, RuleKey, TenantId,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SEED: &str = include_str!("fixtures/seed.json");
const GOLDEN: &str = include_str!("fixtures/bathroom_standard.json");

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn service() -> TakeoffService {
    SeedData::from_json(SEED)
        .unwrap()
        .in_memory_service(EngineConfig::default())
        .await
        .unwrap()
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bathroom_generation_matches_golden_file() {
    let svc = service().await;
    let req = bathroom();

    let report = svc
        .generate(&acme(), &req.rule_key(), &req.bindings(), &default_profile())
        .await
        .unwrap();

    let actual = serde_json::to_value(&report).unwrap();
    let expected: serde_json::Value = serde_json::from_str(GOLDEN).unwrap();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn generation_is_idempotent() {
    let svc = service().await;
    let req = bathroom();

    let first = svc
        .generate(&acme(), &req.rule_key(), &req.bindings(), &default_profile())
        .await
        .unwrap();
    let second = svc
        .generate(&acme(), &req.rule_key(), &req.bindings(), &default_profile())
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn reference_quantities() {
    let svc = service().await;
    let report = svc
        .generate_for_quote(&acme(), &QuoteId::new("q-100"), &bathroom(), &default_profile())
        .await
        .unwrap();

    assert_eq!(report.quote_id, Some(QuoteId::new("q-100")));
    assert_eq!(report.item("tiling").unwrap().qty.to_string(), "39.00");
    assert_eq!(report.item("tile_adhesive").unwrap().qty.to_string(), "2.00");
    assert_eq!(report.item("plumbing").unwrap().qty.to_string(), "6.00");
    assert_eq!(report.item("electrical").unwrap().qty.to_string(), "0.00");
    assert_eq!(report.item("demolition").unwrap().qty.to_string(), "5.17");
    assert_eq!(report.item("waterproofing").unwrap().qty.to_string(), "6.00");
}

#[tokio::test]
async fn boolean_flags_switch_items() {
    let svc = service().await;
    let req = ProjectRequirements::new(RoomType::Kitchen, FinishLevel::Basic, d("12"))
        .with_electrical(true);

    let report = svc
        .generate(&acme(), &req.rule_key(), &req.bindings(), &default_profile())
        .await
        .unwrap();
    assert!(report.is_clean());
    assert_eq!(report.item("electrical").unwrap().qty.to_string(), "3.00");
    assert_eq!(report.item("floor_tile").unwrap().qty.to_string(), "12.00");

    let req = req.with_electrical(false);
    let report = svc
        .generate(&acme(), &req.rule_key(), &req.bindings(), &default_profile())
        .await
        .unwrap();
    assert_eq!(report.item("electrical").unwrap().qty.to_string(), "1.00");
}

#[tokio::test]
async fn failing_expressions_are_listed_in_the_manifest() {
    let svc = service().await;
    let key = RuleKey::new(RoomType::Flooring, FinishLevel::Premium);
    svc.put_rule(
        GenerationRule::new(acme(), key)
            .with_labor("tiling", "10 / 0")
            .with_labor("demolition", "skirtingM + 1")
            .with_material("floor_tile", "areaM2 * 10000")
            .with_material("tile_adhesive", "ceil(areaM2 / 10)"),
    )
    .await
    .unwrap();

    let req = ProjectRequirements::new(RoomType::Flooring, FinishLevel::Premium, d("15.5"));
    let report = svc
        .generate(&acme(), &key, &req.bindings(), &default_profile())
        .await
        .unwrap();

    assert_eq!(report.items.len(), 4);
    let errors: Vec<_> = report
        .failures
        .iter()
        .map(|f| (f.item_ref.as_str(), f.stage, f.error.as_str()))
        .collect();
    assert_eq!(
        errors,
        vec![
            ("demolition", FailureStage::Evaluation, "UndefinedVariableError"),
            ("tiling", FailureStage::Evaluation, "ArithmeticError"),
            ("floor_tile", FailureStage::Evaluation, "RangeError"),
        ]
    );

    for item_ref in ["demolition", "tiling", "floor_tile"] {
        let item = report.item(item_ref).unwrap();
        assert_eq!(item.qty, Decimal::ZERO);
        assert_eq!(item.confidence, PriceConfidence::Low);
        assert!(item.warning.is_some());
    }

    let adhesive = report.item("tile_adhesive").unwrap();
    assert_eq!(adhesive.qty.to_string(), "2.00");
    assert_eq!(adhesive.confidence, PriceConfidence::High);
    assert_eq!(report.totals.subtotal.to_string(), "240.00");
}

#[tokio::test]
async fn unknown_profile_prices_nothing_and_uses_default_vat() {
    let svc = service().await;
    let req = bathroom();
    let report = svc
        .generate(&acme(), &req.rule_key(), &req.bindings(), &ProfileId::new("missing"))
        .await
        .unwrap();

    assert_eq!(report.vat_rate, Decimal::from(25));
    assert_eq!(report.currency, "SEK");
    assert_eq!(report.failures.len(), report.items.len());
    assert!(report.failures.iter().all(|f| f.stage == FailureStage::Pricing));
    assert_eq!(report.totals.total, Decimal::ZERO);
    assert_eq!(report.item("tiling").unwrap().qty.to_string(), "39.00");
}

#[tokio::test]
async fn missing_rule_is_fatal_and_names_the_key() {
    let svc = service().await;
    let req = ProjectRequirements::new(RoomType::Flooring, FinishLevel::Basic, d("20"));

    let err = svc
        .generate(&acme(), &req.rule_key(), &req.bindings(), &default_profile())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::RuleNotFound { .. }));
    assert!(err.to_string().contains("flooring|basic"));
    assert!(err.to_string().contains("put_rule"));
}

#[tokio::test]
async fn invalid_requirements_are_rejected_before_generation() {
    let svc = service().await;
    let req = ProjectRequirements::new(RoomType::Bathroom, FinishLevel::Standard, Decimal::ZERO);

    let err = svc
        .generate_for_quote(&acme(), &QuoteId::new("q-0"), &req, &default_profile())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}
