//! Replay recorded quote edits through generation and tuning
//!
//! The replay file is a JSON array of quotes:
//!
//! ```json
//! [{
//!   "quote_id": "q-1",
//!   "requirements": {"room_type": "bathroom", "finish_level": "standard", "area_m2": "15.5"},
//!   "edits": [{"kind": "labor", "ref": "tiling", "adjusted_qty": "46.8", "reason": "slow substrate"}]
//! }]
//! ```
//!
//! Each quote is generated, each edit is recorded against the generated
//! quantity, and the learned insights are printed at the end.

use crate::output::{print_json, print_success, print_table, print_warning, OutputFormat};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use takeoff_engine::{AdjustmentOutcome, AdjustmentRequest, TakeoffService, TuningUpdate};
use takeoff_tuning::PatternInsight;
use takeoff_types::{ItemKind, ProfileId, ProjectRequirements, QuoteId, TenantId};

/// One quote of a replay file
#[derive(Debug, Deserialize)]
pub struct ReplayQuote {
    pub quote_id: QuoteId,
    pub requirements: ProjectRequirements,
    #[serde(default)]
    pub profile: Option<ProfileId>,
    #[serde(default)]
    pub edits: Vec<ReplayEdit>,
}

/// A user edit of one generated item
#[derive(Debug, Deserialize)]
pub struct ReplayEdit {
    pub kind: ItemKind,
    #[serde(rename = "ref")]
    pub item_ref: String,
    pub adjusted_qty: Decimal,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Per-edit result
#[derive(Debug, Serialize)]
pub struct ReplayResult {
    pub quote_id: QuoteId,
    pub item_ref: String,
    pub original_qty: Decimal,
    pub adjusted_qty: Decimal,
    pub outcome: AdjustmentOutcome,
}

#[derive(Debug, Serialize)]
struct ReplaySummary {
    results: Vec<ReplayResult>,
    insights: Vec<PatternInsight>,
}

#[derive(Debug, Tabled)]
struct InsightRow {
    pattern: String,
    factor: String,
    samples: u32,
    tier: String,
    score: String,
    interpretation: String,
}

impl From<&PatternInsight> for InsightRow {
    fn from(insight: &PatternInsight) -> Self {
        Self {
            pattern: insight.pattern_key.to_string(),
            factor: insight.factor.to_string(),
            samples: insight.sample_count,
            tier: insight.tier.to_string(),
            score: insight.score.to_string(),
            interpretation: insight.interpretation.clone(),
        }
    }
}

pub fn parse_replay(json: &str) -> anyhow::Result<Vec<ReplayQuote>> {
    Ok(serde_json::from_str(json)?)
}

pub async fn execute(
    service: &TakeoffService,
    tenant: &TenantId,
    quotes: Vec<ReplayQuote>,
    default_profile: &ProfileId,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut results = Vec::new();

    for quote in quotes {
        let profile = quote.profile.as_ref().unwrap_or(default_profile);
        let report = service
            .generate_for_quote(tenant, &quote.quote_id, &quote.requirements, profile)
            .await?;

        for edit in quote.edits {
            let Some(item) = report
                .items
                .iter()
                .find(|i| i.kind == edit.kind && i.item_ref == edit.item_ref)
            else {
                print_warning(&format!(
                    "quote {}: no {} item '{}' was generated, edit skipped",
                    quote.quote_id, edit.kind, edit.item_ref
                ));
                continue;
            };

            let mut request = AdjustmentRequest::new(
                quote.quote_id.clone(),
                edit.kind,
                edit.item_ref.clone(),
                item.qty,
                edit.adjusted_qty,
            );
            request.reason = edit.reason;

            let outcome = service.record_adjustment(tenant, request).await?;
            results.push(ReplayResult {
                quote_id: quote.quote_id.clone(),
                item_ref: edit.item_ref,
                original_qty: item.qty,
                adjusted_qty: edit.adjusted_qty,
                outcome,
            });
        }
    }

    let insights = service.insights(tenant).await?;

    match format {
        OutputFormat::Json => print_json(&ReplaySummary { results, insights })?,
        OutputFormat::Table => {
            let logged = results
                .iter()
                .filter(|r| matches!(r.outcome, AdjustmentOutcome::Logged { .. }))
                .count();
            for r in &results {
                if let AdjustmentOutcome::Logged {
                    tuning: TuningUpdate::Failed { error },
                    ..
                } = &r.outcome
                {
                    print_warning(&format!("{} '{}': {}", r.quote_id, r.item_ref, error));
                }
            }
            print_success(&format!(
                "Replayed {} edits ({} logged, {} below threshold)",
                results.len(),
                logged,
                results.len() - logged
            ));
            print_table(insights.iter().map(InsightRow::from).collect());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay_file() {
        let quotes = parse_replay(
            r#"[{
                "quote_id": "q-1",
                "requirements": {"room_type": "bathroom", "finish_level": "standard", "area_m2": "15.5", "has_plumbing_work": true},
                "edits": [{"kind": "labor", "ref": "tiling", "adjusted_qty": "46.8"}]
            }]"#,
        )
        .unwrap();
        assert_eq!(quotes.len(), 1);
        assert!(quotes[0].requirements.has_plumbing_work);
        assert_eq!(quotes[0].edits[0].item_ref, "tiling");
        assert!(quotes[0].profile.is_none());
    }

    #[test]
    fn test_bundled_replay_file_parses() {
        let quotes = parse_replay(include_str!("../../fixtures/replay.json")).unwrap();
        assert_eq!(quotes.len(), 3);
        assert!(quotes.iter().all(|q| !q.edits.is_empty()));
    }
}
