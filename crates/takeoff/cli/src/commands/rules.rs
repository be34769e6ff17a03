//! List the rules installed from a seed file

use crate::output::{print_json, print_table, OutputFormat};
use tabled::Tabled;
use takeoff_engine::TakeoffService;
use takeoff_types::{GenerationRule, TenantId};

#[derive(Debug, Tabled)]
struct RuleRow {
    rule: String,
    kind: String,
    #[tabled(rename = "ref")]
    item_ref: String,
    expression: String,
}

fn rows(rule: &GenerationRule) -> impl Iterator<Item = RuleRow> + '_ {
    rule.entries().map(move |(kind, item_ref, expression)| RuleRow {
        rule: rule.key.to_string(),
        kind: kind.to_string(),
        item_ref: item_ref.to_string(),
        expression: expression.to_string(),
    })
}

pub async fn execute(
    service: &TakeoffService,
    tenant: &TenantId,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rules = service.list_rules(tenant).await?;
    match format {
        OutputFormat::Json => print_json(&rules)?,
        OutputFormat::Table => print_table(rules.iter().flat_map(rows).collect()),
    }
    Ok(())
}
