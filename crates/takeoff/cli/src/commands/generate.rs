//! Generate a quote from project requirements

use crate::output::{print_json, print_success, print_table, print_warning, OutputFormat};
use clap::Args;
use rust_decimal::Decimal;
use tabled::Tabled;
use takeoff_engine::{GenerationReport, TakeoffService};
use takeoff_types::{
    FinishLevel, GeneratedItem, ProfileId, ProjectRequirements, QuoteId, RoomType, TenantId,
};

/// Generation arguments
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Room type (bathroom, kitchen, flooring)
    #[arg(long)]
    pub room: RoomType,

    /// Finish level (basic, standard, premium)
    #[arg(long)]
    pub finish: FinishLevel,

    /// Floor area in square metres
    #[arg(long)]
    pub area: Decimal,

    /// Project includes plumbing work
    #[arg(long)]
    pub plumbing: bool,

    /// Project includes electrical work
    #[arg(long)]
    pub electrical: bool,

    /// Additional numeric input, `name=value`
    #[arg(long = "extra", value_parser = parse_extra)]
    pub extra: Vec<(String, Decimal)>,

    /// Price profile
    #[arg(long, default_value = "default")]
    pub profile: String,

    /// Quote id (generated when omitted)
    #[arg(long)]
    pub quote: Option<String>,
}

impl GenerateArgs {
    pub fn requirements(&self) -> ProjectRequirements {
        let mut req = ProjectRequirements::new(self.room, self.finish, self.area)
            .with_plumbing(self.plumbing)
            .with_electrical(self.electrical);
        for (name, value) in &self.extra {
            req = req.with_extra(name.clone(), *value);
        }
        req
    }
}

fn parse_extra(s: &str) -> Result<(String, Decimal), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let value = value
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("invalid number '{}': {}", value, e))?;
    Ok((name.trim().to_string(), value))
}

/// Table row for a generated item
#[derive(Debug, Tabled)]
pub struct ItemRow {
    kind: String,
    #[tabled(rename = "ref")]
    item_ref: String,
    description: String,
    qty: String,
    unit: String,
    unit_price: String,
    line_total: String,
    confidence: String,
    tuning: String,
}

impl From<&GeneratedItem> for ItemRow {
    fn from(item: &GeneratedItem) -> Self {
        let tuning = match (item.tuning.applied, item.tuning.factor) {
            (true, Some(f)) => format!("x{} ({}, n={})", f, item.tuning.tier, item.tuning.sample_count),
            (false, Some(f)) => format!("pending x{} (n={})", f, item.tuning.sample_count),
            _ => "-".to_string(),
        };
        Self {
            kind: item.kind.to_string(),
            item_ref: item.item_ref.clone(),
            description: item.description.clone(),
            qty: item.qty.to_string(),
            unit: item.unit.clone(),
            unit_price: item.unit_price.to_string(),
            line_total: item.line_total.to_string(),
            confidence: format!("{:?}", item.confidence).to_lowercase(),
            tuning,
        }
    }
}

/// Print a report as tables and summary lines
pub fn print_report(report: &GenerationReport) {
    print_table(report.items.iter().map(ItemRow::from).collect());

    for failure in &report.failures {
        print_warning(&format!(
            "{} '{}' ({:?}): {}",
            failure.kind, failure.item_ref, failure.stage, failure.message
        ));
    }
    if !report.tuning_available {
        print_warning("tuning store unavailable; quantities are untuned");
    }

    println!("Subtotal: {} {}", report.totals.subtotal, report.currency);
    println!("VAT ({}%): {} {}", report.vat_rate, report.totals.vat, report.currency);
    println!("Total:    {} {}", report.totals.total, report.currency);
}

pub async fn execute(
    service: &TakeoffService,
    tenant: &TenantId,
    args: &GenerateArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let quote_id = args
        .quote
        .as_deref()
        .map(QuoteId::new)
        .unwrap_or_else(QuoteId::generate);

    let report = service
        .generate_for_quote(
            tenant,
            &quote_id,
            &args.requirements(),
            &ProfileId::new(args.profile.as_str()),
        )
        .await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_success(&format!(
                "Quote {} generated from rule '{}'",
                quote_id.short(),
                report.rule_key
            ));
            print_report(&report);
        }
    }
    Ok(())
}
