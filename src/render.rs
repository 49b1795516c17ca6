//! Terminal tables for the dashboard.

use analytics::format::{format_currency, format_currency_whole, format_pct};
use analytics::{ChangeDetection, DashboardReport, Insights, KpiReport, SeriesPoint};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use core_types::MerchantRecord;
use rust_decimal::Decimal;
use valuation::Valuation;

const NOT_APPLICABLE: &str = "N/A";

/// One titled block of terminal output.
struct Section {
    title: String,
    body: String,
}

impl Section {
    fn new(title: impl Into<String>, body: impl ToString) -> Self {
        Self {
            title: title.into(),
            body: body.to_string(),
        }
    }
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

fn signed_pct(value: Decimal) -> String {
    let sign = if value > Decimal::ZERO { "+" } else { "" };
    format!("{}{}%", sign, format_pct(value))
}

fn money_cell(value: Decimal) -> Cell {
    let cell = Cell::new(format_currency(value));
    if value < Decimal::ZERO { cell.fg(Color::Red) } else { cell }
}

pub fn print_report(report: &DashboardReport) {
    println!(
        "\nResiduals dashboard: {} / {} ({} records)",
        report.period_name,
        report.context.agent,
        report.record_count()
    );

    for section in dashboard_sections(report) {
        println!("\n{}\n{}", section.title, section.body);
    }
}

fn dashboard_sections(report: &DashboardReport) -> Vec<Section> {
    vec![
        Section::new("Key figures", kpi_table(&report.kpis)),
        Section::new("Valuation", valuation_text(&report.valuation)),
        Section::new("Top merchants", merchants_text(&report.top_merchants)),
        Section::new("Negative merchants", merchants_text(&report.negative_merchants)),
        Section::new("Significant changes", changes_text(&report.changes)),
        Section::new("Residual trend", series_table("Period", &report.residual_trend)),
        Section::new("Agent distribution", series_table("Agent", &report.agent_distribution)),
        Section::new("Agent performance", agent_table(&report.insights)),
        Section::new("Insights", insights_text(&report.insights)),
        Section::new(
            format!("All merchants ({})", report.record_count()),
            merchants_text(&report.merchants),
        ),
    ]
}

fn kpi_table(kpis: &KpiReport) -> Table {
    let mut table = new_table(&["Metric", "Current", "Previous", "Change"]);
    let current = [
        ("Total residual", format_currency(kpis.total_residual)),
        ("Active merchants", kpis.active_merchants.to_string()),
        ("Avg per merchant", format_currency(kpis.avg_per_merchant)),
        ("Sales volume", format_currency_whole(kpis.total_volume)),
    ];
    let previous: [(String, String); 4] = match &kpis.comparison {
        Some(c) => [
            (format_currency(c.previous_residual), signed_pct(c.residual_change_pct)),
            (c.previous_merchants.to_string(), format!("{:+}", c.merchant_change)),
            (format_currency(c.previous_avg_per_merchant), signed_pct(c.avg_change_pct)),
            (format_currency_whole(c.previous_volume), signed_pct(c.volume_change_pct)),
        ],
        None => std::array::from_fn(|_| (NOT_APPLICABLE.to_string(), NOT_APPLICABLE.to_string())),
    };

    for ((metric, now), (before, change)) in current.into_iter().zip(previous) {
        table.add_row(vec![metric.to_string(), now, before, change]);
    }
    table
}

pub fn print_valuation(valuation: &Valuation) {
    println!("{}", valuation_text(valuation));
}

fn valuation_text(valuation: &Valuation) -> String {
    let breakdown = match valuation {
        Valuation::Estimated(b) => b,
        Valuation::Unavailable(diagnostics) => {
            let mut table = new_table(&["Metric", "Value"]);
            table.add_row(vec!["Active merchants".to_string(), diagnostics.active_merchants.to_string()]);
            table.add_row(vec!["Negative merchants".to_string(), diagnostics.negative_merchants.to_string()]);
            return format!("Select a single period to see a valuation.\n{table}");
        }
    };

    let mut table = new_table(&["Metric", "Value"]);
    table.add_row(vec!["Monthly residual".to_string(), format_currency(breakdown.total_residual)]);
    table.add_row(vec!["Active merchants".to_string(), breakdown.active_merchants.to_string()]);
    table.add_row(vec!["Avg per merchant".to_string(), format_currency(breakdown.avg_per_merchant)]);
    table.add_row(vec!["Base multiple".to_string(), format!("{}x", breakdown.base_multiple)]);
    let attrition = match &breakdown.attrition {
        Some(a) => format!(
            "{}% ({} of {} lost), -{}",
            format_pct(a.attrition_rate_pct),
            a.lost_merchants,
            a.previous_merchants,
            a.penalty
        ),
        None => NOT_APPLICABLE.to_string(),
    };
    table.add_row(vec!["Attrition".to_string(), attrition]);
    table.add_row(vec![
        "Concentration".to_string(),
        format!(
            "top {} hold {}%, -{}",
            breakdown.concentration_count,
            format_pct(breakdown.concentration_pct),
            breakdown.concentration_penalty
        ),
    ]);
    table.add_row(vec!["Adjusted multiple".to_string(), format!("{}x", breakdown.adjusted_multiple)]);
    table.add_row(vec![
        "Growth rate".to_string(),
        breakdown.growth_rate_pct.map_or_else(|| NOT_APPLICABLE.to_string(), signed_pct),
    ]);
    table.add_row(vec![
        format!("Conservative ({}x)", breakdown.conservative_multiple),
        format_currency_whole(breakdown.conservative_value),
    ]);
    table.add_row(vec![
        format!("Market ({}x)", breakdown.adjusted_multiple),
        format_currency_whole(breakdown.market_value),
    ]);
    table.add_row(vec![
        format!("Premium ({}x)", breakdown.premium_multiple),
        format_currency_whole(breakdown.premium_value),
    ]);
    table.to_string()
}

fn merchants_text(records: &[MerchantRecord]) -> String {
    if records.is_empty() {
        return "None.".to_string();
    }

    let mut table = new_table(&["Merchant", "MID", "Agent", "Volume", "Net Residual"]);
    for r in records {
        table.add_row(vec![
            Cell::new(r.display_name()),
            Cell::new(&r.merchant_id),
            Cell::new(&r.agent),
            Cell::new(format_currency_whole(r.sales_volume)),
            money_cell(r.net_residual),
        ]);
    }
    table.to_string()
}

fn series_table(label: &str, points: &[SeriesPoint]) -> Table {
    let mut table = new_table(&[label, "Net Residual"]);
    for point in points {
        table.add_row(vec![Cell::new(&point.label), money_cell(point.value)]);
    }
    table
}

fn changes_text(changes: &ChangeDetection) -> String {
    let changes = match changes {
        ChangeDetection::Unavailable => return "No previous period to compare against.".to_string(),
        ChangeDetection::Detected(changes) if changes.is_empty() => {
            return "No significant changes.".to_string();
        }
        ChangeDetection::Detected(changes) => changes,
    };

    let mut table = new_table(&["Merchant", "MID", "Agent", "Previous", "Current", "Change"]);
    for c in changes {
        let pct = Cell::new(signed_pct(c.percent_change));
        table.add_row(vec![
            Cell::new(c.merchant_name.as_deref().unwrap_or("Unknown")),
            Cell::new(&c.merchant_id),
            Cell::new(&c.agent),
            money_cell(c.previous_residual),
            money_cell(c.current_residual),
            if c.percent_change < Decimal::ZERO { pct.fg(Color::Red) } else { pct.fg(Color::Green) },
        ]);
    }
    table.to_string()
}

fn agent_table(insights: &Insights) -> Table {
    let mut agents = new_table(&["Agent", "Merchants", "Total", "Avg", "Rating"]);
    for a in &insights.agent_performance {
        agents.add_row(vec![
            Cell::new(&a.agent),
            Cell::new(a.merchants),
            money_cell(a.total_residual),
            money_cell(a.avg_per_merchant),
            Cell::new("*".repeat(usize::from(a.rating))),
        ]);
    }
    agents
}

fn insights_text(insights: &Insights) -> String {
    let mut lines = vec![
        format!("- Growth: {}", insights.growth.narrative()),
        format!("- Risk: {}", insights.risk.narrative()),
        format!("- Opportunity: {}", insights.opportunity.narrative()),
        String::new(),
        "Recommendations".to_string(),
    ];
    lines.extend(
        insights
            .recommendations
            .iter()
            .map(|rec| format!("- {}: {}", rec.title, rec.text)),
    );
    lines.join("\n")
}

pub fn print_agents(agents: &[String]) {
    let mut table = new_table(&["Agent"]);
    for agent in agents {
        table.add_row(vec![agent.as_str()]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::AnalyticsEngine;
    use configuration::Config;
    use core_types::{FilterContext, PeriodDataset, PeriodId, Portfolio};

    fn report() -> DashboardReport {
        let october = vec![MerchantRecord::new("A", "Ava").with_residual(Decimal::from(80))];
        let november = vec![
            MerchantRecord::new("A", "Ava").with_name("Harbor Coffee").with_residual(Decimal::from(100)),
            MerchantRecord::new("B", "Ben").with_name("Pine Street Books").with_residual(Decimal::from(-50)),
        ];
        let portfolio = Portfolio::new(vec![
            PeriodDataset::new("October", october),
            PeriodDataset::new("November", november),
        ])
        .unwrap();

        AnalyticsEngine::from_config(&Config::default())
            .unwrap()
            .calculate(&portfolio, &FilterContext::period(PeriodId::named("November")))
            .unwrap()
    }

    #[test]
    fn dashboard_renders_every_report_section() {
        let sections = dashboard_sections(&report());
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();

        assert!(titles.contains(&"Agent distribution"));
        assert!(titles.contains(&"All merchants (2)"));

        let distribution = &sections.iter().find(|s| s.title == "Agent distribution").unwrap().body;
        assert!(distribution.contains("Ava"));
        assert!(distribution.contains("Ben"));

        let master = &sections.iter().find(|s| s.title.starts_with("All merchants")).unwrap().body;
        assert!(master.contains("Harbor Coffee"));
        assert!(master.contains("Pine Street Books"));
    }

    #[test]
    fn earliest_period_kpis_show_not_applicable() {
        let kpis = KpiReport {
            total_residual: Decimal::from(80),
            active_merchants: 1,
            avg_per_merchant: Decimal::from(80),
            total_volume: Decimal::ZERO,
            comparison: None,
        };
        assert!(kpi_table(&kpis).to_string().contains(NOT_APPLICABLE));
    }
}
