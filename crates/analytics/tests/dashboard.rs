//! End-to-end dashboard calculations over small in-memory portfolios.

use analytics::{AnalyticsEngine, ChangeDetection, GrowthInsight};
use configuration::Config;
use core_types::{AgentFilter, FilterContext, MerchantRecord, PeriodDataset, PeriodId, Portfolio};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use valuation::Valuation;

fn engine() -> AnalyticsEngine {
    AnalyticsEngine::from_config(&Config::default()).expect("default config is valid")
}

fn scenario_portfolio() -> Portfolio {
    let october = vec![MerchantRecord::new("A", "X").with_residual(dec!(80))];
    let november = vec![
        MerchantRecord::new("A", "X").with_residual(dec!(100)).with_volume(dec!(1000)),
        MerchantRecord::new("B", "X").with_residual(dec!(-50)).with_volume(dec!(500)),
    ];
    Portfolio::new(vec![
        PeriodDataset::new("October", october),
        PeriodDataset::new("November", november),
    ])
    .unwrap()
}

#[test]
fn new_merchant_scenario() {
    let report = engine()
        .calculate(&scenario_portfolio(), &FilterContext::period(PeriodId::named("November")))
        .unwrap();

    assert_eq!(report.kpis.total_residual, dec!(50));
    assert_eq!(report.kpis.active_merchants, 2);
    assert_eq!(report.kpis.avg_per_merchant, dec!(25));
    assert_eq!(report.kpis.total_volume, dec!(1500));

    let comparison = report.kpis.comparison.as_ref().expect("November has a predecessor");
    assert_eq!(comparison.previous_merchants, 1);
    assert_eq!(comparison.merchant_change, 1);

    // A moved 25%, below the reporting threshold; B has no baseline.
    assert_eq!(report.changes, ChangeDetection::Detected(vec![]));

    assert_eq!(report.negative_merchants.len(), 1);
    assert_eq!(report.negative_merchants[0].merchant_id, "B");
    assert_eq!(report.top_merchants[0].merchant_id, "A");
    assert_eq!(report.record_count(), 2);
}

#[test]
fn earliest_period_reports_not_applicable_states() {
    let report = engine()
        .calculate(&scenario_portfolio(), &FilterContext::period(PeriodId::named("october")))
        .unwrap();

    assert!(report.kpis.comparison.is_none());
    assert_eq!(report.changes, ChangeDetection::Unavailable);
    assert_eq!(report.insights.growth, GrowthInsight::NoData);

    let breakdown = report.valuation.breakdown().expect("single period is valued");
    assert!(breakdown.attrition.is_none());
    assert_eq!(breakdown.market_value, dec!(80) * Decimal::from(breakdown.adjusted_multiple));
}

#[test]
fn total_view_concatenates_and_skips_valuation() {
    let report = engine()
        .calculate(&scenario_portfolio(), &FilterContext::period(PeriodId::Total))
        .unwrap();

    assert_eq!(report.period_name, "Total");
    assert_eq!(report.record_count(), 3);
    assert_eq!(report.kpis.total_residual, dec!(130));
    // Merchant A appears in both months but is one distinct id.
    assert_eq!(report.kpis.active_merchants, 2);
    assert!(report.kpis.comparison.is_none());
    assert_eq!(report.changes, ChangeDetection::Unavailable);

    match report.valuation {
        Valuation::Unavailable(diagnostics) => {
            assert_eq!(diagnostics.active_merchants, 2);
            assert_eq!(diagnostics.negative_merchants, 1);
        }
        Valuation::Estimated(_) => panic!("Total view must not be valued"),
    }
}

#[test]
fn agent_filter_applies_to_both_periods() {
    let october = vec![
        MerchantRecord::new("A", "Ava").with_residual(dec!(100)),
        MerchantRecord::new("B", "Ben").with_residual(dec!(100)),
        MerchantRecord::new("C", "Ben").with_residual(dec!(100)),
    ];
    let november = vec![
        MerchantRecord::new("A", "Ava").with_residual(dec!(200)),
        MerchantRecord::new("B", "Ben").with_residual(dec!(40)),
    ];
    let portfolio = Portfolio::new(vec![
        PeriodDataset::new("October", october),
        PeriodDataset::new("November", november),
    ])
    .unwrap();

    let ctx = FilterContext::new(PeriodId::named("November"), AgentFilter::Agent("Ben".to_string()));
    let report = engine().calculate(&portfolio, &ctx).unwrap();

    assert_eq!(report.kpis.total_residual, dec!(40));
    let comparison = report.kpis.comparison.as_ref().unwrap();
    assert_eq!(comparison.previous_residual, dec!(200));
    assert_eq!(comparison.merchant_change, -1);

    let changes = report.changes.changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].merchant_id, "B");
    assert_eq!(changes[0].percent_change, dec!(-60));

    // Ben lost C: 1 of 2 merchants, a 50% attrition rate.
    let attrition = report.valuation.breakdown().unwrap().attrition.clone().unwrap();
    assert_eq!(attrition.lost_merchants, 1);
    assert_eq!(attrition.attrition_rate_pct, dec!(50));
    assert_eq!(attrition.penalty, 5);

    assert_eq!(report.residual_trend.len(), 2);
    assert_eq!(report.residual_trend[0].value, dec!(200));
    assert_eq!(report.residual_trend[1].value, dec!(40));
    assert_eq!(report.insights.growth, GrowthInsight::Declining(dec!(-80)));
}

#[test]
fn unknown_period_is_an_error() {
    let result = engine().calculate(&scenario_portfolio(), &FilterContext::period(PeriodId::named("March")));
    assert!(result.is_err());
}

#[test]
fn report_serializes_to_json() {
    let report = engine()
        .calculate(&scenario_portfolio(), &FilterContext::period(PeriodId::named("November")))
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("kpis").is_some());
    assert!(json.get("valuation").is_some());
    assert!(json["insights"]["recommendations"].is_array());
}
