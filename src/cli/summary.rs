use super::ui;
use crate::core::config::HoldingConfig;
use crate::core::valuation::{self, Allocation, Portfolio};
use crate::core::{QuoteProvider, RateProvider, ValuationError};
use anyhow::Result;
use chrono::NaiveDateTime;
use comfy_table::Cell;
use tracing::{debug, info};

/// `14:05 on Friday, 16-10-2026`
pub const TIMESTAMP_FORMAT: &str = "%H:%M on %A, %d-%m-%Y";

/// Rendered valuation: the holdings table and the closing summary line.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub table: String,
    pub summary: String,
}

pub fn render_table(allocations: &[Allocation<'_>]) -> String {
    let mut table = ui::new_styled_table();

    table.set_header(vec![
        ui::header_cell("Coin"),
        ui::header_cell("Holding"),
        ui::header_cell("Price"),
        ui::header_cell("Market Value"),
        ui::header_cell("% Allocation"),
    ]);

    for allocation in allocations {
        let holding = allocation.holding;
        table.add_row(vec![
            Cell::new(&holding.asset.identifier),
            ui::number_cell(holding.quantity),
            ui::number_cell(holding.asset.target_price),
            ui::number_cell(allocation.market_value),
            ui::format_percentage_cell(allocation.percent),
        ]);
    }

    table.to_string()
}

pub fn render_summary(total_value: f64, currency: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "The total value of your portfolio at {} is {} {}.",
        timestamp.format(TIMESTAMP_FORMAT),
        currency,
        ui::format_amount(total_value)
    )
}

/// The one currency every holding is valued in, `None` for an empty
/// portfolio.
pub fn report_currency(portfolio: &Portfolio) -> Result<Option<&str>, ValuationError> {
    let mut currencies: Vec<&str> = Vec::new();
    for holding in &portfolio.holdings {
        let currency = holding.asset.currency.as_str();
        if !currencies.contains(&currency) {
            currencies.push(currency);
        }
    }

    match currencies.as_slice() {
        [] => Ok(None),
        [currency] => Ok(Some(*currency)),
        _ => Err(ValuationError::MixedCurrency(
            currencies.iter().map(|c| c.to_string()).collect(),
        )),
    }
}

/// Renders the table and summary. An empty portfolio is reported in
/// `fallback_currency`.
pub fn render_report(
    portfolio: &Portfolio,
    fallback_currency: &str,
    timestamp: NaiveDateTime,
) -> Result<Report, ValuationError> {
    let currency = report_currency(portfolio)?.unwrap_or(fallback_currency);
    let allocations = valuation::allocations(portfolio);
    let total = valuation::total_value(portfolio);

    Ok(Report {
        table: render_table(&allocations),
        summary: render_summary(total, currency, timestamp),
    })
}

/// Values the holdings one at a time and prints the report. Nothing is
/// printed unless every holding was priced.
pub async fn run(
    holdings: &[HoldingConfig],
    quote_provider: &(dyn QuoteProvider + Send + Sync),
    rate_provider: &(dyn RateProvider + Send + Sync),
    target_currency: &str,
) -> Result<()> {
    let pb = ui::new_progress_bar(holdings.len() as u64, true);
    pb.set_message("Fetching prices...");

    let result = valuation::value_holdings(
        holdings,
        target_currency,
        quote_provider,
        rate_provider,
        &|| pb.inc(1),
    )
    .await;
    pb.finish_and_clear();
    let portfolio = result?;
    debug!("Valued {} holdings", portfolio.holdings.len());

    let timestamp = chrono::Local::now().naive_local();
    let report = render_report(&portfolio, &target_currency.to_uppercase(), timestamp)?;
    info!("Rendered portfolio report");

    if portfolio.is_empty() {
        println!("{}", ui::style_text("No holdings to value.", ui::StyleType::Subtle));
    }
    println!("{}", report.table);
    println!(
        "\n{}",
        ui::style_text(&report.summary, ui::StyleType::TotalValue)
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Asset;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 8)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
    }

    fn asset(identifier: &str, currency: &str, target_price: f64) -> Arc<Asset> {
        Arc::new(Asset {
            identifier: identifier.to_string(),
            currency: currency.to_string(),
            usd_price: target_price,
            target_price,
        })
    }

    fn scenario_portfolio() -> Portfolio {
        valuation::build_portfolio(vec![
            (asset("ETH", "GBP", 2400.0), 2.0),
            (asset("BTC", "GBP", 40000.0), 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_render_summary() {
        assert_eq!(
            render_summary(44800.0, "GBP", timestamp()),
            "The total value of your portfolio at 09:05 on Friday, 08-03-2024 is GBP 44,800.00."
        );
        assert_eq!(
            render_summary(0.0, "EUR", timestamp()),
            "The total value of your portfolio at 09:05 on Friday, 08-03-2024 is EUR 0.00."
        );
    }

    #[test]
    fn test_render_table_orders_and_formats_rows() {
        let portfolio = scenario_portfolio();
        let table = render_table(&valuation::allocations(&portfolio));

        for header in ["Coin", "Holding", "Price", "Market Value", "% Allocation"] {
            assert!(table.contains(header), "missing header {header}");
        }
        assert!(table.contains("40000.00"));
        assert!(table.contains("4800.00"));
        assert!(table.contains("89.29%"));
        assert!(table.contains("10.71%"));

        let btc = table.find("BTC").unwrap();
        let eth = table.find("ETH").unwrap();
        assert!(btc < eth, "largest position should come first");
    }

    #[test]
    fn test_render_report() {
        let report = render_report(&scenario_portfolio(), "USD", timestamp()).unwrap();
        assert!(report.table.contains("BTC"));
        assert_eq!(
            report.summary,
            "The total value of your portfolio at 09:05 on Friday, 08-03-2024 is GBP 44,800.00."
        );
    }

    #[test]
    fn test_render_report_for_empty_portfolio_uses_fallback_currency() {
        let report = render_report(&Portfolio::default(), "GBP", timestamp()).unwrap();
        assert!(report.table.contains("Coin"));
        assert!(!report.table.contains("0.00%"));
        assert!(report.summary.ends_with("is GBP 0.00."));
    }

    #[test]
    fn test_mixed_currencies_are_rejected() {
        let portfolio = valuation::build_portfolio(vec![
            (asset("BTC", "GBP", 40000.0), 1.0),
            (asset("ETH", "EUR", 2800.0), 1.0),
            (asset("XRP", "GBP", 0.5), 1.0),
        ])
        .unwrap();

        assert_eq!(
            report_currency(&portfolio),
            Err(ValuationError::MixedCurrency(vec![
                "GBP".to_string(),
                "EUR".to_string()
            ]))
        );
        assert!(render_report(&portfolio, "GBP", timestamp()).is_err());
    }

    struct FixedQuotes;

    #[async_trait]
    impl QuoteProvider for FixedQuotes {
        async fn get_price(&self, asset: &str) -> Result<f64, ValuationError> {
            match asset {
                "bitcoin" => Ok(50000.0),
                "ethereum" => Ok(3000.0),
                _ => Err(ValuationError::price_unavailable(asset, "unknown asset")),
            }
        }
    }

    struct FixedRate;

    #[async_trait]
    impl RateProvider for FixedRate {
        async fn get_rate(&self, _currency: &str) -> Result<f64, ValuationError> {
            Ok(0.8)
        }
    }

    #[tokio::test]
    async fn test_summary_command() {
        let holdings: Vec<HoldingConfig> =
            vec!["bitcoin:1".parse().unwrap(), "ethereum:2".parse().unwrap()];
        let result = run(&holdings, &FixedQuotes, &FixedRate, "GBP").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_summary_command_fails_on_missing_price() {
        let holdings: Vec<HoldingConfig> = vec![
            "bitcoin:1".parse().unwrap(),
            "dogecoin:10".parse().unwrap(),
            "ethereum:2".parse().unwrap(),
        ];
        let err = run(&holdings, &FixedQuotes, &FixedRate, "GBP")
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValuationError>(),
            Some(&ValuationError::price_unavailable(
                "dogecoin",
                "unknown asset"
            ))
        );
    }
}
