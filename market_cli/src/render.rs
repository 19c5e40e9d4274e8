//! Text rendering of quotes, histories and predictions.
use market_common::prediction::ModelInfo;
use market_common::quote::{
    PeriodStats, format_change, format_market_cap, format_price, format_volume, percent_change,
};
use market_common::{HistoricalBar, ModelKind, PredictionResult, PricePrediction, Quote};

/// One-line quote summary; watched symbols get a star.
pub fn quote_line(quote: &Quote, watched: bool) -> String {
    format!(
        "{} {:<14} {:<36} {:>12} {:>11} ({:+.2}%)",
        if watched { "*" } else { " " },
        quote.symbol,
        quote.name,
        format_price(quote.price, &quote.symbol),
        format_change(quote.change, &quote.symbol),
        quote.change_percent
    )
}

pub fn quote_detail(quote: &Quote) -> Vec<String> {
    let s = &quote.symbol;
    vec![
        format!("{} ({}) [{:?}]", quote.name, s, quote.currency()),
        format!(
            "Price      {}  {} ({:+.2}%)",
            format_price(quote.price, s),
            format_change(quote.change, s),
            quote.change_percent
        ),
        format!(
            "Open       {}   Prev close {}",
            format_price(quote.open, s),
            format_price(quote.previous_close, s)
        ),
        format!(
            "Day range  {} - {}",
            format_price(quote.low, s),
            format_price(quote.high, s)
        ),
        format!("Volume     {}", format_volume(quote.volume)),
        format!("Market cap {}", format_market_cap(quote.market_cap, s)),
    ]
}

pub fn bar_line(bar: &HistoricalBar, symbol: &str) -> String {
    format!(
        "{}  O {:>11}  H {:>11}  L {:>11}  C {:>11}  V {:>7}",
        bar.date,
        format_price(bar.open, symbol),
        format_price(bar.high, symbol),
        format_price(bar.low, symbol),
        format_price(bar.close, symbol),
        format_volume(bar.volume)
    )
}

pub fn stats_line(stats: &PeriodStats, symbol: &str) -> String {
    format!(
        "Period low {}  high {}  range {:.2}%",
        format_price(stats.min_close, symbol),
        format_price(stats.max_close, symbol),
        stats.range_percent
    )
}

pub fn prediction_header(result: &PredictionResult, model: ModelKind) -> String {
    format!(
        "{} via {}: now {}, trend {}, confidence {:.0}%, model accuracy {:.0}%",
        result.symbol,
        model.info().name,
        format_price(result.current_price, &result.symbol),
        result.trend,
        result.confidence * 100.0,
        result.accuracy * 100.0
    )
}

/// Forecast row with its change against the live price.
pub fn prediction_line(step: &PricePrediction, current_price: f64, symbol: &str) -> String {
    format!(
        "{}  {:>11} ({:+6.2}%)  {:>11} - {:<11}  {:.0}%",
        step.date,
        format_price(step.price, symbol),
        percent_change(current_price, step.price),
        format_price(step.low, symbol),
        format_price(step.high, symbol),
        step.confidence * 100.0
    )
}

pub fn model_line(kind: ModelKind) -> String {
    let ModelInfo {
        name,
        description,
        accuracy,
        best_for,
    } = kind.info();
    format!(
        "{:<7} {:<27} {:>3.0}%  {} (best for: {})",
        kind.to_string(),
        name,
        accuracy * 100.0,
        description,
        best_for
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn prediction_line_shows_change_vs_current() {
        let step = PricePrediction {
            date: NaiveDate::from_ymd_opt(2024, 3, 16).unwrap(),
            price: 110.0,
            high: 115.5,
            low: 104.5,
            confidence: 0.7,
        };
        let line = prediction_line(&step, 100.0, "TCS.NS");
        assert!(line.starts_with("2024-03-16"));
        assert!(line.contains("₹110.00"));
        assert!(line.contains("+10.00%"));
        assert!(line.ends_with("70%"));
    }

    #[test]
    fn watched_quotes_are_starred() {
        let quote = market_common::universe::default_universe()
            .find("AAPL")
            .unwrap();
        assert!(quote_line(quote, true).starts_with('*'));
        assert!(quote_line(quote, false).starts_with(' '));
        assert!(quote_line(quote, false).contains('$'));
    }

    #[test]
    fn model_lines_name_every_model() {
        let line = model_line(ModelKind::Lstm);
        assert!(line.starts_with("lstm"));
        assert!(line.contains("Pattern Recognition"));
        assert!(line.contains("78%"));
    }
}
