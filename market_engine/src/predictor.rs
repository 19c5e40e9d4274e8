//! Prediction orchestrator.
//!
//! `Predictor::predict` simulates a plain history sized by the request's
//! timeframe, runs the requested forecaster over its closes and wraps each
//! step into a [`PricePrediction`] with a ±5% band and decaying confidence.
//!
//! Forecast dates advance one calendar day per step and do not skip weekends,
//! unlike the simulated history.
//!
//! [`Predictor::spawn`] is the latency-bearing variant: it runs the same work
//! on a worker thread after the configured delay and hands the result back on
//! a channel. Dropping the receiver discards the result; nothing else is
//! touched.

use std::thread;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use crossbeam_channel::{Receiver, bounded};
use log::{debug, info};
use market_common::config::PREDICTION_LATENCY;
use market_common::quote::round2;
use market_common::{ModelKind, PredictionRequest, PredictionResult, PricePrediction, Quote, Trend};
use rand::Rng;

use crate::forecast;
use crate::simulator::{HistorySimulator, closes};

/// Half-width of the price band around each forecast.
pub const BAND: f64 = 0.05;
/// Confidence lost per forecast step.
pub const CONFIDENCE_DECAY: f64 = 0.02;
/// Lowest reported confidence.
pub const CONFIDENCE_FLOOR: f64 = 0.5;

/// Runs simulations and forecasters for prediction requests.
#[derive(Debug, Clone, Copy)]
pub struct Predictor {
    simulator: HistorySimulator,
    latency: Duration,
}

impl Default for Predictor {
    fn default() -> Self {
        Predictor::new(HistorySimulator::plain(), PREDICTION_LATENCY)
    }
}

impl Predictor {
    /// Predictor simulating with `simulator` and answering after `latency`.
    pub fn new(simulator: HistorySimulator, latency: Duration) -> Self {
        Predictor { simulator, latency }
    }

    /// Forecast `quote` as of `today` using randomness from `rng`.
    pub fn predict<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        quote: &Quote,
        request: PredictionRequest,
        today: NaiveDate,
    ) -> PredictionResult {
        let timeframe = request.timeframe;
        let history = self
            .simulator
            .generate(rng, quote, timeframe.history_days(), today);
        let forecasts = forecast::forecast(
            request.model,
            &closes(&history),
            timeframe.horizon(),
            rng,
        );
        debug!(
            "{}: {} bars in, {} forecasts out ({} / {})",
            quote.symbol,
            history.len(),
            forecasts.len(),
            timeframe,
            request.model
        );
        build_result(quote, request.model, &forecasts, today)
    }

    /// Run [`Self::predict`] on a worker thread after the simulated latency.
    ///
    /// The receiver yields exactly one result. Callers that lose interest
    /// simply drop it.
    pub fn spawn(&self, quote: Quote, request: PredictionRequest) -> Receiver<PredictionResult> {
        info!(
            "Prediction requested for {} ({} / {})",
            quote.symbol, request.timeframe, request.model
        );
        let (tx, rx) = bounded(1);
        let predictor = *self;
        thread::spawn(move || {
            thread::sleep(predictor.latency);
            let today = Local::now().date_naive();
            let result = predictor.predict(&mut rand::rng(), &quote, request, today);
            if tx.send(result).is_err() {
                debug!("Prediction for {} discarded by caller", quote.symbol);
            }
        });
        rx
    }
}

/// Wrap raw `forecasts` into a result for `quote`.
///
/// Step `i` is dated `today + i + 1`, banded at ±5% and carries
/// `max(0.5, base - 0.02 * i)` confidence. The trend compares the last
/// forecast with the quote's live price.
pub fn build_result(
    quote: &Quote,
    model: ModelKind,
    forecasts: &[f64],
    today: NaiveDate,
) -> PredictionResult {
    let base = model.base_confidence();
    let predictions = forecasts
        .iter()
        .enumerate()
        .filter_map(|(i, &price)| {
            let date = today.checked_add_days(Days::new(i as u64 + 1))?;
            let range = price * BAND;
            Some(PricePrediction {
                date,
                price,
                high: round2(price + range),
                low: round2(price - range),
                confidence: (base - i as f64 * CONFIDENCE_DECAY).max(CONFIDENCE_FLOOR),
            })
        })
        .collect();

    let trend = forecasts
        .last()
        .map_or(Trend::Neutral, |&last| Trend::classify(quote.price, last));

    PredictionResult {
        symbol: quote.symbol.clone(),
        current_price: quote.price,
        predictions,
        confidence: base,
        accuracy: model.accuracy(),
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_common::Timeframe;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn quote(price: f64) -> Quote {
        Quote {
            symbol: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            price,
            change: 0.0,
            change_percent: 0.0,
            volume: 45_234_567,
            market_cap: 2.9e12,
            high: price,
            low: price,
            open: price,
            previous_close: price,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn one_week_ema_has_seven_decaying_steps() {
        let mut rng = StdRng::seed_from_u64(17);
        let request = PredictionRequest::new(Timeframe::OneWeek, ModelKind::Ema);
        let result = Predictor::default().predict(&mut rng, &quote(182.52), request, today());

        assert_eq!(result.predictions.len(), 7);
        assert_eq!(result.confidence, 0.75);
        assert_eq!(result.accuracy, 0.74);
        for pair in result.predictions.windows(2) {
            assert!(pair[1].confidence <= pair[0].confidence);
        }
        assert!(result.predictions[6].confidence >= 0.5);
    }

    #[test]
    fn horizon_follows_timeframe() {
        for (timeframe, horizon) in [
            (Timeframe::OneDay, 1),
            (Timeframe::OneMonth, 30),
            (Timeframe::SixMonths, 180),
        ] {
            let mut rng = StdRng::seed_from_u64(2);
            let request = PredictionRequest::new(timeframe, ModelKind::Lstm);
            let result = Predictor::default().predict(&mut rng, &quote(100.0), request, today());
            assert_eq!(result.predictions.len(), horizon);
        }
    }

    #[test]
    fn forecast_dates_are_consecutive_calendar_days() {
        // 2024-03-15 is a Friday: the next two steps land on the weekend.
        let result = build_result(&quote(100.0), ModelKind::Sma, &[100.0, 101.0, 102.0], today());
        let dates: Vec<String> = result.predictions.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, ["2024-03-16", "2024-03-17", "2024-03-18"]);
    }

    #[test]
    fn confidence_floors_at_half() {
        let forecasts = vec![100.0; 20];
        let result = build_result(&quote(100.0), ModelKind::Linear, &forecasts, today());
        assert_eq!(result.predictions[0].confidence, 0.65);
        assert!(result.predictions.iter().all(|p| p.confidence >= CONFIDENCE_FLOOR));
        assert_eq!(result.predictions[19].confidence, CONFIDENCE_FLOOR);
    }

    #[test]
    fn band_is_five_percent_rounded() {
        let result = build_result(&quote(100.0), ModelKind::Sma, &[120.0], today());
        let step = &result.predictions[0];
        assert_eq!(step.high, 126.0);
        assert_eq!(step.low, 114.0);
        assert_eq!(round2(step.high), step.high);
    }

    #[test]
    fn trend_uses_live_price_and_last_forecast() {
        let q = quote(100.0);
        assert_eq!(build_result(&q, ModelKind::Sma, &[90.0, 105.0], today()).trend, Trend::Bullish);
        assert_eq!(build_result(&q, ModelKind::Sma, &[110.0, 95.0], today()).trend, Trend::Bearish);
        assert_eq!(build_result(&q, ModelKind::Sma, &[100.5], today()).trend, Trend::Neutral);
        assert_eq!(build_result(&q, ModelKind::Sma, &[99.5], today()).trend, Trend::Neutral);
        assert_eq!(build_result(&q, ModelKind::Sma, &[], today()).trend, Trend::Neutral);
    }

    #[test]
    fn monetary_fields_have_two_decimals() {
        let mut rng = StdRng::seed_from_u64(99);
        let request = PredictionRequest::new(Timeframe::OneMonth, ModelKind::Linear);
        let result = Predictor::default().predict(&mut rng, &quote(3542.75), request, today());
        for p in &result.predictions {
            for value in [p.price, p.high, p.low] {
                assert_eq!(round2(value), value);
            }
        }
    }

    #[test]
    fn spawned_prediction_is_delivered() {
        let predictor = Predictor::new(HistorySimulator::plain(), Duration::ZERO);
        let request = PredictionRequest::new(Timeframe::OneDay, ModelKind::Sma);
        let rx = predictor.spawn(quote(50.0), request);
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result.symbol, "AAPL");
        assert_eq!(result.predictions.len(), 1);
    }

    #[test]
    fn dropped_receiver_does_not_block_later_requests() {
        let predictor = Predictor::new(HistorySimulator::plain(), Duration::from_millis(10));
        let superseded = PredictionRequest::new(Timeframe::OneWeek, ModelKind::Linear);
        drop(predictor.spawn(quote(50.0), superseded));
        thread::sleep(Duration::from_millis(50));

        let current = PredictionRequest::new(Timeframe::OneMonth, ModelKind::Ema);
        let result = predictor
            .spawn(quote(75.0), current)
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert_eq!(result.current_price, 75.0);
        assert_eq!(result.predictions.len(), 30);
        assert_eq!(result.confidence, ModelKind::Ema.base_confidence());
    }
}
