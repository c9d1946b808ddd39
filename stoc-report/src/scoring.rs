//! Score card: the weighted "overall score" and the assessment ratio.
//!
//! Inputs are the mean daily return (%), the mean volatility (%), the market
//! capitalisation in billions, and the benchmark's mean daily return (%).
//! Each is multiplied by its weight and the products are summed.

use serde::{Deserialize, Serialize};
use stoc_core::domain::{MarketCapClass, PriceFrame};
use stoc_core::metrics::{last_valid, nan_mean, pct_change, DerivedColumn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    #[serde(rename = "return")]
    pub ret: f64,
    pub volatility: f64,
    pub market_cap: f64,
    pub benchmark: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            ret: 0.3,
            volatility: 0.2,
            market_cap: 0.3,
            benchmark: 0.2,
        }
    }
}

impl ScoreWeights {
    pub fn all_finite(&self) -> bool {
        [self.ret, self.volatility, self.market_cap, self.benchmark]
            .iter()
            .all(|w| w.is_finite())
    }
}

/// One weighted component of the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub score: f64,
    pub weight: f64,
    pub weighted: f64,
}

impl ScoreComponent {
    fn new(score: f64, weight: f64) -> Self {
        Self {
            score,
            weight,
            weighted: score * weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    /// Mean daily return × 100.
    pub ret: ScoreComponent,
    /// Mean rolling volatility × 100.
    pub volatility: ScoreComponent,
    /// Provider market capitalisation / 1e9; 0 when unknown.
    pub market_cap: ScoreComponent,
    /// Benchmark mean daily return × 100; scores 0 when the benchmark is missing.
    pub benchmark: ScoreComponent,
    pub benchmark_available: bool,
    pub overall: f64,
    /// Return % / volatility %; `None` when volatility is zero or undefined.
    pub assessment: Option<f64>,
    /// Last compounded daily growth multiple.
    pub growth_multiple: Option<f64>,
    pub market_cap_usd: f64,
    pub size_class: Option<MarketCapClass>,
    pub mean_vix: Option<f64>,
}

/// Everything the score card is computed from, besides the decorated frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreInputs<'a> {
    pub market_cap: Option<f64>,
    pub benchmark_closes: Option<&'a [f64]>,
    pub vix_closes: Option<&'a [f64]>,
}

impl ScoreCard {
    /// `frame` must already carry the standard derived columns.
    pub fn compute(frame: &PriceFrame, inputs: ScoreInputs<'_>, weights: &ScoreWeights) -> Self {
        let mean_of = |c: DerivedColumn| frame.derived_values(c).map(nan_mean).unwrap_or(f64::NAN);

        let return_pct = mean_of(DerivedColumn::Return) * 100.0;
        let volatility_pct = mean_of(DerivedColumn::Volatility) * 100.0;

        let market_cap_usd = inputs.market_cap.filter(|v| v.is_finite()).unwrap_or(0.0);
        let market_cap_billions = market_cap_usd / 1e9;

        let benchmark_pct = inputs
            .benchmark_closes
            .map(|closes| nan_mean(&pct_change(closes)) * 100.0)
            .filter(|v| !v.is_nan());

        let ret = ScoreComponent::new(return_pct, weights.ret);
        let volatility = ScoreComponent::new(volatility_pct, weights.volatility);
        let market_cap = ScoreComponent::new(market_cap_billions, weights.market_cap);
        let benchmark = ScoreComponent::new(benchmark_pct.unwrap_or(0.0), weights.benchmark);

        let overall = ret.weighted + volatility.weighted + market_cap.weighted + benchmark.weighted;

        let assessment = if volatility_pct.is_nan() || volatility_pct == 0.0 {
            None
        } else {
            Some(return_pct / volatility_pct).filter(|v| v.is_finite())
        };

        let growth_multiple = frame
            .derived_values(DerivedColumn::GrowthRate)
            .and_then(last_valid);

        let size_class = (market_cap_usd > 0.0).then(|| MarketCapClass::classify(market_cap_usd));

        let mean_vix = inputs.vix_closes.map(nan_mean).filter(|v| !v.is_nan());

        Self {
            ret,
            volatility,
            market_cap,
            benchmark,
            benchmark_available: benchmark_pct.is_some(),
            overall,
            assessment,
            growth_multiple,
            market_cap_usd,
            size_class,
            mean_vix,
        }
    }
}
