//! The nine numbered calculation steps shown beside a score card.
//!
//! Each step is a formula line followed by the value it produced, in the order
//! the score is assembled.

use std::fmt;

use serde::Serialize;

use stoc_core::metrics::{DerivedColumn, MetricsConfig};

use crate::scoring::{ScoreCard, ScoreComponent};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub number: usize,
    pub title: &'static str,
    pub formula: String,
    pub value: String,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}. {}:", self.number, self.title)?;
        if !self.formula.is_empty() {
            writeln!(f, "   {}", self.formula)?;
        }
        write!(f, "   {}", self.value)
    }
}

/// Render a number for display; NaN becomes `n/a`.
pub fn fmt_num(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{value:.decimals$}")
    }
}

fn components(card: &ScoreCard, pick: impl Fn(&ScoreComponent) -> f64, units: [&str; 4]) -> String {
    let parts = [
        ("Return", &card.ret),
        ("Volatility", &card.volatility),
        ("Market Capitalization", &card.market_cap),
        ("National Average Return", &card.benchmark),
    ];
    let body = parts
        .iter()
        .zip(units)
        .map(|((name, c), unit)| format!("{name}: {}{unit}", fmt_num(pick(c), 4)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{body}}}")
}

/// Steps for `card`. `metrics` is the configuration the frame was decorated with.
pub fn explain(card: &ScoreCard, metrics: &MetricsConfig) -> Vec<Step> {
    let benchmark_value = if card.benchmark_available {
        format!("National Average Return = {}%", fmt_num(card.benchmark.score, 4))
    } else {
        "National Average Return = unavailable (scored as 0)".to_string()
    };

    let growth = card
        .growth_multiple
        .map(|g| format!("{}x", fmt_num(g, 4)))
        .unwrap_or_else(|| "n/a".to_string());

    vec![
        Step {
            number: 1,
            title: "Calculate daily returns",
            formula: "Return = (Close - Close_prev) / Close_prev".into(),
            value: format!("Return = {}%", fmt_num(card.ret.score, 4)),
        },
        Step {
            number: 2,
            title: "Calculate volatility",
            formula: format!("Volatility = {}", DerivedColumn::Volatility.formula(metrics)),
            value: format!("Volatility = {}%", fmt_num(card.volatility.score, 4)),
        },
        Step {
            number: 3,
            title: "Calculate market capitalization",
            formula: "Market Capitalization = (High + Low) / 2 * Volume".into(),
            value: format!(
                "Market Capitalization = {} billion",
                fmt_num(card.market_cap.score, 4)
            ),
        },
        Step {
            number: 4,
            title: "Calculate compounded daily growth rate",
            formula: "Compounded Daily Growth Rate = (1 + Return)^cumprod".into(),
            value: format!("Compounded Daily Growth Rate = {growth}"),
        },
        Step {
            number: 5,
            title: "Calculate national average return",
            formula: String::new(),
            value: benchmark_value,
        },
        Step {
            number: 6,
            title: "Calculate weights for scoring",
            formula: String::new(),
            value: format!("Weights = {}", components(card, |c| c.weight, ["", "", "", ""])),
        },
        Step {
            number: 7,
            title: "Calculate scores",
            formula: String::new(),
            value: format!(
                "Scores = {}",
                components(card, |c| c.score, ["%", "%", " billion", "%"])
            ),
        },
        Step {
            number: 8,
            title: "Calculate weighted scores",
            formula: String::new(),
            value: format!(
                "Weighted Scores = {}",
                components(card, |c| c.weighted, ["", "", "", ""])
            ),
        },
        Step {
            number: 9,
            title: "Calculate overall score",
            formula: String::new(),
            value: format!("Overall Score = {}", fmt_num(card.overall, 4)),
        },
    ]
}

/// Steps joined into one block of text, preceded by a heading.
pub fn render_steps(steps: &[Step]) -> String {
    let mut out = String::from("Calculating scores:\n");
    for step in steps {
        out.push_str(&step.to_string());
        out.push('\n');
    }
    out
}

/// The closing "assessment" lines printed after the charts.
pub fn summary_lines(card: &ScoreCard) -> Vec<String> {
    vec![
        format!(
            "Assessment Score: {}",
            card.assessment.map(|a| fmt_num(a, 2)).unwrap_or_else(|| "n/a".into())
        ),
        format!("Return: {}%", fmt_num(card.ret.score, 2)),
        format!("Volatility: {}%", fmt_num(card.volatility.score, 2)),
        format!("Market Capitalization: {} billion", fmt_num(card.market_cap.score, 2)),
        format!("National Average Return: {}%", fmt_num(card.benchmark.score, 2)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{ScoreInputs, ScoreWeights};
    use crate::test_bars;
    use stoc_core::domain::PriceFrame;
    use stoc_core::metrics::decorate;

    fn metrics() -> MetricsConfig {
        MetricsConfig {
            volatility_window: 2,
            ..MetricsConfig::default()
        }
    }

    fn card() -> ScoreCard {
        let mut frame = PriceFrame::new("TEST", test_bars(&[100.0, 102.0, 101.0, 103.0, 104.0]));
        decorate(&mut frame, &metrics());
        ScoreCard::compute(
            &frame,
            ScoreInputs {
                market_cap: Some(2.5e9),
                benchmark_closes: None,
                vix_closes: None,
            },
            &ScoreWeights::default(),
        )
    }

    #[test]
    fn nine_steps_in_order() {
        let steps = explain(&card(), &metrics());
        assert_eq!(steps.len(), 9);
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.number, i + 1);
        }
        assert_eq!(steps[1].formula, "Volatility = std(Return, 2) * sqrt(252)");
        assert_eq!(steps[2].value, "Market Capitalization = 2.5000 billion");
        assert!(steps[3].value.ends_with('x'));
    }

    #[test]
    fn volatility_step_matches_scaling() {
        let raw = MetricsConfig {
            annualize: false,
            ..metrics()
        };
        assert_eq!(explain(&card(), &raw)[1].formula, "Volatility = std(Return, 2)");

        let longer_year = MetricsConfig {
            trading_days: 260,
            ..metrics()
        };
        assert_eq!(
            explain(&card(), &longer_year)[1].formula,
            "Volatility = std(Return, 2) * sqrt(260)"
        );
    }

    #[test]
    fn missing_benchmark_is_spelled_out() {
        let steps = explain(&card(), &metrics());
        assert!(steps[4].value.contains("unavailable"));
        assert!(steps[6].value.contains("National Average Return: 0.0000%"));
    }

    #[test]
    fn weights_step_lists_all_four() {
        let steps = explain(&card(), &metrics());
        assert_eq!(
            steps[5].value,
            "Weights = {Return: 0.3000, Volatility: 0.2000, Market Capitalization: 0.3000, National Average Return: 0.2000}"
        );
    }

    #[test]
    fn rendered_block_has_heading_and_overall() {
        let text = render_steps(&explain(&card(), &metrics()));
        assert!(text.starts_with("Calculating scores:\n1. Calculate daily returns:"));
        assert!(text.contains("9. Calculate overall score:"));
    }

    #[test]
    fn nan_renders_as_na() {
        assert_eq!(fmt_num(f64::NAN, 2), "n/a");
        assert_eq!(fmt_num(1.23456, 2), "1.23");
    }

    #[test]
    fn summary_has_two_decimals() {
        let lines = summary_lines(&card());
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "Market Capitalization: 2.50 billion");
    }
}
