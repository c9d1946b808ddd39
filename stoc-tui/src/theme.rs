//! Neon-on-charcoal palette and the style helpers the panels draw with.
//!
//! # Color Palette
//! - **Accent**: electric cyan (focus, highlights)
//! - **Positive**: neon green (gains)
//! - **Negative**: hot pink (losses, errors)
//! - **Warning**: neon orange
//! - **Neutral**: cool purple (headings, secondary info)
//! - **Muted**: steel blue (hints, disabled)

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);

/// Line colours for multi-series charts, in draw order.
pub const SERIES: [Color; 2] = [ACCENT, WARNING];

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

/// Green for gains, pink for losses, muted for NaN.
pub fn metric_color(value: f64) -> Style {
    if value.is_nan() {
        muted()
    } else if value >= 0.0 {
        positive()
    } else {
        negative()
    }
}

/// Diverging blue → white → red scale over [-1, 1]; NaN is dark grey.
pub fn heat_color(value: f64) -> Color {
    if value.is_nan() {
        return Color::Rgb(60, 60, 60);
    }
    let v = value.clamp(-1.0, 1.0);
    let t = v.abs();
    let fade = |c: u8| (255.0 - (255.0 - c as f64) * t).round() as u8;
    if v < 0.0 {
        Color::Rgb(fade(59), fade(76), fade(192))
    } else {
        Color::Rgb(fade(180), fade(4), fade(38))
    }
}

/// Black or white, whichever reads better on `heat_color(value)`.
pub fn heat_text(value: f64) -> Color {
    if value.is_nan() || value.abs() > 0.55 {
        Color::White
    } else {
        Color::Black
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_color_by_sign() {
        assert_eq!(metric_color(1.0), positive());
        assert_eq!(metric_color(0.0), positive());
        assert_eq!(metric_color(-0.1), negative());
        assert_eq!(metric_color(f64::NAN), muted());
    }

    #[test]
    fn heat_scale_endpoints() {
        assert_eq!(heat_color(0.0), Color::Rgb(255, 255, 255));
        assert_eq!(heat_color(-1.0), Color::Rgb(59, 76, 192));
        assert_eq!(heat_color(1.0), Color::Rgb(180, 4, 38));
        // clamped outside the range
        assert_eq!(heat_color(3.0), heat_color(1.0));
    }

    #[test]
    fn heat_text_contrast() {
        assert_eq!(heat_text(0.1), Color::Black);
        assert_eq!(heat_text(-0.9), Color::White);
    }
}
