use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::fmt::amount;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const MESSAGE_STYLE: Style = Style::new().fg(Color::Yellow);

pub const FOCUS_STYLE: Style = Style::new().fg(Color::Cyan);

pub const AMOUNT_POS_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const AMOUNT_NEG_STYLE: Style = Style::new().fg(Color::Red);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

/// Signed total as a coloured span: green when positive, red when negative.
pub fn total_span(total: f64) -> Span<'static> {
    let style = if total < 0.0 {
        AMOUNT_NEG_STYLE
    } else {
        AMOUNT_POS_STYLE
    };
    Span::styled(format!("TOTAL: {}", amount(total)), style)
}

/// Parse `#rrggbb` into an RGB colour.
pub fn hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

pub fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 1).collect();
        format!("{truncated}\u{2026}")
    }
}

/// Restore the terminal before the default panic output runs.
pub fn install_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("#5fb83e"), Some(Color::Rgb(0x5f, 0xb8, 0x3e)));
        assert_eq!(hex_color("#CCCCCC"), Some(Color::Rgb(204, 204, 204)));
        assert_eq!(hex_color("5fb83e"), None);
        assert_eq!(hex_color("#12345"), None);
        assert_eq!(hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Groceries", 20), "Groceries");
        assert_eq!(truncate("Groceries", 5), "Groc\u{2026}");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_total_span_text() {
        assert_eq!(total_span(50.0).content, "TOTAL: 50.00");
        assert_eq!(total_span(-7.5).style, AMOUNT_NEG_STYLE);
    }
}
