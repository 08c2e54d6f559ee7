use crate::error::{MapnikError, MapnikResult};
use crate::render::Color;

/// Parses a stylesheet color.
///
/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r,g,b)`, `rgba(r,g,b,a)` and a
/// small set of CSS names. Channel values inside `rgb()` are 0..=255, alpha in
/// `rgba()` is 0..=1.
pub fn parse_color(text: &str) -> MapnikResult<Color> {
    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();

    if let Some(hex) = lower.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| invalid(trimmed));
    }
    if let Some(body) = lower
        .strip_prefix("rgba(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_functional(body, true).ok_or_else(|| invalid(trimmed));
    }
    if let Some(body) = lower
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_functional(body, false).ok_or_else(|| invalid(trimmed));
    }

    named(&lower).ok_or_else(|| invalid(trimmed))
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digits: Vec<u8> = hex
        .chars()
        .map(|ch| ch.to_digit(16).and_then(|digit| u8::try_from(digit).ok()))
        .collect::<Option<_>>()?;

    let channels: Vec<u8> = match digits.len() {
        3 => digits.iter().map(|digit| digit * 17).collect(),
        6 | 8 => digits
            .chunks(2)
            .map(|pair| pair[0] * 16 + pair[1])
            .collect(),
        _ => return None,
    };

    let alpha = channels.get(3).copied().unwrap_or(255);
    Some(Color::from_rgba8(channels[0], channels[1], channels[2], alpha))
}

fn parse_functional(body: &str, with_alpha: bool) -> Option<Color> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let mut rgb = [0.0; 3];
    for (slot, part) in rgb.iter_mut().zip(&parts) {
        let value = part.parse::<f64>().ok()?;
        if !(0.0..=255.0).contains(&value) {
            return None;
        }
        *slot = value / 255.0;
    }
    let alpha = if with_alpha {
        let value = parts[3].parse::<f64>().ok()?;
        if !(0.0..=1.0).contains(&value) {
            return None;
        }
        value
    } else {
        1.0
    };

    Some(Color::rgba(rgb[0], rgb[1], rgb[2], alpha))
}

fn named(name: &str) -> Option<Color> {
    let (r, g, b, a) = match name {
        "black" => (0, 0, 0, 255),
        "white" => (255, 255, 255, 255),
        "red" => (255, 0, 0, 255),
        "green" => (0, 128, 0, 255),
        "blue" => (0, 0, 255, 255),
        "yellow" => (255, 255, 0, 255),
        "gray" | "grey" => (128, 128, 128, 255),
        "orange" => (255, 165, 0, 255),
        "transparent" => (0, 0, 0, 0),
        _ => return None,
    };
    Some(Color::from_rgba8(r, g, b, a))
}

fn invalid(text: &str) -> MapnikError {
    MapnikError::Stylesheet(format!("failed to parse color: \"{text}\""))
}
