//! Color literal validation for palette swatches
//!
//! Accepts hex colors (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), the
//! functional `rgb()`, `rgba()`, `hsl()` and `hsla()` notations, CSS named
//! colors and `transparent`. Matching is case-insensitive.

use regex::Regex;
use std::sync::OnceLock;

const NAMED_COLORS: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue",
    "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
    "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
    "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
    "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
    "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
    "gray", "green", "greenyellow", "grey", "honeydew", "hotpink", "indianred", "indigo",
    "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
    "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
    "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
    "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
    "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
    "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
    "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
    "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
    "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown", "royalblue",
    "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna", "silver",
    "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan",
    "teal", "thistle", "tomato", "turquoise", "violet", "wheat", "white", "whitesmoke",
    "yellow", "yellowgreen", "transparent",
];

fn rgb_regex() -> &'static Regex {
    static RGB: OnceLock<Regex> = OnceLock::new();
    RGB.get_or_init(|| {
        Regex::new(
            r"(?i)^rgba?\(\s*(\d{1,3}%?)\s*,\s*(\d{1,3}%?)\s*,\s*(\d{1,3}%?)\s*(,\s*(\d*\.)?\d+%?\s*)?\)$",
        )
        .expect("static regex")
    })
}

fn hsl_regex() -> &'static Regex {
    static HSL: OnceLock<Regex> = OnceLock::new();
    HSL.get_or_init(|| {
        Regex::new(
            r"(?i)^hsla?\(\s*(\d*\.)?\d+(deg)?\s*,\s*(\d*\.)?\d+%\s*,\s*(\d*\.)?\d+%\s*(,\s*(\d*\.)?\d+%?\s*)?\)$",
        )
        .expect("static regex")
    })
}

/// Whether `value` is a color literal swatches can display
pub fn is_color(value: &str) -> bool {
    let value = value.trim();
    is_hex_color(value) || is_functional_color(value) || is_named_color(value)
}

pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

pub fn is_functional_color(value: &str) -> bool {
    if let Some(caps) = rgb_regex().captures(value) {
        // Channels are bytes or percentages
        return (1..=3).all(|i| {
            let channel = &caps[i];
            match channel.strip_suffix('%') {
                Some(percent) => percent.parse::<u16>().map_or(false, |p| p <= 100),
                None => channel.parse::<u16>().map_or(false, |v| v <= 255),
            }
        });
    }
    hsl_regex().is_match(value)
}

pub fn is_named_color(value: &str) -> bool {
    let lowered = value.to_ascii_lowercase();
    NAMED_COLORS.contains(&lowered.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_colors() {
        assert!(is_color("#336699"));
        assert!(is_color("#fff"));
        assert!(is_color("#FFFA"));
        assert!(is_color("#12345678"));
        assert!(!is_color("#12345"));
        assert!(!is_color("#ggg"));
        assert!(!is_color("336699"));
    }

    #[test]
    fn test_functional_colors() {
        assert!(is_color("rgb(255, 0, 0)"));
        assert!(is_color("rgba(0,0,0,.5)"));
        assert!(is_color("RGB(100%, 0%, 50%)"));
        assert!(is_color("hsl(120, 100%, 50%)"));
        assert!(is_color("hsla(120deg, 100%, 50%, 0.3)"));
        assert!(!is_color("rgb(256, 0, 0)"));
        assert!(!is_color("rgb(0, 0)"));
        assert!(!is_color("hsl(120, 100, 50)"));
    }

    #[test]
    fn test_named_colors() {
        assert!(is_color("red"));
        assert!(is_color("RebeccaPurple"));
        assert!(is_color("transparent"));
        assert!(!is_color("not-a-color"));
        assert!(!is_color("var(--brand-blue)"));
        assert!(!is_color(""));
    }
}
