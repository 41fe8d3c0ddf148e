//! Palette, theme colors and color derivation helpers

// ============================================================================
// THEME CONSTANTS
// ============================================================================

pub const BG_PANEL: &str = "#ffffff";
pub const BG_ELEVATED: &str = "#f3f4f6";
pub const BORDER: &str = "#e1e5e8";
pub const GRID: &str = "#e1e5e8";
pub const TEXT_PRIMARY: &str = "#2d353c";
pub const TEXT_MUTED: &str = "#6b7280";
pub const GUTTER: &str = "#e1e5e8";
pub const POINTER: &str = "#2d353c";

/// Default series palette, cycled by positional index
pub const PALETTE: &[&str] = &[
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Owned copy of the default palette (config arrays are owned)
pub fn default_palette() -> Vec<String> {
    PALETTE.iter().map(|c| c.to_string()).collect()
}

/// Palette entry for a positional index, wrapping around the palette length.
/// An empty palette falls back to [`PALETTE`].
pub fn palette_color(palette: &[String], index: usize) -> String {
    if palette.is_empty() {
        PALETTE[index % PALETTE.len()].to_string()
    } else {
        palette[index % palette.len()].clone()
    }
}

// ============================================================================
// RGBA
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#')?;
        // Byte slicing below assumes one byte per digit
        if !digits.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();

        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1].repeat(2));
                Some(Self::new(expand(0)?, expand(1)?, expand(2)?, 1.0))
            }
            6 | 8 => {
                let r = channel(&digits[0..2])?;
                let g = channel(&digits[2..4])?;
                let b = channel(&digits[4..6])?;
                let a = if digits.len() == 8 {
                    channel(&digits[6..8])? as f64 / 255.0
                } else {
                    1.0
                };
                Some(Self::new(r, g, b, a))
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let alpha = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, alpha)
        }
    }

    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {:.2})", self.r, self.g, self.b, self.a)
    }

    /// Mix each channel toward `target` by `amount` (0..=1)
    pub fn mix(&self, target: Rgba, amount: f64) -> Self {
        let t = amount.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Self::new(
            lerp(self.r, target.r),
            lerp(self.g, target.g),
            lerp(self.b, target.b),
            self.a,
        )
    }
}

const WHITE: Rgba = Rgba::new(255, 255, 255, 1.0);
const BLACK: Rgba = Rgba::new(0, 0, 0, 1.0);

// ============================================================================
// DERIVATION
// ============================================================================

/// `rgba(...)` string for a hex color; non-hex inputs are returned unchanged
pub fn with_alpha(color: &str, alpha: f64) -> String {
    match Rgba::from_hex(color) {
        Some(rgba) => Rgba { a: alpha.clamp(0.0, 1.0), ..rgba }.to_css(),
        None => color.to_string(),
    }
}

/// Mix toward white
pub fn lighten(color: &str, amount: f64) -> String {
    Rgba::from_hex(color)
        .map(|c| c.mix(WHITE, amount).to_hex())
        .unwrap_or_else(|| color.to_string())
}

/// Mix toward black
pub fn darken(color: &str, amount: f64) -> String {
    Rgba::from_hex(color)
        .map(|c| c.mix(BLACK, amount).to_hex())
        .unwrap_or_else(|| color.to_string())
}

/// Radial gradient stops `(offset %, color)` from a base color.
/// `intensity` (0..=100) controls how far the inner stop is lightened; the
/// rim is darkened by half as much.
pub fn gradient_stops(color: &str, intensity: f64) -> Vec<(f64, String)> {
    let amount = (intensity / 100.0).clamp(0.0, 1.0);
    vec![
        (0.0, lighten(color, amount)),
        (50.0, color.to_string()),
        (100.0, darken(color, amount / 2.0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_wraps_by_index() {
        let palette = vec!["#111111".to_string(), "#222222".to_string()];
        assert_eq!(palette_color(&palette, 0), "#111111");
        assert_eq!(palette_color(&palette, 1), "#222222");
        assert_eq!(palette_color(&palette, 2), "#111111");
        assert_eq!(palette_color(&[], 0), PALETTE[0]);
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgba::from_hex("#fff"), Some(Rgba::new(255, 255, 255, 1.0)));
        assert_eq!(Rgba::from_hex("#1f77b4"), Some(Rgba::new(31, 119, 180, 1.0)));
        let translucent = Rgba::from_hex("#ff000080").unwrap();
        assert!((translucent.a - 0.502).abs() < 0.01);
        assert_eq!(Rgba::from_hex("red"), None);
        assert_eq!(Rgba::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_non_ascii_hex_is_rejected() {
        assert_eq!(Rgba::from_hex("#aéaaa"), None);
        assert_eq!(Rgba::from_hex("#é1"), None);
        assert_eq!(lighten("#aéaaa", 0.35), "#aéaaa");
        assert_eq!(gradient_stops("#aéaaa", 50.0)[2].1, "#aéaaa");
    }

    #[test]
    fn test_with_alpha() {
        assert_eq!(with_alpha("#ff0000", 0.5), "rgba(255, 0, 0, 0.50)");
        assert_eq!(with_alpha("tomato", 0.5), "tomato");
    }

    #[test]
    fn test_lighten_darken() {
        assert_eq!(lighten("#000000", 1.0), "#ffffff");
        assert_eq!(darken("#ffffff", 1.0), "#000000");
        assert_eq!(lighten("#000000", 0.0), "#000000");
        assert_eq!(lighten("#808080", 0.5), "#c0c0c0");
    }

    #[test]
    fn test_gradient_stops() {
        let stops = gradient_stops("#808080", 50.0);
        assert_eq!(stops.len(), 3);
        assert_eq!(stops[0], (0.0, "#c0c0c0".to_string()));
        assert_eq!(stops[1], (50.0, "#808080".to_string()));
        assert_eq!(stops[2], (100.0, "#606060".to_string()));
    }
}
