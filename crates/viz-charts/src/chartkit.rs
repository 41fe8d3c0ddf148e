//! # chartkit
//!
//! Shared drawing primitives: tick picking, SVG path building, arc geometry
//! and value formatting.

use std::f64::consts::{PI, TAU};
use std::fmt::Write;

// ============================================================================
// TICK SCALE
// ============================================================================

/// Upper bound on requested tick counts
pub const MAX_TICKS: usize = 100;

/// Linear value domain that picks round tick values
#[derive(Debug, Clone)]
pub struct LinearScale {
    domain: (f64, f64),
}

impl LinearScale {
    pub fn new() -> Self {
        Self { domain: (0.0, 1.0) }
    }

    pub fn domain(mut self, min: f64, max: f64) -> Self {
        self.domain = (min, max);
        self
    }

    /// Generate "nice" tick values (rounded to clean numbers) inside the domain
    pub fn nice_ticks(&self, count: usize) -> Vec<f64> {
        let (min, max) = self.domain;
        let range = max - min;

        if range == 0.0 || count == 0 || !range.is_finite() {
            return vec![min];
        }

        let rough_step = range / count.min(MAX_TICKS) as f64;
        let magnitude = 10.0_f64.powf(rough_step.log10().floor());
        let residual = rough_step / magnitude;

        let nice_step = if residual <= 1.0 {
            magnitude
        } else if residual <= 2.0 {
            2.0 * magnitude
        } else if residual <= 5.0 {
            5.0 * magnitude
        } else {
            10.0 * magnitude
        };

        let first = (min / nice_step).ceil() as i64;
        let last = (max / nice_step).floor() as i64;

        // Integer multiples avoid accumulated float drift (0.30000000000000004)
        (first..=last).map(|i| i as f64 * nice_step).collect()
    }
}

impl Default for LinearScale {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// PATH BUILDER (fluent API)
// ============================================================================

/// SVG path builder with fluent API
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    commands: String,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            commands: String::with_capacity(256),
        }
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        let _ = write!(self.commands, "M{:.2},{:.2}", x, y);
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        let _ = write!(self.commands, "L{:.2},{:.2}", x, y);
        self
    }

    pub fn arc_to(
        mut self,
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) -> Self {
        let _ = write!(
            self.commands,
            "A{:.2},{:.2},{:.2},{},{},{:.2},{:.2}",
            rx, ry, rotation, large_arc as u8, sweep as u8, x, y
        );
        self
    }

    pub fn close(mut self) -> Self {
        self.commands.push('Z');
        self
    }

    pub fn build(self) -> String {
        self.commands
    }
}

/// Generate closed area path with baseline
pub fn area_path(points: &[(f64, f64)], baseline_y: f64) -> String {
    let Some(&(first_x, first_y)) = points.first() else {
        return String::new();
    };

    let mut builder = PathBuilder::new()
        .move_to(first_x, baseline_y)
        .line_to(first_x, first_y);

    for &(x, y) in &points[1..] {
        builder = builder.line_to(x, y);
    }

    if let Some(&(last_x, _)) = points.last() {
        builder = builder.line_to(last_x, baseline_y);
    }

    builder.close().build()
}

/// Generate line path (non-closed)
pub fn line_path(points: &[(f64, f64)]) -> String {
    let Some((&(x, y), rest)) = points.split_first() else {
        return String::new();
    };

    rest.iter()
        .fold(PathBuilder::new().move_to(x, y), |builder, &(x, y)| builder.line_to(x, y))
        .build()
}

// ============================================================================
// ARC GEOMETRY
// ============================================================================

/// Sweeps this close to a full turn are drawn as a full ring
const FULL_TURN_EPSILON: f64 = 1e-9;

/// Point on a circle. Angles are SVG screen angles: 0 = 3 o'clock, growing
/// clockwise because the y axis points down.
pub fn polar(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

/// Screen angle of a turn fraction measured clockwise from 12 o'clock
pub fn clock_angle(radians_from_top: f64) -> f64 {
    radians_from_top - PI / 2.0
}

/// Closed ring (or pie when `inner` is 0) segment path
pub fn ring_segment_path(cx: f64, cy: f64, outer: f64, inner: f64, start: f64, sweep: f64) -> String {
    let sweep = sweep.clamp(0.0, TAU);
    let inner = inner.max(0.0);

    if sweep >= TAU - FULL_TURN_EPSILON {
        return full_ring_path(cx, cy, outer, inner, start);
    }

    let end = start + sweep;
    let large = sweep > PI;
    let (ox1, oy1) = polar(cx, cy, outer, start);
    let (ox2, oy2) = polar(cx, cy, outer, end);

    let builder = PathBuilder::new()
        .move_to(ox1, oy1)
        .arc_to(outer, outer, 0.0, large, true, ox2, oy2);

    if inner <= 0.0 {
        return builder.line_to(cx, cy).close().build();
    }

    let (ix2, iy2) = polar(cx, cy, inner, end);
    let (ix1, iy1) = polar(cx, cy, inner, start);
    builder
        .line_to(ix2, iy2)
        .arc_to(inner, inner, 0.0, large, false, ix1, iy1)
        .close()
        .build()
}

/// A single arc command cannot describe a full circle: use two halves, with
/// the inner ring wound the other way so the hole stays empty.
fn full_ring_path(cx: f64, cy: f64, outer: f64, inner: f64, start: f64) -> String {
    let (ox1, oy1) = polar(cx, cy, outer, start);
    let (ox2, oy2) = polar(cx, cy, outer, start + PI);

    let builder = PathBuilder::new()
        .move_to(ox1, oy1)
        .arc_to(outer, outer, 0.0, false, true, ox2, oy2)
        .arc_to(outer, outer, 0.0, false, true, ox1, oy1)
        .close();

    if inner <= 0.0 {
        return builder.build();
    }

    let (ix1, iy1) = polar(cx, cy, inner, start);
    let (ix2, iy2) = polar(cx, cy, inner, start + PI);
    builder
        .move_to(ix1, iy1)
        .arc_to(inner, inner, 0.0, false, false, ix2, iy2)
        .arc_to(inner, inner, 0.0, false, false, ix1, iy1)
        .close()
        .build()
}

/// Text anchor for labels placed around a center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }

    /// Anchor for a label at `x` relative to a vertical centerline
    pub fn around(x: f64, center_x: f64, tolerance: f64) -> Self {
        if x > center_x + tolerance {
            Self::Start
        } else if x < center_x - tolerance {
            Self::End
        } else {
            Self::Middle
        }
    }
}

// ============================================================================
// FORMATTERS
// ============================================================================

/// Placeholder for values that cannot be computed (empty or zero totals)
pub const PLACEHOLDER: &str = "-";

/// Format a value with fixed decimals, `-` when not finite
pub fn format_value(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{:.prec$}", value, prec = decimals)
    } else {
        PLACEHOLDER.to_string()
    }
}

/// Format a proportion (0..=1) as a percentage, `-` when not finite
pub fn format_percentage(proportion: f64, decimals: usize) -> String {
    if proportion.is_finite() {
        format!("{:.prec$}%", proportion * 100.0, prec = decimals)
    } else {
        PLACEHOLDER.to_string()
    }
}

/// Format large numbers with K/M/B suffixes
pub fn format_large_number(num: f64) -> String {
    if !num.is_finite() {
        return PLACEHOLDER.to_string();
    }

    let abs = num.abs();
    let sign = if num < 0.0 { "-" } else { "" };

    if abs >= 1_000_000_000.0 {
        format!("{}{:.2}B", sign, abs / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{}{:.2}M", sign, abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{}{:.2}K", sign, abs / 1_000.0)
    } else if abs.fract() == 0.0 {
        format!("{}{}", sign, abs)
    } else {
        format!("{}{:.2}", sign, abs)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_ticks() {
        let scale = LinearScale::new().domain(-5.0, 8.0);
        assert_eq!(scale.nice_ticks(10), vec![-4.0, -2.0, 0.0, 2.0, 4.0, 6.0, 8.0]);

        let scale = LinearScale::new().domain(0.0, 100.0);
        assert_eq!(scale.nice_ticks(5), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);

        let flat = LinearScale::new().domain(3.0, 3.0);
        assert_eq!(flat.nice_ticks(5), vec![3.0]);

        let capped = LinearScale::new().domain(0.0, 100.0);
        assert_eq!(capped.nice_ticks(usize::MAX), capped.nice_ticks(MAX_TICKS));
        assert_eq!(capped.nice_ticks(usize::MAX).len(), 101);
    }

    #[test]
    fn test_path_builder() {
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .line_to(100.0, 100.0)
            .close()
            .build();

        assert!(path.contains("M0.00,0.00"));
        assert!(path.contains("L100.00,100.00"));
        assert!(path.ends_with('Z'));
    }

    #[test]
    fn test_line_and_area_paths() {
        let points = [(0.0, 10.0), (50.0, 5.0), (100.0, 0.0)];
        let line = line_path(&points);
        assert!(line.starts_with("M0.00,10.00"));
        assert!(line.contains("L50.00,5.00"));

        let area = area_path(&points, 20.0);
        assert!(area.starts_with("M0.00,20.00L0.00,10.00"));
        assert!(area.ends_with("L100.00,20.00Z"));
        assert!(line_path(&[]).is_empty());
    }

    #[test]
    fn test_polar_clock_angles() {
        let (x, y) = polar(0.0, 0.0, 10.0, clock_angle(0.0));
        assert!(x.abs() < 1e-9 && (y + 10.0).abs() < 1e-9);

        let (x, y) = polar(0.0, 0.0, 10.0, clock_angle(PI / 2.0));
        assert!((x - 10.0).abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn test_ring_segment_path() {
        let half = ring_segment_path(50.0, 50.0, 40.0, 20.0, clock_angle(0.0), PI);
        assert_eq!(half.matches('A').count(), 2);
        assert!(half.ends_with('Z'));

        let pie = ring_segment_path(50.0, 50.0, 40.0, 0.0, 0.0, 1.0);
        assert!(pie.contains("L50.00,50.00"));

        let full = ring_segment_path(50.0, 50.0, 40.0, 20.0, 0.0, TAU);
        assert_eq!(full.matches('A').count(), 4);
        assert_eq!(full.matches('M').count(), 2);
    }

    #[test]
    fn test_text_anchor_around_centerline() {
        assert_eq!(TextAnchor::around(60.0, 50.0, 2.0), TextAnchor::Start);
        assert_eq!(TextAnchor::around(40.0, 50.0, 2.0), TextAnchor::End);
        assert_eq!(TextAnchor::around(51.0, 50.0, 2.0), TextAnchor::Middle);
    }

    #[test]
    fn test_formatters() {
        assert_eq!(format_percentage(0.3, 0), "30%");
        assert_eq!(format_percentage(f64::NAN, 1), "-");
        assert_eq!(format_value(12.345, 1), "12.3");
        assert_eq!(format_value(f64::INFINITY, 1), "-");
        assert_eq!(format_large_number(1_500_000.0), "1.50M");
        assert_eq!(format_large_number(2_500.0), "2.50K");
        assert_eq!(format_large_number(-5.0), "-5");
        assert_eq!(format_large_number(0.5), "0.50");
    }
}
