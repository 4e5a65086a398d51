//! Diverging blue-white-red ramp for scatter points.

/// Color of points without a usable value.
pub const NEUTRAL_COLOR: &str = "#aaaaaa";

const COLD: (f64, f64, f64) = (0.0, 70.0, 170.0);
const WHITE: (f64, f64, f64) = (240.0, 240.0, 240.0);
const HOT: (f64, f64, f64) = (200.0, 50.0, 50.0);

fn blend(from: (f64, f64, f64), to: (f64, f64, f64), k: f64) -> (f64, f64, f64) {
    (
        from.0 + (to.0 - from.0) * k,
        from.1 + (to.1 - from.1) * k,
        from.2 + (to.2 - from.2) * k,
    )
}

fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Map `value` within `[min, max]` to a `#rrggbb` color.
///
/// Out-of-range values clamp to the ends of the ramp. A zero-width range
/// divides by one instead.
pub fn color_for(value: f64, min: f64, max: f64) -> String {
    if !value.is_finite() {
        return NEUTRAL_COLOR.to_string();
    }
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    let u = ((value - min) / range).clamp(0.0, 1.0);
    let (r, g, b) = if u <= 0.5 {
        blend(COLD, WHITE, u / 0.5)
    } else {
        blend(WHITE, HOT, (u - 0.5) / 0.5)
    };
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}
