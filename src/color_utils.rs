//! Color utility functions shared across the widget.
//!
//! Features take their color from a fixed palette by creation order. When a
//! configuration supplies an empty palette, colors are generated by walking
//! the hue circle with the golden angle.

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `v` - Value/brightness (0.0-1.0)
///
/// # Returns
/// RGB tuple with values in range 0.0-1.0
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// Format an RGB triple (0.0-1.0 components) as a `#rrggbb` CSS color.
pub fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
    let to_byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", to_byte(r), to_byte(g), to_byte(b))
}

/// Generated color for the `index`-th feature when no palette is configured.
pub fn generated_color(index: usize) -> String {
    // Golden angle for good distribution
    let hue = (index as f64 * 137.5) % 360.0;
    let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.95);
    rgb_to_hex(r, g, b)
}

/// Color for the `index`-th created feature, cycling through `palette`.
pub fn palette_color(palette: &[String], index: usize) -> String {
    if palette.is_empty() {
        generated_color(index)
    } else {
        palette[index % palette.len()].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_to_rgb_red() {
        let (r, g, b) = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!((r - 1.0).abs() < 0.01);
        assert!(g.abs() < 0.01);
        assert!(b.abs() < 0.01);
    }

    #[test]
    fn test_hsv_to_rgb_blue() {
        let (r, g, b) = hsv_to_rgb(240.0, 1.0, 1.0);
        assert!(r.abs() < 0.01);
        assert!(g.abs() < 0.01);
        assert!((b - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_rgb_to_hex() {
        assert_eq!(rgb_to_hex(1.0, 0.0, 0.0), "#ff0000");
        assert_eq!(rgb_to_hex(0.0, 1.0, 1.0), "#00ffff");
        // Out of range components are clamped
        assert_eq!(rgb_to_hex(2.0, -1.0, 0.0), "#ff0000");
    }

    #[test]
    fn test_palette_cycles() {
        let palette = vec!["#111111".to_string(), "#222222".to_string()];
        assert_eq!(palette_color(&palette, 0), "#111111");
        assert_eq!(palette_color(&palette, 1), "#222222");
        assert_eq!(palette_color(&palette, 2), "#111111");
    }

    #[test]
    fn test_empty_palette_generates_distinct_colors() {
        let c0 = palette_color(&[], 0);
        let c1 = palette_color(&[], 1);
        assert_ne!(c0, c1);
        assert!(c0.starts_with('#') && c0.len() == 7);
    }
}
