//! Player color generation
//!
//! Colors are sampled at evenly spaced hues and quantized to 8 bits per
//! channel, so the same player count always yields the same palette.

use crate::controller::Rgb;

/// Convert HSV (each in 0.0 to 1.0) to an 8-bit RGB triple.
///
/// Channels are truncated rather than rounded.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [u8; 3] {
    let full = (255.0 * v) as u8;
    if s == 0.0 {
        return [full; 3];
    }

    let sector = (h * 6.0) as i64;
    let f = h * 6.0 - sector as f64;
    let p = (255.0 * (v * (1.0 - s))) as u8;
    let q = (255.0 * (v * (1.0 - s * f))) as u8;
    let t = (255.0 * (v * (1.0 - s * (1.0 - f)))) as u8;

    match sector.rem_euclid(6) {
        0 => [full, t, p],
        1 => [q, full, p],
        2 => [p, full, t],
        3 => [p, q, full],
        4 => [t, p, full],
        _ => [full, p, q],
    }
}

/// Generate `n` distinct fully saturated colors, one per player.
///
/// Hue `k` is `k / n`; output order matches the order players are passed in.
pub fn generate(n: usize) -> Vec<Rgb> {
    (0..n)
        .map(|k| Rgb::from_bytes(hsv_to_rgb(k as f64 / n as f64, 1.0, 1.0)))
        .collect()
}

/// Hue sweep used for the winner's celebration
pub fn rainbow(frames: usize, saturation: f64) -> Vec<Rgb> {
    (0..frames)
        .map(|k| Rgb::from_bytes(hsv_to_rgb(k as f64 / frames as f64, saturation, 1.0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hue in 0.0..1.0 of a saturated color
    fn hue(color: Rgb) -> f32 {
        let (r, g, b) = (color.r, color.g, color.b);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let d = max - min;
        let h = if max == r {
            ((g - b) / d).rem_euclid(6.0)
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        h / 6.0
    }

    #[test]
    fn test_generate_empty() {
        assert!(generate(0).is_empty());
    }

    #[test]
    fn test_generate_count_and_range() {
        for n in 0..=16 {
            let colors = generate(n);
            assert_eq!(colors.len(), n);
            for c in colors {
                for channel in [c.r, c.g, c.b] {
                    assert!((0.0..=1.0).contains(&channel), "n={} channel={}", n, channel);
                }
            }
        }
    }

    #[test]
    fn test_generate_even_hue_spacing() {
        for n in 2..=12 {
            let colors = generate(n);
            for pair in colors.windows(2) {
                let step = (hue(pair[1]) - hue(pair[0])).rem_euclid(1.0);
                let expected = 1.0 / n as f32;
                assert!(
                    (step - expected).abs() < 0.005,
                    "n={} step={} expected={}",
                    n,
                    step,
                    expected
                );
            }
        }
    }

    #[test]
    fn test_generate_three_players() {
        assert_eq!(generate(3), vec![Rgb::RED, Rgb::GREEN, Rgb::new(0.0, 0.0, 1.0)]);
    }

    #[test]
    fn test_generate_is_deterministic() {
        assert_eq!(generate(7), generate(7));
    }

    #[test]
    fn test_rainbow_frames() {
        let frames = rainbow(50, 0.9);
        assert_eq!(frames.len(), 50);
        assert_eq!(frames[0].r, 1.0);
        // 0.9 saturation keeps every channel lit
        assert!(frames.iter().all(|c| c.r > 0.0 && c.g > 0.0 && c.b > 0.0));
    }
}
