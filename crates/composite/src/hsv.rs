//! HSV to RGB conversion

/// RGB color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Convert HSV to RGB.
///
/// `h` in degrees (wrapped into [0, 360)), `s` and `v` in [0, 1] (clamped).
/// Standard sextant formulation; the channels are rounded into u8 so the
/// result can never wrap.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);
    let h = h.rem_euclid(360.0);

    let c = v * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());

    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let m = v - c;
    Rgb::new(
        ((r1 + m) * 255.0).round() as u8,
        ((g1 + m) * 255.0).round() as u8,
        ((b1 + m) * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_colors() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), Rgb::new(0, 255, 0));
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), Rgb::new(0, 0, 255));
    }

    #[test]
    fn zero_saturation_is_gray() {
        assert_eq!(hsv_to_rgb(0.0, 0.0, 0.5), Rgb::new(128, 128, 128));
        assert_eq!(hsv_to_rgb(200.0, 0.0, 1.0), Rgb::new(255, 255, 255));
    }

    #[test]
    fn zero_value_is_black() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 0.0), Rgb::new(0, 0, 0));
    }

    #[test]
    fn red_hue_keeps_red_channel_at_value() {
        // On the red hue, R = 255 * v and G = B = 255 * v * (1 - s)
        let c = hsv_to_rgb(0.0, 0.5, 0.8);
        assert_eq!(c.r, 204);
        assert_eq!(c.g, c.b);
        assert_eq!(c.g, 102);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        assert_eq!(hsv_to_rgb(0.0, 2.0, 5.0), Rgb::new(255, 0, 0));
        assert_eq!(hsv_to_rgb(0.0, -1.0, -1.0), Rgb::new(0, 0, 0));
        assert_eq!(hsv_to_rgb(360.0, 1.0, 1.0), Rgb::new(255, 0, 0));
    }
}
