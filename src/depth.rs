//! Depth, parallax and fog helpers
//!
//! Depth `z` runs from 0.0 (far) to 1.0 (near). Everything that scales with
//! distance goes through these three functions.

use rand::Rng;

/// RGBA colour, straight (non-premultiplied) alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Saturating add to the colour channels, alpha untouched.
    /// Used for the lightning flash.
    #[inline]
    pub fn brighten(self, amount: u8) -> Self {
        Self {
            r: self.r.saturating_add(amount),
            g: self.g.saturating_add(amount),
            b: self.b.saturating_add(amount),
            a: self.a,
        }
    }

    /// Multiply the colour channels by `factor`, alpha untouched
    #[inline]
    pub fn scaled(self, factor: f32) -> Self {
        let s = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
        Self {
            r: s(self.r),
            g: s(self.g),
            b: s(self.b),
            a: self.a,
        }
    }

    #[inline]
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Soft pastel used for rain: every channel, alpha included, in 150..=254
    pub fn random_rain(rng: &mut impl Rng) -> Self {
        Self {
            r: rng.gen_range(150..255),
            g: rng.gen_range(150..255),
            b: rng.gen_range(150..255),
            a: rng.gen_range(150..255),
        }
    }
}

/// Size/brightness/speed scale for a depth: 0.2 at the horizon, 1.0 up close
#[inline]
pub fn depth_scale(z: f32) -> f32 {
    0.2 + 0.8 * z
}

/// Camera-relative screen x. Near objects slide further than far ones.
#[inline]
pub fn project_x(x: f32, z: f32, camera_x: f32) -> f32 {
    x - camera_x * 0.3 * z
}

/// Darken and blue-shift a colour with distance
#[inline]
pub fn depth_color(color: Rgba, z: f32) -> Rgba {
    let fog = 1.0 - z * 0.7;
    Rgba {
        r: (color.r as f32 * z) as u8,
        g: (color.g as f32 * z + 5.0 * fog) as u8,
        b: (color.b as f32 * z + 30.0 * fog) as u8,
        a: color.a,
    }
}

/// Random x inside a band that widens with distance, mimicking the wider
/// field of view at the horizon. `spread` is how much wider the band is at z=0.
pub fn depth_band_x(rng: &mut impl Rng, z: f32, spread: f32, width: u32) -> f32 {
    let widen = 1.0 + (1.0 - z) * spread;
    let band = ((width as f32 * widen) as u32).max(1);
    rng.gen_range(0..band) as f32 - (widen - 1.0) * width as f32 / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn depth_scale_is_monotonic_and_bounded() {
        assert_eq!(depth_scale(0.0), 0.2);
        assert_eq!(depth_scale(1.0), 1.0);
        let mut prev = depth_scale(0.0);
        for i in 1..=100 {
            let s = depth_scale(i as f32 / 100.0);
            assert!(s >= prev);
            prev = s;
        }
    }

    #[test]
    fn projection_parallax_grows_with_depth() {
        let camera = 200.0;
        let far = project_x(100.0, 0.0, camera);
        let mid = project_x(100.0, 0.5, camera);
        let near = project_x(100.0, 1.0, camera);
        assert_eq!(far, 100.0);
        assert!((mid - 70.0).abs() < 1e-3);
        assert!((near - 40.0).abs() < 1e-3);
        assert!(near < mid && mid < far);
        // Without camera movement nothing shifts
        assert_eq!(project_x(100.0, 1.0, 0.0), 100.0);
    }

    #[test]
    fn depth_color_matches_fog_formula() {
        let c = Rgba::new(200, 100, 50, 77);
        let out = depth_color(c, 0.5);
        assert_eq!(out.r, 100);
        assert_eq!(out.g, (50.0 + 5.0 * 0.65) as u8);
        assert_eq!(out.b, (25.0 + 30.0 * 0.65) as u8);
        assert_eq!(out.a, 77);

        let far = depth_color(c, 0.0);
        assert_eq!((far.r, far.g, far.b), (0, 5, 30));
    }

    #[test]
    fn farther_is_darker() {
        let c = Rgba::opaque(220, 220, 220);
        let mut prev = depth_color(c, 0.0);
        for i in 1..=20 {
            let cur = depth_color(c, i as f32 / 20.0);
            assert!(cur.r >= prev.r);
            assert!(cur.g >= prev.g);
            // Blue gains from colour faster than it loses fog for bright inputs
            assert!(cur.b >= prev.b);
            prev = cur;
        }
    }

    #[test]
    fn brighten_saturates() {
        let c = Rgba::new(250, 10, 128, 9).brighten(20);
        assert_eq!(c, Rgba::new(255, 30, 148, 9));
    }

    #[test]
    fn random_rain_stays_in_pastel_range() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            let c = Rgba::random_rain(&mut rng);
            for ch in [c.r, c.g, c.b, c.a] {
                assert!((150..=254).contains(&ch));
            }
        }
    }

    #[test]
    fn depth_band_is_wider_far_away() {
        let mut rng = SmallRng::seed_from_u64(9);
        let (mut min, mut max) = (f32::MAX, f32::MIN);
        for _ in 0..2000 {
            let x = depth_band_x(&mut rng, 0.0, 2.0, 800);
            min = min.min(x);
            max = max.max(x);
        }
        assert!(min >= -800.0 && max < 1600.0);
        assert!(min < 0.0 && max > 800.0);

        for _ in 0..200 {
            let x = depth_band_x(&mut rng, 1.0, 2.0, 800);
            assert!((0.0..800.0).contains(&x));
        }
    }
}
