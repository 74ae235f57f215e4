use rand::Rng;
use std::fmt;

/// Lowest channel value of generated cluster colors.
const CHANNEL_MIN: u8 = 50;

/// Highest channel value of generated cluster colors.
const CHANNEL_MAX: u8 = 200;

/// An opaque RGB color, only meant for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Placeholder color of points that have not been assigned yet.
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Draws a color whose channels are in `[50, 200]`, so that it stays
    /// visible against both dark and light backgrounds.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            r: rng.gen_range(CHANNEL_MIN..=CHANNEL_MAX),
            g: rng.gen_range(CHANNEL_MIN..=CHANNEL_MAX),
            b: rng.gen_range(CHANNEL_MIN..=CHANNEL_MAX),
        }
    }
}

/// Formats the color as `#rrggbb`.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

pub(crate) fn random_palette<R>(rng: &mut R, count: usize) -> Vec<Color>
where
    R: Rng + ?Sized,
{
    (0..count).map(|_| Color::random(rng)).collect()
}
