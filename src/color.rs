use std::fmt;
use std::hash::{Hash, Hasher};

use palette::Srgb;

use crate::convert::{CHANNEL_MAX, rgb16_to_lab};

/// An opaque color with 16 bits per RGB channel.
///
/// The perceptual (Lab-like) coordinates are computed once at construction
/// and travel with the raw channels, so clustering never converts twice.
/// Equality and hashing only look at the raw channels; the perceptual
/// coordinates are a pure function of them.
#[derive(Clone, Copy, Debug)]
pub struct Color {
    rgb: [u16; 3],
    lab: [f64; 3],
}

impl Color {
    /// Create a color from 16-bit channels.
    pub fn from_rgb16(r: u16, g: u16, b: u16) -> Self {
        let rgb = [r, g, b];
        Self {
            rgb,
            lab: rgb16_to_lab(rgb),
        }
    }

    /// Create a color from 8-bit channels, widened with `<< 8`.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgb16(u16::from(r) << 8, u16::from(g) << 8, u16::from(b) << 8)
    }

    /// Create a color from alpha-premultiplied 16-bit channels.
    ///
    /// Translucent input is un-premultiplied before conversion and the alpha
    /// is then dropped. A fully transparent pixel carries no color and
    /// becomes black.
    pub fn from_rgba16(r: u16, g: u16, b: u16, a: u16) -> Self {
        let [r, g, b] = unpremultiply([r, g, b], a);
        Self::from_rgb16(r, g, b)
    }

    /// 8-bit counterpart of [`Color::from_rgba16`].
    ///
    /// Channels and alpha are widened to 16 bits before un-premultiplying.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        if a == u8::MAX {
            return Self::from_rgb8(r, g, b);
        }
        let [r, g, b, a] = [r, g, b, a].map(|c| u16::from(c) << 8);
        Self::from_rgba16(r, g, b, a)
    }

    /// Raw channels as `[R, G, B]`.
    #[inline]
    pub fn rgb(&self) -> [u16; 3] {
        self.rgb
    }

    /// Perceptual coordinates as `[L, A, B]`.
    #[inline]
    pub fn lab(&self) -> [f64; 3] {
        self.lab
    }

    /// Euclidean distance in the perceptual space. This is the metric the
    /// clustering runs on.
    #[inline]
    pub fn distance(&self, other: &Color) -> f64 {
        let [l1, a1, b1] = self.lab;
        let [l2, a2, b2] = other.lab;
        ((l1 - l2).powi(2) + (a1 - a2).powi(2) + (b1 - b2).powi(2)).sqrt()
    }

    /// Euclidean distance between the raw channels.
    ///
    /// Only useful for diagnostics: raw distance over-weights green and
    /// under-weights blue compared to what the eye sees.
    pub fn distance_rgb(&self, other: &Color) -> f64 {
        let sum: i64 = self
            .rgb
            .iter()
            .zip(other.rgb.iter())
            .map(|(&a, &b)| (i64::from(a) - i64::from(b)).pow(2))
            .sum();
        (sum as f64).sqrt()
    }

    /// `#rrggbb` rendering with 8 bits per channel.
    pub fn hex(&self) -> String {
        let [r, g, b] = self.rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Channels truncated to 8 bits.
    pub fn rgb8(&self) -> [u8; 3] {
        // a u16 shifted right by 8 always fits in a u8
        self.rgb.map(|c| (c >> 8) as u8)
    }
}

fn unpremultiply(channels: [u16; 3], alpha: u16) -> [u16; 3] {
    if alpha == CHANNEL_MAX {
        return channels;
    }
    if alpha == 0 {
        return [0; 3];
    }
    let max = u32::from(CHANNEL_MAX);
    channels.map(|c| (u32::from(c) * max / u32::from(alpha)).min(max) as u16)
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.rgb == other.rgb
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rgb.hash(state);
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

// ------------------------------------------------------------
// Interop with `palette` and `image`
// ------------------------------------------------------------

impl From<Srgb<u16>> for Color {
    fn from(c: Srgb<u16>) -> Self {
        Self::from_rgb16(c.red, c.green, c.blue)
    }
}

impl From<Srgb<u8>> for Color {
    fn from(c: Srgb<u8>) -> Self {
        Self::from_rgb8(c.red, c.green, c.blue)
    }
}

impl From<Color> for Srgb<u16> {
    fn from(c: Color) -> Self {
        let [r, g, b] = c.rgb;
        Srgb::new(r, g, b)
    }
}

impl From<Color> for Srgb<u8> {
    fn from(c: Color) -> Self {
        let [r, g, b] = c.rgb8();
        Srgb::new(r, g, b)
    }
}

impl From<image::Rgb<u16>> for Color {
    fn from(px: image::Rgb<u16>) -> Self {
        let [r, g, b] = px.0;
        Self::from_rgb16(r, g, b)
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(px: image::Rgb<u8>) -> Self {
        let [r, g, b] = px.0;
        Self::from_rgb8(r, g, b)
    }
}

impl From<Color> for image::Rgb<u16> {
    fn from(c: Color) -> Self {
        image::Rgb(c.rgb)
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(c: Color) -> Self {
        image::Rgb(c.rgb8())
    }
}
