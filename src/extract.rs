//! Image → pixel samples → palette.
//!
//! Decoding and sampling live here, outside the clustering core.

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Color;
use crate::error::Result;
use crate::kmeans::{Clustering, DEFAULT_MAX_ITERATIONS, InitialSelection, KMeans};

/// Samples along the longer image side when the interval is picked automatically.
pub const AUTO_SAMPLES: u32 = 64;

/// Tuning knobs for [`extract_dominant_colors`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Read one pixel every `sampling_interval` pixels along both axes.
    /// `0` picks the interval so the longer side yields about
    /// [`AUTO_SAMPLES`] samples.
    pub sampling_interval: u32,
    pub initial_selection: InitialSelection,
    /// Only return colors that occur in the image.
    pub exact_match: bool,
    pub max_iterations: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            sampling_interval: 0,
            initial_selection: InitialSelection::Uniform,
            exact_match: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Options {
    pub fn with_sampling_interval(mut self, interval: u32) -> Self {
        self.sampling_interval = interval;
        self
    }

    pub fn with_initial_selection(mut self, selection: InitialSelection) -> Self {
        self.initial_selection = selection;
        self
    }

    pub fn with_exact_match(mut self, exact_match: bool) -> Self {
        self.exact_match = exact_match;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn kmeans(&self, count: usize) -> KMeans {
        KMeans::new(count)
            .with_selection(self.initial_selection)
            .with_exact_match(self.exact_match)
            .with_max_iterations(self.max_iterations)
    }
}

/// Extract the `count` most dominant colors of `image`, most prominent first.
///
/// For an 80-pixel image with 60 blue and 20 red pixels and `count = 2`
/// the result is `[blue, red]`.
pub fn extract_dominant_colors(
    image: &DynamicImage,
    count: usize,
    options: &Options,
) -> Result<Vec<Color>> {
    Ok(cluster_image(image, count, options)?.colors)
}

/// Like [`extract_dominant_colors`], but also reports cluster sizes and
/// whether the clustering converged.
pub fn cluster_image(image: &DynamicImage, count: usize, options: &Options) -> Result<Clustering> {
    let pixels = sample_pixels(image, options.sampling_interval);
    options.kmeans(count).run(&pixels)
}

/// Decode `input` and extract its palette as `#rrggbb` strings.
pub fn extract_palette_bytes(input: &[u8], count: usize, options: &Options) -> Result<Vec<String>> {
    let img = image::load_from_memory(input)?;
    let colors = extract_dominant_colors(&img, count, options)?;
    Ok(colors.iter().map(Color::hex).collect())
}

/// Interval that reduces the longer side to about [`AUTO_SAMPLES`] pixels.
pub fn auto_sampling_interval(width: u32, height: u32) -> u32 {
    (width.max(height) / AUTO_SAMPLES).max(1)
}

/// Read one pixel every `interval` pixels along both axes, row by row.
///
/// The grid is `width / interval` by `height / interval`; an image smaller
/// than the interval yields no samples. 16-bit images keep their full
/// precision. Alpha is dropped: `image` stores straight alpha, so the color
/// channels need no correction.
pub fn sample_pixels(image: &DynamicImage, interval: u32) -> Vec<Color> {
    let (width, height) = image.dimensions();
    let interval = if interval == 0 {
        auto_sampling_interval(width, height)
    } else {
        interval
    };
    let columns = width / interval;
    let rows = height / interval;

    let mut colors = Vec::with_capacity((columns * rows) as usize);
    if has_wide_channels(image) {
        let buf = image.to_rgba16();
        for y in 0..rows {
            for x in 0..columns {
                let [r, g, b, _] = buf.get_pixel(x * interval, y * interval).0;
                colors.push(Color::from_rgb16(r, g, b));
            }
        }
    } else {
        let buf = image.to_rgba8();
        for y in 0..rows {
            for x in 0..columns {
                let [r, g, b, _] = buf.get_pixel(x * interval, y * interval).0;
                colors.push(Color::from_rgb8(r, g, b));
            }
        }
    }

    debug!(width, height, interval, samples = colors.len(), "Sampled image");
    colors
}

fn has_wide_channels(image: &DynamicImage) -> bool {
    let color = image.color();
    color.bytes_per_pixel() > color.channel_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    #[test]
    fn auto_interval_targets_64_samples() {
        assert_eq!(auto_sampling_interval(640, 480), 10);
        assert_eq!(auto_sampling_interval(100, 1280), 20);
        assert_eq!(auto_sampling_interval(10, 10), 1);
        assert_eq!(auto_sampling_interval(0, 0), 1);
    }

    #[test]
    fn samples_grid_in_row_major_order() {
        let img = RgbImage::from_fn(4, 4, |x, y| Rgb([(x * 10) as u8, (y * 10) as u8, 0]));
        let samples = sample_pixels(&DynamicImage::ImageRgb8(img), 2);
        assert_eq!(
            samples,
            vec![
                Color::from_rgb8(0, 0, 0),
                Color::from_rgb8(20, 0, 0),
                Color::from_rgb8(0, 20, 0),
                Color::from_rgb8(20, 20, 0),
            ]
        );
    }

    #[test]
    fn partial_cells_are_skipped() {
        let img = RgbImage::new(5, 3);
        assert_eq!(sample_pixels(&DynamicImage::ImageRgb8(img), 2).len(), 2);
        let tiny = RgbImage::new(1, 1);
        assert!(sample_pixels(&DynamicImage::ImageRgb8(tiny), 2).is_empty());
    }

    #[test]
    fn sixteen_bit_images_keep_precision() {
        let img: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(2, 2, Rgb([1000, 1001, 1002]));
        let samples = sample_pixels(&DynamicImage::ImageRgb16(img), 1);
        assert_eq!(samples, vec![Color::from_rgb16(1000, 1001, 1002); 4]);
    }

    #[test]
    fn alpha_is_dropped() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 10]));
        let samples = sample_pixels(&DynamicImage::ImageRgba8(img), 1);
        assert_eq!(samples, vec![Color::from_rgb8(200, 100, 50)]);
    }

    #[test]
    fn options_from_partial_json() {
        let options: Options =
            serde_json::from_str(r#"{"exact_match":true,"sampling_interval":4}"#).unwrap();
        assert_eq!(
            options,
            Options::default().with_exact_match(true).with_sampling_interval(4)
        );
    }

    #[test]
    fn decode_errors_surface() {
        let err = extract_palette_bytes(b"garbage", 3, &Options::default()).unwrap_err();
        assert!(matches!(err, crate::Error::Decode(_)));
    }
}
