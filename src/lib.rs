//! Dominant color extraction.
//!
//! Pixels are sampled from an image, converted once into a Lab-like
//! perceptual space and clustered with K-means. The palette comes back
//! ordered by cluster size, most dominant color first.
//!
//! ```no_run
//! use dominant_colors::{Options, extract_dominant_colors};
//!
//! let img = image::open("photo.jpg").unwrap();
//! let palette = extract_dominant_colors(&img, 5, &Options::default()).unwrap();
//! for color in &palette {
//!     println!("{color}");
//! }
//! ```

use js_sys::Array;
use wasm_bindgen::prelude::*;

pub mod color;
pub mod convert;
pub mod error;
pub mod extract;
pub mod kmeans;

pub use color::Color;
pub use error::{Error, Result};
pub use extract::{
    Options, cluster_image, extract_dominant_colors, extract_palette_bytes, sample_pixels,
};
pub use kmeans::{Clustering, Convergence, InitialSelection, KMeans};

/// Extract the dominant colors of an encoded image.
///
/// Returns an `Array` of `#rrggbb` strings, most dominant first. A
/// `sampling_interval` of `0` picks one automatically.
#[wasm_bindgen]
pub fn dominant_colors(
    input: Vec<u8>,
    count: usize,
    sampling_interval: u32,
    exact_match: bool,
) -> std::result::Result<Array, JsValue> {
    let options = Options::default()
        .with_sampling_interval(sampling_interval)
        .with_exact_match(exact_match);
    let palette = extract_palette_bytes(&input, count, &options)
        .map_err(|e| JsValue::from_str(&format!("Unable to extract colors: {e}")))?;

    let result = Array::new();
    for hex in palette {
        result.push(&JsValue::from_str(&hex));
    }
    Ok(result)
}
