//! Raw RGB channels → Lab-like perceptual coordinates.
//!
//! Every function here is pure. The whole pipeline runs once per sampled
//! pixel when a [`Color`](crate::Color) is built, never per comparison.

/// Largest raw channel value (16 bits per channel).
pub const CHANNEL_MAX: u16 = u16::MAX;

/// Reference white used for the XYZ → Lab remap (D65-like).
pub const WHITE_REFERENCE: [f64; 3] = [0.95047, 1.00000, 1.08883];

const LAB_EPSILON: f64 = (6.0 / 29.0) * (6.0 / 29.0) * (6.0 / 29.0);

/// Transfer function with a linear toe below `0.0031308` and a
/// `1/2.4` power segment above it.
#[inline]
pub fn delinearize(v: f64) -> f64 {
    if v <= 0.0031308 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// Mix three transferred channels into XYZ using the sRGB primaries.
#[inline]
pub fn linear_rgb_to_xyz(r: f64, g: f64, b: f64) -> [f64; 3] {
    [
        0.41239079926595948 * r + 0.35758433938387796 * g + 0.18048078840183429 * b,
        0.21263900587151036 * r + 0.71516867876775593 * g + 0.072192315360733715 * b,
        0.019330818715591851 * r + 0.11919477979462599 * g + 0.95053215224966058 * b,
    ]
}

#[inline]
fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        t / 3.0 * (29.0 / 6.0) * (29.0 / 6.0) + 4.0 / 29.0
    }
}

/// Remap XYZ to `[L, A, B]` relative to [`WHITE_REFERENCE`].
///
/// Lightness lands in `0.0..=1.0` for in-gamut input, not the 0–100 scale
/// CIELAB is usually quoted in.
#[inline]
pub fn xyz_to_lab(x: f64, y: f64, z: f64) -> [f64; 3] {
    let fy = lab_f(y / WHITE_REFERENCE[1]);
    let fx = lab_f(x / WHITE_REFERENCE[0]);
    let fz = lab_f(z / WHITE_REFERENCE[2]);
    [1.16 * fy - 0.16, 5.0 * (fx - fy), 2.0 * (fy - fz)]
}

/// Full pipeline for one 16-bit RGB triple.
pub fn rgb16_to_lab(rgb: [u16; 3]) -> [f64; 3] {
    let max = f64::from(CHANNEL_MAX);
    let [r, g, b] = rgb.map(|c| delinearize(f64::from(c) / max));
    let [x, y, z] = linear_rgb_to_xyz(r, g, b);
    xyz_to_lab(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn delinearize_endpoints_and_toe() {
        assert_eq!(delinearize(0.0), 0.0);
        assert!(close(delinearize(1.0), 1.0, 1e-12));
        assert!(close(delinearize(0.002), 12.92 * 0.002, 1e-15));
        // both segments meet at the threshold
        let below = delinearize(0.0031308);
        let above = delinearize(0.0031309);
        assert!(close(below, above, 1e-5), "{below} vs {above}");
    }

    #[test]
    fn delinearize_is_monotonic() {
        let mut previous = delinearize(0.0);
        for i in 1..=1000 {
            let next = delinearize(f64::from(i) / 1000.0);
            assert!(next > previous, "not increasing at step {i}");
            previous = next;
        }
    }

    #[test]
    fn white_maps_to_reference() {
        let [x, y, z] = linear_rgb_to_xyz(1.0, 1.0, 1.0);
        assert!(close(x, WHITE_REFERENCE[0], 1e-4), "x = {x}");
        assert!(close(y, WHITE_REFERENCE[1], 1e-4), "y = {y}");
        assert!(close(z, WHITE_REFERENCE[2], 5e-4), "z = {z}");
    }

    #[test]
    fn black_and_white_lab() {
        let [l, a, b] = rgb16_to_lab([0, 0, 0]);
        assert!(close(l, 0.0, 1e-12), "black L = {l}");
        assert!(close(a, 0.0, 1e-12));
        assert!(close(b, 0.0, 1e-12));

        let [l, a, b] = rgb16_to_lab([CHANNEL_MAX; 3]);
        assert!(close(l, 1.0, 1e-4), "white L = {l}");
        assert!(close(a, 0.0, 1e-3), "white A = {a}");
        assert!(close(b, 0.0, 1e-3), "white B = {b}");
    }

    #[test]
    fn chromatic_axes_have_expected_signs() {
        let [_, a, _] = rgb16_to_lab([CHANNEL_MAX, 0, 0]);
        assert!(a > 0.0, "red should sit on +A, got {a}");
        let [_, a, _] = rgb16_to_lab([0, CHANNEL_MAX, 0]);
        assert!(a < 0.0, "green should sit on -A, got {a}");
        let [_, _, b] = rgb16_to_lab([0, 0, CHANNEL_MAX]);
        assert!(b < 0.0, "blue should sit on -B, got {b}");
    }

    #[test]
    fn conversion_is_pure() {
        let rgb = [12_345, 40_000, 777];
        assert_eq!(rgb16_to_lab(rgb), rgb16_to_lab(rgb));
    }
}
