//! K-means over [`Color`]s in the perceptual space.
//!
//! One iteration is a pure step from the current centroids to the next ones:
//! every pixel is assigned to its nearest centroid, a fresh [`Accumulator`]
//! collects channel sums and counts, and the means become the new centroids.
//! The loop stops as soon as a step reproduces its input exactly.

use std::cmp::Reverse;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::color::Color;
use crate::error::{Error, Result};

/// Iteration cap used unless [`KMeans::with_max_iterations`] says otherwise.
pub const DEFAULT_MAX_ITERATIONS: usize = 300;

/// How the first centroids are picked from the pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InitialSelection {
    /// Every `len / count`-th pixel, starting at the first one.
    /// Same pixels in, same palette out.
    #[default]
    Uniform,
    /// `count` distinct pixels drawn uniformly from the whole input.
    ///
    /// **Non-deterministic** unless a `seed` is given.
    Random {
        #[serde(default)]
        seed: Option<u64>,
    },
}

/// Whether the run reached a fixed point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Convergence {
    /// The last iteration reproduced its input centroids exactly.
    Converged,
    /// The iteration cap was hit; the palette is the latest estimate.
    IterationLimit,
}

/// Outcome of a clustering run, most populous cluster first.
#[derive(Clone, Debug, PartialEq)]
pub struct Clustering {
    /// Exactly `count` centroids.
    pub colors: Vec<Color>,
    /// Pixels assigned to each entry of `colors` in the last assignment pass.
    pub counts: Vec<usize>,
    pub iterations: usize,
    pub status: Convergence,
}

impl Clustering {
    pub fn is_converged(&self) -> bool {
        self.status == Convergence::Converged
    }
}

/// K-means configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KMeans {
    count: usize,
    selection: InitialSelection,
    exact_match: bool,
    max_iterations: usize,
}

impl KMeans {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            selection: InitialSelection::Uniform,
            exact_match: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_selection(mut self, selection: InitialSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Snap every centroid to the input pixel closest to the cluster mean,
    /// so the palette only contains colors that occur in the input.
    pub fn with_exact_match(mut self, exact_match: bool) -> Self {
        self.exact_match = exact_match;
        self
    }

    /// Values below 1 are treated as 1.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Cluster `pixels` into `count` colors.
    ///
    /// Fails with [`Error::EmptyInput`] for no pixels and with
    /// [`Error::InvalidConfiguration`] unless `1 <= count <= pixels.len()`.
    /// When `count` exceeds the number of distinct colors the palette may
    /// contain duplicates.
    pub fn run(&self, pixels: &[Color]) -> Result<Clustering> {
        if pixels.is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.count == 0 || self.count > pixels.len() {
            return Err(Error::InvalidConfiguration {
                count: self.count,
                available: pixels.len(),
            });
        }

        let max_iterations = self.max_iterations.max(1);
        let mut centroids = self.initial_centroids(pixels);
        let mut iterations = 0;

        let (counts, status) = loop {
            iterations += 1;
            let accumulator = Accumulator::assign(&centroids, pixels, self.exact_match);
            let next = accumulator.update(&centroids, pixels);

            if next == centroids {
                break (accumulator.counts, Convergence::Converged);
            }

            trace!(
                iteration = iterations,
                moved = next.iter().zip(&centroids).filter(|(a, b)| a != b).count(),
                "Centroids moved"
            );
            centroids = next;

            if iterations >= max_iterations {
                warn!(iterations, "K-means did not converge, returning latest palette");
                break (accumulator.counts, Convergence::IterationLimit);
            }
        };

        // stable sort: equal counts keep centroid index order
        let mut order: Vec<usize> = (0..centroids.len()).collect();
        order.sort_by_key(|&i| Reverse(counts[i]));

        debug!(
            pixels = pixels.len(),
            count = self.count,
            exact_match = self.exact_match,
            iterations,
            ?status,
            "K-means finished"
        );

        Ok(Clustering {
            colors: order.iter().map(|&i| centroids[i]).collect(),
            counts: order.iter().map(|&i| counts[i]).collect(),
            iterations,
            status,
        })
    }

    fn initial_centroids(&self, pixels: &[Color]) -> Vec<Color> {
        match self.selection {
            InitialSelection::Uniform => {
                let step = pixels.len() / self.count;
                (0..self.count).map(|i| pixels[i * step]).collect()
            }
            InitialSelection::Random { seed: Some(seed) } => {
                random_centroids(&mut StdRng::seed_from_u64(seed), pixels, self.count)
            }
            InitialSelection::Random { seed: None } => {
                random_centroids(&mut rand::rng(), pixels, self.count)
            }
        }
    }
}

/// Draw `count` distinct indices from the full pixel range in one pass.
fn random_centroids<R: Rng + ?Sized>(rng: &mut R, pixels: &[Color], count: usize) -> Vec<Color> {
    rand::seq::index::sample(rng, pixels.len(), count)
        .into_iter()
        .map(|i| pixels[i])
        .collect()
}

/// Index of the nearest centroid; the lowest index wins ties.
#[inline]
fn nearest(point: &Color, centroids: &[Color]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let distance = centroid.distance(point);
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

/// Per-iteration cluster state. Built from scratch by [`Accumulator::assign`].
#[derive(Debug)]
struct Accumulator {
    sums: Vec<[u64; 3]>,
    counts: Vec<usize>,
    /// Cluster of every pixel; only filled in exact-match mode.
    members: Vec<usize>,
}

impl Accumulator {
    fn assign(centroids: &[Color], pixels: &[Color], track_members: bool) -> Self {
        let mut acc = Self {
            sums: vec![[0; 3]; centroids.len()],
            counts: vec![0; centroids.len()],
            members: Vec::with_capacity(if track_members { pixels.len() } else { 0 }),
        };

        for pixel in pixels {
            let cluster = nearest(pixel, centroids);
            for (sum, channel) in acc.sums[cluster].iter_mut().zip(pixel.rgb()) {
                *sum += u64::from(channel);
            }
            acc.counts[cluster] += 1;
            if track_members {
                acc.members.push(cluster);
            }
        }
        acc
    }

    /// Next centroids. An empty cluster keeps its previous centroid.
    fn update(&self, previous: &[Color], pixels: &[Color]) -> Vec<Color> {
        let means: Vec<Color> = self
            .sums
            .iter()
            .zip(&self.counts)
            .zip(previous)
            .map(|((sum, &count), &prev)| {
                if count == 0 {
                    return prev;
                }
                // the mean of u16 values fits in a u16
                let [r, g, b] = sum.map(|s| (s / count as u64) as u16);
                Color::from_rgb16(r, g, b)
            })
            .collect();

        if self.members.is_empty() {
            return means;
        }

        let mut closest: Vec<Option<(usize, f64)>> = vec![None; means.len()];
        for (px, &cluster) in self.members.iter().enumerate() {
            let distance = means[cluster].distance(&pixels[px]);
            if closest[cluster].is_none_or(|(_, best)| distance < best) {
                closest[cluster] = Some((px, distance));
            }
        }

        closest
            .iter()
            .zip(means)
            .map(|(hit, mean)| hit.map_or(mean, |(px, _)| pixels[px]))
            .collect()
    }
}
