//! Iterative k-means clustering of 2D points.
//!
//! The [`Clusterer`] alternates two passes until no centroid moves:
//!
//! 1. assignment: every point is labelled with its nearest centroid,
//! 2. update: every centroid moves to the mean of its points.
//!
//! Clusters that end up with no point are reseeded onto a random point of the
//! dataset instead of being left in place.

use crate::color::random_palette;
use crate::Bounds;
use crate::Color;
use crate::Error;
use crate::Point2D;
use crate::RunInfo;
use itertools::Itertools as _;
use rand::seq::SliceRandom as _;
use rand::Rng;

/// Distance under which a centroid is considered not to have moved.
pub const TOLERANCE: f64 = 1e-6;

/// A point of the dataset, along with its current assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub position: Point2D,

    /// Index of the centroid this point belongs to, `None` until the first
    /// assignment pass.
    pub cluster: Option<usize>,

    /// Display color of the point's cluster. Never read by the algorithm.
    pub color: Color,
}

impl DataPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self::from(Point2D::new(x, y))
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        (self.position - other).norm()
    }
}

impl From<Point2D> for DataPoint {
    fn from(position: Point2D) -> Self {
        Self {
            position,
            cluster: None,
            color: Color::WHITE,
        }
    }
}

/// K-means engine over a growable set of 2D points.
///
/// The number of clusters and the sampling bounds are fixed at construction.
/// All randomness (centroid placement, empty cluster reseeding, colors) is
/// drawn from the given `rng`.
///
/// # Example
///
/// ```rust
/// use kmeans2d::{Bounds, Clusterer, DataPoint};
/// use rand::SeedableRng as _;
///
/// # fn main() -> Result<(), kmeans2d::Error> {
/// let rng = rand_pcg::Pcg64::seed_from_u64(42);
/// let mut clusterer = Clusterer::new(2, Bounds::default(), rng)?;
///
/// for (x, y) in [(-0.8, -0.8), (-0.7, -0.8), (0.7, 0.8), (0.8, 0.8)] {
///     clusterer.add_data_point(DataPoint::new(x, y));
/// }
/// let run = clusterer.train(100)?;
///
/// assert!(run.converged);
/// assert_eq!(clusterer.centroids().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Clusterer<R> {
    k: usize,
    bounds: Bounds,
    points: Vec<DataPoint>,
    centroids: Vec<Point2D>,
    colors: Vec<Color>,
    rng: R,
}

impl<R> Clusterer<R>
where
    R: Rng,
{
    /// Creates an engine with `k` clusters and no data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidClusterCount`] if `k` is zero.
    pub fn new(k: usize, bounds: Bounds, mut rng: R) -> Result<Self, Error> {
        if k == 0 {
            return Err(Error::InvalidClusterCount);
        }
        let colors = random_palette(&mut rng, k);
        Ok(Self {
            k,
            bounds,
            points: Vec::new(),
            centroids: Vec::new(),
            colors,
            rng,
        })
    }

    /// Appends a point to the dataset.
    ///
    /// The point is left unassigned until the next assignment pass.
    pub fn add_data_point(&mut self, point: impl Into<DataPoint>) {
        let point = point.into();
        self.points.push(DataPoint::from(point.position));
    }

    /// Places `k` centroids uniformly at random within the bounds, then
    /// assigns every point to one of them.
    pub fn initialize_centroids_randomly(&mut self) {
        self.centroids.clear();
        self.centroids.reserve(self.k);
        for _ in 0..self.k {
            let centroid = self.bounds.sample(&mut self.rng);
            self.centroids.push(centroid);
        }

        self.assign_clusters();
    }

    /// Replaces the centroids with the given ones.
    ///
    /// Points are not reassigned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputLenMismatch`] if there are not exactly `k`
    /// centroids.
    pub fn set_centroids(&mut self, centroids: Vec<Point2D>) -> Result<(), Error> {
        if centroids.len() != self.k {
            return Err(Error::InputLenMismatch {
                expected: self.k,
                actual: centroids.len(),
            });
        }
        self.centroids = centroids;
        Ok(())
    }

    /// Labels every point with its nearest centroid and colors it
    /// accordingly.
    ///
    /// On exact distance ties, the centroid with the lowest index wins. Does
    /// nothing before the centroids have been initialized.
    pub fn assign_clusters(&mut self) {
        let centroids = &self.centroids;
        let colors = &self.colors;
        for point in &mut self.points {
            let nearest = centroids
                .iter()
                .map(|centroid| point.distance_to(centroid))
                .position_min_by(f64::total_cmp);
            if let Some(cluster) = nearest {
                point.cluster = Some(cluster);
                point.color = colors[cluster];
            }
        }
    }

    /// Moves every centroid to the mean of the points assigned to it.
    ///
    /// A centroid with no assigned point is moved onto a point of the dataset
    /// chosen uniformly at random. It is left in place when the dataset is
    /// empty.
    ///
    /// Returns `true` if a centroid moved farther than [`TOLERANCE`] or was
    /// reseeded, `false` once the clustering has converged.
    pub fn update_centroids(&mut self) -> bool {
        let mut sums = vec![Point2D::zeros(); self.centroids.len()];
        let mut counts = vec![0_usize; self.centroids.len()];
        for point in &self.points {
            if let Some(cluster) = point.cluster {
                sums[cluster] += point.position;
                counts[cluster] += 1;
            }
        }

        let mut changed = false;
        for (cluster, ((centroid, sum), count)) in self
            .centroids
            .iter_mut()
            .zip(sums)
            .zip(counts)
            .enumerate()
        {
            if count > 0 {
                let mean = sum / count as f64;
                if (mean - *centroid).norm() > TOLERANCE {
                    changed = true;
                }
                *centroid = mean;
            } else if let Some(seed) = self.points.choose(&mut self.rng) {
                tracing::debug!(cluster, "reseeding empty cluster");
                *centroid = seed.position;
                changed = true;
            } else {
                tracing::warn!(cluster, "empty cluster left in place, no point to reseed from");
            }
        }

        changed
    }

    /// Runs one assignment pass followed by one update pass.
    ///
    /// Returns `false` once the clustering has converged, see
    /// [`Clusterer::update_centroids`].
    pub fn iterate(&mut self) -> bool {
        self.assign_clusters();
        self.update_centroids()
    }

    /// Iterates until convergence, or until `max_iterations` iterations have
    /// been run.
    ///
    /// Centroids are initialized randomly first if they have not been yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoData`] if the dataset is empty.
    pub fn train(&mut self, max_iterations: usize) -> Result<RunInfo, Error> {
        if self.points.is_empty() {
            return Err(Error::NoData);
        }

        let span = tracing::info_span!(
            "k-means training",
            k = self.k,
            point_count = self.points.len()
        );
        let _enter = span.enter();

        if self.centroids.is_empty() {
            self.initialize_centroids_randomly();
        }

        let mut info = RunInfo::default();
        for iteration in 1..=max_iterations {
            let changed = self.iterate();
            info.iterations = iteration;
            tracing::debug!(iteration, changed);
            if !changed {
                info.converged = true;
                tracing::info!("converged after {iteration} iterations");
                return Ok(info);
            }
        }

        tracing::info!("stopped after {max_iterations} iterations without converging");
        Ok(info)
    }

    /// Removes every point and centroid and draws new cluster colors.
    ///
    /// The number of clusters and the bounds are kept.
    pub fn reset(&mut self) {
        self.points.clear();
        self.centroids.clear();
        self.colors = random_palette(&mut self.rng, self.k);
    }
}

impl<R> Clusterer<R> {
    pub fn data_points(&self) -> &[DataPoint] {
        &self.points
    }

    /// Centroid positions, empty until initialization.
    pub fn centroids(&self) -> &[Point2D] {
        &self.centroids
    }

    /// Display color of each cluster.
    pub fn cluster_colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Sum of the squared distances between assigned points and their
    /// centroid.
    pub fn inertia(&self) -> f64 {
        self.points
            .iter()
            .filter_map(|point| {
                let centroid = self.centroids.get(point.cluster?)?;
                Some((point.position - centroid).norm_squared())
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use approx::assert_ulps_eq;
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    fn clusterer(k: usize) -> Clusterer<Pcg64> {
        Clusterer::new(k, Bounds::default(), Pcg64::seed_from_u64(1)).unwrap()
    }

    #[test]
    fn test_zero_clusters() {
        let result = Clusterer::new(0, Bounds::default(), Pcg64::seed_from_u64(1));
        assert_eq!(result.err(), Some(Error::InvalidClusterCount));
    }

    #[test]
    fn test_new() {
        let clusterer = clusterer(4);

        assert_eq!(clusterer.k(), 4);
        assert_eq!(clusterer.cluster_colors().len(), 4);
        assert!(clusterer.centroids().is_empty());
        assert!(clusterer.data_points().is_empty());
    }

    #[test]
    fn test_add_data_point_is_unassigned() {
        let mut clusterer = clusterer(2);
        let mut point = DataPoint::new(0.5, 0.25);
        point.cluster = Some(1);
        point.color = Color::new(1, 2, 3);

        clusterer.add_data_point(point);
        clusterer.add_data_point(Point2D::new(-0.5, 0.0));

        let points = clusterer.data_points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], DataPoint::new(0.5, 0.25));
        assert_eq!(points[1].cluster, None);
        assert_eq!(points[1].color, Color::WHITE);
    }

    #[test]
    fn test_initialize_centroids_randomly() {
        let mut clusterer = clusterer(7);
        for i in 0..20 {
            clusterer.add_data_point(DataPoint::new(i as f64 / 20.0, 0.0));
        }

        for _ in 0..3 {
            clusterer.initialize_centroids_randomly();

            assert_eq!(clusterer.centroids().len(), 7);
            assert!(clusterer
                .centroids()
                .iter()
                .all(|c| clusterer.bounds().contains(c)));
            assert!(clusterer
                .data_points()
                .iter()
                .all(|p| matches!(p.cluster, Some(c) if c < 7)));
        }
    }

    #[test]
    fn test_assign_before_initialization() {
        let mut clusterer = clusterer(3);
        clusterer.add_data_point(DataPoint::new(0.0, 0.0));

        clusterer.assign_clusters();

        assert_eq!(clusterer.data_points()[0].cluster, None);
        assert!(!clusterer.update_centroids());
    }

    #[test]
    fn test_assign_tie_break() {
        let mut clusterer = clusterer(3);
        clusterer
            .set_centroids(vec![
                Point2D::new(1.0, 0.0),
                Point2D::new(-1.0, 0.0),
                Point2D::new(0.0, 1.0),
            ])
            .unwrap();
        clusterer.add_data_point(DataPoint::new(0.0, 0.0));
        clusterer.add_data_point(DataPoint::new(-1.0, 1.0));

        clusterer.assign_clusters();

        let points = clusterer.data_points();
        assert_eq!(points[0].cluster, Some(0));
        assert_eq!(points[1].cluster, Some(1));
        assert_eq!(points[0].color, clusterer.cluster_colors()[0]);
        assert_eq!(points[1].color, clusterer.cluster_colors()[1]);
    }

    #[test]
    fn test_set_centroids_len_mismatch() {
        let mut clusterer = clusterer(2);
        assert_eq!(
            clusterer.set_centroids(vec![Point2D::zeros()]),
            Err(Error::InputLenMismatch {
                expected: 2,
                actual: 1
            }),
        );
    }

    #[test]
    fn test_single_cluster_converges_in_one_iteration() {
        let mut clusterer = clusterer(1);
        for (x, y) in [(0.1, 0.2), (-0.4, 0.6), (0.9, -0.3), (0.0, 0.5)] {
            clusterer.add_data_point(DataPoint::new(x, y));
        }
        clusterer.set_centroids(vec![Point2D::new(-1.0, -1.0)]).unwrap();

        assert!(clusterer.iterate());
        assert_relative_eq!(
            clusterer.centroids()[0],
            Point2D::new(0.15, 0.25),
            epsilon = 1e-12
        );
        assert!(!clusterer.iterate());
    }

    #[test]
    fn test_update_converged() {
        let mut clusterer = clusterer(2);
        for (x, y) in [(-1.0, 0.0), (-0.5, 0.0), (0.5, 0.0), (1.0, 0.0)] {
            clusterer.add_data_point(DataPoint::new(x, y));
        }
        clusterer
            .set_centroids(vec![Point2D::new(-0.75, 0.0), Point2D::new(0.75, 0.0)])
            .unwrap();

        clusterer.assign_clusters();

        assert!(!clusterer.update_centroids());
        assert_ulps_eq!(clusterer.centroids()[0], Point2D::new(-0.75, 0.0));
        assert_ulps_eq!(clusterer.centroids()[1], Point2D::new(0.75, 0.0));
    }

    #[test]
    fn test_update_below_tolerance() {
        let mut clusterer = clusterer(1);
        clusterer.add_data_point(DataPoint::new(0.5, 0.5));
        clusterer
            .set_centroids(vec![Point2D::new(0.5 + TOLERANCE / 2.0, 0.5)])
            .unwrap();

        clusterer.assign_clusters();

        assert!(!clusterer.update_centroids());
        assert_eq!(clusterer.centroids()[0], Point2D::new(0.5, 0.5));
    }

    #[test]
    fn test_empty_cluster_is_reseeded() {
        let mut clusterer = clusterer(2);
        for (x, y) in [(0.0, 0.0), (0.1, 0.0), (0.0, 0.1)] {
            clusterer.add_data_point(DataPoint::new(x, y));
        }
        clusterer
            .set_centroids(vec![Point2D::new(0.0, 0.0), Point2D::new(0.9, 0.9)])
            .unwrap();

        clusterer.assign_clusters();
        assert!(clusterer
            .data_points()
            .iter()
            .all(|p| p.cluster == Some(0)));

        assert!(clusterer.update_centroids());
        let reseeded = clusterer.centroids()[1];
        assert!(clusterer
            .data_points()
            .iter()
            .any(|p| p.position == reseeded));
    }

    #[test]
    fn test_reseed_in_place_counts_as_change() {
        let mut clusterer = clusterer(2);
        clusterer.add_data_point(DataPoint::new(0.0, 0.0));
        clusterer
            .set_centroids(vec![Point2D::zeros(), Point2D::zeros()])
            .unwrap();

        clusterer.assign_clusters();
        assert_eq!(clusterer.data_points()[0].cluster, Some(0));

        // Cluster 1 is empty and lands back where it was.
        assert!(clusterer.update_centroids());
        assert_eq!(clusterer.centroids(), &[Point2D::zeros(), Point2D::zeros()]);
    }

    #[test]
    fn test_empty_cluster_without_data() {
        let mut clusterer = clusterer(2);
        let centroids = vec![Point2D::new(0.2, 0.2), Point2D::new(-0.3, 0.4)];
        clusterer.set_centroids(centroids.clone()).unwrap();

        assert!(!clusterer.iterate());
        assert_eq!(clusterer.centroids(), &centroids[..]);
    }

    #[test]
    fn test_train_without_data() {
        let mut clusterer = clusterer(3);
        assert_eq!(clusterer.train(10), Err(Error::NoData));
        assert!(clusterer.centroids().is_empty());
    }

    #[test]
    fn test_train_initializes_centroids() {
        let mut clusterer = clusterer(3);
        let mut rng = Pcg64::seed_from_u64(2);
        for point in crate::uniform_points(&mut rng, &Bounds::default(), 50) {
            clusterer.add_data_point(point);
        }

        let info = clusterer.train(0).unwrap();

        assert_eq!(info, RunInfo::default());
        assert_eq!(clusterer.centroids().len(), 3);
        assert!(clusterer.data_points().iter().all(|p| p.cluster.is_some()));
    }

    #[test]
    fn test_train_stops_at_cap() {
        let mut clusterer = clusterer(1);
        clusterer.add_data_point(DataPoint::new(0.5, 0.5));
        clusterer.set_centroids(vec![Point2D::new(-0.5, -0.5)]).unwrap();

        let info = clusterer.train(1).unwrap();
        assert_eq!(
            info,
            RunInfo {
                iterations: 1,
                converged: false
            }
        );

        let info = clusterer.train(10).unwrap();
        assert_eq!(
            info,
            RunInfo {
                iterations: 1,
                converged: true
            }
        );
    }

    #[test]
    fn test_reset() {
        let mut clusterer = clusterer(5);
        let mut rng = Pcg64::seed_from_u64(3);
        for point in crate::uniform_points(&mut rng, &Bounds::default(), 30) {
            clusterer.add_data_point(point);
        }
        clusterer.train(50).unwrap();

        clusterer.reset();

        assert!(clusterer.data_points().is_empty());
        assert!(clusterer.centroids().is_empty());
        assert_eq!(clusterer.cluster_colors().len(), 5);
        assert_eq!(clusterer.k(), 5);
        assert_eq!(clusterer.bounds(), &Bounds::default());
    }

    #[test]
    fn test_inertia() {
        let mut clusterer = clusterer(2);
        for (x, y) in [(-1.0, 0.0), (-0.5, 0.0), (0.5, 0.0), (1.0, 0.0)] {
            clusterer.add_data_point(DataPoint::new(x, y));
        }
        assert_eq!(clusterer.inertia(), 0.0);

        clusterer
            .set_centroids(vec![Point2D::new(-0.75, 0.0), Point2D::new(0.75, 0.0)])
            .unwrap();
        clusterer.assign_clusters();

        assert_ulps_eq!(clusterer.inertia(), 0.25);
    }

    proptest!(
        #[test]
        fn test_assignment_picks_first_nearest(
            centroids in prop::collection::vec((-4..=4_i32, -4..=4_i32), 1..6),
            points in prop::collection::vec((-4..=4_i32, -4..=4_i32), 0..40),
        ) {
            // Integer coordinates make exact distance ties frequent.
            let centroids: Vec<Point2D> = centroids
                .into_iter()
                .map(|(x, y)| Point2D::new(f64::from(x), f64::from(y)))
                .collect();
            let mut clusterer = Clusterer::new(
                centroids.len(),
                Bounds::new(-4.0, 4.0, -4.0, 4.0).unwrap(),
                Pcg64::seed_from_u64(0),
            )
            .unwrap();
            for (x, y) in points {
                clusterer.add_data_point(DataPoint::new(f64::from(x), f64::from(y)));
            }
            clusterer.set_centroids(centroids.clone()).unwrap();

            clusterer.assign_clusters();

            for point in clusterer.data_points() {
                let cluster = point.cluster.unwrap();
                prop_assert!(cluster < centroids.len());
                let distance = point.distance_to(&centroids[cluster]);
                for (other, centroid) in centroids.iter().enumerate() {
                    let other_distance = point.distance_to(centroid);
                    if other < cluster {
                        prop_assert!(distance < other_distance);
                    } else {
                        prop_assert!(distance <= other_distance);
                    }
                }
                prop_assert_eq!(point.color, clusterer.cluster_colors()[cluster]);
            }
        }
    );
}
