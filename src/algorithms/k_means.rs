use super::Error;
use crate::Bounds;
use crate::Clusterer;
use crate::Point2D;
use crate::RunInfo;

/// # K-means clustering
///
/// Groups points around `part_count` centroids, placed at random within
/// `bounds` and then moved to the mean of their points until they settle.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), kmeans2d::Error> {
/// use kmeans2d::Partition as _;
/// use kmeans2d::Point2D;
/// use rand::SeedableRng as _;
///
/// let points = [
///     Point2D::new(-0.9, -0.9),
///     Point2D::new(-0.8, -0.9),
///     Point2D::new(0.8, 0.9),
///     Point2D::new(0.9, 0.9),
/// ];
/// let mut partition = [0; 4];
///
/// let rng = rand_pcg::Pcg64::seed_from_u64(5);
/// let info = kmeans2d::KMeans::new(2, rng).partition(&mut partition, &points[..])?;
///
/// assert!(info.converged);
/// assert_eq!(partition[0], partition[1]);
/// assert_eq!(partition[2], partition[3]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct KMeans<R> {
    pub part_count: usize,
    pub max_iter: usize,
    pub bounds: Bounds,
    pub rng: R,
}

impl<R> KMeans<R> {
    /// Settings with at most 100 iterations over the `[-1, 1]²` square.
    pub fn new(part_count: usize, rng: R) -> Self {
        Self {
            part_count,
            max_iter: 100,
            bounds: Bounds::default(),
            rng,
        }
    }
}

impl<'a, R> crate::Partition<&'a [Point2D]> for KMeans<R>
where
    R: rand::Rng,
{
    type Metadata = RunInfo;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        points: &'a [Point2D],
    ) -> Result<Self::Metadata, Self::Error> {
        if part_ids.len() != points.len() {
            return Err(Error::InputLenMismatch {
                expected: part_ids.len(),
                actual: points.len(),
            });
        }
        if points.is_empty() {
            return Ok(RunInfo::skip());
        }

        let mut clusterer = Clusterer::new(self.part_count, self.bounds, &mut self.rng)?;
        for point in points {
            clusterer.add_data_point(*point);
        }
        let info = clusterer.train(self.max_iter)?;

        // The last update pass may have moved centroids; label points against
        // the final ones.
        clusterer.assign_clusters();
        for (part_id, point) in part_ids.iter_mut().zip(clusterer.data_points()) {
            // train() initializes centroids, so every point is assigned.
            *part_id = point.cluster.unwrap_or(0);
        }

        Ok(info)
    }
}
