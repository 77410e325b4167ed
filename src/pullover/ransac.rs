//! Plane fitting over radar point clouds.

use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

/// Result of a successful plane fit.
///
/// The plane is `normal · p + offset = 0` with a unit `normal`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneFit {
    pub normal: Vector3<f32>,
    pub offset: f32,
    pub num_inliers: usize,
    pub num_points: usize,
    /// Mean absolute distance of the inliers to the plane
    pub mean_distance: f32,
}

impl PlaneFit {
    pub fn inlier_ratio(&self) -> f32 {
        if self.num_points == 0 {
            0.0
        } else {
            self.num_inliers as f32 / self.num_points as f32
        }
    }

    pub fn distance(&self, point: &Point3<f32>) -> f32 {
        (self.normal.dot(&point.coords) + self.offset).abs()
    }
}

/// Plane-fit procedure used by the pullover checker.
pub trait PlaneFitter: Send + Sync {
    /// Fit a plane to `points`. `None` means no plane was found.
    fn fit(
        &self,
        points: &[Point3<f32>],
        inlier_threshold: f32,
        max_trials: usize,
    ) -> Option<PlaneFit>;
}

/// RANSAC over random three-point samples.
///
/// Keeps the candidate with the most inliers, breaking ties by the smaller
/// mean inlier distance. Degenerate (collinear) samples are skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RansacPlaneFitter {
    /// RNG seed for deterministic fits. None = random.
    pub seed: Option<u64>,
}

impl RansacPlaneFitter {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl PlaneFitter for RansacPlaneFitter {
    fn fit(
        &self,
        points: &[Point3<f32>],
        inlier_threshold: f32,
        max_trials: usize,
    ) -> Option<PlaneFit> {
        if points.len() < 3 {
            return None;
        }

        let mut rng = self.rng();
        let mut best: Option<PlaneFit> = None;

        for _ in 0..max_trials {
            let sample = index::sample(&mut rng, points.len(), 3);
            let Some((normal, offset)) = plane_through(
                &points[sample.index(0)],
                &points[sample.index(1)],
                &points[sample.index(2)],
            ) else {
                continue;
            };

            let candidate = score(points, normal, offset, inlier_threshold);
            let better = match &best {
                None => true,
                Some(current) => {
                    candidate.num_inliers > current.num_inliers
                        || (candidate.num_inliers == current.num_inliers
                            && candidate.mean_distance < current.mean_distance)
                }
            };
            if better {
                best = Some(candidate);
            }
        }

        best.filter(|fit| fit.num_inliers > 0)
    }
}

fn plane_through(
    a: &Point3<f32>,
    b: &Point3<f32>,
    c: &Point3<f32>,
) -> Option<(Vector3<f32>, f32)> {
    let normal = (b - a).cross(&(c - a));
    let length = normal.norm();
    if length < 1e-6 {
        return None;
    }
    let normal = normal / length;
    Some((normal, -normal.dot(&a.coords)))
}

fn score(points: &[Point3<f32>], normal: Vector3<f32>, offset: f32, threshold: f32) -> PlaneFit {
    let mut num_inliers = 0;
    let mut total_distance = 0.0;
    for point in points {
        let distance = (normal.dot(&point.coords) + offset).abs();
        if distance <= threshold {
            num_inliers += 1;
            total_distance += distance;
        }
    }

    PlaneFit {
        normal,
        offset,
        num_inliers,
        num_points: points.len(),
        mean_distance: if num_inliers == 0 {
            0.0
        } else {
            total_distance / num_inliers as f32
        },
    }
}
