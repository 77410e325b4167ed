//! Radar-based pullover safety decision.

use crate::pullover::radar::{RadarCallback, RadarDetection, RadarSensor, SensorError};
use crate::pullover::ransac::{PlaneFitter, RansacPlaneFitter};
use crate::pullover::PulloverConfig;
use crate::vehicle::PulloverAssessor;
use nalgebra::Point3;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Decides whether pulling over is safe from the latest radar frame.
///
/// Every radar frame replaces the cached point set. The decision fits a
/// plane (guardrail or road boundary) to a snapshot of that set and fails
/// closed: too few points, no plane, too few inliers or a low inlier ratio
/// all mean "not safe".
pub struct SafePulloverChecker<F: PlaneFitter = RansacPlaneFitter> {
    config: PulloverConfig,
    fitter: F,
    latest: Arc<Mutex<Vec<Point3<f32>>>>,
    sensor: Mutex<Option<Box<dyn RadarSensor>>>,
}

impl SafePulloverChecker<RansacPlaneFitter> {
    /// Checker using the bundled RANSAC fitter, with no sensor attached.
    pub fn new(config: PulloverConfig) -> Self {
        Self::with_fitter(RansacPlaneFitter::default(), config)
    }
}

impl<F: PlaneFitter> SafePulloverChecker<F> {
    pub fn with_fitter(fitter: F, config: PulloverConfig) -> Self {
        Self {
            config,
            fitter,
            latest: Arc::new(Mutex::new(Vec::new())),
            sensor: Mutex::new(None),
        }
    }

    /// Subscribe to `sensor`. A sensor that refuses the subscription leaves
    /// the checker without data, which keeps every decision "not safe".
    pub fn attach(self, mut sensor: impl RadarSensor + 'static) -> Self {
        let latest = Arc::clone(&self.latest);
        let callback: RadarCallback = Arc::new(move |frame: &[RadarDetection]| {
            store_frame(&latest, frame);
        });

        match sensor.listen(callback) {
            Ok(()) => *self.sensor.lock() = Some(Box::new(sensor)),
            Err(e) => warn!(error = %e, "radar subscription failed, pullover will be reported unsafe"),
        }
        self
    }

    /// Replace the cached points with one frame of detections.
    pub fn ingest(&self, frame: &[RadarDetection]) {
        store_frame(&self.latest, frame);
    }

    /// Copy of the cached points.
    pub fn latest_points(&self) -> Vec<Point3<f32>> {
        self.latest.lock().clone()
    }

    pub fn config(&self) -> &PulloverConfig {
        &self.config
    }

    pub fn fitter(&self) -> &F {
        &self.fitter
    }

    pub fn is_attached(&self) -> bool {
        self.sensor.lock().is_some()
    }

    /// Decide whether the roadside is clear enough to pull over.
    pub fn is_pullover_safe(&self) -> bool {
        let points = self.latest_points();

        if points.len() < self.config.min_inliers {
            debug!(
                points = points.len(),
                min_inliers = self.config.min_inliers,
                "not enough radar points"
            );
            return false;
        }

        let Some(fit) = self.fitter.fit(
            &points,
            self.config.inlier_dist_thresh,
            self.config.ransac_max_trials,
        ) else {
            debug!(points = points.len(), "plane fitting failed");
            return false;
        };

        let ratio = fit.inlier_ratio();
        debug!(
            inliers = fit.num_inliers,
            points = fit.num_points,
            ratio,
            distance = fit.mean_distance,
            "plane fitted"
        );

        if fit.num_inliers < self.config.min_inliers {
            debug!(inliers = fit.num_inliers, "not enough inliers");
            return false;
        }
        if ratio < self.config.min_inlier_ratio {
            debug!(ratio, "inlier ratio too low");
            return false;
        }

        true
    }

    /// Stop the radar subscription. Stop failures are logged and ignored;
    /// calling `destroy` again is a no-op.
    pub fn destroy(&self) {
        let Some(mut sensor) = self.sensor.lock().take() else {
            return;
        };
        if let Err(e) = sensor.stop() {
            match e {
                SensorError::AlreadyStopped => debug!("radar sensor already stopped"),
                other => warn!(error = %other, "failed to stop radar sensor"),
            }
        }
    }
}

impl<F: PlaneFitter> PulloverAssessor for SafePulloverChecker<F> {
    fn is_pullover_safe(&self) -> bool {
        Self::is_pullover_safe(self)
    }
}

impl<F: PlaneFitter> Drop for SafePulloverChecker<F> {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn store_frame(latest: &Mutex<Vec<Point3<f32>>>, frame: &[RadarDetection]) {
    let points: Vec<Point3<f32>> = frame.iter().map(RadarDetection::to_point).collect();
    *latest.lock() = points;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pullover::radar::SimulatedRadar;
    use crate::pullover::ransac::PlaneFit;
    use nalgebra::Vector3;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedFitter {
        calls: AtomicUsize,
        inliers: Option<usize>,
    }

    impl ScriptedFitter {
        fn reporting(inliers: Option<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                inliers,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PlaneFitter for ScriptedFitter {
        fn fit(&self, points: &[Point3<f32>], _threshold: f32, _trials: usize) -> Option<PlaneFit> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inliers.map(|num_inliers| PlaneFit {
                normal: Vector3::y(),
                offset: -2.0,
                num_inliers,
                num_points: points.len(),
                mean_distance: 0.1,
            })
        }
    }

    fn frame(len: usize) -> Vec<RadarDetection> {
        (0..len)
            .map(|i| RadarDetection {
                depth: 5.0 + i as f32,
                azimuth: 0.1 * i as f32,
                altitude: 0.0,
                velocity: 0.0,
            })
            .collect()
    }

    #[test]
    fn too_few_points_fail_without_fitting() {
        let checker =
            SafePulloverChecker::with_fitter(ScriptedFitter::reporting(Some(19)), PulloverConfig::default());
        checker.ingest(&frame(19));

        assert!(!checker.is_pullover_safe());
        assert_eq!(checker.fitter().calls(), 0);
    }

    #[test]
    fn empty_cache_is_unsafe() {
        let checker = SafePulloverChecker::new(PulloverConfig::default());
        assert!(checker.latest_points().is_empty());
        assert!(!checker.is_pullover_safe());
    }

    #[test]
    fn enough_inliers_and_ratio_is_safe() {
        let checker =
            SafePulloverChecker::with_fitter(ScriptedFitter::reporting(Some(25)), PulloverConfig::default());
        checker.ingest(&frame(30));

        assert!(checker.is_pullover_safe());
        assert_eq!(checker.fitter().calls(), 1);
    }

    #[test]
    fn too_few_inliers_is_unsafe() {
        let checker =
            SafePulloverChecker::with_fitter(ScriptedFitter::reporting(Some(18)), PulloverConfig::default());
        checker.ingest(&frame(30));

        assert!(!checker.is_pullover_safe());
    }

    #[test]
    fn low_inlier_ratio_is_unsafe() {
        let checker =
            SafePulloverChecker::with_fitter(ScriptedFitter::reporting(Some(22)), PulloverConfig::default());
        checker.ingest(&frame(40));

        assert!(!checker.is_pullover_safe());
    }

    #[test]
    fn missing_plane_is_unsafe() {
        let checker =
            SafePulloverChecker::with_fitter(ScriptedFitter::reporting(None), PulloverConfig::default());
        checker.ingest(&frame(30));

        assert!(!checker.is_pullover_safe());
        assert_eq!(checker.fitter().calls(), 1);
    }

    #[test]
    fn each_frame_replaces_the_previous_one() {
        let radar = SimulatedRadar::new();
        let feed = radar.feed();
        let checker = SafePulloverChecker::new(PulloverConfig::default()).attach(radar);

        assert!(feed.deliver(&frame(30)));
        assert_eq!(checker.latest_points().len(), 30);

        assert!(feed.deliver(&frame(3)));
        let points = checker.latest_points();
        assert_eq!(points.len(), 3);
        assert!((points[0] - Point3::new(5.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn destroy_unsubscribes_and_is_idempotent() {
        let radar = SimulatedRadar::new();
        let feed = radar.feed();
        let checker = SafePulloverChecker::new(PulloverConfig::default()).attach(radar);
        assert!(checker.is_attached());

        checker.destroy();
        assert!(!checker.is_attached());
        assert!(!feed.deliver(&frame(30)));

        checker.destroy();
    }

    #[test]
    fn offline_sensor_leaves_checker_unsafe() {
        let checker =
            SafePulloverChecker::new(PulloverConfig::default()).attach(SimulatedRadar::offline());

        assert!(!checker.is_attached());
        assert!(!checker.is_pullover_safe());
    }
}
