//! Background eye-state detection with a cached result.

use crate::inattention::camera::CameraSource;
use crate::inattention::classifier::{EyeDetection, EyeStateClassifier};
use crate::inattention::InattentionConfig;
use crate::vehicle::AttentionMonitor;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Failed to spawn detector worker: {0}")]
    Spawn(#[from] std::io::Error),
}

struct Worker {
    handle: JoinHandle<()>,
    finished: Receiver<()>,
}

/// Decouples eye-state inference from the control tick.
///
/// [`detect`](Self::detect) never waits on the camera or the classifier: it
/// requests a new detection if none is in flight and returns the last
/// completed result. The result is `true` (inattentive) until the first
/// detection completes.
pub struct InattentionDetector {
    inattentive: Arc<Mutex<bool>>,
    pending: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    trigger: Mutex<Option<SyncSender<()>>>,
    worker: Mutex<Option<Worker>>,
    join_timeout: Duration,
}

impl InattentionDetector {
    /// Start the worker thread. The camera and classifier move onto it.
    pub fn spawn<C, M>(
        camera: C,
        classifier: M,
        config: &InattentionConfig,
    ) -> Result<Self, DetectorError>
    where
        C: CameraSource + 'static,
        M: EyeStateClassifier + 'static,
    {
        Self::spawn_with(camera, |_| classifier, config)
    }

    /// Start the worker thread with a classifier built from
    /// [`InattentionConfig::eye_threshold`].
    pub fn spawn_with<C, M, F>(
        camera: C,
        make_classifier: F,
        config: &InattentionConfig,
    ) -> Result<Self, DetectorError>
    where
        C: CameraSource + 'static,
        M: EyeStateClassifier + 'static,
        F: FnOnce(f32) -> M,
    {
        let classifier = make_classifier(config.eye_threshold);
        let inattentive = Arc::new(Mutex::new(true));
        let pending = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));
        let (trigger, triggers) = mpsc::sync_channel(1);
        let (done, finished) = mpsc::channel();

        let loop_state = DetectionLoop {
            camera,
            classifier,
            inattentive: Arc::clone(&inattentive),
            pending: Arc::clone(&pending),
            stop: Arc::clone(&stop),
            eyes_open_label: config.eyes_open_label,
            poll_interval: config.poll_interval(),
        };

        let exit = WorkerExit {
            inattentive: Arc::clone(&inattentive),
            pending: Arc::clone(&pending),
            done,
        };

        let handle = thread::Builder::new()
            .name("inattention-detector".to_string())
            .spawn(move || {
                let _exit = exit;
                loop_state.run(triggers);
            })?;

        Ok(Self {
            inattentive,
            pending,
            stop,
            trigger: Mutex::new(Some(trigger)),
            worker: Mutex::new(Some(Worker { handle, finished })),
            join_timeout: config.join_timeout(),
        })
    }

    /// Request a detection if none is in flight and return the cached result.
    ///
    /// `true` means inattentive. Repeated calls while a detection is running
    /// are coalesced into that detection.
    pub fn detect(&self) -> bool {
        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let sent = match self.trigger.lock().as_ref() {
                Some(trigger) => trigger.try_send(()),
                None => Err(TrySendError::Disconnected(())),
            };
            match sent {
                Ok(()) | Err(TrySendError::Full(())) => {}
                Err(TrySendError::Disconnected(())) => {
                    self.pending.store(false, Ordering::Release);
                }
            }
        }

        self.latest()
    }

    /// The last completed result, without requesting a new detection.
    pub fn latest(&self) -> bool {
        *self.inattentive.lock()
    }

    /// Whether a requested detection has not completed yet.
    pub fn is_detecting(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Stop the worker and release the camera.
    ///
    /// Waits up to the configured join timeout. A worker stuck in the camera
    /// or the classifier past that point is detached, not killed, and keeps
    /// the camera until that call returns; it then releases the camera and
    /// exits without starting another detection. Calling `close` more than
    /// once is a no-op. After `close` every result reads inattentive.
    pub fn close(&self) {
        self.stop.store(true, Ordering::Release);
        self.trigger.lock().take();
        *self.inattentive.lock() = true;

        let Some(worker) = self.worker.lock().take() else {
            return;
        };

        match worker.finished.recv_timeout(self.join_timeout) {
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    timeout_ms = self.join_timeout.as_millis() as u64,
                    "inattention detector worker did not stop in time, detaching"
                );
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.handle.join().is_err() {
                    warn!("inattention detector worker panicked");
                } else {
                    debug!("inattention detector stopped");
                }
            }
        }
    }
}

impl AttentionMonitor for InattentionDetector {
    fn is_inattentive(&self) -> bool {
        self.detect()
    }
}

impl Drop for InattentionDetector {
    fn drop(&mut self) {
        self.close();
    }
}

/// Marks the detector inattentive and idle when the worker thread ends,
/// including by unwinding.
struct WorkerExit {
    inattentive: Arc<Mutex<bool>>,
    pending: Arc<AtomicBool>,
    done: Sender<()>,
}

impl Drop for WorkerExit {
    fn drop(&mut self) {
        *self.inattentive.lock() = true;
        self.pending.store(false, Ordering::Release);
        let _ = self.done.send(());
    }
}

struct DetectionLoop<C, M> {
    camera: C,
    classifier: M,
    inattentive: Arc<Mutex<bool>>,
    pending: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    eyes_open_label: u32,
    poll_interval: Duration,
}

impl<C: CameraSource, M: EyeStateClassifier> DetectionLoop<C, M> {
    fn run(mut self, triggers: Receiver<()>) {
        while !self.stop.load(Ordering::Acquire) {
            match triggers.recv_timeout(self.poll_interval) {
                Ok(()) => {
                    let inattentive = self.detect_once();
                    let mut cached = self.inattentive.lock();
                    // a result finished after close must not overwrite the closed state
                    if !self.stop.load(Ordering::Acquire) {
                        *cached = inattentive;
                    }
                    drop(cached);
                    self.pending.store(false, Ordering::Release);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.camera.close();
    }

    /// Grab a frame and classify it. Any failure reads as inattentive.
    fn detect_once(&mut self) -> bool {
        let camera = &mut self.camera;
        let classifier = &mut self.classifier;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let frame = camera.next_grayscale();
            classifier.predict(&frame)
        }));

        match outcome {
            Ok(Ok(detections)) => !eyes_open(&detections, self.eyes_open_label),
            Ok(Err(e)) => {
                debug!(error = %e, "eye-state classification failed, assuming inattentive");
                true
            }
            Err(_) => {
                warn!("camera or eye-state classifier panicked, assuming inattentive");
                true
            }
        }
    }
}

fn eyes_open(detections: &[EyeDetection], label: u32) -> bool {
    detections.iter().any(|d| d.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inattention::camera::BlankCamera;
    use crate::inattention::classifier::ClassifierError;
    use image::GrayImage;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    fn config() -> InattentionConfig {
        InattentionConfig {
            poll_interval_ms: 10,
            join_timeout_ms: 500,
            ..InattentionConfig::default()
        }
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn open_eyes(_frame: &GrayImage) -> Result<Vec<EyeDetection>, ClassifierError> {
        Ok(vec![
            EyeDetection { label: 0, confidence: 0.4 },
            EyeDetection { label: 1, confidence: 0.9 },
        ])
    }

    #[test]
    fn eyes_open_requires_matching_label() {
        let closed = [EyeDetection { label: 0, confidence: 0.9 }];
        assert!(!eyes_open(&closed, 1));
        assert!(!eyes_open(&[], 1));
        assert!(eyes_open(&closed, 0));
    }

    #[test]
    fn inattentive_until_first_detection_completes() {
        let detector = InattentionDetector::spawn(BlankCamera::default(), open_eyes, &config())
            .unwrap();

        assert!(detector.latest());
        detector.detect();
        assert!(wait_until(|| !detector.latest()));
        assert!(!detector.is_detecting());
    }

    #[test]
    fn concurrent_requests_coalesce_into_one_pass() {
        let passes = Arc::new(AtomicUsize::new(0));
        let (release, gate) = mpsc::channel::<()>();
        let counter = Arc::clone(&passes);
        let classifier = move |frame: &GrayImage| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = gate.recv();
            open_eyes(frame)
        };

        let detector =
            InattentionDetector::spawn(BlankCamera::default(), classifier, &config()).unwrap();

        let first = detector.detect();
        let second = detector.detect();
        assert_eq!(first, second);
        assert!(detector.is_detecting());

        release.send(()).unwrap();
        assert!(wait_until(|| !detector.is_detecting()));
        assert_eq!(passes.load(Ordering::SeqCst), 1);
        assert!(!detector.latest());
    }

    #[test]
    fn classifier_error_counts_as_inattentive() {
        let failing = |_frame: &GrayImage| -> Result<Vec<EyeDetection>, ClassifierError> {
            Err(ClassifierError::Inference("model not loaded".to_string()))
        };
        let detector =
            InattentionDetector::spawn(BlankCamera::default(), failing, &config()).unwrap();

        detector.detect();
        assert!(wait_until(|| !detector.is_detecting()));
        assert!(detector.latest());
    }

    #[test]
    fn classifier_panic_counts_as_inattentive() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let flaky = move |frame: &GrayImage| {
            if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                panic!("inference backend crashed");
            }
            open_eyes(frame)
        };
        let detector = InattentionDetector::spawn(BlankCamera::default(), flaky, &config()).unwrap();

        detector.detect();
        assert!(wait_until(|| !detector.is_detecting()));
        assert!(!detector.latest());

        detector.detect();
        assert!(wait_until(|| !detector.is_detecting()));
        assert!(detector.latest());
    }

    struct FlakyCamera {
        frames: Arc<AtomicUsize>,
    }

    impl CameraSource for FlakyCamera {
        fn next_grayscale(&mut self) -> GrayImage {
            if self.frames.fetch_add(1, Ordering::SeqCst) == 1 {
                panic!("camera stream dropped");
            }
            GrayImage::new(4, 4)
        }
    }

    #[test]
    fn camera_panic_counts_as_inattentive_and_worker_survives() {
        let frames = Arc::new(AtomicUsize::new(0));
        let camera = FlakyCamera {
            frames: Arc::clone(&frames),
        };
        let detector = InattentionDetector::spawn(camera, open_eyes, &config()).unwrap();

        detector.detect();
        assert!(wait_until(|| !detector.is_detecting()));
        assert!(!detector.latest());

        detector.detect();
        assert!(wait_until(|| !detector.is_detecting()));
        assert!(detector.latest());

        // the next frame comes through again
        detector.detect();
        assert!(wait_until(|| !detector.is_detecting()));
        assert!(!detector.latest());
        assert_eq!(frames.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn worker_exit_resets_to_inattentive() {
        let detector =
            InattentionDetector::spawn(BlankCamera::default(), open_eyes, &config()).unwrap();

        detector.detect();
        assert!(wait_until(|| !detector.latest()));

        detector.close();
        assert!(detector.latest());
        assert!(detector.detect());
        assert!(!detector.is_detecting());
    }

    #[test]
    fn classifier_is_built_with_configured_threshold() {
        let settings = InattentionConfig {
            eye_threshold: 0.95,
            ..config()
        };
        let detector = InattentionDetector::spawn_with(
            BlankCamera::default(),
            |threshold: f32| {
                move |frame: &GrayImage| -> Result<Vec<EyeDetection>, ClassifierError> {
                    Ok(open_eyes(frame)?
                        .into_iter()
                        .filter(|d| d.confidence >= threshold)
                        .collect())
                }
            },
            &settings,
        )
        .unwrap();

        detector.detect();
        assert!(wait_until(|| !detector.is_detecting()));
        // the open-eye detection at 0.9 falls below the threshold
        assert!(detector.latest());
    }

    struct TrackedCamera {
        closed: Arc<AtomicBool>,
    }

    impl CameraSource for TrackedCamera {
        fn next_grayscale(&mut self) -> GrayImage {
            GrayImage::new(2, 2)
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn close_releases_camera_and_is_idempotent() {
        let closed = Arc::new(AtomicBool::new(false));
        let camera = TrackedCamera {
            closed: Arc::clone(&closed),
        };
        let detector = InattentionDetector::spawn(camera, open_eyes, &config()).unwrap();

        detector.close();
        assert!(closed.load(Ordering::SeqCst));

        detector.close();
        assert!(detector.detect());
        assert!(!detector.is_detecting());
    }

    #[test]
    fn close_detaches_stuck_worker() {
        let (release, gate) = mpsc::channel::<()>();
        let stuck = move |frame: &GrayImage| {
            let _ = gate.recv_timeout(Duration::from_secs(2));
            open_eyes(frame)
        };
        let closed = Arc::new(AtomicBool::new(false));
        let camera = TrackedCamera {
            closed: Arc::clone(&closed),
        };
        let detector = InattentionDetector::spawn(
            camera,
            stuck,
            &InattentionConfig {
                poll_interval_ms: 10,
                join_timeout_ms: 50,
                ..InattentionConfig::default()
            },
        )
        .unwrap();

        detector.detect();
        assert!(wait_until(|| detector.is_detecting()));

        let started = Instant::now();
        detector.close();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!closed.load(Ordering::SeqCst));
        assert!(detector.latest());

        release.send(()).unwrap();
        assert!(wait_until(|| closed.load(Ordering::SeqCst)));
        assert!(detector.latest());
    }
}
