//! Expression observer: camera sampling, emotion mapping and duration ledger.

pub mod ledger;
pub mod mapping;

pub use ledger::EmotionLedger;
pub use mapping::{CONFIDENCE_THRESHOLD, map_expression};

use crate::config::AvatarConfig;
use crate::event_bus::{AvatarEvent, Component, EventBus};
use fluent_avatar_domain::{AvatarError, EmotionLabel, ExpressionScores};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// An open video capture.
pub trait FrameSource: Send + Sync + 'static {
    /// Whether enough data has arrived to sample a frame.
    fn is_ready(&self) -> bool;

    /// Stop every capture track. Called exactly once when sampling ends.
    fn release(&mut self);
}

/// Camera device that can be opened for capture.
pub trait Camera: Send + Sync {
    type Stream: FrameSource;

    /// Request access and open a stream. Permission denial is reported as
    /// [`AvatarError::MediaAccess`].
    fn open(&self) -> impl Future<Output = Result<Self::Stream, AvatarError>> + Send;
}

/// Face detector plus expression classifier running on a frame source.
pub trait ExpressionClassifier<S: FrameSource>: Send + 'static {
    /// Expression scores for every face in the current frame, most
    /// prominent face first.
    fn detect(
        &mut self,
        source: &S,
    ) -> impl Future<Output = Result<Vec<ExpressionScores>, AvatarError>> + Send;
}

/// Point-in-time view of the observer.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverSnapshot {
    pub tracking: bool,
    pub active: EmotionLabel,
    pub current_span: Duration,
    pub longest: Option<EmotionLabel>,
    pub totals: Vec<(EmotionLabel, Duration)>,
}

struct Sampling<X> {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<X>,
}

/// Samples a camera on a fixed interval while active and keeps the
/// emotion-duration ledger.
pub struct ExpressionObserver<C: Camera, X> {
    camera: C,
    classifier: Option<X>,
    bus: EventBus,
    interval: Duration,
    threshold: f32,
    ledger: Arc<Mutex<EmotionLedger>>,
    sampling: Option<Sampling<X>>,
}

impl<C, X> ExpressionObserver<C, X>
where
    C: Camera,
    X: ExpressionClassifier<C::Stream>,
{
    pub fn new(camera: C, classifier: X, bus: EventBus, config: &AvatarConfig) -> Self {
        Self {
            camera,
            classifier: Some(classifier),
            bus,
            interval: config.sample_interval,
            threshold: config.confidence_threshold,
            ledger: Arc::new(Mutex::new(EmotionLedger::new())),
            sampling: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.sampling.is_some()
    }

    /// Open the camera and start sampling. Starting an active observer is a
    /// no-op.
    pub async fn start(&mut self) -> Result<(), AvatarError> {
        if self.sampling.is_some() {
            return Ok(());
        }
        let Some(mut classifier) = self.classifier.take() else {
            return Err(AvatarError::Classification(
                "classifier was lost by a failed sampling task".to_string(),
            ));
        };

        let mut stream = match self.camera.open().await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("Camera access denied: {}", e);
                self.classifier = Some(classifier);
                self.bus
                    .publish(AvatarEvent::status(
                        Component::Observer,
                        format!("Camera access denied: {e}"),
                    ))
                    .await;
                return Err(e);
            }
        };

        {
            let mut ledger = self.ledger.lock();
            ledger.reset();
            ledger.activate(Instant::now());
        }

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let ledger = self.ledger.clone();
        let bus = self.bus.clone();
        let interval = self.interval;
        let threshold = self.threshold;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        if !stream.is_ready() {
                            continue;
                        }
                        let faces = match classifier.detect(&stream).await {
                            Ok(faces) => faces,
                            Err(e) => {
                                tracing::warn!("expression detection failed: {}", e);
                                continue;
                            }
                        };
                        let Some(face) = faces.first() else {
                            continue;
                        };

                        let emotion = map_expression(face, threshold);
                        let (changed, longest) = {
                            let mut ledger = ledger.lock();
                            let changed = ledger.observe(emotion, Instant::now());
                            (changed, ledger.longest())
                        };
                        if changed {
                            tracing::debug!(%emotion, ?longest, "detected emotion changed");
                            bus.publish(AvatarEvent::EmotionDetected { emotion, longest }).await;
                        }
                    }
                }
            }

            stream.release();
            classifier
        });

        self.sampling = Some(Sampling { shutdown_tx, task });
        tracing::info!(interval_ms = interval.as_millis() as u64, "face tracking started");
        self.bus.publish(AvatarEvent::TrackingStarted).await;
        self.bus
            .publish(AvatarEvent::status(Component::Observer, "Active"))
            .await;
        Ok(())
    }

    /// Stop sampling, release the camera and forget the ledger. Returns once
    /// the capture has been released.
    pub async fn stop(&mut self) {
        let Some(sampling) = self.sampling.take() else {
            return;
        };
        let _ = sampling.shutdown_tx.send(());
        match sampling.task.await {
            Ok(classifier) => self.classifier = Some(classifier),
            Err(e) => tracing::error!("face tracking task failed: {}", e),
        }
        self.ledger.lock().reset();

        tracing::info!("face tracking stopped");
        self.bus.publish(AvatarEvent::TrackingStopped).await;
        self.bus
            .publish(AvatarEvent::status(Component::Observer, "Stopped"))
            .await;
    }

    pub fn snapshot(&self) -> ObserverSnapshot {
        let ledger = self.ledger.lock();
        ObserverSnapshot {
            tracking: self.sampling.is_some(),
            active: ledger.active(),
            current_span: ledger.current_span(Instant::now()),
            longest: ledger.longest(),
            totals: ledger.totals().to_vec(),
        }
    }
}

impl<C: Camera, X> Drop for ExpressionObserver<C, X> {
    fn drop(&mut self) {
        // Signal the sampling task to release the camera
        if let Some(sampling) = self.sampling.take() {
            let _ = sampling.shutdown_tx.send(());
            let mut ledger = self.ledger.lock();
            ledger.close_out(Instant::now());
            tracing::debug!(
                longest = ?ledger.longest(),
                recorded_ms = ledger.recorded().as_millis() as u64,
                "face tracking torn down"
            );
        }
    }
}
