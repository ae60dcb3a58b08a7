//! Single-flight hand-off of utterances to the assistant.
use crate::event_bus::{AvatarEvent, Component, EventBus};
use crate::gateway::AssistantGateway;
use fluent_avatar_domain::{ConversationTurn, EmotionLabel};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Clears the in-flight flag however the request ends, including
/// cancellation of the awaiting task.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Sends utterances to the gateway one at a time and turns the outcome into
/// a [`ConversationTurn`].
///
/// A dispatch attempted while another is in flight is dropped, not queued.
pub struct Dispatcher<G> {
    gateway: G,
    bus: EventBus,
    in_flight: AtomicBool,
    reset_delay: Duration,
    pending_reset: Mutex<Option<JoinHandle<()>>>,
}

impl<G: AssistantGateway> Dispatcher<G> {
    pub fn new(gateway: G, bus: EventBus, reset_delay: Duration) -> Self {
        Self {
            gateway,
            bus,
            in_flight: AtomicBool::new(false),
            reset_delay,
            pending_reset: Mutex::new(None),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Ask the assistant about `text`, spoken while the user looked
    /// `emotion`.
    ///
    /// Returns `None` without side effects when `text` is blank or another
    /// dispatch is in flight. Otherwise the resulting turn, error-flagged if
    /// the gateway failed, has already been published as
    /// [`AvatarEvent::TurnCompleted`].
    pub async fn dispatch(&self, text: &str, emotion: EmotionLabel) -> Option<ConversationTurn> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("dispatch already in flight, dropping utterance");
            return None;
        }
        let _guard = InFlight(&self.in_flight);

        tracing::info!(%emotion, "dispatching utterance: {}", text);
        self.bus
            .publish(AvatarEvent::UtteranceDispatched {
                text: text.to_string(),
                emotion,
            })
            .await;
        self.report("Your AI friend is thinking...").await;

        let turn = match self.gateway.respond(text, emotion).await {
            Ok(reply) => {
                tracing::debug!(quality = ?reply.quality, animation = %reply.animation, "assistant replied");
                self.report("Response received! Ready for more conversation")
                    .await;
                ConversationTurn::completed(text, emotion, reply)
            }
            Err(e) => {
                tracing::error!("Error getting assistant response: {}", e);
                self.report(format!("Error: {e}")).await;
                ConversationTurn::failed(text, emotion, &e)
            }
        };

        self.bus
            .publish(AvatarEvent::TurnCompleted(turn.clone()))
            .await;
        self.schedule_reset();
        Some(turn)
    }

    /// Return the avatar to neutral once the reply has had time on screen.
    /// A newer turn pushes the reset back.
    fn schedule_reset(&self) {
        let bus = self.bus.clone();
        let delay = self.reset_delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            bus.publish(AvatarEvent::EmotionReset).await;
        });
        if let Some(previous) = self.pending_reset.lock().replace(task) {
            previous.abort();
        }
    }

    async fn report(&self, status: impl Into<String>) {
        self.bus
            .publish(AvatarEvent::status(Component::Coordinator, status))
            .await;
    }
}

impl<G> Drop for Dispatcher<G> {
    fn drop(&mut self) {
        if let Some(task) = self.pending_reset.get_mut().take() {
            task.abort();
        }
    }
}
