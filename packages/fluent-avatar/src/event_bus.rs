//! Typed event bus connecting the avatar components.
//!
//! Components never reach into each other; they publish [`AvatarEvent`]s and
//! whoever owns the affected state subscribes by [`EventType`].

use fluent_avatar_domain::{AvatarError, ConversationTurn, EmotionLabel};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Type alias for boxed future returned by event handlers
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Type alias for event handler function
pub type EventHandler =
    Arc<dyn Fn(AvatarEvent) -> BoxFuture<'static, Result<(), AvatarError>> + Send + Sync + 'static>;

/// Event bus for cross-component communication
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<HashMap<EventType, Vec<EventHandler>>>>,
}

/// Types of events that can be published on the event bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    EmotionSelected,
    TrackingStarted,
    TrackingStopped,
    EmotionDetected,
    TranscriptPartial,
    UtteranceDispatched,
    TurnCompleted,
    SpeakingChanged,
    EmotionReset,
    StatusChanged,
}

/// Component that produced a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    Observer,
    Coordinator,
    Presenter,
}

/// Events that can be published and subscribed to on the event bus
#[derive(Debug, Clone)]
pub enum AvatarEvent {
    /// Manual emotion button pressed.
    EmotionSelected { emotion: EmotionLabel },
    TrackingStarted,
    TrackingStopped,
    /// The observer's active label changed.
    EmotionDetected {
        emotion: EmotionLabel,
        longest: Option<EmotionLabel>,
    },
    /// Interim recognition result, display only.
    TranscriptPartial { text: String },
    UtteranceDispatched {
        text: String,
        emotion: EmotionLabel,
    },
    TurnCompleted(ConversationTurn),
    SpeakingChanged { speaking: bool },
    /// Return the avatar to its neutral baseline now.
    EmotionReset,
    StatusChanged {
        component: Component,
        status: String,
    },
}

impl AvatarEvent {
    /// Get the event type for this event
    pub fn event_type(&self) -> EventType {
        match self {
            AvatarEvent::EmotionSelected { .. } => EventType::EmotionSelected,
            AvatarEvent::TrackingStarted => EventType::TrackingStarted,
            AvatarEvent::TrackingStopped => EventType::TrackingStopped,
            AvatarEvent::EmotionDetected { .. } => EventType::EmotionDetected,
            AvatarEvent::TranscriptPartial { .. } => EventType::TranscriptPartial,
            AvatarEvent::UtteranceDispatched { .. } => EventType::UtteranceDispatched,
            AvatarEvent::TurnCompleted(_) => EventType::TurnCompleted,
            AvatarEvent::SpeakingChanged { .. } => EventType::SpeakingChanged,
            AvatarEvent::EmotionReset => EventType::EmotionReset,
            AvatarEvent::StatusChanged { .. } => EventType::StatusChanged,
        }
    }

    pub fn status(component: Component, status: impl Into<String>) -> Self {
        AvatarEvent::StatusChanged {
            component,
            status: status.into(),
        }
    }
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event to all subscribers of its type, in subscription order.
    ///
    /// Handlers run after the subscriber table is released, so they may
    /// publish or subscribe themselves.
    pub async fn publish(&self, event: AvatarEvent) {
        let handlers = match self.subscribers.read().await.get(&event.event_type()) {
            Some(handlers) => handlers.clone(),
            None => return,
        };
        for handler in handlers {
            if let Err(e) = handler(event.clone()).await {
                // Log error but continue processing other handlers
                tracing::error!("Event handler failed: {}", e);
            }
        }
    }

    /// Subscribe to events of a specific type with a handler function
    pub async fn subscribe<F>(&self, event_type: EventType, handler: F)
    where
        F: Fn(AvatarEvent) -> BoxFuture<'static, Result<(), AvatarError>> + Send + Sync + 'static,
    {
        let boxed_handler: EventHandler = Arc::new(handler);

        let mut subscribers = self.subscribers.write().await;
        subscribers.entry(event_type).or_default().push(boxed_handler);
    }

    /// Subscribe the same handler to several event types.
    pub async fn subscribe_all<F>(&self, event_types: &[EventType], handler: F)
    where
        F: Fn(AvatarEvent) -> BoxFuture<'static, Result<(), AvatarError>>
            + Clone
            + Send
            + Sync
            + 'static,
    {
        for event_type in event_types {
            self.subscribe(*event_type, handler.clone()).await;
        }
    }

    /// Check if there are any subscribers for a given event type
    pub async fn has_subscribers(&self, event_type: EventType) -> bool {
        let subscribers = self.subscribers.read().await;
        subscribers
            .get(&event_type)
            .is_some_and(|handlers| !handlers.is_empty())
    }

    /// Get the number of subscribers for a given event type
    pub async fn subscriber_count(&self, event_type: EventType) -> usize {
        let subscribers = self.subscribers.read().await;
        subscribers
            .get(&event_type)
            .map_or(0, |handlers| handlers.len())
    }
}
