use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::task::JoinHandle;

use crate::events::{EventHandler, EventProducer, Handler, InterestReceivedEvent, MatchCreatedEvent, MatchEndedEvent};

type BoxedHook<E> = dyn (Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static;

#[derive(Default, Clone)]
pub struct EventProducers {
    pub match_created_producer: Vec<EventProducer<MatchCreatedEvent>>,
    pub interest_received_producer: Vec<EventProducer<InterestReceivedEvent>>,
    pub match_ended_producer: Vec<EventProducer<MatchEndedEvent>>,
}

impl EventProducers {
    pub async fn publish_match_created(&self, event: MatchCreatedEvent) {
        for producer in &self.match_created_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_interest_received(&self, event: InterestReceivedEvent) {
        for producer in &self.interest_received_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_match_ended(&self, event: MatchEndedEvent) {
        for producer in &self.match_ended_producer {
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_match_created: Option<EventHandler<MatchCreatedEvent>>,
    pub on_interest_received: Option<EventHandler<InterestReceivedEvent>>,
    pub on_match_ended: Option<EventHandler<MatchEndedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_match_created = hooks.on_match_created.map(|f| EventHandler::new(buffer_size, f));
        let on_interest_received = hooks.on_interest_received.map(|f| EventHandler::new(buffer_size, f));
        let on_match_ended = hooks.on_match_ended.map(|f| EventHandler::new(buffer_size, f));
        Self { on_match_created, on_interest_received, on_match_ended }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_match_created {
            result.match_created_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_interest_received {
            result.interest_received_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_match_ended {
            result.match_ended_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns a task for every registered handler. Each task ends once all the producers subscribed to it have been
    /// dropped and its in-flight jobs have finished.
    pub fn start_handlers(self) -> HandlerTasks {
        let mut tasks = Vec::new();
        if let Some(handler) = self.on_match_created {
            tasks.push(tokio::spawn(handler.start_handler()));
        }
        if let Some(handler) = self.on_interest_received {
            tasks.push(tokio::spawn(handler.start_handler()));
        }
        if let Some(handler) = self.on_match_ended {
            tasks.push(tokio::spawn(handler.start_handler()));
        }
        HandlerTasks(tasks)
    }
}

/// The running event handler tasks.
pub struct HandlerTasks(Vec<JoinHandle<()>>);

impl HandlerTasks {
    /// Waits for every handler to drain. Drop all producers first, or this never returns.
    pub async fn join(self) {
        for task in self.0 {
            if let Err(e) = task.await {
                warn!("📬️ Event handler task ended abnormally: {e}");
            }
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_match_created: Option<Handler<MatchCreatedEvent>>,
    pub on_interest_received: Option<Handler<InterestReceivedEvent>>,
    pub on_match_ended: Option<Handler<MatchEndedEvent>>,
}

impl EventHooks {
    pub fn on_match_created<F>(&mut self, f: F) -> &mut Self
    where F: Fn(MatchCreatedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static {
        let hook: Arc<BoxedHook<MatchCreatedEvent>> = Arc::new(f);
        self.on_match_created = Some(hook);
        self
    }

    pub fn on_interest_received<F>(&mut self, f: F) -> &mut Self
    where F: Fn(InterestReceivedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static {
        let hook: Arc<BoxedHook<InterestReceivedEvent>> = Arc::new(f);
        self.on_interest_received = Some(hook);
        self
    }

    pub fn on_match_ended<F>(&mut self, f: F) -> &mut Self
    where F: Fn(MatchEndedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static {
        let hook: Arc<BoxedHook<MatchEndedEvent>> = Arc::new(f);
        self.on_match_ended = Some(hook);
        self
    }
}
