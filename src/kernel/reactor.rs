use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::event::{Event, InputContent, InputEvent, Notice};
use super::state::{SceneState, StateDelta};
use crate::batcher::ActionBatcher;
use crate::config::Config;
use crate::pool::{ActionGenerator, ActionPool};
use crate::scene::{RenderOrchestrator, SceneCompositor};
use crate::services::{ImageRef, Services};

#[derive(Debug, Clone)]
pub struct ReactorConfig {
    pub slot_count: usize,
    pub batch_size: usize,
    pub min_backlog: usize,
    pub debounce: Duration,
    pub fill_delay: Duration,
}

impl From<&Config> for ReactorConfig {
    fn from(config: &Config) -> Self {
        Self {
            slot_count: config.pool.slot_count,
            batch_size: config.pool.batch_size,
            min_backlog: config.pool.min_backlog,
            debounce: config.debounce(),
            fill_delay: Duration::from_millis(config.pool.fill_delay_ms),
        }
    }
}

/// Single owner of all session state. Events are processed one at a time;
/// remote work runs in spawned tasks that report back through the channel.
pub struct Reactor {
    pub receiver: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    pub pool: ActionPool,
    pub batcher: ActionBatcher,
    pub state: SceneState,
    generator: ActionGenerator,
    compositor: SceneCompositor,
    renderer: RenderOrchestrator,
    fill_delay: Duration,
    replenish_in_flight: usize,
    banner: Option<String>,
}

impl Reactor {
    pub fn new(
        receiver: mpsc::Receiver<Event>,
        tx: mpsc::Sender<Event>,
        services: Services,
        config: &Config,
        reference: Option<ImageRef>,
    ) -> Self {
        let reactor_config = ReactorConfig::from(config);
        let character = &config.character;

        let banner = (!config.has_text_credentials())
            .then(|| "Together API key missing - check your environment".to_string());

        let base_image = reference
            .clone()
            .unwrap_or_else(|| ImageRef::url(character.base_image.display().to_string()));

        Self {
            receiver,
            tx: tx.clone(),
            pool: ActionPool::new(reactor_config.slot_count, reactor_config.min_backlog),
            batcher: ActionBatcher::new(reactor_config.debounce, tx),
            state: SceneState::new(character.base_prompt.clone(), base_image),
            generator: ActionGenerator::new(services.text.clone(), reactor_config.batch_size),
            compositor: SceneCompositor::new(services.text.clone(), character),
            renderer: RenderOrchestrator::new(services.images, services.background).with_reference(reference),
            fill_delay: reactor_config.fill_delay,
            replenish_in_flight: 0,
            banner,
        }
    }

    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn replenish_in_flight(&self) -> usize {
        self.replenish_in_flight
    }

    /// Startup: surface the credential banner once, then fill slots and backlog.
    pub async fn initialize(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        if let Some(banner) = &self.banner {
            warn!("{}", banner);
            notices.push(Notice::Banner(banner.clone()));
        }

        info!("Starting block initialization...");
        if self.pool.initialize(&self.generator, self.fill_delay).await > 0 {
            notices.push(Notice::SlotsChanged);
        }
        self.maybe_replenish();
        notices
    }

    /// Processes one event. Never awaits; remote work is spawned.
    pub fn step(&mut self, event: Event) -> Vec<Notice> {
        let mut notices = Vec::new();

        match event {
            Event::Input(input) => self.handle_input(input, &mut notices),
            Event::BatchDue(seq) => {
                if let Some(batch) = self.batcher.fire(seq) {
                    self.state.reduce(StateDelta::ProcessingStarted);
                    self.dispatch_render(batch.clone());
                    notices.push(Notice::Dispatched(batch));
                }
            }
            Event::PhrasesGenerated(phrases) => {
                self.replenish_in_flight = self.replenish_in_flight.saturating_sub(1);
                let kept = self.pool.absorb(phrases);
                debug!("Backlog replenished with {} phrases ({} total)", kept, self.pool.backlog().len());
                if kept > 0 {
                    self.maybe_replenish();
                }
            }
            Event::ReplenishFailed => {
                self.replenish_in_flight = self.replenish_in_flight.saturating_sub(1);
            }
            Event::SceneRendered { description, image } => {
                let rendered = image.is_some();
                if self.state.reduce(StateDelta::RenderFinished { description, image }) {
                    notices.push(Notice::SceneUpdated);
                } else if !rendered {
                    warn!("No image data received from generation");
                    notices.push(Notice::RenderSkipped);
                }
            }
            Event::RewriteFinished { original, outcome } => {
                notices.push(Notice::Rewritten { original, outcome });
            }
            Event::Shutdown => {}
        }

        notices
    }

    fn handle_input(&mut self, input: InputEvent, notices: &mut Vec<Notice>) {
        debug!("Input from {}: {:?}", input.source, input.content);
        match input.content {
            InputContent::Drop(id) => {
                if let Some(consumed) = self.pool.consume(id) {
                    info!("Dropped onto stage: {}", consumed.text);
                    notices.push(Notice::SlotsChanged);
                    self.batcher.submit(consumed.text);
                    self.maybe_replenish();
                }
            }
            InputContent::Custom(text) => match self.pool.add_custom(&text) {
                Ok(id) => notices.push(Notice::CustomAdded(id)),
                Err(rejection) => notices.push(Notice::Rejected {
                    text,
                    reason: rejection.message,
                }),
            },
            InputContent::Rewrite(text) => {
                let generator = self.generator.clone();
                let exclusions = self.pool.exclusions();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = generator.rewrite(&text, &exclusions).await;
                    let _ = tx.send(Event::RewriteFinished { original: text, outcome }).await;
                });
            }
        }
    }

    /// Fires a replenishment fetch when the backlog is low. Outstanding
    /// fetches are not deduplicated; their results only ever append.
    fn maybe_replenish(&mut self) {
        let Some(exclusions) = self.pool.replenishment_request() else {
            return;
        };

        if self.replenish_in_flight > 0 {
            debug!("Replenishment requested with {} already in flight", self.replenish_in_flight);
        }
        self.replenish_in_flight += 1;

        let generator = self.generator.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match generator.generate(&exclusions).await {
                Ok(phrases) => Event::PhrasesGenerated(phrases),
                Err(e) => {
                    warn!("Failed to generate block batch: {}", e);
                    Event::ReplenishFailed
                }
            };
            let _ = tx.send(event).await;
        });
    }

    fn dispatch_render(&self, batch: Vec<String>) {
        let compositor = self.compositor.clone();
        let renderer = self.renderer.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let description = compositor.compose(&batch).await;
            let image = renderer.render(&description).await;
            let _ = tx.send(Event::SceneRendered { description, image }).await;
        });
    }

    /// Async driver loop. Ends on `Event::Shutdown`.
    pub async fn run<F>(&mut self, mut on_notice: F)
    where
        F: FnMut(&Reactor, &Notice),
    {
        info!("Reactor loop started");
        while let Some(event) = self.receiver.recv().await {
            if matches!(event, Event::Shutdown) {
                break;
            }
            for notice in self.step(event) {
                on_notice(self, &notice);
            }
        }
        info!("Reactor loop stopped");
    }
}
