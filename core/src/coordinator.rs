//! The one component that reacts to page events by driving several
//! registries at once.

use crate::animation::{
    AnimationRegistry, AnimationTarget, FOCAL_SHAKE, REVEAL_SCREEN_FLASH, SLOT_CLICK_FLASH,
};
use crate::config::BoardConfig;
use crate::connection::{ConnectionId, ConnectionRegistry, RaySettings};
use crate::error::BoardError;
use crate::events::{BoardEvent, Component, EventSource, SubscriptionTable};
use crate::jitter::Jitter;
use crate::particle::{ParticleRegistry, ParticleSettings};
use crate::photo::{PhotoRegistry, PhotoSettings};
use crate::scheduler::{Scheduler, TaskToken};
use crate::shortcut::{KeyChord, Shortcut};
use crate::slot_id::SlotId;
use crate::surface::{BoardSurface, Diagnostics, LayoutProbe, Overlay, StageSurface};

pub const REVEAL_FLASH: &str = "reveal-flash";
pub const QUESTION_SHAKE: &str = "question-shake";
pub const HOVER_TILT_DEG: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardTask {
    RefreshPositions,
    ResizeRefresh,
    EndReveal,
    DustMotes,
    PulseConnection(ConnectionId),
}

#[derive(Default)]
struct Tokens {
    refresh: Option<TaskToken>,
    resize: Option<TaskToken>,
    reveal: Option<TaskToken>,
    dust: Option<TaskToken>,
    pulses: Vec<(ConnectionId, TaskToken)>,
}

pub struct EffectCoordinator<S: BoardSurface> {
    surface: S,
    config: BoardConfig,
    connections: ConnectionRegistry<S>,
    photos: PhotoRegistry<S>,
    particles: ParticleRegistry<S>,
    animations: AnimationRegistry<S>,
    tasks: Scheduler<BoardTask>,
    tokens: Tokens,
    table: SubscriptionTable<Self, S::File>,
    paused_for_visibility: bool,
    ambient_before_pause: bool,
    hovered: Option<SlotId>,
    started: bool,
    jitter: Jitter,
}

impl<S: BoardSurface> EffectCoordinator<S> {
    pub fn new(surface: S, config: BoardConfig, seed: u64) -> Self {
        let connections = ConnectionRegistry::new(
            surface.clone(),
            RaySettings::from_config(&config),
            seed ^ 0x5eed_0001,
        );
        let photos = PhotoRegistry::new(surface.clone(), PhotoSettings::from_config(&config));
        let particles = ParticleRegistry::new(
            surface.clone(),
            ParticleSettings::from_config(&config),
            seed ^ 0x5eed_0002,
        );
        let animations = AnimationRegistry::new(surface.clone());
        Self {
            surface,
            config,
            connections,
            photos,
            particles,
            animations,
            tasks: Scheduler::new(),
            tokens: Tokens::default(),
            table: Self::subscriptions(),
            paused_for_visibility: false,
            ambient_before_pause: false,
            hovered: None,
            started: false,
            jitter: Jitter::new(seed),
        }
    }

    fn subscriptions() -> SubscriptionTable<Self, S::File> {
        SubscriptionTable::<Self, S::File>::new()
            .on(EventSource::Clock, Component::Particles, Self::tick_particles)
            .on(EventSource::Clock, Component::Photos, Self::tick_photos)
            .on(EventSource::Clock, Component::Animations, Self::tick_animations)
            .on(EventSource::Clock, Component::Scheduler, Self::run_due_tasks)
            .on(EventSource::Window, Component::Scheduler, Self::debounce_resize)
            .on(EventSource::Visibility, Component::Stage, Self::visibility_changed)
            .on(EventSource::SlotPointer, Component::Animations, Self::flash_clicked_slot)
            .on(EventSource::SlotPointer, Component::Particles, Self::burst_at_clicked_slot)
            .on(EventSource::SlotPointer, Component::Connections, Self::rays_at_clicked_slot)
            .on(EventSource::SlotHover, Component::Connections, Self::hover_highlight)
            .on(EventSource::SlotHover, Component::Stage, Self::hover_lift)
            .on(EventSource::Question, Component::Animations, Self::shake_question)
            .on(EventSource::Question, Component::Stage, Self::reveal_from_question)
            .on(EventSource::Keyboard, Component::Stage, Self::shortcut_pressed)
            .on(EventSource::Controls, Component::Photos, Self::control_changed)
            .on(EventSource::Loader, Component::Photos, Self::load_finished)
            .on(EventSource::DragDrop, Component::Photos, Self::drag_changed)
    }

    /// Scans the page, installs the configured connections and starts every
    /// background effect. Fails without touching the page if the reference
    /// container is missing.
    pub fn start(&mut self, now_ms: f64) -> Result<usize, BoardError> {
        if self.started {
            return Ok(self.connections.len());
        }
        if self.surface.container_box().is_none() {
            return Err(BoardError::missing(".detective-board"));
        }
        let slots = self.photos.init_from_document();
        let connections = self.connections.add_seeds(&self.config.connections);
        self.particles.start_ambient(now_ms);
        self.particles.seed_ambient(now_ms);
        self.tokens.refresh = Some(self.tasks.repeating(
            now_ms,
            f64::from(self.config.refresh_period_ms),
            BoardTask::RefreshPositions,
        ));
        if self.config.dust_count > 0 {
            self.particles.dust_motes(now_ms, self.config.dust_count);
            self.tokens.dust = Some(self.tasks.repeating(
                now_ms,
                f64::from(self.config.dust_interval_ms),
                BoardTask::DustMotes,
            ));
        }
        if self.config.pulse_chance > 0.0 {
            let window_ms = f64::from(self.config.pulse_window_ms);
            for id in self.connections.pick_for_pulse(self.config.pulse_chance) {
                let delay = self.jitter.range(0.0, window_ms);
                let token = self.tasks.once(now_ms, delay, BoardTask::PulseConnection(id));
                self.tokens.pulses.push((id, token));
            }
        }
        if self.config.interactive != self.connections.is_interactive() {
            self.connections.toggle_interactive_mode();
        }
        self.surface
            .show_overlay(Overlay::Welcome, self.config.welcome_ms);
        self.surface.info(&format!(
            "board ready: {slots} slots, {connections} connections"
        ));
        self.started = true;
        Ok(connections)
    }

    /// Cancels every task and removes every line and transient effect, so
    /// a later `start` builds the board from scratch.
    pub fn stop(&mut self) {
        self.tasks.clear();
        self.tokens = Tokens::default();
        self.particles.stop_ambient();
        self.animations.stop_all();
        self.connections.end_flash();
        self.connections.reset_highlights();
        self.connections.clear_all();
        self.surface.clear_overlays();
        if let Some(slot) = self.hovered.take() {
            self.surface.set_slot_lifted(&slot, None);
        }
        if self.paused_for_visibility {
            self.paused_for_visibility = false;
            self.ambient_before_pause = false;
            self.surface.set_animations_paused(false);
        }
        self.started = false;
    }

    pub fn dispatch(&mut self, event: BoardEvent<S::File>, now_ms: f64) {
        let handlers: Vec<_> = self
            .table
            .handlers(event.source())
            .iter()
            .map(|(_, handler)| *handler)
            .collect();
        for handler in handlers {
            handler(self, &event, now_ms);
        }
    }

    pub fn tick(&mut self, now_ms: f64) {
        self.dispatch(BoardEvent::Tick, now_ms);
    }

    /// Flashes every connection gold, flashes the screen and bursts
    /// particles from the focal point. A second reveal restarts the revert.
    pub fn reveal(&mut self, now_ms: f64) {
        self.connections.flash_all();
        if let Some(token) = self.tokens.reveal.take() {
            self.tasks.cancel(token);
        }
        self.tokens.reveal = Some(self.tasks.once(
            now_ms,
            f64::from(self.config.reveal_ms),
            BoardTask::EndReveal,
        ));
        self.animations
            .play(REVEAL_FLASH, AnimationTarget::Stage, REVEAL_SCREEN_FLASH, now_ms);
        let focal = self
            .surface
            .focal_box()
            .or_else(|| self.surface.container_box());
        match focal {
            Some(rect) => {
                let (x, y) = rect.center();
                self.particles.burst(now_ms, x, y, self.config.reveal_burst);
            }
            None => self.surface.warn("reveal has no focal point"),
        }
    }

    /// Resets every transient effect. Each step touches its own state, so
    /// the order does not matter.
    pub fn clear_effects(&mut self, now_ms: f64) {
        self.particles.stop_ambient();
        if self.paused_for_visibility {
            self.ambient_before_pause = true;
        } else {
            self.particles.start_ambient(now_ms);
        }
        self.connections.reset_highlights();
        if let Some(token) = self.tokens.reveal.take() {
            self.tasks.cancel(token);
            self.connections.end_flash();
        }
        self.animations.stop_all();
        self.surface.clear_overlays();
        if let Some(slot) = self.hovered.take() {
            self.surface.set_slot_lifted(&slot, None);
        }
    }

    /// Hidden pages stop ambient spawning and freeze animations; showing
    /// the page again restores exactly what was running before.
    pub fn set_hidden(&mut self, hidden: bool, now_ms: f64) {
        if hidden == self.paused_for_visibility {
            return;
        }
        self.paused_for_visibility = hidden;
        if hidden {
            self.ambient_before_pause = self.particles.is_running();
            self.particles.stop_ambient();
        } else if self.ambient_before_pause {
            self.particles.start_ambient(now_ms);
        }
        self.surface.set_animations_paused(hidden);
        self.connections.set_paused(hidden);
    }

    pub fn resize(&mut self, now_ms: f64) {
        if let Some(token) = self.tokens.resize.take() {
            self.tasks.cancel(token);
        }
        self.tokens.resize = Some(self.tasks.once(
            now_ms,
            f64::from(self.config.resize_debounce_ms),
            BoardTask::ResizeRefresh,
        ));
    }

    pub fn toggle_interactive(&mut self) -> bool {
        let interactive = self.connections.toggle_interactive_mode();
        self.surface
            .show_overlay(Overlay::ModeBanner { interactive }, self.config.banner_ms);
        self.surface.info(&format!(
            "interactive mode {}",
            if interactive { "on" } else { "off" }
        ));
        interactive
    }

    pub fn shortcut_for(&self, chord: &KeyChord) -> Option<Shortcut> {
        Shortcut::decode(chord, self.photos.len())
    }

    pub fn apply_shortcut(&mut self, shortcut: Shortcut, now_ms: f64) {
        match shortcut {
            Shortcut::ResetPhotos => {
                self.photos.reset_all();
            }
            Shortcut::ToggleInteractive => {
                self.toggle_interactive();
            }
            Shortcut::Reveal => self.reveal(now_ms),
            Shortcut::ClearEffects => self.clear_effects(now_ms),
            Shortcut::QuickSelect(index) => {
                if let Some(slot) = self.photos.slot_at(index).cloned() {
                    self.photos.select_slot(slot.as_str(), now_ms);
                }
            }
        }
    }

    pub fn connections(&self) -> &ConnectionRegistry<S> {
        &self.connections
    }

    pub fn connections_mut(&mut self) -> &mut ConnectionRegistry<S> {
        &mut self.connections
    }

    pub fn photos(&self) -> &PhotoRegistry<S> {
        &self.photos
    }

    pub fn photos_mut(&mut self) -> &mut PhotoRegistry<S> {
        &mut self.photos
    }

    pub fn particles(&self) -> &ParticleRegistry<S> {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleRegistry<S> {
        &mut self.particles
    }

    pub fn animations(&self) -> &AnimationRegistry<S> {
        &self.animations
    }

    pub fn subscriptions_for(&self, source: EventSource) -> Vec<Component> {
        self.table.components(source)
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn is_interactive(&self) -> bool {
        self.connections.is_interactive()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_for_visibility
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn hovered(&self) -> Option<&SlotId> {
        self.hovered.as_ref()
    }

    pub fn is_pending(&self, task: BoardTask) -> bool {
        let token = match task {
            BoardTask::RefreshPositions => self.tokens.refresh,
            BoardTask::ResizeRefresh => self.tokens.resize,
            BoardTask::EndReveal => self.tokens.reveal,
            BoardTask::DustMotes => self.tokens.dust,
            BoardTask::PulseConnection(id) => self
                .tokens
                .pulses
                .iter()
                .find(|(pulsing, _)| *pulsing == id)
                .map(|(_, token)| *token),
        };
        token.is_some_and(|token| self.tasks.is_pending(token))
    }

    /// Pulses scheduled at start that have not fired yet.
    pub fn pending_pulses(&self) -> usize {
        self.tokens.pulses.len()
    }

    fn run_task(&mut self, task: BoardTask, now_ms: f64) {
        match task {
            BoardTask::RefreshPositions => {
                self.connections.refresh_positions();
            }
            BoardTask::ResizeRefresh => {
                self.tokens.resize = None;
                self.connections.refresh_positions();
            }
            BoardTask::EndReveal => {
                self.tokens.reveal = None;
                self.connections.end_flash();
            }
            BoardTask::DustMotes => {
                if !self.paused_for_visibility {
                    self.particles.dust_motes(now_ms, self.config.dust_count);
                }
            }
            BoardTask::PulseConnection(id) => {
                self.tokens.pulses.retain(|(pulsing, _)| *pulsing != id);
                if !self.paused_for_visibility {
                    self.connections.pulse(id, self.config.pulse_ms);
                }
            }
        }
    }

    fn report(&self, result: Result<impl Sized, BoardError>) {
        if let Err(error) = result {
            self.surface.info(&format!("image change skipped: {error}"));
        }
    }

    fn tick_particles(&mut self, _: &BoardEvent<S::File>, now_ms: f64) {
        self.particles.tick(now_ms);
    }

    fn tick_photos(&mut self, _: &BoardEvent<S::File>, now_ms: f64) {
        self.photos.tick(now_ms);
    }

    fn tick_animations(&mut self, _: &BoardEvent<S::File>, now_ms: f64) {
        self.animations.tick(now_ms);
    }

    fn run_due_tasks(&mut self, _: &BoardEvent<S::File>, now_ms: f64) {
        for task in self.tasks.due(now_ms) {
            self.run_task(task, now_ms);
        }
    }

    fn debounce_resize(&mut self, _: &BoardEvent<S::File>, now_ms: f64) {
        self.resize(now_ms);
    }

    fn visibility_changed(&mut self, event: &BoardEvent<S::File>, now_ms: f64) {
        if let BoardEvent::VisibilityChanged { hidden } = event {
            self.set_hidden(*hidden, now_ms);
        }
    }

    fn flash_clicked_slot(&mut self, event: &BoardEvent<S::File>, now_ms: f64) {
        let BoardEvent::SlotClicked(slot) = event else {
            return;
        };
        self.animations.play(
            format!("flash:{slot}"),
            AnimationTarget::Slot(slot.clone()),
            SLOT_CLICK_FLASH,
            now_ms,
        );
    }

    fn burst_at_clicked_slot(&mut self, event: &BoardEvent<S::File>, now_ms: f64) {
        let BoardEvent::SlotClicked(slot) = event else {
            return;
        };
        let Some(rect) = self.surface.element_box(slot.as_str()) else {
            return;
        };
        let (x, y) = rect.center();
        self.particles.burst(now_ms, x, y, self.config.click_burst);
    }

    fn rays_at_clicked_slot(&mut self, event: &BoardEvent<S::File>, _: f64) {
        let BoardEvent::SlotClicked(slot) = event else {
            return;
        };
        if self.connections.is_interactive() {
            self.connections.burst(slot, self.config.ray_count);
        }
    }

    fn hover_highlight(&mut self, event: &BoardEvent<S::File>, _: f64) {
        match event {
            BoardEvent::SlotEntered(slot) => self.connections.highlight(slot),
            BoardEvent::SlotLeft(_) => self.connections.reset_highlights(),
            _ => {}
        }
    }

    fn hover_lift(&mut self, event: &BoardEvent<S::File>, _: f64) {
        match event {
            BoardEvent::SlotEntered(slot) => {
                if let Some(previous) = self.hovered.take() {
                    self.surface.set_slot_lifted(&previous, None);
                }
                let tilt = self.jitter.range(-HOVER_TILT_DEG, HOVER_TILT_DEG);
                self.surface.set_slot_lifted(slot, Some(tilt));
                self.hovered = Some(slot.clone());
            }
            BoardEvent::SlotLeft(slot) => {
                self.surface.set_slot_lifted(slot, None);
                if self.hovered.as_ref() == Some(slot) {
                    self.hovered = None;
                }
            }
            _ => {}
        }
    }

    fn shake_question(&mut self, _: &BoardEvent<S::File>, now_ms: f64) {
        self.animations
            .play(QUESTION_SHAKE, AnimationTarget::Focal, FOCAL_SHAKE, now_ms);
    }

    fn reveal_from_question(&mut self, _: &BoardEvent<S::File>, now_ms: f64) {
        self.reveal(now_ms);
    }

    fn shortcut_pressed(&mut self, event: &BoardEvent<S::File>, now_ms: f64) {
        let BoardEvent::Key(chord) = event else {
            return;
        };
        if let Some(shortcut) = self.shortcut_for(chord) {
            self.apply_shortcut(shortcut, now_ms);
        }
    }

    fn control_changed(&mut self, event: &BoardEvent<S::File>, now_ms: f64) {
        match event {
            BoardEvent::SlotChosen(id) => {
                self.photos.select_slot(id, now_ms);
            }
            BoardEvent::FileChosen(file) => {
                let result = self.photos.set_image_from_file(file.clone());
                self.report(result);
            }
            BoardEvent::UrlSubmitted(url) => {
                let result = self.photos.set_image_from_url(url);
                self.report(result);
            }
            _ => {}
        }
    }

    fn load_finished(&mut self, event: &BoardEvent<S::File>, _: f64) {
        match event {
            BoardEvent::FileDecoded { ticket, result } => {
                self.photos.file_decoded(*ticket, result.clone());
            }
            BoardEvent::PreloadFinished { ticket, ok } => {
                self.photos.preload_finished(*ticket, *ok);
            }
            BoardEvent::ImageSettled { slot, src, ok } => {
                self.photos.image_settled(slot, src, *ok);
            }
            _ => {}
        }
    }

    fn drag_changed(&mut self, event: &BoardEvent<S::File>, now_ms: f64) {
        match event {
            BoardEvent::DragOver(slot) => {
                self.photos.drag_over(slot);
            }
            BoardEvent::DragLeft(slot) => {
                self.photos.drag_leave(slot);
            }
            BoardEvent::FileDropped { slot, file } => {
                let result = self.photos.drop_file(slot, file.clone(), now_ms);
                self.report(result);
            }
            _ => {}
        }
    }
}
