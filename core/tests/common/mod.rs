#![allow(dead_code)]

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use corkboard_core::{
    AnimationSpec, AnimationSurface, AnimationTarget, Diagnostics, LayoutProbe, LineStyle,
    LineSurface, LoadTicket, Notice, NoticeKind, Notifier, Overlay, ParticleKind, ParticleSpec,
    ParticleSurface, PercentPoint, PhotoSurface, Ray, Rect, SlotId, SlotScan, StageSurface,
};

pub const SLOT_IDS: [&str; 6] = ["photo1", "photo2", "photo3", "photo4", "photo5", "photo6"];

#[derive(Clone, Debug, PartialEq)]
pub struct FakeLine {
    pub style: LineStyle,
    pub placed: Option<(PercentPoint, PercentPoint)>,
    pub pulses: usize,
    pub paused: bool,
}

#[derive(Default)]
pub struct FakeState {
    pub container: Option<Rect>,
    pub boxes: HashMap<String, Rect>,
    pub focal: Option<Rect>,
    pub slots: Vec<SlotScan>,
    pub viewport_width: f64,
    pub lines: BTreeMap<u32, FakeLine>,
    pub released_lines: Vec<u32>,
    pub rays: Vec<Ray>,
    pub particles: BTreeMap<u32, ParticleSpec>,
    pub spawned_particles: usize,
    pub animations: BTreeMap<u32, (AnimationTarget, AnimationSpec)>,
    pub cancelled_animations: Vec<&'static str>,
    pub next_handle: u32,
    pub notices: Vec<Notice>,
    pub warnings: Vec<String>,
    pub infos: Vec<String>,
    pub glowing: HashMap<String, bool>,
    pub dimmed: HashMap<String, bool>,
    pub srcs: HashMap<String, String>,
    pub flashed: Vec<String>,
    pub drop_targets: HashMap<String, bool>,
    pub selection: Option<String>,
    pub decodes: Vec<(LoadTicket, String)>,
    pub preloads: Vec<(LoadTicket, String)>,
    pub url_cleared: usize,
    pub animations_paused: bool,
    pub overlays: Vec<Overlay>,
    pub overlays_cleared: usize,
    pub lifted: HashMap<String, Option<f64>>,
}

impl FakeState {
    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn live_particles(&self, kind: ParticleKind) -> usize {
        self.particles
            .values()
            .filter(|spec| spec.kind == kind)
            .count()
    }

    pub fn notices_of(&self, kind: NoticeKind) -> Vec<&str> {
        self.notices
            .iter()
            .filter(|notice| notice.kind == kind)
            .map(|notice| notice.message.as_str())
            .collect()
    }
}

/// Records everything the board asks of the page.
#[derive(Clone, Default)]
pub struct FakeSurface {
    state: Rc<RefCell<FakeState>>,
}

impl FakeSurface {
    /// A 1200x600 board at (100, 50) with six slots laid out in a 3x2 grid.
    pub fn board() -> Self {
        let surface = Self::default();
        {
            let mut state = surface.state_mut();
            state.container = Some(Rect::new(100.0, 50.0, 1200.0, 600.0));
            state.viewport_width = 1400.0;
            state.focal = Some(Rect::new(500.0, 250.0, 200.0, 100.0));
            for (index, id) in SLOT_IDS.iter().enumerate() {
                let col = (index % 3) as f64;
                let row = (index / 3) as f64;
                let rect = Rect::new(
                    100.0 + col * 400.0 + 100.0,
                    50.0 + row * 300.0 + 50.0,
                    200.0,
                    200.0,
                );
                state.boxes.insert((*id).to_owned(), rect);
                let src = format!("images/{id}.jpg");
                state.srcs.insert((*id).to_owned(), src.clone());
                state.slots.push(SlotScan {
                    id: SlotId::new(*id),
                    src,
                    title: format!("Evidence {}", index + 1),
                });
            }
        }
        surface
    }

    pub fn state(&self) -> Ref<'_, FakeState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, FakeState> {
        self.state.borrow_mut()
    }

    pub fn remove_element(&self, id: &str) {
        self.state_mut().boxes.remove(id);
    }

    pub fn move_element(&self, id: &str, rect: Rect) {
        self.state_mut().boxes.insert(id.to_owned(), rect);
    }
}

impl Diagnostics for FakeSurface {
    fn warn(&self, message: &str) {
        self.state.borrow_mut().warnings.push(message.to_owned());
    }

    fn info(&self, message: &str) {
        self.state.borrow_mut().infos.push(message.to_owned());
    }
}

impl Notifier for FakeSurface {
    fn notify(&mut self, notice: Notice) {
        self.state_mut().notices.push(notice);
    }
}

impl LayoutProbe for FakeSurface {
    fn container_box(&self) -> Option<Rect> {
        self.state().container
    }

    fn element_box(&self, id: &str) -> Option<Rect> {
        self.state().boxes.get(id).copied()
    }

    fn focal_box(&self) -> Option<Rect> {
        self.state().focal
    }
}

impl LineSurface for FakeSurface {
    type Line = u32;

    fn create_line(&mut self, style: &LineStyle) -> Option<u32> {
        let mut state = self.state_mut();
        let handle = state.handle();
        state.lines.insert(
            handle,
            FakeLine {
                style: style.clone(),
                placed: None,
                pulses: 0,
                paused: false,
            },
        );
        Some(handle)
    }

    fn place_line(&mut self, line: &u32, from: PercentPoint, to: PercentPoint) {
        if let Some(entry) = self.state_mut().lines.get_mut(line) {
            entry.placed = Some((from, to));
        }
    }

    fn style_line(&mut self, line: &u32, style: &LineStyle) {
        if let Some(entry) = self.state_mut().lines.get_mut(line) {
            entry.style = style.clone();
        }
    }

    fn pulse_line(&mut self, line: &u32, _duration_ms: u32) {
        if let Some(entry) = self.state_mut().lines.get_mut(line) {
            entry.pulses += 1;
        }
    }

    fn pause_line(&mut self, line: &u32, paused: bool) {
        if let Some(entry) = self.state_mut().lines.get_mut(line) {
            entry.paused = paused;
        }
    }

    fn release_line(&mut self, line: u32) {
        let mut state = self.state_mut();
        state.lines.remove(&line);
        state.released_lines.push(line);
    }

    fn emit_ray(&mut self, ray: &Ray) {
        self.state_mut().rays.push(ray.clone());
    }
}

impl PhotoSurface for FakeSurface {
    type File = String;

    fn scan_slots(&self) -> Vec<SlotScan> {
        self.state().slots.clone()
    }

    fn set_slot_glow(&mut self, slot: &SlotId, on: bool) {
        self.state_mut().glowing.insert(slot.to_string(), on);
    }

    fn set_slot_dimmed(&mut self, slot: &SlotId, dimmed: bool) {
        self.state_mut().dimmed.insert(slot.to_string(), dimmed);
    }

    fn set_slot_src(&mut self, slot: &SlotId, src: &str) {
        self.state_mut().srcs.insert(slot.to_string(), src.to_owned());
    }

    fn flash_slot(&mut self, slot: &SlotId, _duration_ms: u32) {
        self.state_mut().flashed.push(slot.to_string());
    }

    fn set_drop_target(&mut self, slot: &SlotId, active: bool) {
        self.state_mut().drop_targets.insert(slot.to_string(), active);
    }

    fn sync_selection(&mut self, slot: &SlotId) {
        self.state_mut().selection = Some(slot.to_string());
    }

    fn decode_file(&mut self, ticket: LoadTicket, file: String) {
        self.state_mut().decodes.push((ticket, file));
    }

    fn preload_url(&mut self, ticket: LoadTicket, url: &str) {
        self.state_mut().preloads.push((ticket, url.to_owned()));
    }

    fn clear_url_input(&mut self) {
        self.state_mut().url_cleared += 1;
    }
}

impl ParticleSurface for FakeSurface {
    type Particle = u32;

    fn viewport_width(&self) -> f64 {
        self.state().viewport_width
    }

    fn spawn_particle(&mut self, spec: &ParticleSpec) -> Option<u32> {
        let mut state = self.state_mut();
        let handle = state.handle();
        state.particles.insert(handle, spec.clone());
        state.spawned_particles += 1;
        Some(handle)
    }

    fn remove_particle(&mut self, particle: u32) {
        self.state_mut().particles.remove(&particle);
    }
}

impl AnimationSurface for FakeSurface {
    type Animation = u32;

    fn play(&mut self, target: &AnimationTarget, spec: &AnimationSpec) -> Option<u32> {
        let mut state = self.state_mut();
        let handle = state.handle();
        state.animations.insert(handle, (target.clone(), *spec));
        Some(handle)
    }

    fn cancel(&mut self, animation: u32) {
        let mut state = self.state_mut();
        if let Some((_, spec)) = state.animations.remove(&animation) {
            state.cancelled_animations.push(spec.keyframes);
        }
    }
}

impl StageSurface for FakeSurface {
    fn set_animations_paused(&mut self, paused: bool) {
        self.state_mut().animations_paused = paused;
    }

    fn show_overlay(&mut self, overlay: Overlay, _duration_ms: u32) {
        self.state_mut().overlays.push(overlay);
    }

    fn clear_overlays(&mut self) {
        self.state_mut().overlays_cleared += 1;
    }

    fn set_slot_lifted(&mut self, slot: &SlotId, tilt_deg: Option<f64>) {
        self.state_mut().lifted.insert(slot.to_string(), tilt_deg);
    }
}

pub fn slot(id: &str) -> SlotId {
    SlotId::new(id)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
