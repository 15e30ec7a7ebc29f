//! The seams between board logic and the page it decorates.
//!
//! Registries never touch the document directly. Each one is generic over
//! the narrow surface it needs; the browser binary implements all of them
//! over `web-sys`, tests implement them over a recording fake.

use crate::animation::{AnimationSpec, AnimationTarget};
use crate::color::Color;
use crate::geometry::{PercentPoint, Rect};
use crate::particle::ParticleSpec;
use crate::photo::LoadTicket;
use crate::slot_id::SlotId;

pub trait Diagnostics {
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
}

pub trait LayoutProbe {
    /// Box of the reference container that defines the percentage space.
    fn container_box(&self) -> Option<Rect>;
    fn element_box(&self, id: &str) -> Option<Rect>;
    /// Box of the element reveal bursts radiate from, if the page has one.
    fn focal_box(&self) -> Option<Rect>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineStyle {
    pub stroke: Color,
    pub width: f32,
    pub opacity: f32,
    pub glow_px: f32,
    pub glow: Color,
    pub dashed: bool,
    pub lightning: bool,
}

/// A short-lived radial line emitted by a burst.
#[derive(Clone, Debug, PartialEq)]
pub struct Ray {
    pub from: PercentPoint,
    pub to: PercentPoint,
    pub color: Color,
    pub lifetime_ms: u32,
}

pub trait LineSurface: LayoutProbe + Diagnostics {
    type Line;

    fn create_line(&mut self, style: &LineStyle) -> Option<Self::Line>;
    fn place_line(&mut self, line: &Self::Line, from: PercentPoint, to: PercentPoint);
    fn style_line(&mut self, line: &Self::Line, style: &LineStyle);
    fn pulse_line(&mut self, line: &Self::Line, duration_ms: u32);
    fn pause_line(&mut self, line: &Self::Line, paused: bool);
    fn release_line(&mut self, line: Self::Line);
    /// Draws a ray that removes itself after `ray.lifetime_ms`.
    fn emit_ray(&mut self, ray: &Ray);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }
}

pub trait Notifier {
    /// Shows a transient banner, replacing any banner still on screen.
    fn notify(&mut self, notice: Notice);
}

/// What the page reports about one photo container when scanned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotScan {
    pub id: SlotId,
    pub src: String,
    pub title: String,
}

pub trait PhotoSurface: Diagnostics + Notifier {
    type File: Clone;

    fn scan_slots(&self) -> Vec<SlotScan>;
    fn set_slot_glow(&mut self, slot: &SlotId, on: bool);
    /// Dimmed and slightly shrunk while a new image is loading.
    fn set_slot_dimmed(&mut self, slot: &SlotId, dimmed: bool);
    /// Points the slot's image at `src`. The surface later reports the
    /// outcome as an `ImageSettled` event.
    fn set_slot_src(&mut self, slot: &SlotId, src: &str);
    fn flash_slot(&mut self, slot: &SlotId, duration_ms: u32);
    fn set_drop_target(&mut self, slot: &SlotId, active: bool);
    fn sync_selection(&mut self, slot: &SlotId);
    /// Reads `file` into a displayable source, reported as `FileDecoded`.
    fn decode_file(&mut self, ticket: LoadTicket, file: Self::File);
    /// Loads `url` off-screen, reported as `PreloadFinished`.
    fn preload_url(&mut self, ticket: LoadTicket, url: &str);
    fn clear_url_input(&mut self);
}

pub trait ParticleSurface {
    type Particle;

    fn viewport_width(&self) -> f64;
    fn spawn_particle(&mut self, spec: &ParticleSpec) -> Option<Self::Particle>;
    fn remove_particle(&mut self, particle: Self::Particle);
}

pub trait AnimationSurface {
    type Animation;

    fn play(&mut self, target: &AnimationTarget, spec: &AnimationSpec) -> Option<Self::Animation>;
    /// Stops the animation and restores whatever it replaced.
    fn cancel(&mut self, animation: Self::Animation);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    Welcome,
    ModeBanner { interactive: bool },
}

pub trait StageSurface: Diagnostics + Notifier {
    /// Freezes or resumes CSS-driven animations on slots and decorations.
    fn set_animations_paused(&mut self, paused: bool);
    fn show_overlay(&mut self, overlay: Overlay, duration_ms: u32);
    fn clear_overlays(&mut self);
    /// Hover lift; `Some(deg)` scales the slot up and tilts it.
    fn set_slot_lifted(&mut self, slot: &SlotId, tilt_deg: Option<f64>);
}

/// Everything the coordinator needs from the page.
pub trait BoardSurface:
    LineSurface + PhotoSurface + ParticleSurface + AnimationSurface + StageSurface + Clone
{
}

impl<T> BoardSurface for T where
    T: LineSurface + PhotoSurface + ParticleSurface + AnimationSurface + StageSurface + Clone
{
}
