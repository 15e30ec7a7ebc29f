pub mod animation;
pub mod color;
pub mod config;
pub mod connection;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod geometry;
pub mod jitter;
pub mod particle;
pub mod photo;
pub mod pool;
pub mod scheduler;
pub mod shortcut;
pub mod slot_id;
pub mod surface;

pub use animation::{AnimationRegistry, AnimationSpec, AnimationTarget};
pub use color::Color;
pub use config::{default_connections, BoardConfig, ConnectionSeed};
pub use connection::{Connection, ConnectionId, ConnectionRegistry, Emphasis};
pub use coordinator::{BoardTask, EffectCoordinator};
pub use error::BoardError;
pub use events::{BoardEvent, Component, EventSource, SubscriptionTable};
pub use geometry::{map_to_container_percent, point_at_angle, PercentPoint, Rect};
pub use particle::{Motion, ParticleId, ParticleKind, ParticleRegistry, ParticleSpec};
pub use photo::{LoadTicket, PhotoRegistry, PhotoSlot, SelectedFile};
pub use shortcut::{KeyChord, KeyTarget, Shortcut};
pub use slot_id::SlotId;
pub use surface::{
    AnimationSurface, BoardSurface, Diagnostics, LayoutProbe, LineStyle, LineSurface, Notice,
    NoticeKind, Notifier, Overlay, ParticleSurface, PhotoSurface, Ray, SlotScan, StageSurface,
};
