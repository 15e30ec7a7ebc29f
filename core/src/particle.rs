use crate::color::{Color, AMBIENT_PALETTE};
use crate::config::BoardConfig;
use crate::geometry::spoke_angle;
use crate::jitter::Jitter;
use crate::pool::{Pool, PoolIndex};
use crate::scheduler::{Scheduler, TaskToken};
use crate::surface::ParticleSurface;

pub const AMBIENT_CAP_FACTOR: usize = 2;
pub const AMBIENT_LINGER_MS: f64 = 2000.0;

pub type ParticleId = PoolIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    Ambient,
    Burst,
    Dust,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Motion {
    /// Rises across the viewport from `start_x_px`, drifting to `end_x_px`.
    Float {
        start_x_px: f64,
        end_x_px: f64,
        duration_ms: u32,
        delay_ms: u32,
    },
    /// Flies from a page position by `(dx, dy)` and shrinks away.
    Radial {
        origin: (f64, f64),
        offset: (f64, f64),
        duration_ms: u32,
    },
    /// Hovers around a percentage position inside the particle layer.
    Hover {
        left_pct: f64,
        top_pct: f64,
        duration_ms: u32,
        delay_ms: u32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSpec {
    pub kind: ParticleKind,
    pub size_px: f64,
    pub color: Color,
    pub opacity: f64,
    pub motion: Motion,
}

#[derive(Clone, Copy, Debug)]
pub struct ParticleSettings {
    pub target: usize,
    pub spawn_period_ms: f64,
    pub seed_stagger_ms: f64,
    pub burst_lifetime_ms: u32,
    pub dust_lifetime_ms: u32,
}

impl ParticleSettings {
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            target: config.ambient_target,
            spawn_period_ms: f64::from(config.ambient_spawn_ms),
            seed_stagger_ms: f64::from(config.ambient_seed_stagger_ms),
            burst_lifetime_ms: config.burst_lifetime_ms,
            dust_lifetime_ms: config.dust_lifetime_ms,
        }
    }

    pub fn cap(&self) -> usize {
        self.target.saturating_mul(AMBIENT_CAP_FACTOR)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AmbientTimer {
    Spawn,
    Seed,
}

struct Live<P> {
    kind: ParticleKind,
    expires_at_ms: f64,
    handle: P,
}

/// Ambient, burst and dust particles, all self-expiring.
///
/// Liveness is tracked in a generation-checked pool so the ambient cap can
/// be checked against an exact count rather than the page's node list.
pub struct ParticleRegistry<S: ParticleSurface> {
    surface: S,
    pool: Pool<Live<S::Particle>>,
    timers: Scheduler<AmbientTimer>,
    spawn_token: Option<TaskToken>,
    seed_tokens: Vec<TaskToken>,
    ambient_live: usize,
    settings: ParticleSettings,
    jitter: Jitter,
}

impl<S: ParticleSurface> ParticleRegistry<S> {
    pub fn new(surface: S, settings: ParticleSettings, seed: u64) -> Self {
        Self {
            surface,
            pool: Pool::new(),
            timers: Scheduler::new(),
            spawn_token: None,
            seed_tokens: Vec::new(),
            ambient_live: 0,
            settings,
            jitter: Jitter::new(seed),
        }
    }

    pub fn settings(&self) -> &ParticleSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.spawn_token.is_some()
    }

    pub fn live_ambient(&self) -> usize {
        self.ambient_live
    }

    pub fn live_total(&self) -> usize {
        self.pool.len()
    }

    pub fn live_of(&self, kind: ParticleKind) -> usize {
        self.pool.iter().filter(|(_, live)| live.kind == kind).count()
    }

    pub fn is_live(&self, id: ParticleId) -> bool {
        self.pool.contains(id)
    }

    /// Starts the periodic ambient spawn. Returns `false` if it was
    /// already running.
    pub fn start_ambient(&mut self, now_ms: f64) -> bool {
        if self.spawn_token.is_some() {
            return false;
        }
        self.spawn_token = Some(self.timers.repeating(
            now_ms,
            self.settings.spawn_period_ms,
            AmbientTimer::Spawn,
        ));
        true
    }

    /// Schedules the initial population as staggered spawns, one per
    /// `seed_stagger_ms`. Only board start seeds; a resumed spawner fills
    /// back up at the periodic rate. Returns how many seeds were queued.
    pub fn seed_ambient(&mut self, now_ms: f64) -> usize {
        for index in 0..self.settings.target {
            let delay = self.settings.seed_stagger_ms * index as f64;
            let token = self.timers.once(now_ms, delay, AmbientTimer::Seed);
            self.seed_tokens.push(token);
        }
        self.settings.target
    }

    /// Cancels spawning and removes every live ambient particle at once.
    /// Returns how many were removed.
    pub fn stop_ambient(&mut self) -> usize {
        if let Some(token) = self.spawn_token.take() {
            self.timers.cancel(token);
        }
        for token in self.seed_tokens.drain(..) {
            self.timers.cancel(token);
        }
        let removed = self
            .pool
            .drain_where(|live| live.kind == ParticleKind::Ambient);
        let count = removed.len();
        for live in removed {
            self.surface.remove_particle(live.handle);
        }
        self.ambient_live = 0;
        count
    }

    /// Expires old particles, then runs due seeds and the periodic spawn.
    pub fn tick(&mut self, now_ms: f64) {
        self.sweep(now_ms);
        for timer in self.timers.due(now_ms) {
            match timer {
                AmbientTimer::Spawn | AmbientTimer::Seed => {
                    self.spawn_ambient(now_ms);
                }
            }
        }
        let timers = &self.timers;
        self.seed_tokens.retain(|token| timers.is_pending(*token));
    }

    /// Removes particles whose lifetime has elapsed. Returns how many.
    pub fn sweep(&mut self, now_ms: f64) -> usize {
        let expired = self.pool.drain_where(|live| live.expires_at_ms <= now_ms);
        let count = expired.len();
        for live in expired {
            if live.kind == ParticleKind::Ambient {
                self.ambient_live = self.ambient_live.saturating_sub(1);
            }
            self.surface.remove_particle(live.handle);
        }
        count
    }

    /// Spawns one ambient particle unless the live count is at the cap.
    pub fn spawn_ambient(&mut self, now_ms: f64) -> Option<ParticleId> {
        if self.ambient_live >= self.settings.cap() {
            return None;
        }
        let viewport = self.surface.viewport_width().max(0.0);
        let size_px = self.jitter.range(1.0, 5.0);
        let color = self
            .jitter
            .pick(&AMBIENT_PALETTE)
            .cloned()
            .unwrap_or(Color::GOLD);
        let opacity = self.jitter.range(0.1, 0.4);
        let duration_ms = self.jitter.range(8000.0, 18000.0).round() as u32;
        let start_x_px = self.jitter.range(0.0, viewport);
        let end_x_px = start_x_px + self.jitter.range(-100.0, 100.0);
        let delay_ms = self.jitter.range(0.0, 2000.0).round() as u32;
        let spec = ParticleSpec {
            kind: ParticleKind::Ambient,
            size_px,
            color,
            opacity,
            motion: Motion::Float {
                start_x_px,
                end_x_px,
                duration_ms,
                delay_ms,
            },
        };
        let lifetime = f64::from(duration_ms) + AMBIENT_LINGER_MS;
        let id = self.insert(spec, now_ms + lifetime)?;
        self.ambient_live += 1;
        Some(id)
    }

    /// Spawns `count` particles flying outward from a page position. Bursts
    /// do not count against the ambient cap.
    pub fn burst(&mut self, now_ms: f64, x: f64, y: f64, count: usize) -> usize {
        let lifetime_ms = self.settings.burst_lifetime_ms;
        let mut spawned = 0;
        for index in 0..count {
            let angle = spoke_angle(index, count);
            let distance = self.jitter.range(50.0, 150.0);
            let spec = ParticleSpec {
                kind: ParticleKind::Burst,
                size_px: self.jitter.range(2.0, 5.0),
                color: Color::GOLD,
                opacity: 1.0,
                motion: Motion::Radial {
                    origin: (x, y),
                    offset: (angle.cos() * distance, angle.sin() * distance),
                    duration_ms: lifetime_ms,
                },
            };
            if self.insert(spec, now_ms + f64::from(lifetime_ms)).is_some() {
                spawned += 1;
            }
        }
        spawned
    }

    /// Spawns `count` faint hovering motes, each removed after the dust
    /// lifetime whatever state its animation is in.
    pub fn dust_motes(&mut self, now_ms: f64, count: usize) -> usize {
        let lifetime_ms = self.settings.dust_lifetime_ms;
        let mut spawned = 0;
        for _ in 0..count {
            let spec = ParticleSpec {
                kind: ParticleKind::Dust,
                size_px: 1.0,
                color: Color::MOTE,
                opacity: 0.3,
                motion: Motion::Hover {
                    left_pct: self.jitter.range(0.0, 100.0),
                    top_pct: self.jitter.range(0.0, 100.0),
                    duration_ms: self.jitter.range(15000.0, 25000.0).round() as u32,
                    delay_ms: self.jitter.range(0.0, 5000.0).round() as u32,
                },
            };
            if self.insert(spec, now_ms + f64::from(lifetime_ms)).is_some() {
                spawned += 1;
            }
        }
        spawned
    }

    fn insert(&mut self, spec: ParticleSpec, expires_at_ms: f64) -> Option<ParticleId> {
        let handle = self.surface.spawn_particle(&spec)?;
        Some(self.pool.insert(Live {
            kind: spec.kind,
            expires_at_ms,
            handle,
        }))
    }
}
