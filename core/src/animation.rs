use std::collections::HashMap;

use crate::slot_id::SlotId;
use crate::surface::AnimationSurface;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnimationTarget {
    Slot(SlotId),
    /// Full-page overlay above the board.
    Stage,
    /// The element reveal bursts radiate from.
    Focal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationSpec {
    pub keyframes: &'static str,
    pub duration_ms: u32,
    pub easing: &'static str,
}

pub const SLOT_CLICK_FLASH: AnimationSpec = AnimationSpec {
    keyframes: "flashEffect",
    duration_ms: 300,
    easing: "ease-out",
};

pub const REVEAL_SCREEN_FLASH: AnimationSpec = AnimationSpec {
    keyframes: "mysteryFlash",
    duration_ms: 1500,
    easing: "ease-out",
};

pub const FOCAL_SHAKE: AnimationSpec = AnimationSpec {
    keyframes: "mysteryShake",
    duration_ms: 500,
    easing: "ease-in-out",
};

struct Running<A> {
    handle: A,
    ends_at_ms: f64,
}

/// Named animations, at most one running per name.
pub struct AnimationRegistry<S: AnimationSurface> {
    surface: S,
    running: HashMap<String, Running<S::Animation>>,
}

impl<S: AnimationSurface> AnimationRegistry<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            running: HashMap::new(),
        }
    }

    /// Starts `spec` under `name`, cancelling whatever already runs there.
    pub fn play(
        &mut self,
        name: impl Into<String>,
        target: AnimationTarget,
        spec: AnimationSpec,
        now_ms: f64,
    ) -> bool {
        let name = name.into();
        if let Some(previous) = self.running.remove(&name) {
            self.surface.cancel(previous.handle);
        }
        let Some(handle) = self.surface.play(&target, &spec) else {
            return false;
        };
        self.running.insert(
            name,
            Running {
                handle,
                ends_at_ms: now_ms + f64::from(spec.duration_ms),
            },
        );
        true
    }

    pub fn cancel(&mut self, name: &str) -> bool {
        match self.running.remove(name) {
            Some(running) => {
                self.surface.cancel(running.handle);
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&mut self) {
        for (_, running) in self.running.drain() {
            self.surface.cancel(running.handle);
        }
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.running.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Retires animations whose duration has elapsed.
    pub fn tick(&mut self, now_ms: f64) {
        let finished: Vec<String> = self
            .running
            .iter()
            .filter(|(_, running)| running.ends_at_ms <= now_ms)
            .map(|(name, _)| name.clone())
            .collect();
        for name in finished {
            self.cancel(&name);
        }
    }
}
