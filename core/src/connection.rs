use std::collections::BTreeMap;

use crate::color::Color;
use crate::config::{BoardConfig, ConnectionSeed};
use crate::geometry::{map_to_container_percent, point_at_angle, spoke_angle, PercentPoint};
use crate::jitter::Jitter;
use crate::slot_id::SlotId;
use crate::surface::{LineStyle, LineSurface, Ray};

pub const LINE_WIDTH: f32 = 2.0;
pub const LINE_OPACITY: f32 = 0.7;
pub const LINE_GLOW_PX: f32 = 5.0;
pub const HIGHLIGHT_WIDTH: f32 = 4.0;
pub const HIGHLIGHT_OPACITY: f32 = 1.0;
pub const HIGHLIGHT_GLOW_PX: f32 = 15.0;
pub const DIMMED_OPACITY: f32 = 0.3;
pub const RAY_COLOR: Color = Color::GOLD;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    Normal,
    Highlighted,
    Dimmed,
}

pub struct Connection<L> {
    id: ConnectionId,
    from: SlotId,
    to: SlotId,
    color: Color,
    animated: bool,
    emphasis: Emphasis,
    endpoints: Option<(PercentPoint, PercentPoint)>,
    line: L,
}

impl<L> Connection<L> {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn from(&self) -> &SlotId {
        &self.from
    }

    pub fn to(&self) -> &SlotId {
        &self.to
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn animated(&self) -> bool {
        self.animated
    }

    pub fn emphasis(&self) -> Emphasis {
        self.emphasis
    }

    /// Endpoints from the most recent successful placement.
    pub fn endpoints(&self) -> Option<(PercentPoint, PercentPoint)> {
        self.endpoints
    }

    pub fn touches(&self, slot: &SlotId) -> bool {
        self.from == *slot || self.to == *slot
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    pub fn line(&self) -> &L {
        &self.line
    }
}

fn line_style(color: &Color, animated: bool, emphasis: Emphasis, flashing: bool) -> LineStyle {
    let mut style = LineStyle {
        stroke: color.clone(),
        width: LINE_WIDTH,
        opacity: LINE_OPACITY,
        glow_px: LINE_GLOW_PX,
        glow: color.clone(),
        dashed: animated,
        lightning: false,
    };
    match emphasis {
        Emphasis::Normal => {}
        Emphasis::Highlighted => {
            style.width = HIGHLIGHT_WIDTH;
            style.opacity = HIGHLIGHT_OPACITY;
            style.glow_px = HIGHLIGHT_GLOW_PX;
        }
        Emphasis::Dimmed => {
            style.opacity = DIMMED_OPACITY;
        }
    }
    if flashing {
        style.stroke = Color::GOLD;
        style.glow = Color::GOLD;
        style.glow_px = HIGHLIGHT_GLOW_PX;
        style.lightning = true;
    }
    style
}

#[derive(Clone, Copy, Debug)]
pub struct RaySettings {
    pub count: usize,
    pub length_pct: f64,
    pub lifetime_ms: u32,
}

impl RaySettings {
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            count: config.ray_count,
            length_pct: config.ray_length_pct,
            lifetime_ms: config.ray_lifetime_ms,
        }
    }
}

/// Connector lines between slots, kept anchored to the slots' current boxes.
pub struct ConnectionRegistry<S: LineSurface> {
    surface: S,
    connections: BTreeMap<ConnectionId, Connection<S::Line>>,
    next_id: u64,
    interactive: bool,
    highlighted: Option<SlotId>,
    flashing: bool,
    rays: RaySettings,
    jitter: Jitter,
}

impl<S: LineSurface> ConnectionRegistry<S> {
    pub fn new(surface: S, rays: RaySettings, seed: u64) -> Self {
        Self {
            surface,
            connections: BTreeMap::new(),
            next_id: 1,
            interactive: false,
            highlighted: None,
            flashing: false,
            rays,
            jitter: Jitter::new(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection<S::Line>> {
        self.connections.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection<S::Line>> {
        self.connections.values()
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn highlighted(&self) -> Option<&SlotId> {
        self.highlighted.as_ref()
    }

    pub fn is_flashing(&self) -> bool {
        self.flashing
    }

    /// Draws a line from `from` to `to`. Both slots must be on the page;
    /// otherwise nothing is registered and `None` comes back.
    pub fn add_connection(
        &mut self,
        from: &SlotId,
        to: &SlotId,
        color: Color,
        animated: bool,
    ) -> Option<ConnectionId> {
        if self.surface.element_box(from.as_str()).is_none()
            || self.surface.element_box(to.as_str()).is_none()
        {
            self.surface
                .warn(&format!("cannot create connection: {from} -> {to}"));
            return None;
        }
        let emphasis = match &self.highlighted {
            None => Emphasis::Normal,
            Some(slot) if from == slot || to == slot => Emphasis::Highlighted,
            Some(_) => Emphasis::Dimmed,
        };
        let style = line_style(&color, animated, emphasis, self.flashing);
        let Some(line) = self.surface.create_line(&style) else {
            self.surface
                .warn(&format!("cannot draw connection: {from} -> {to}"));
            return None;
        };
        let id = ConnectionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.connections.insert(
            id,
            Connection {
                id,
                from: from.clone(),
                to: to.clone(),
                color,
                animated,
                emphasis,
                endpoints: None,
                line,
            },
        );
        self.place(id);
        Some(id)
    }

    pub fn add_seeds(&mut self, seeds: &[ConnectionSeed]) -> usize {
        seeds
            .iter()
            .filter_map(|seed| {
                self.add_connection(&seed.from, &seed.to, seed.color.clone(), seed.animated)
            })
            .count()
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> bool {
        match self.connections.remove(&id) {
            Some(connection) => {
                self.surface.release_line(connection.line);
                true
            }
            None => false,
        }
    }

    pub fn clear_all(&mut self) -> usize {
        let connections = std::mem::take(&mut self.connections);
        let count = connections.len();
        for (_, connection) in connections {
            self.surface.release_line(connection.line);
        }
        count
    }

    /// Re-reads every endpoint box and moves the lines. Returns how many
    /// lines were placed; lines whose slots are gone keep their last spot.
    pub fn refresh_positions(&mut self) -> usize {
        let Some(container) = self.surface.container_box() else {
            return 0;
        };
        let mut placed = 0;
        for connection in self.connections.values_mut() {
            if let Some(endpoints) = endpoints_for(&self.surface, container, connection) {
                self.surface
                    .place_line(&connection.line, endpoints.0, endpoints.1);
                connection.endpoints = Some(endpoints);
                placed += 1;
            }
        }
        placed
    }

    pub fn highlight(&mut self, slot: &SlotId) {
        self.highlighted = Some(slot.clone());
        for connection in self.connections.values_mut() {
            connection.emphasis = if connection.touches(slot) {
                Emphasis::Highlighted
            } else {
                Emphasis::Dimmed
            };
        }
        self.restyle_all();
    }

    pub fn reset_highlights(&mut self) {
        self.highlighted = None;
        for connection in self.connections.values_mut() {
            connection.emphasis = Emphasis::Normal;
        }
        self.restyle_all();
    }

    /// Restyles every line in lightning gold until [`Self::end_flash`].
    pub fn flash_all(&mut self) {
        self.flashing = true;
        self.restyle_all();
    }

    pub fn end_flash(&mut self) {
        self.flashing = false;
        self.restyle_all();
    }

    /// Emits `ray_count` rays around the slot's centre. Persistent lines are
    /// untouched. Returns the number of rays drawn.
    pub fn burst(&mut self, slot: &SlotId, ray_count: usize) -> usize {
        let Some(container) = self.surface.container_box() else {
            return 0;
        };
        let Some(center) = self
            .surface
            .element_box(slot.as_str())
            .and_then(|rect| map_to_container_percent(rect, container))
        else {
            return 0;
        };
        for index in 0..ray_count {
            let angle = spoke_angle(index, ray_count);
            let ray = Ray {
                from: center,
                to: point_at_angle(center, angle, self.rays.length_pct),
                color: RAY_COLOR,
                lifetime_ms: self.rays.lifetime_ms,
            };
            self.surface.emit_ray(&ray);
        }
        ray_count
    }

    pub fn burst_default(&mut self, slot: &SlotId) -> usize {
        self.burst(slot, self.rays.count)
    }

    pub fn toggle_interactive_mode(&mut self) -> bool {
        self.interactive = !self.interactive;
        self.interactive
    }

    /// Picks a random share of the lines to pulse.
    pub fn pick_for_pulse(&mut self, chance: f64) -> Vec<ConnectionId> {
        let ids: Vec<ConnectionId> = self.connections.keys().copied().collect();
        ids.into_iter()
            .filter(|_| self.jitter.chance(chance))
            .collect()
    }

    /// Briefly pulses one line. Returns `false` if it is gone.
    pub fn pulse(&mut self, id: ConnectionId, duration_ms: u32) -> bool {
        let Some(connection) = self.connections.get(&id) else {
            return false;
        };
        self.surface.pulse_line(&connection.line, duration_ms);
        true
    }

    pub fn set_paused(&mut self, paused: bool) {
        for connection in self.connections.values() {
            self.surface.pause_line(&connection.line, paused);
        }
    }

    fn place(&mut self, id: ConnectionId) {
        let Some(container) = self.surface.container_box() else {
            return;
        };
        let Some(connection) = self.connections.get_mut(&id) else {
            return;
        };
        if let Some(endpoints) = endpoints_for(&self.surface, container, connection) {
            self.surface
                .place_line(&connection.line, endpoints.0, endpoints.1);
            connection.endpoints = Some(endpoints);
        }
    }

    fn restyle_all(&mut self) {
        for connection in self.connections.values() {
            let style = line_style(
                &connection.color,
                connection.animated,
                connection.emphasis,
                self.flashing,
            );
            self.surface.style_line(&connection.line, &style);
        }
    }
}

fn endpoints_for<S: LineSurface>(
    surface: &S,
    container: crate::geometry::Rect,
    connection: &Connection<S::Line>,
) -> Option<(PercentPoint, PercentPoint)> {
    let from = map_to_container_percent(surface.element_box(connection.from.as_str())?, container)?;
    let to = map_to_container_percent(surface.element_box(connection.to.as_str())?, container)?;
    Some((from, to))
}
