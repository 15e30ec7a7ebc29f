mod common;

use common::{assert_close, slot, FakeSurface};
use corkboard_core::config::default_connections;
use corkboard_core::connection::{RaySettings, DIMMED_OPACITY, HIGHLIGHT_WIDTH, LINE_WIDTH};
use corkboard_core::{BoardConfig, Color, ConnectionRegistry, Emphasis, Rect};

fn registry(surface: &FakeSurface) -> ConnectionRegistry<FakeSurface> {
    let config = BoardConfig::default();
    ConnectionRegistry::new(surface.clone(), RaySettings::from_config(&config), 7)
}

#[test]
fn default_connections_include_one_self_loop() {
    let surface = FakeSurface::board();
    let mut lines = registry(&surface);
    assert_eq!(lines.add_seeds(&default_connections()), 5);
    assert_eq!(lines.len(), 5);
    let loops: Vec<_> = lines.iter().filter(|line| line.is_self_loop()).collect();
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].from(), &slot("photo1"));
    assert_eq!(loops[0].to(), &slot("photo1"));
    let (from, to) = loops[0].endpoints().expect("placed");
    assert_eq!(from, to);
}

#[test]
fn refresh_places_endpoints_at_element_centres() {
    let surface = FakeSurface::board();
    let mut lines = registry(&surface);
    let id = lines
        .add_connection(&slot("photo1"), &slot("photo6"), Color::OXBLOOD, true)
        .expect("both slots exist");

    surface.move_element("photo6", Rect::new(1000.0, 350.0, 300.0, 300.0));
    assert_eq!(lines.refresh_positions(), 1);

    let (from, to) = lines.get(id).and_then(|line| line.endpoints()).expect("placed");
    assert_close(from.x, 200.0 / 1200.0 * 100.0);
    assert_close(from.y, 25.0);
    assert_close(to.x, 1050.0 / 1200.0 * 100.0);
    assert_close(to.y, 450.0 / 600.0 * 100.0);
    for point in [from, to] {
        assert!(point.in_unit_square());
    }
    let state = surface.state();
    let line = state.lines.values().next().expect("one line drawn");
    assert_eq!(line.placed, Some((from, to)));
}

#[test]
fn missing_endpoint_registers_nothing() {
    let surface = FakeSurface::board();
    let mut lines = registry(&surface);
    lines.add_seeds(&default_connections());

    let result = lines.add_connection(&slot("photo1"), &slot("photo9"), Color::GOLD, false);
    assert!(result.is_none());
    assert_eq!(lines.len(), 5);
    assert_eq!(surface.state().lines.len(), 5);
    assert!(surface
        .state()
        .warnings
        .iter()
        .any(|warning| warning.contains("photo9")));
}

#[test]
fn highlight_then_reset_restores_every_style() {
    let surface = FakeSurface::board();
    let mut lines = registry(&surface);
    lines.add_seeds(&default_connections());
    let before: Vec<_> = surface.state().lines.values().map(|line| line.style.clone()).collect();

    lines.highlight(&slot("photo2"));
    lines.highlight(&slot("photo2"));
    {
        let state = surface.state();
        let touching = state
            .lines
            .values()
            .filter(|line| line.style.width == HIGHLIGHT_WIDTH)
            .count();
        assert_eq!(touching, 2);
        let dimmed = state
            .lines
            .values()
            .filter(|line| line.style.opacity == DIMMED_OPACITY)
            .count();
        assert_eq!(dimmed, 3);
    }

    lines.reset_highlights();
    lines.reset_highlights();
    let after: Vec<_> = surface.state().lines.values().map(|line| line.style.clone()).collect();
    assert_eq!(before, after);
    assert!(lines.iter().all(|line| line.emphasis() == Emphasis::Normal));
}

#[test]
fn line_added_during_highlight_follows_it() {
    let surface = FakeSurface::board();
    let mut lines = registry(&surface);
    lines.highlight(&slot("photo3"));
    let touching = lines
        .add_connection(&slot("photo3"), &slot("photo4"), Color::OXBLOOD, true)
        .expect("added");
    let other = lines
        .add_connection(&slot("photo5"), &slot("photo6"), Color::OXBLOOD, true)
        .expect("added");
    assert_eq!(lines.get(touching).map(|line| line.emphasis()), Some(Emphasis::Highlighted));
    assert_eq!(lines.get(other).map(|line| line.emphasis()), Some(Emphasis::Dimmed));
}

#[test]
fn flash_reverts_to_each_lines_own_colour() {
    let surface = FakeSurface::board();
    let mut lines = registry(&surface);
    lines.add_seeds(&default_connections());
    lines.highlight(&slot("photo5"));

    lines.flash_all();
    assert!(surface
        .state()
        .lines
        .values()
        .all(|line| line.style.stroke == Color::GOLD && line.style.lightning));

    lines.end_flash();
    let state = surface.state();
    let oxblood = state
        .lines
        .values()
        .filter(|line| line.style.stroke == Color::OXBLOOD)
        .count();
    assert_eq!(oxblood, 4);
    let highlighted = state
        .lines
        .values()
        .filter(|line| line.style.width == HIGHLIGHT_WIDTH)
        .count();
    assert_eq!(highlighted, 1);
    assert!(state.lines.values().all(|line| !line.style.lightning));
}

#[test]
fn burst_emits_rays_without_touching_lines() {
    let surface = FakeSurface::board();
    let mut lines = registry(&surface);
    lines.add_seeds(&default_connections());
    let before: Vec<_> = surface.state().lines.values().cloned().collect();

    assert_eq!(lines.burst_default(&slot("photo2")), 8);
    assert_eq!(lines.burst(&slot("photo2"), 3), 3);
    assert_eq!(lines.burst(&slot("missing"), 8), 0);

    let state = surface.state();
    assert_eq!(state.rays.len(), 11);
    let first = &state.rays[0];
    assert_close(first.from.x, 50.0);
    assert_close(first.from.y, 25.0);
    assert_close(first.to.x, 65.0);
    assert_close(first.to.y, 25.0);
    assert_eq!(first.color, Color::GOLD);
    assert_eq!(first.lifetime_ms, 800);
    let after: Vec<_> = state.lines.values().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn toggle_twice_restores_mode() {
    let surface = FakeSurface::board();
    let mut lines = registry(&surface);
    let original = lines.is_interactive();
    assert_eq!(lines.toggle_interactive_mode(), !original);
    assert_eq!(lines.toggle_interactive_mode(), original);
}

#[test]
fn removal_releases_the_line() {
    let surface = FakeSurface::board();
    let mut lines = registry(&surface);
    let id = lines
        .add_connection(&slot("photo1"), &slot("photo2"), Color::OXBLOOD, true)
        .expect("added");
    lines.add_connection(&slot("photo2"), &slot("photo3"), Color::OXBLOOD, true);

    assert!(lines.remove_connection(id));
    assert!(!lines.remove_connection(id));
    assert_eq!(lines.len(), 1);
    assert_eq!(lines.clear_all(), 1);
    assert!(lines.is_empty());
    let state = surface.state();
    assert!(state.lines.is_empty());
    assert_eq!(state.released_lines.len(), 2);
}

#[test]
fn missing_container_skips_refresh() {
    let surface = FakeSurface::board();
    let mut lines = registry(&surface);
    lines.add_seeds(&default_connections());
    surface.state_mut().container = None;
    assert_eq!(lines.refresh_positions(), 0);
    assert_eq!(lines.len(), 5);
    let widths: Vec<_> = surface.state().lines.values().map(|line| line.style.width).collect();
    assert!(widths.iter().all(|width| *width == LINE_WIDTH));
}
