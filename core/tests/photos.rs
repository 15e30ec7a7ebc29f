mod common;

use common::{slot, FakeSurface};
use corkboard_core::photo::PhotoSettings;
use corkboard_core::{BoardConfig, BoardError, NoticeKind, PhotoRegistry, SelectedFile};

fn registry(surface: &FakeSurface) -> PhotoRegistry<FakeSurface> {
    let mut photos = PhotoRegistry::new(
        surface.clone(),
        PhotoSettings::from_config(&BoardConfig::default()),
    );
    assert_eq!(photos.init_from_document(), 6);
    photos
}

fn png(name: &str) -> SelectedFile<String> {
    SelectedFile::new(name, "image/png", name.to_owned())
}

#[test]
fn scan_records_defaults_and_activates_first_slot() {
    let surface = FakeSurface::board();
    let photos = registry(&surface);
    assert_eq!(photos.active_slot(), Some(&slot("photo1")));
    let third = photos.slot("photo3").expect("scanned");
    assert_eq!(third.default_src(), "images/photo3.jpg");
    assert_eq!(third.current_src(), "images/photo3.jpg");
    assert_eq!(third.title(), "Evidence 3");
    assert_eq!(photos.slot_at(5), Some(&slot("photo6")));
}

#[test]
fn selection_glow_moves_and_expires() {
    let surface = FakeSurface::board();
    let mut photos = registry(&surface);
    assert!(photos.select_slot("photo2", 0.0));
    assert!(photos.select_slot("photo4", 500.0));
    {
        let state = surface.state();
        assert_eq!(state.glowing.get("photo2"), Some(&false));
        assert_eq!(state.glowing.get("photo4"), Some(&true));
        assert_eq!(state.selection.as_deref(), Some("photo4"));
    }
    photos.tick(2000.0);
    assert_eq!(photos.glowing_slot(), Some(&slot("photo4")));
    photos.tick(2500.0);
    assert_eq!(photos.glowing_slot(), None);
    assert_eq!(surface.state().glowing.get("photo4"), Some(&false));
    assert_eq!(photos.active_slot(), Some(&slot("photo4")));
}

#[test]
fn unknown_slot_is_not_selected() {
    let surface = FakeSurface::board();
    let mut photos = registry(&surface);
    assert!(!photos.select_slot("photo42", 0.0));
    assert_eq!(photos.active_slot(), Some(&slot("photo1")));
    assert_eq!(surface.state().warnings.len(), 1);
}

#[test]
fn non_image_file_changes_nothing() {
    let surface = FakeSurface::board();
    let mut photos = registry(&surface);
    let before = photos.snapshot_state();

    let err = photos
        .set_image_from_file(SelectedFile::new("notes.txt", "text/plain", "notes.txt".to_owned()))
        .expect_err("rejected");
    assert!(matches!(err, BoardError::InvalidInput { .. }));

    assert_eq!(photos.snapshot_state(), before);
    let state = surface.state();
    assert!(state.decodes.is_empty());
    assert_eq!(state.srcs.get("photo1").map(String::as_str), Some("images/photo1.jpg"));
    assert_eq!(state.notices_of(NoticeKind::Error).len(), 1);
}

#[test]
fn decoded_file_lands_on_the_slot_active_at_request() {
    let surface = FakeSurface::board();
    let mut photos = registry(&surface);
    photos.select_slot("photo3", 0.0);
    let ticket = photos.set_image_from_file(png("suspect.png")).expect("accepted");
    photos.select_slot("photo5", 10.0);

    assert!(photos.file_decoded(ticket, Ok("data:image/png;base64,AAAA".to_owned())));
    assert!(!photos.file_decoded(ticket, Ok("data:again".to_owned())));
    {
        let state = surface.state();
        assert_eq!(
            state.srcs.get("photo3").map(String::as_str),
            Some("data:image/png;base64,AAAA")
        );
        assert_eq!(state.dimmed.get("photo3"), Some(&true));
    }
    assert_eq!(photos.slot("photo3").map(|s| s.current_src()), Some("images/photo3.jpg"));

    assert!(photos.image_settled(&slot("photo3"), "data:image/png;base64,AAAA", true));
    let state = surface.state();
    assert_eq!(state.dimmed.get("photo3"), Some(&false));
    assert_eq!(state.flashed, vec!["photo3".to_owned()]);
    assert_eq!(state.notices_of(NoticeKind::Success), vec!["Image updated successfully!"]);
    drop(state);
    assert_eq!(
        photos.snapshot_state().get("photo3").map(String::as_str),
        Some("data:image/png;base64,AAAA")
    );
}

#[test]
fn decode_error_is_reported() {
    let surface = FakeSurface::board();
    let mut photos = registry(&surface);
    let ticket = photos.set_image_from_file(png("broken.png")).expect("accepted");
    assert!(!photos.file_decoded(ticket, Err(BoardError::load_failure("broken.png"))));
    assert_eq!(
        surface.state().notices_of(NoticeKind::Error),
        vec!["Error reading file"]
    );
    assert_eq!(photos.pending_loads(), 0);
}

#[test]
fn empty_url_is_rejected_immediately() {
    let surface = FakeSurface::board();
    let mut photos = registry(&surface);
    let err = photos.set_image_from_url("   ").expect_err("empty");
    assert!(matches!(err, BoardError::InvalidInput { .. }));
    let state = surface.state();
    assert!(state.preloads.is_empty());
    assert_eq!(state.notices_of(NoticeKind::Error).len(), 1);
}

#[test]
fn failed_preload_leaves_slot_alone() {
    let surface = FakeSurface::board();
    let mut photos = registry(&surface);
    let ticket = photos
        .set_image_from_url("  https://example.test/missing.jpg ")
        .expect("accepted");
    assert_eq!(
        surface.state().preloads,
        vec![(ticket, "https://example.test/missing.jpg".to_owned())]
    );

    assert!(!photos.preload_finished(ticket, false));
    let state = surface.state();
    assert_eq!(state.srcs.get("photo1").map(String::as_str), Some("images/photo1.jpg"));
    assert!(state.dimmed.is_empty());
    assert_eq!(state.url_cleared, 0);
    assert_eq!(
        state.notices_of(NoticeKind::Error),
        vec!["Unable to load image from URL"]
    );
}

#[test]
fn successful_preload_applies_and_clears_input() {
    let surface = FakeSurface::board();
    let mut photos = registry(&surface);
    let ticket = photos
        .set_image_from_url("https://example.test/face.jpg")
        .expect("accepted");
    assert!(photos.preload_finished(ticket, true));
    let state = surface.state();
    assert_eq!(state.url_cleared, 1);
    assert_eq!(
        state.srcs.get("photo1").map(String::as_str),
        Some("https://example.test/face.jpg")
    );
}

#[test]
fn failed_load_reverts_to_known_good() {
    let surface = FakeSurface::board();
    let mut photos = registry(&surface);
    let photo2 = slot("photo2");
    photos.apply_image(&photo2, "good.jpg");
    photos.image_settled(&photo2, "good.jpg", true);

    photos.apply_image(&photo2, "bad.jpg");
    assert!(photos.image_settled(&photo2, "bad.jpg", false));

    assert_eq!(
        photos.snapshot_state().get("photo2").map(String::as_str),
        Some("good.jpg")
    );
    let state = surface.state();
    assert_eq!(state.srcs.get("photo2").map(String::as_str), Some("good.jpg"));
    assert_eq!(state.dimmed.get("photo2"), Some(&false));
    assert_eq!(state.notices_of(NoticeKind::Error).len(), 1);
}

#[test]
fn stale_settle_reports_are_ignored() {
    let surface = FakeSurface::board();
    let mut photos = registry(&surface);
    let photo2 = slot("photo2");
    photos.apply_image(&photo2, "first.jpg");
    photos.apply_image(&photo2, "second.jpg");

    assert!(!photos.image_settled(&photo2, "first.jpg", false));
    assert_eq!(photos.slot("photo2").and_then(|s| s.pending_src()), Some("second.jpg"));
    assert!(photos.image_settled(&photo2, "second.jpg", true));
    assert!(!photos.image_settled(&photo2, "images/photo2.jpg", true));
    assert_eq!(photos.slot("photo2").map(|s| s.current_src()), Some("second.jpg"));
}

#[test]
fn reset_restores_defaults() {
    let surface = FakeSurface::board();
    let mut photos = registry(&surface);
    for id in ["photo1", "photo4"] {
        photos.apply_image(&slot(id), "x.jpg");
        photos.image_settled(&slot(id), "x.jpg", true);
    }
    assert_eq!(photos.reset_all(), 6);
    for (id, src) in photos.snapshot_state() {
        assert_eq!(src, format!("images/{id}.jpg"));
    }
    let state = surface.state();
    assert_eq!(state.srcs.get("photo4").map(String::as_str), Some("images/photo4.jpg"));
    assert_eq!(state.notices_of(NoticeKind::Info).len(), 1);
}

#[test]
fn dropping_a_file_selects_the_slot() {
    let surface = FakeSurface::board();
    let mut photos = registry(&surface);
    let target = slot("photo6");
    assert!(photos.drag_over(&target));
    assert_eq!(surface.state().drop_targets.get("photo6"), Some(&true));

    let ticket = photos.drop_file(&target, png("drop.png"), 0.0).expect("accepted");
    assert_eq!(photos.active_slot(), Some(&target));
    assert_eq!(surface.state().drop_targets.get("photo6"), Some(&false));
    photos.file_decoded(ticket, Ok("data:drop".to_owned()));
    assert_eq!(surface.state().srcs.get("photo6").map(String::as_str), Some("data:drop"));

    let err = photos
        .drop_file(&slot("nowhere"), png("drop.png"), 0.0)
        .expect_err("unknown slot");
    assert!(matches!(err, BoardError::MissingElement { .. }));
    assert!(!photos.drag_over(&slot("nowhere")));
}

#[test]
fn snapshot_has_no_side_effects() {
    let surface = FakeSurface::board();
    let photos = registry(&surface);
    let notices = surface.state().notices.len();
    let first = photos.snapshot_state();
    let second = photos.snapshot_state();
    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
    assert_eq!(surface.state().notices.len(), notices);
}
