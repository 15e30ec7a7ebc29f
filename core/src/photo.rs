use std::collections::{BTreeMap, HashMap};

use crate::config::BoardConfig;
use crate::error::BoardError;
use crate::slot_id::SlotId;
use crate::surface::{Notice, PhotoSurface};

pub const IMAGE_MEDIA_PREFIX: &str = "image/";

/// Identifies one asynchronous file decode or URL preload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoSlot {
    id: SlotId,
    title: String,
    default_src: String,
    known_good_src: String,
    pending_src: Option<String>,
}

impl PhotoSlot {
    pub fn id(&self) -> &SlotId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn default_src(&self) -> &str {
        &self.default_src
    }

    /// Last source that is known to have loaded.
    pub fn current_src(&self) -> &str {
        &self.known_good_src
    }

    pub fn pending_src(&self) -> Option<&str> {
        self.pending_src.as_deref()
    }

    pub fn is_swapping(&self) -> bool {
        self.pending_src.is_some()
    }
}

/// A file picked or dropped by the user, before any decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile<F> {
    pub name: String,
    pub media_type: String,
    pub file: F,
}

impl<F> SelectedFile<F> {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, file: F) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            file,
        }
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with(IMAGE_MEDIA_PREFIX)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PhotoSettings {
    pub glow_ms: u32,
    pub flash_ms: u32,
}

impl PhotoSettings {
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            glow_ms: config.selection_glow_ms,
            flash_ms: config.update_flash_ms,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum PendingLoad {
    File { slot: SlotId },
    Url { slot: SlotId, url: String },
}

struct Glow {
    slot: SlotId,
    expires_at_ms: f64,
}

/// The fixed photo slots and every image swap on them.
///
/// A swap is confirm-or-revert: the slot's recorded source only moves to a
/// new value once the page reports the image loaded. A failed load points
/// the slot back at its last known-good source.
pub struct PhotoRegistry<S: PhotoSurface> {
    surface: S,
    slots: Vec<PhotoSlot>,
    active: Option<SlotId>,
    glow: Option<Glow>,
    loads: HashMap<LoadTicket, PendingLoad>,
    next_ticket: u64,
    settings: PhotoSettings,
}

impl<S: PhotoSurface> PhotoRegistry<S> {
    pub fn new(surface: S, settings: PhotoSettings) -> Self {
        Self {
            surface,
            slots: Vec::new(),
            active: None,
            glow: None,
            loads: HashMap::new(),
            next_ticket: 1,
            settings,
        }
    }

    /// Records every slot on the page with its current source as default.
    /// The first slot becomes active. Slots already known keep their state.
    pub fn init_from_document(&mut self) -> usize {
        for scan in self.surface.scan_slots() {
            if self.position(scan.id.as_str()).is_some() {
                continue;
            }
            self.slots.push(PhotoSlot {
                id: scan.id,
                title: scan.title,
                default_src: scan.src.clone(),
                known_good_src: scan.src,
                pending_src: None,
            });
        }
        if self.slots.is_empty() {
            self.surface.warn("no photo slots found");
        }
        if self.active.is_none() {
            self.active = self.slots.first().map(|slot| slot.id.clone());
        }
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, id: &str) -> Option<&PhotoSlot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    /// Slot at a zero-based position in page order.
    pub fn slot_at(&self, index: usize) -> Option<&SlotId> {
        self.slots.get(index).map(|slot| &slot.id)
    }

    pub fn slot_ids(&self) -> impl Iterator<Item = &SlotId> {
        self.slots.iter().map(|slot| &slot.id)
    }

    pub fn active_slot(&self) -> Option<&SlotId> {
        self.active.as_ref()
    }

    pub fn glowing_slot(&self) -> Option<&SlotId> {
        self.glow.as_ref().map(|glow| &glow.slot)
    }

    pub fn pending_loads(&self) -> usize {
        self.loads.len()
    }

    pub fn select_slot(&mut self, id: &str, now_ms: f64) -> bool {
        let Some(index) = self.position(id) else {
            self.surface.warn(&format!("photo slot '{id}' not found"));
            return false;
        };
        let slot = self.slots[index].id.clone();
        if let Some(previous) = self.glow.take() {
            if previous.slot != slot {
                self.surface.set_slot_glow(&previous.slot, false);
            }
        }
        self.surface.set_slot_glow(&slot, true);
        self.surface.sync_selection(&slot);
        self.glow = Some(Glow {
            slot: slot.clone(),
            expires_at_ms: now_ms + f64::from(self.settings.glow_ms),
        });
        self.active = Some(slot);
        true
    }

    /// Ends an expired selection glow.
    pub fn tick(&mut self, now_ms: f64) {
        let expired = self
            .glow
            .as_ref()
            .is_some_and(|glow| glow.expires_at_ms <= now_ms);
        if expired {
            if let Some(glow) = self.glow.take() {
                self.surface.set_slot_glow(&glow.slot, false);
            }
        }
    }

    /// Starts decoding `file` for the active slot. Non-image files are
    /// rejected before anything changes.
    pub fn set_image_from_file(
        &mut self,
        file: SelectedFile<S::File>,
    ) -> Result<LoadTicket, BoardError> {
        if !file.is_image() {
            self.surface
                .notify(Notice::error("Please select a valid image file"));
            return Err(BoardError::invalid(format!(
                "'{}' has media type '{}'",
                file.name, file.media_type
            )));
        }
        let slot = self.require_active()?;
        let ticket = self.issue(PendingLoad::File { slot });
        self.surface.decode_file(ticket, file.file);
        Ok(ticket)
    }

    /// Completion of a file decode. Stale or unknown tickets are ignored.
    pub fn file_decoded(&mut self, ticket: LoadTicket, result: Result<String, BoardError>) -> bool {
        let Some(PendingLoad::File { slot }) = self.take_load(ticket, true) else {
            return false;
        };
        match result {
            Ok(src) => self.apply_image(&slot, &src),
            Err(error) => {
                self.surface.warn(&format!("file decode failed: {error}"));
                self.surface.notify(Notice::error("Error reading file"));
                false
            }
        }
    }

    /// Starts preloading `url` for the active slot. The slot is only touched
    /// once the preload succeeds.
    pub fn set_image_from_url(&mut self, url: &str) -> Result<LoadTicket, BoardError> {
        let url = url.trim();
        if url.is_empty() {
            self.surface.notify(Notice::error("Please enter an image URL"));
            return Err(BoardError::invalid("empty image URL"));
        }
        let slot = self.require_active()?;
        let ticket = self.issue(PendingLoad::Url {
            slot,
            url: url.to_owned(),
        });
        self.surface.preload_url(ticket, url);
        Ok(ticket)
    }

    pub fn preload_finished(&mut self, ticket: LoadTicket, ok: bool) -> bool {
        let Some(PendingLoad::Url { slot, url }) = self.take_load(ticket, false) else {
            return false;
        };
        if !ok {
            self.surface.warn(&BoardError::load_failure(&url).to_string());
            self.surface
                .notify(Notice::error("Unable to load image from URL"));
            return false;
        }
        self.surface.clear_url_input();
        self.apply_image(&slot, &url)
    }

    /// Points `slot` at `src` and dims it until the page reports the load.
    pub fn apply_image(&mut self, slot: &SlotId, src: &str) -> bool {
        let Some(index) = self.position(slot.as_str()) else {
            self.surface
                .warn(&BoardError::missing(slot.as_str()).to_string());
            return false;
        };
        self.slots[index].pending_src = Some(src.to_owned());
        self.surface.set_slot_dimmed(slot, true);
        self.surface.set_slot_src(slot, src);
        true
    }

    /// Load outcome for a slot image. Commits or reverts the pending swap;
    /// reports for any other source are stale and ignored.
    pub fn image_settled(&mut self, slot: &SlotId, src: &str, ok: bool) -> bool {
        let Some(index) = self.position(slot.as_str()) else {
            return false;
        };
        if self.slots[index].pending_src.as_deref() != Some(src) {
            return false;
        }
        self.slots[index].pending_src = None;
        self.surface.set_slot_dimmed(slot, false);
        if ok {
            self.slots[index].known_good_src = src.to_owned();
            self.surface.flash_slot(slot, self.settings.flash_ms);
            self.surface
                .notify(Notice::success("Image updated successfully!"));
        } else {
            let fallback = self.slots[index].known_good_src.clone();
            self.surface.set_slot_src(slot, &fallback);
            self.surface.warn(&BoardError::load_failure(src).to_string());
            self.surface
                .notify(Notice::error("Failed to load image. Reverted to previous."));
        }
        true
    }

    /// Restores every slot to the source it had when the page was scanned.
    /// Swaps still in flight are abandoned.
    pub fn reset_all(&mut self) -> usize {
        self.loads.clear();
        for slot in &mut self.slots {
            slot.pending_src = None;
            slot.known_good_src = slot.default_src.clone();
            self.surface.set_slot_dimmed(&slot.id, false);
            self.surface.set_slot_src(&slot.id, &slot.default_src);
        }
        self.surface
            .notify(Notice::info("All photos reset to default"));
        self.slots.len()
    }

    pub fn snapshot_state(&self) -> BTreeMap<SlotId, String> {
        self.slots
            .iter()
            .map(|slot| (slot.id.clone(), slot.known_good_src.clone()))
            .collect()
    }

    /// A file dropped onto `slot`: selects it, then loads like a picked file.
    pub fn drop_file(
        &mut self,
        slot: &SlotId,
        file: SelectedFile<S::File>,
        now_ms: f64,
    ) -> Result<LoadTicket, BoardError> {
        self.drag_leave(slot);
        if !self.select_slot(slot.as_str(), now_ms) {
            return Err(BoardError::missing(slot.as_str()));
        }
        self.set_image_from_file(file)
    }

    pub fn drag_over(&mut self, slot: &SlotId) -> bool {
        if self.position(slot.as_str()).is_none() {
            return false;
        }
        self.surface.set_drop_target(slot, true);
        true
    }

    pub fn drag_leave(&mut self, slot: &SlotId) -> bool {
        if self.position(slot.as_str()).is_none() {
            return false;
        }
        self.surface.set_drop_target(slot, false);
        true
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == id)
    }

    fn require_active(&self) -> Result<SlotId, BoardError> {
        match &self.active {
            Some(slot) => Ok(slot.clone()),
            None => {
                self.surface.warn("no active photo slot");
                Err(BoardError::missing("active photo slot"))
            }
        }
    }

    fn issue(&mut self, load: PendingLoad) -> LoadTicket {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        self.loads.insert(ticket, load);
        ticket
    }

    fn take_load(&mut self, ticket: LoadTicket, file: bool) -> Option<PendingLoad> {
        let matches = match self.loads.get(&ticket)? {
            PendingLoad::File { .. } => file,
            PendingLoad::Url { .. } => !file,
        };
        if matches {
            self.loads.remove(&ticket)
        } else {
            None
        }
    }
}
