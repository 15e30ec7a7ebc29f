use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use corkboard_core::{
    BoardConfig, BoardError, BoardEvent, EffectCoordinator, KeyChord, KeyTarget, SelectedFile,
    SlotId,
};
use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo::file::File;
use gloo::timers::callback::Interval;
use js_sys::Date;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, DragEvent, Element, Event, EventTarget, HtmlElement, KeyboardEvent,
    PageTransitionEvent, Window,
};

use crate::controls;
use crate::dom::DomSurface;
use crate::glue::{self, Typewriter};

const TICK_MS: u32 = 100;
const CONFIG_ID: &str = "board-config";
const QUESTION_SELECTOR: &str = ".mystery-question";

thread_local! {
    static BOARD_APP: RefCell<Option<Rc<BoardApp>>> = RefCell::new(None);
}

pub(crate) fn now_ms() -> f64 {
    Date::now()
}

pub(crate) fn run() {
    console_error_panic_hook::set_once();
    if let Err(err) = start() {
        gloo::console::error!(format!("corkboard: {err}"));
    }
}

fn start() -> Result<(), BoardError> {
    let window = web_sys::window().ok_or_else(|| BoardError::missing("window"))?;
    let document = window
        .document()
        .ok_or_else(|| BoardError::missing("document"))?;
    glue::install_styles(&document);
    let config = load_config(&window, &document);
    let surface = DomSurface::new(window, document)?;
    let seed = now_ms().to_bits();
    let board = EffectCoordinator::new(surface.clone(), config, seed);
    let app = Rc::new(BoardApp {
        board: RefCell::new(board),
        surface: surface.clone(),
        queue: RefCell::new(VecDeque::new()),
        draining: Cell::new(false),
        listeners: RefCell::new(Vec::new()),
        ticker: RefCell::new(None),
        typewriter: RefCell::new(None),
    });

    let weak = Rc::downgrade(&app);
    surface.set_sink(Rc::new(move |event| {
        if let Some(app) = weak.upgrade() {
            app.dispatch(event);
        }
    }));

    app.board.borrow_mut().start(now_ms())?;
    glue::stagger_slots(surface.document(), seed);
    app.attach_listeners();
    app.start_ticker();
    *app.typewriter.borrow_mut() = Typewriter::start(surface.document());

    BOARD_APP.with(|slot| {
        *slot.borrow_mut() = Some(app);
    });
    Ok(())
}

/// Defaults, then the inline JSON block, then query-string overrides.
fn load_config(window: &Window, document: &Document) -> BoardConfig {
    let inline = document
        .get_element_by_id(CONFIG_ID)
        .and_then(|element| element.text_content())
        .filter(|text| !text.trim().is_empty());
    let mut config = match inline {
        Some(text) => BoardConfig::from_json(&text).unwrap_or_else(|err| {
            gloo::console::warn!(format!("ignoring board config: {err}"));
            BoardConfig::default()
        }),
        None => BoardConfig::default(),
    };
    if let Ok(search) = window.location().search() {
        config.apply_query(&search);
    }
    config
}

pub(crate) struct BoardApp {
    board: RefCell<EffectCoordinator<DomSurface>>,
    surface: DomSurface,
    queue: RefCell<VecDeque<BoardEvent<File>>>,
    draining: Cell<bool>,
    listeners: RefCell<Vec<EventListener>>,
    ticker: RefCell<Option<Interval>>,
    typewriter: RefCell<Option<Typewriter>>,
}

impl BoardApp {
    /// Events raised while another is being handled wait their turn.
    pub(crate) fn dispatch(&self, event: BoardEvent<File>) {
        self.queue.borrow_mut().push_back(event);
        if self.draining.replace(true) {
            return;
        }
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            match self.board.try_borrow_mut() {
                Ok(mut board) => board.dispatch(event, now_ms()),
                Err(_) => gloo::console::warn!("board busy, event dropped"),
            }
        }
        self.draining.set(false);
    }

    fn start_ticker(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let interval = Interval::new(TICK_MS, move || {
            if let Some(app) = weak.upgrade() {
                app.dispatch(BoardEvent::Tick);
            }
        });
        *self.ticker.borrow_mut() = Some(interval);
    }

    fn listen(
        self: &Rc<Self>,
        target: &EventTarget,
        kind: &'static str,
        map: impl Fn(&Event) -> Option<BoardEvent<File>> + 'static,
    ) {
        let weak = Rc::downgrade(self);
        let listener = EventListener::new(target, kind, move |event| {
            let Some(app) = weak.upgrade() else {
                return;
            };
            if let Some(event) = map(event) {
                app.dispatch(event);
            }
        });
        self.listeners.borrow_mut().push(listener);
    }

    /// Like `listen`, but cancels the browser's default handling.
    fn listen_active(
        self: &Rc<Self>,
        target: &EventTarget,
        kind: &'static str,
        map: impl Fn(&Event) -> Option<BoardEvent<File>> + 'static,
    ) {
        let weak = Rc::downgrade(self);
        let options = EventListenerOptions {
            phase: EventListenerPhase::Bubble,
            passive: false,
        };
        let listener = EventListener::new_with_options(target, kind, options, move |event| {
            event.prevent_default();
            let Some(app) = weak.upgrade() else {
                return;
            };
            if let Some(event) = map(event) {
                app.dispatch(event);
            }
        });
        self.listeners.borrow_mut().push(listener);
    }

    fn attach_listeners(self: &Rc<Self>) {
        let document = self.surface.document().clone();
        let window = self.surface.window().clone();

        let slot_ids: Vec<SlotId> = self.board.borrow().photos().slot_ids().cloned().collect();
        for slot in slot_ids {
            let Some(element) = document.get_element_by_id(slot.as_str()) else {
                continue;
            };
            self.attach_slot(&element, slot);
        }

        if let Some(question) = document.query_selector(QUESTION_SELECTOR).ok().flatten() {
            self.listen(&question, "click", |_| Some(BoardEvent::QuestionClicked));
        }

        self.listen(&window, "resize", |_| Some(BoardEvent::Resized));

        let visibility_doc = document.clone();
        self.listen(&document, "visibilitychange", move |_| {
            Some(BoardEvent::VisibilityChanged {
                hidden: visibility_doc.hidden(),
            })
        });

        let weak = Rc::downgrade(self);
        let options = EventListenerOptions {
            phase: EventListenerPhase::Bubble,
            passive: false,
        };
        let keys = EventListener::new_with_options(&document, "keydown", options, move |event| {
            let Some(app) = weak.upgrade() else {
                return;
            };
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let chord = key_chord(event);
            let shortcut = app
                .board
                .try_borrow()
                .ok()
                .and_then(|board| board.shortcut_for(&chord));
            if shortcut.is_some_and(|shortcut| shortcut.prevents_default()) {
                event.prevent_default();
            }
            app.dispatch(BoardEvent::Key(chord));
        });
        self.listeners.borrow_mut().push(keys);

        let weak = Rc::downgrade(self);
        // A page kept in the back/forward cache comes back with its
        // listeners and timers intact, so only a real unload tears down.
        let hide = EventListener::new(&window, "pagehide", move |event| {
            if !is_final_unload(event) {
                return;
            }
            if let Some(app) = weak.upgrade() {
                app.shutdown();
            }
        });
        self.listeners.borrow_mut().push(hide);

        let controls = controls::attach(self, &document);
        self.listeners.borrow_mut().extend(controls);
        self.listeners
            .borrow_mut()
            .extend(glue::attach_title(&document));
    }

    fn attach_slot(self: &Rc<Self>, element: &Element, slot: SlotId) {
        let id = slot.clone();
        self.listen(element, "click", move |_| Some(BoardEvent::SlotClicked(id.clone())));
        let id = slot.clone();
        self.listen(element, "mouseenter", move |_| Some(BoardEvent::SlotEntered(id.clone())));
        let id = slot.clone();
        self.listen(element, "mouseleave", move |_| Some(BoardEvent::SlotLeft(id.clone())));
        let id = slot.clone();
        self.listen_active(element, "dragover", move |_| Some(BoardEvent::DragOver(id.clone())));
        let id = slot.clone();
        self.listen(element, "dragleave", move |_| Some(BoardEvent::DragLeft(id.clone())));
        let id = slot.clone();
        self.listen_active(element, "drop", move |event| {
            let file = event
                .dyn_ref::<DragEvent>()?
                .data_transfer()?
                .files()?
                .get(0)?;
            Some(BoardEvent::FileDropped {
                slot: id.clone(),
                file: selected_file(file),
            })
        });

        let Some(image) = element.query_selector(".evidence-photo").ok().flatten() else {
            return;
        };
        for (kind, ok) in [("load", true), ("error", false)] {
            let id = slot.clone();
            let source = image.clone();
            self.listen(&image, kind, move |_| {
                Some(BoardEvent::ImageSettled {
                    slot: id.clone(),
                    src: source.get_attribute("src").unwrap_or_default(),
                    ok,
                })
            });
        }
    }

    pub(crate) fn shutdown(&self) {
        self.ticker.borrow_mut().take();
        if let Some(typewriter) = self.typewriter.borrow_mut().take() {
            typewriter.stop();
        }
        if let Ok(mut board) = self.board.try_borrow_mut() {
            board.stop();
        }
        self.surface.shutdown();
        self.listeners.borrow_mut().clear();
        BOARD_APP.with(|slot| {
            slot.borrow_mut().take();
        });
        gloo::console::log!("corkboard stopped");
    }
}

pub(crate) fn selected_file(file: web_sys::File) -> SelectedFile<File> {
    let name = file.name();
    let media_type = file.type_();
    SelectedFile::new(name, media_type, File::from(file))
}

fn is_final_unload(event: &Event) -> bool {
    event
        .dyn_ref::<PageTransitionEvent>()
        .map_or(true, |event| !event.persisted())
}

fn key_chord(event: &KeyboardEvent) -> KeyChord {
    let mut chord = KeyChord::new(event.key(), key_target(event)).with_code(event.code());
    chord.ctrl = event.ctrl_key();
    chord.meta = event.meta_key();
    chord.repeat = event.repeat();
    chord
}

fn key_target(event: &KeyboardEvent) -> KeyTarget {
    let Some(element) = event.target().and_then(|target| target.dyn_into::<HtmlElement>().ok())
    else {
        return KeyTarget::Other;
    };
    match element.tag_name().as_str() {
        "BODY" => KeyTarget::Body,
        "INPUT" | "TEXTAREA" | "SELECT" => KeyTarget::TextField,
        _ if element.is_content_editable() => KeyTarget::TextField,
        _ => KeyTarget::Other,
    }
}
