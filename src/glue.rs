use std::cell::RefCell;
use std::rc::Rc;

use corkboard_core::jitter::Jitter;
use gloo::events::EventListener;
use gloo::timers::callback::{Interval, Timeout};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

const STYLE_ID: &str = "corkboard-styles";
const HEADLINE_SELECTOR: &str = ".mystery-question h2";
const TYPE_DELAY_MS: u32 = 2000;
const TYPE_STEP_MS: u32 = 150;
const TITLE_SELECTOR: &str = ".main-title";
const TITLE_HOVER: &str = "titleIntense 0.5s ease-in-out forwards";
const TITLE_REST: &str = "titleGlow 3s ease-in-out infinite alternate";
const SLOT_SELECTOR: &str = ".photo-container";
const SLOT_DELAY_MAX_S: f64 = 2.0;

const STYLES: &str = r#"
.particles { position: fixed; inset: 0; pointer-events: none; overflow: hidden; z-index: 1; }
.particle { position: absolute; bottom: -10px; border-radius: 50%; pointer-events: none; }
.particle.burst { bottom: auto; position: fixed; }
.particle.mote { bottom: auto; }
.connection-line { transition: opacity 0.3s ease, stroke-width 0.3s ease; }
.connection-line.dashed { stroke-dasharray: 5 5; animation: dashMove 1s linear infinite; }
.connection-line.lightning { animation: lightningFlash 0.3s ease-in-out infinite alternate; }
.connection-line.pulse { animation: linePulse 2s ease-in-out; }
.connection-line.paused, .effects-paused .connection-line,
.effects-paused .particle, .effects-paused .photo-container { animation-play-state: paused; }
.burst-ray { pointer-events: none; }
.photo-container { transition: transform 0.3s ease, opacity 0.3s ease; }
.photo-container.selected-glow { box-shadow: 0 0 20px rgba(212, 175, 55, 0.8); }
.photo-container.swapping { opacity: 0.3; transform: scale(0.95); }
.photo-container.updated { animation: flashEffect 0.6s ease-out; }
.photo-container.drag-over { outline: 3px dashed #d4af37; }
.click-flash { position: absolute; inset: 0; background: rgba(212, 175, 55, 0.6); pointer-events: none; }
.screen-flash { position: fixed; inset: 0; pointer-events: none; z-index: 999;
  background: radial-gradient(circle, rgba(212, 175, 55, 0.3) 0%, transparent 70%); }
.welcome-banner { position: fixed; top: 50%; left: 50%; transform: translate(-50%, -50%);
  background: rgba(0, 0, 0, 0.9); color: #d4af37; padding: 30px; border: 2px solid #d4af37;
  border-radius: 10px; text-align: center; z-index: 1000; animation: welcomeFade 3s ease-in-out forwards; }
.welcome-keys { font-size: 0.85em; opacity: 0.8; margin-top: 12px; }
.mode-banner { position: fixed; top: 20px; left: 50%; transform: translateX(-50%);
  background: rgba(139, 0, 0, 0.9); color: #fff; padding: 10px 20px; border-radius: 5px;
  z-index: 1000; animation: fadeInOut 2s ease-in-out forwards; }
.notification { position: fixed; top: 20px; right: 20px; padding: 12px 20px; border-radius: 5px;
  color: #fff; z-index: 1001; animation: notificationSlide 0.3s ease-out; }
.notification.success { background: #2e7d32; }
.notification.error { background: #8b0000; }
.notification.info { background: #1565c0; }
.notification.leaving { animation: notificationSlideOut 0.3s ease-in forwards; }
@keyframes particleFloat {
  0% { transform: translate(0, 0); opacity: 0; }
  10% { opacity: 1; }
  90% { opacity: 1; }
  100% { transform: translate(var(--drift, 0px), -100vh); opacity: 0; }
}
@keyframes burstOut {
  from { transform: translate(0, 0) scale(1); opacity: 1; }
  to { transform: translate(var(--dx), var(--dy)) scale(0); opacity: 0; }
}
@keyframes dustFloat {
  0%, 100% { transform: translate(0, 0); }
  25% { transform: translate(10px, -10px); }
  50% { transform: translate(-5px, -20px); }
  75% { transform: translate(-10px, -5px); }
}
@keyframes titleIntense {
  0% { transform: scale(1); }
  50% { transform: scale(1.05); }
  100% { transform: scale(1); }
}
@keyframes titleGlow {
  from { text-shadow: 0 0 8px rgba(212, 175, 55, 0.4); }
  to { text-shadow: 0 0 20px rgba(212, 175, 55, 0.9); }
}
@keyframes dashMove { to { stroke-dashoffset: -10; } }
@keyframes lightningFlash { from { opacity: 0.4; } to { opacity: 1; } }
@keyframes linePulse { 0%, 100% { opacity: 0.7; } 50% { opacity: 1; } }
@keyframes rayFade { from { opacity: 1; } to { opacity: 0; } }
@keyframes flashEffect { 0% { opacity: 0; } 50% { opacity: 1; } 100% { opacity: 0; } }
@keyframes mysteryShake {
  0%, 100% { transform: translateX(0); }
  25% { transform: translateX(-5px); }
  75% { transform: translateX(5px); }
}
@keyframes mysteryFlash { 0% { opacity: 0; } 50% { opacity: 1; } 100% { opacity: 0; } }
@keyframes welcomeFade {
  0% { opacity: 0; transform: translate(-50%, -50%) scale(0.8); }
  20%, 80% { opacity: 1; transform: translate(-50%, -50%) scale(1); }
  100% { opacity: 0; transform: translate(-50%, -50%) scale(0.8); }
}
@keyframes fadeInOut { 0%, 100% { opacity: 0; } 20%, 80% { opacity: 1; } }
@keyframes notificationSlide { from { transform: translateX(120%); } to { transform: translateX(0); } }
@keyframes notificationSlideOut { from { transform: translateX(0); } to { transform: translateX(120%); } }
"#;

/// Adds the board's keyframes and state classes once per document.
pub(crate) fn install_styles(document: &Document) {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return;
    }
    let Ok(style) = document.create_element("style") else {
        return;
    };
    style.set_id(STYLE_ID);
    style.set_text_content(Some(STYLES));
    if let Some(head) = document.head() {
        let _ = head.append_child(&style);
    }
}

/// Offsets each slot's idle animation by a random delay so the slots do not
/// sway in step. Returns how many slots were touched.
pub(crate) fn stagger_slots(document: &Document, seed: u64) -> usize {
    let Ok(slots) = document.query_selector_all(SLOT_SELECTOR) else {
        return 0;
    };
    let mut jitter = Jitter::new(seed);
    let mut touched = 0;
    for index in 0..slots.length() {
        let Some(slot) = slots
            .item(index)
            .and_then(|node| node.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };
        let delay = jitter.range(0.0, SLOT_DELAY_MAX_S);
        let _ = slot
            .style()
            .set_property("animation-delay", &format!("{delay:.2}s"));
        touched += 1;
    }
    touched
}

/// Swaps the title between its intense hover pulse and the resting glow.
pub(crate) fn attach_title(document: &Document) -> Vec<EventListener> {
    let Some(title) = document
        .query_selector(TITLE_SELECTOR)
        .ok()
        .flatten()
        .and_then(|title| title.dyn_into::<HtmlElement>().ok())
    else {
        return Vec::new();
    };
    [("mouseenter", TITLE_HOVER), ("mouseleave", TITLE_REST)]
        .into_iter()
        .map(|(kind, animation)| {
            let target = title.clone();
            EventListener::new(&title, kind, move |_| {
                let _ = target.style().set_property("animation", animation);
            })
        })
        .collect()
}

struct TypewriterState {
    element: Element,
    chars: Vec<char>,
    shown: usize,
    delay: Option<Timeout>,
    step: Option<Interval>,
}

/// Types out the headline one character at a time.
pub(crate) struct Typewriter {
    state: Rc<RefCell<TypewriterState>>,
}

impl Typewriter {
    pub(crate) fn start(document: &Document) -> Option<Self> {
        let element = document.query_selector(HEADLINE_SELECTOR).ok().flatten()?;
        let text = element.text_content().unwrap_or_default();
        if text.is_empty() {
            return None;
        }
        element.set_text_content(Some(""));
        let state = Rc::new(RefCell::new(TypewriterState {
            element,
            chars: text.chars().collect(),
            shown: 0,
            delay: None,
            step: None,
        }));

        let weak = Rc::downgrade(&state);
        let delay = Timeout::new(TYPE_DELAY_MS, move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let stepper = Rc::downgrade(&state);
            let step = Interval::new(TYPE_STEP_MS, move || {
                if let Some(state) = stepper.upgrade() {
                    advance(&state);
                }
            });
            let mut state = state.borrow_mut();
            state.delay = None;
            state.step = Some(step);
        });
        state.borrow_mut().delay = Some(delay);
        Some(Self { state })
    }

    /// Cancels typing and shows the full headline.
    pub(crate) fn stop(self) {
        let mut state = self.state.borrow_mut();
        state.delay = None;
        state.step = None;
        let text: String = state.chars.iter().collect();
        state.element.set_text_content(Some(&text));
    }
}

fn advance(state: &Rc<RefCell<TypewriterState>>) {
    let mut state = state.borrow_mut();
    state.shown += 1;
    let text: String = state.chars.iter().take(state.shown).collect();
    state.element.set_text_content(Some(&text));
    if state.shown >= state.chars.len() {
        state.step = None;
    }
}
