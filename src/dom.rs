use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use corkboard_core::{
    AnimationSpec, AnimationSurface, AnimationTarget, BoardError, BoardEvent, Diagnostics,
    LayoutProbe, LineStyle, LineSurface, LoadTicket, Motion, Notice, NoticeKind, Notifier,
    Overlay, ParticleSpec, ParticleSurface, PercentPoint, PhotoSurface, Ray, Rect, SlotId,
    SlotScan, StageSurface,
};
use gloo::events::EventListener;
use gloo::file::callbacks::{read_as_data_url, FileReader};
use gloo::file::File;
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlElement, HtmlImageElement, HtmlInputElement, HtmlSelectElement, Window,
};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const BOARD_SELECTOR: &str = ".detective-board";
const LINES_SELECTOR: &str = ".connection-lines";
const SLOT_SELECTOR: &str = ".photo-container";
const PHOTO_SELECTOR: &str = ".evidence-photo";
const QUESTION_SELECTOR: &str = ".mystery-question";
const PARTICLES_ID: &str = "particles";
const SELECT_ID: &str = "photoSelect";
const URL_INPUT_ID: &str = "imageUrl";
const NOTICE_MS: u32 = 3000;
const NOTICE_EXIT_MS: u32 = 300;
const HOVER_SCALE: f64 = 1.05;

pub(crate) type EventSink = Rc<dyn Fn(BoardEvent<File>)>;

/// Handle for a running animation on the page.
pub(crate) enum DomAnimation {
    /// Replaced the element's own `animation` property.
    Inline {
        element: HtmlElement,
        previous: String,
    },
    /// A temporary element added just for the animation.
    Layer(Element),
}

struct DomInner {
    window: Window,
    document: Document,
    board: Element,
    svg: Element,
    particles: Element,
    sink: RefCell<Option<EventSink>>,
    timers: RefCell<HashMap<u64, Timeout>>,
    next_timer: Cell<u64>,
    readers: RefCell<HashMap<LoadTicket, FileReader>>,
    preloads: RefCell<HashMap<LoadTicket, (HtmlImageElement, Vec<EventListener>)>>,
    notice: RefCell<Option<Element>>,
    overlays: RefCell<Vec<Element>>,
}

/// The board's surfaces implemented over the live document.
#[derive(Clone)]
pub(crate) struct DomSurface {
    inner: Rc<DomInner>,
}

impl DomSurface {
    pub(crate) fn new(window: Window, document: Document) -> Result<Self, BoardError> {
        let board =
            query(&document, BOARD_SELECTOR).ok_or_else(|| BoardError::missing(BOARD_SELECTOR))?;
        let svg =
            query(&document, LINES_SELECTOR).ok_or_else(|| BoardError::missing(LINES_SELECTOR))?;
        let particles = match document.get_element_by_id(PARTICLES_ID) {
            Some(particles) => particles,
            None => {
                gloo::console::warn!("particle layer missing, adding one");
                let layer = document
                    .create_element("div")
                    .map_err(|_| BoardError::missing(PARTICLES_ID))?;
                layer.set_id(PARTICLES_ID);
                layer.set_class_name("particles");
                let body = document.body().ok_or_else(|| BoardError::missing("body"))?;
                body.append_child(&layer).map_err(|_| BoardError::missing(PARTICLES_ID))?;
                layer
            }
        };
        Ok(Self {
            inner: Rc::new(DomInner {
                window,
                document,
                board,
                svg,
                particles,
                sink: RefCell::new(None),
                timers: RefCell::new(HashMap::new()),
                next_timer: Cell::new(1),
                readers: RefCell::new(HashMap::new()),
                preloads: RefCell::new(HashMap::new()),
                notice: RefCell::new(None),
                overlays: RefCell::new(Vec::new()),
            }),
        })
    }

    pub(crate) fn document(&self) -> &Document {
        &self.inner.document
    }

    pub(crate) fn window(&self) -> &Window {
        &self.inner.window
    }

    /// Where load completions are reported.
    pub(crate) fn set_sink(&self, sink: EventSink) {
        *self.inner.sink.borrow_mut() = Some(sink);
    }

    /// Drops every pending timer, reader and preload.
    pub(crate) fn shutdown(&self) {
        self.inner.sink.borrow_mut().take();
        self.inner.timers.borrow_mut().clear();
        self.inner.readers.borrow_mut().clear();
        self.inner.preloads.borrow_mut().clear();
    }

    fn emit(&self, event: BoardEvent<File>) {
        let sink = self.inner.sink.borrow().clone();
        if let Some(sink) = sink {
            sink(event);
        }
    }

    /// Runs `action` once after `delay_ms`. The timer is dropped on shutdown.
    fn after(&self, delay_ms: u32, action: impl FnOnce() + 'static) {
        let id = self.inner.next_timer.get();
        self.inner.next_timer.set(id.wrapping_add(1));
        let weak: Weak<DomInner> = Rc::downgrade(&self.inner);
        let timeout = Timeout::new(delay_ms, move || {
            if let Some(inner) = weak.upgrade() {
                inner.timers.borrow_mut().remove(&id);
            }
            action();
        });
        self.inner.timers.borrow_mut().insert(id, timeout);
    }

    fn remove_after(&self, element: Element, delay_ms: u32) {
        self.after(delay_ms, move || element.remove());
    }

    fn div(&self, class: &str) -> Option<HtmlElement> {
        let element = self.inner.document.create_element("div").ok()?;
        element.set_class_name(class);
        element.dyn_into::<HtmlElement>().ok()
    }

    fn svg_element(&self, tag: &str) -> Option<Element> {
        self.inner.document.create_element_ns(Some(SVG_NS), tag).ok()
    }

    fn slot_element(&self, slot: &SlotId) -> Option<HtmlElement> {
        self.inner
            .document
            .get_element_by_id(slot.as_str())?
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn slot_image(&self, slot: &SlotId) -> Option<HtmlImageElement> {
        self.inner
            .document
            .get_element_by_id(slot.as_str())?
            .query_selector(PHOTO_SELECTOR)
            .ok()
            .flatten()?
            .dyn_into::<HtmlImageElement>()
            .ok()
    }

    fn question(&self) -> Option<Element> {
        query(&self.inner.document, QUESTION_SELECTOR)
    }

    fn set_class(&self, slot: &SlotId, class: &str, on: bool) {
        if let Some(element) = self.slot_element(slot) {
            let _ = element.class_list().toggle_with_force(class, on);
        }
    }

    fn append_to_body(&self, element: &Element) -> bool {
        match self.inner.document.body() {
            Some(body) => body.append_child(element).is_ok(),
            None => false,
        }
    }
}

fn query(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

pub(crate) fn to_rect(element: &Element) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

fn percent(value: f64) -> String {
    format!("{value:.3}%")
}

impl Diagnostics for DomSurface {
    fn warn(&self, message: &str) {
        gloo::console::warn!(message);
    }

    fn info(&self, message: &str) {
        gloo::console::log!(message);
    }
}

impl Notifier for DomSurface {
    fn notify(&mut self, notice: Notice) {
        if let Some(previous) = self.inner.notice.borrow_mut().take() {
            previous.remove();
        }
        let kind = match notice.kind {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
            NoticeKind::Info => "info",
        };
        let Some(element) = self.div(&format!("notification {kind}")) else {
            return;
        };
        element.set_text_content(Some(&notice.message));
        let element: Element = element.into();
        if !self.append_to_body(&element) {
            return;
        }
        *self.inner.notice.borrow_mut() = Some(element.clone());
        let surface = self.clone();
        self.after(NOTICE_MS, move || {
            let _ = element.class_list().add_1("leaving");
            surface.remove_after(element, NOTICE_EXIT_MS);
        });
    }
}

impl LayoutProbe for DomSurface {
    fn container_box(&self) -> Option<Rect> {
        Some(to_rect(&self.inner.board))
    }

    fn element_box(&self, id: &str) -> Option<Rect> {
        self.inner
            .document
            .get_element_by_id(id)
            .map(|element| to_rect(&element))
    }

    fn focal_box(&self) -> Option<Rect> {
        self.question().map(|element| to_rect(&element))
    }
}

fn apply_line_style(line: &Element, style: &LineStyle) {
    let _ = line.set_attribute("stroke", style.stroke.as_str());
    let _ = line.set_attribute("stroke-width", &style.width.to_string());
    let _ = line.set_attribute("opacity", &style.opacity.to_string());
    let _ = line.set_attribute(
        "style",
        &format!("filter: drop-shadow(0 0 {}px {})", style.glow_px, style.glow),
    );
    let classes = line.class_list();
    let _ = classes.toggle_with_force("dashed", style.dashed);
    let _ = classes.toggle_with_force("lightning", style.lightning);
}

impl LineSurface for DomSurface {
    type Line = Element;

    fn create_line(&mut self, style: &LineStyle) -> Option<Element> {
        let line = self.svg_element("line")?;
        let _ = line.set_attribute("class", "connection-line");
        apply_line_style(&line, style);
        self.inner.svg.append_child(&line).ok()?;
        Some(line)
    }

    fn place_line(&mut self, line: &Element, from: PercentPoint, to: PercentPoint) {
        let _ = line.set_attribute("x1", &percent(from.x));
        let _ = line.set_attribute("y1", &percent(from.y));
        let _ = line.set_attribute("x2", &percent(to.x));
        let _ = line.set_attribute("y2", &percent(to.y));
    }

    fn style_line(&mut self, line: &Element, style: &LineStyle) {
        apply_line_style(line, style);
    }

    fn pulse_line(&mut self, line: &Element, duration_ms: u32) {
        let _ = line.class_list().add_1("pulse");
        let line = line.clone();
        self.after(duration_ms, move || {
            let _ = line.class_list().remove_1("pulse");
        });
    }

    fn pause_line(&mut self, line: &Element, paused: bool) {
        let _ = line.class_list().toggle_with_force("paused", paused);
    }

    fn release_line(&mut self, line: Element) {
        line.remove();
    }

    fn emit_ray(&mut self, ray: &Ray) {
        let Some(line) = self.svg_element("line") else {
            return;
        };
        let _ = line.set_attribute("class", "burst-ray");
        let _ = line.set_attribute("x1", &percent(ray.from.x));
        let _ = line.set_attribute("y1", &percent(ray.from.y));
        let _ = line.set_attribute("x2", &percent(ray.to.x));
        let _ = line.set_attribute("y2", &percent(ray.to.y));
        let _ = line.set_attribute("stroke", ray.color.as_str());
        let _ = line.set_attribute("stroke-width", "2");
        let _ = line.set_attribute(
            "style",
            &format!("animation: rayFade {}ms ease-out forwards", ray.lifetime_ms),
        );
        if self.inner.svg.append_child(&line).is_ok() {
            self.remove_after(line, ray.lifetime_ms);
        }
    }
}

impl PhotoSurface for DomSurface {
    type File = File;

    fn scan_slots(&self) -> Vec<SlotScan> {
        let Ok(nodes) = self.inner.document.query_selector_all(SLOT_SELECTOR) else {
            return Vec::new();
        };
        let mut slots = Vec::new();
        for index in 0..nodes.length() {
            let Some(element) = nodes.item(index).and_then(|node| node.dyn_into::<Element>().ok())
            else {
                continue;
            };
            let id = element.id();
            if id.is_empty() {
                continue;
            }
            let Some(image) = element
                .query_selector(PHOTO_SELECTOR)
                .ok()
                .flatten()
                .and_then(|image| image.dyn_into::<HtmlImageElement>().ok())
            else {
                gloo::console::warn!(format!("slot '{id}' has no photo"));
                continue;
            };
            slots.push(SlotScan {
                id: SlotId::new(id),
                src: image.get_attribute("src").unwrap_or_default(),
                title: image.alt(),
            });
        }
        slots
    }

    fn set_slot_glow(&mut self, slot: &SlotId, on: bool) {
        self.set_class(slot, "selected-glow", on);
    }

    fn set_slot_dimmed(&mut self, slot: &SlotId, dimmed: bool) {
        self.set_class(slot, "swapping", dimmed);
    }

    fn set_slot_src(&mut self, slot: &SlotId, src: &str) {
        if let Some(image) = self.slot_image(slot) {
            let _ = image.set_attribute("src", src);
        }
    }

    fn flash_slot(&mut self, slot: &SlotId, duration_ms: u32) {
        self.set_class(slot, "updated", true);
        let surface = self.clone();
        let slot = slot.clone();
        self.after(duration_ms, move || surface.set_class(&slot, "updated", false));
    }

    fn set_drop_target(&mut self, slot: &SlotId, active: bool) {
        self.set_class(slot, "drag-over", active);
    }

    fn sync_selection(&mut self, slot: &SlotId) {
        if let Some(select) = self
            .inner
            .document
            .get_element_by_id(SELECT_ID)
            .and_then(|element| element.dyn_into::<HtmlSelectElement>().ok())
        {
            select.set_value(slot.as_str());
        }
    }

    fn decode_file(&mut self, ticket: LoadTicket, file: File) {
        let surface = self.clone();
        let reader = read_as_data_url(&file, move |result| {
            surface.inner.readers.borrow_mut().remove(&ticket);
            let result = result.map_err(|err| BoardError::load_failure(err.to_string()));
            surface.emit(BoardEvent::FileDecoded { ticket, result });
        });
        self.inner.readers.borrow_mut().insert(ticket, reader);
    }

    fn preload_url(&mut self, ticket: LoadTicket, url: &str) {
        let Ok(image) = HtmlImageElement::new() else {
            self.emit(BoardEvent::PreloadFinished { ticket, ok: false });
            return;
        };
        let listeners = [("load", true), ("error", false)]
            .into_iter()
            .map(|(kind, ok)| {
                let surface = self.clone();
                EventListener::once(&image, kind, move |_| {
                    surface.inner.preloads.borrow_mut().remove(&ticket);
                    surface.emit(BoardEvent::PreloadFinished { ticket, ok });
                })
            })
            .collect();
        image.set_src(url);
        self.inner
            .preloads
            .borrow_mut()
            .insert(ticket, (image, listeners));
    }

    fn clear_url_input(&mut self) {
        if let Some(input) = self
            .inner
            .document
            .get_element_by_id(URL_INPUT_ID)
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value("");
        }
    }
}

impl ParticleSurface for DomSurface {
    type Particle = Element;

    fn viewport_width(&self) -> f64 {
        self.inner
            .window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0)
    }

    fn spawn_particle(&mut self, spec: &ParticleSpec) -> Option<Element> {
        let particle = self.div("particle")?;
        let style = particle.style();
        let size = format!("{}px", spec.size_px);
        let _ = style.set_property("width", &size);
        let _ = style.set_property("height", &size);
        let _ = style.set_property("background", spec.color.as_str());
        let _ = style.set_property("opacity", &spec.opacity.to_string());
        match &spec.motion {
            Motion::Float {
                start_x_px,
                end_x_px,
                duration_ms,
                delay_ms,
            } => {
                let _ = style.set_property("left", &format!("{start_x_px}px"));
                let _ = style.set_property("--drift", &format!("{}px", end_x_px - start_x_px));
                let _ = style.set_property(
                    "animation",
                    &format!("particleFloat {duration_ms}ms linear {delay_ms}ms infinite"),
                );
            }
            Motion::Radial {
                origin,
                offset,
                duration_ms,
            } => {
                let _ = particle.class_list().add_1("burst");
                let _ = style.set_property("left", &format!("{}px", origin.0));
                let _ = style.set_property("top", &format!("{}px", origin.1));
                let _ = style.set_property("--dx", &format!("{}px", offset.0));
                let _ = style.set_property("--dy", &format!("{}px", offset.1));
                let _ = style.set_property(
                    "animation",
                    &format!("burstOut {duration_ms}ms ease-out forwards"),
                );
            }
            Motion::Hover {
                left_pct,
                top_pct,
                duration_ms,
                delay_ms,
            } => {
                let _ = particle.class_list().add_1("mote");
                let _ = style.set_property("left", &percent(*left_pct));
                let _ = style.set_property("top", &percent(*top_pct));
                let _ = style.set_property(
                    "animation",
                    &format!("dustFloat {duration_ms}ms ease-in-out {delay_ms}ms infinite"),
                );
            }
        }
        let particle: Element = particle.into();
        self.inner.particles.append_child(&particle).ok()?;
        Some(particle)
    }

    fn remove_particle(&mut self, particle: Element) {
        particle.remove();
    }
}

fn animation_value(spec: &AnimationSpec) -> String {
    format!("{} {}ms {}", spec.keyframes, spec.duration_ms, spec.easing)
}

impl AnimationSurface for DomSurface {
    type Animation = DomAnimation;

    fn play(&mut self, target: &AnimationTarget, spec: &AnimationSpec) -> Option<DomAnimation> {
        let value = animation_value(spec);
        match target {
            AnimationTarget::Stage => {
                let layer = self.div("screen-flash")?;
                let _ = layer.style().set_property("animation", &value);
                let layer: Element = layer.into();
                self.append_to_body(&layer).then_some(DomAnimation::Layer(layer))
            }
            AnimationTarget::Slot(slot) => {
                let container = self.slot_element(slot)?;
                let layer = self.div("click-flash")?;
                let _ = layer.style().set_property("animation", &value);
                let layer: Element = layer.into();
                container.append_child(&layer).ok()?;
                Some(DomAnimation::Layer(layer))
            }
            AnimationTarget::Focal => {
                let element = self.question()?.dyn_into::<HtmlElement>().ok()?;
                let style = element.style();
                let previous = style.get_property_value("animation").unwrap_or_default();
                let _ = style.set_property("animation", &value);
                Some(DomAnimation::Inline { element, previous })
            }
        }
    }

    fn cancel(&mut self, animation: DomAnimation) {
        match animation {
            DomAnimation::Inline { element, previous } => {
                let style = element.style();
                if previous.is_empty() {
                    let _ = style.remove_property("animation");
                } else {
                    let _ = style.set_property("animation", &previous);
                }
            }
            DomAnimation::Layer(layer) => layer.remove(),
        }
    }
}

const WELCOME_MARKUP: &str = "<h2>Welcome Detective</h2>\
<p>Investigate the evidence and solve the mystery.</p>\
<div class=\"welcome-keys\">Press Space to reveal connections<br>\
Ctrl/Cmd + I for interactive mode<br>\
Ctrl/Cmd + R to reset photos<br>\
Esc to clear effects</div>";

impl StageSurface for DomSurface {
    fn set_animations_paused(&mut self, paused: bool) {
        if let Some(body) = self.inner.document.body() {
            let _ = body.class_list().toggle_with_force("effects-paused", paused);
        }
    }

    fn show_overlay(&mut self, overlay: Overlay, duration_ms: u32) {
        let element = match overlay {
            Overlay::Welcome => {
                let Some(element) = self.div("welcome-banner") else {
                    return;
                };
                element.set_inner_html(WELCOME_MARKUP);
                element
            }
            Overlay::ModeBanner { interactive } => {
                let Some(element) = self.div("mode-banner") else {
                    return;
                };
                let text = if interactive {
                    "Interactive Mode ON"
                } else {
                    "Interactive Mode OFF"
                };
                element.set_text_content(Some(text));
                element
            }
        };
        let element: Element = element.into();
        if !self.append_to_body(&element) {
            return;
        }
        self.inner.overlays.borrow_mut().push(element.clone());
        let weak = Rc::downgrade(&self.inner);
        self.after(duration_ms, move || {
            if let Some(inner) = weak.upgrade() {
                inner.overlays.borrow_mut().retain(|kept| kept != &element);
            }
            element.remove();
        });
    }

    fn clear_overlays(&mut self) {
        for element in self.inner.overlays.borrow_mut().drain(..) {
            element.remove();
        }
        let Ok(flashes) = self.inner.document.query_selector_all(".screen-flash") else {
            return;
        };
        let flashes = (0..flashes.length())
            .filter_map(|index| flashes.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok());
        for flash in flashes {
            flash.remove();
        }
    }

    fn set_slot_lifted(&mut self, slot: &SlotId, tilt_deg: Option<f64>) {
        let Some(element) = self.slot_element(slot) else {
            return;
        };
        let style = element.style();
        match tilt_deg {
            Some(tilt) => {
                let _ = style.set_property(
                    "transform",
                    &format!("scale({HOVER_SCALE}) rotate({tilt:.2}deg)"),
                );
                let _ = style.set_property("z-index", "15");
            }
            None => {
                let _ = style.remove_property("transform");
                let _ = style.remove_property("z-index");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn assert_close(actual: f64, expected: f64) {
        let delta = (actual - expected).abs();
        assert!(
            delta <= 1e-6,
            "expected {:.6} got {:.6} (delta {:.6})",
            expected,
            actual,
            delta
        );
    }

    fn fixture() -> (Document, Element) {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .expect("document available");
        let root = document.create_element("div").expect("create root");
        root.set_inner_html(
            "<div class=\"detective-board\" style=\"position:fixed;left:0;top:0;width:400px;height:200px\">\
             <svg class=\"connection-lines\"></svg>\
             <div class=\"photo-container\" id=\"photo1\" style=\"position:absolute;left:0;top:0;width:100px;height:100px\">\
             <img class=\"evidence-photo\" src=\"a.jpg\" alt=\"First\"></div>\
             <div class=\"photo-container\" id=\"photo2\" style=\"position:absolute;left:300px;top:100px;width:100px;height:100px\">\
             <img class=\"evidence-photo\" src=\"b.jpg\" alt=\"Second\"></div>\
             </div><div id=\"particles\"></div>",
        );
        document
            .body()
            .expect("body available")
            .append_child(&root)
            .expect("append root");
        (document, root)
    }

    #[wasm_bindgen_test]
    fn scans_slots_and_maps_centres() {
        let (document, root) = fixture();
        let window = web_sys::window().expect("window");
        let surface = DomSurface::new(window, document).expect("surface");

        let slots = surface.scan_slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].id, "photo1");
        assert_eq!(slots[0].src, "a.jpg");
        assert_eq!(slots[1].title, "Second");

        let container = surface.container_box().expect("board box");
        let centre = surface
            .element_box("photo2")
            .and_then(|rect| corkboard_core::map_to_container_percent(rect, container))
            .expect("mapped");
        assert_close(centre.x, 87.5);
        assert_close(centre.y, 75.0);
        root.remove();
    }

    #[wasm_bindgen_test]
    fn lines_carry_percent_coordinates() {
        let (document, root) = fixture();
        let window = web_sys::window().expect("window");
        let mut surface = DomSurface::new(window, document).expect("surface");
        let style = LineStyle {
            stroke: corkboard_core::Color::OXBLOOD,
            width: 2.0,
            opacity: 0.7,
            glow_px: 5.0,
            glow: corkboard_core::Color::OXBLOOD,
            dashed: true,
            lightning: false,
        };
        let line = surface.create_line(&style).expect("line");
        surface.place_line(&line, PercentPoint::new(12.5, 25.0), PercentPoint::new(87.5, 75.0));
        assert_eq!(line.get_attribute("x1").as_deref(), Some("12.500%"));
        assert_eq!(line.get_attribute("y2").as_deref(), Some("75.000%"));
        assert!(line.class_list().contains("dashed"));
        surface.release_line(line);
        root.remove();
    }
}
