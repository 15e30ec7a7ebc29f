//! The photo swap control panel: slot picker, file input, URL field and
//! the change button.

use std::rc::{Rc, Weak};

use corkboard_core::BoardEvent;
use gloo::events::EventListener;
use gloo::file::File;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlInputElement, HtmlSelectElement, KeyboardEvent};

use crate::app::{selected_file, BoardApp};

const SELECT_ID: &str = "photoSelect";
const UPLOAD_ID: &str = "imageUpload";
const URL_ID: &str = "imageUrl";
const BUTTON_ID: &str = "changeImage";

fn by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into::<T>().ok()
}

fn send(app: &Weak<BoardApp>, event: BoardEvent<File>) {
    if let Some(app) = app.upgrade() {
        app.dispatch(event);
    }
}

/// Wires whichever controls the page has. Missing ones are skipped.
pub(crate) fn attach(app: &Rc<BoardApp>, document: &Document) -> Vec<EventListener> {
    let mut listeners = Vec::new();
    let upload = by_id::<HtmlInputElement>(document, UPLOAD_ID);
    let url = by_id::<HtmlInputElement>(document, URL_ID);

    if let Some(select) = by_id::<HtmlSelectElement>(document, SELECT_ID) {
        let weak = Rc::downgrade(app);
        let source = select.clone();
        listeners.push(EventListener::new(&select, "change", move |_| {
            send(&weak, BoardEvent::SlotChosen(source.value()));
        }));
    }

    if let Some(input) = upload.clone() {
        let weak = Rc::downgrade(app);
        let source = input.clone();
        listeners.push(EventListener::new(&input, "change", move |_| {
            let file = source.files().and_then(|files| files.get(0));
            if let Some(file) = file {
                send(&weak, BoardEvent::FileChosen(selected_file(file)));
            }
            // Picking the same file twice should still fire `change`.
            source.set_value("");
        }));
    }

    if let Some(input) = url.clone() {
        let weak = Rc::downgrade(app);
        let source = input.clone();
        listeners.push(EventListener::new(&input, "keydown", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if event.key() == "Enter" {
                send(&weak, BoardEvent::UrlSubmitted(source.value()));
            }
        }));
    }

    if let Some(button) = document.get_element_by_id(BUTTON_ID) {
        let weak = Rc::downgrade(app);
        listeners.push(EventListener::new(&button, "click", move |_| {
            let typed = url
                .as_ref()
                .map(|input| input.value())
                .filter(|value| !value.trim().is_empty());
            match (typed, upload.as_ref()) {
                (Some(value), _) => send(&weak, BoardEvent::UrlSubmitted(value)),
                (None, Some(picker)) => picker.click(),
                (None, None) => {
                    send(&weak, BoardEvent::UrlSubmitted(String::new()));
                }
            }
        }));
    }

    listeners
}
