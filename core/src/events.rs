use std::collections::BTreeMap;

use crate::error::BoardError;
use crate::photo::{LoadTicket, SelectedFile};
use crate::shortcut::KeyChord;
use crate::slot_id::SlotId;

/// Everything the page can report to the board. `F` is the surface's file
/// handle type.
#[derive(Clone, Debug, PartialEq)]
pub enum BoardEvent<F> {
    Tick,
    Resized,
    VisibilityChanged { hidden: bool },
    SlotClicked(SlotId),
    SlotEntered(SlotId),
    SlotLeft(SlotId),
    QuestionClicked,
    Key(KeyChord),
    SlotChosen(String),
    FileChosen(SelectedFile<F>),
    UrlSubmitted(String),
    FileDecoded {
        ticket: LoadTicket,
        result: Result<String, BoardError>,
    },
    PreloadFinished { ticket: LoadTicket, ok: bool },
    ImageSettled { slot: SlotId, src: String, ok: bool },
    DragOver(SlotId),
    DragLeft(SlotId),
    FileDropped { slot: SlotId, file: SelectedFile<F> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventSource {
    Clock,
    Window,
    Visibility,
    SlotPointer,
    SlotHover,
    Question,
    Keyboard,
    Controls,
    Loader,
    DragDrop,
}

impl<F> BoardEvent<F> {
    pub fn source(&self) -> EventSource {
        match self {
            BoardEvent::Tick => EventSource::Clock,
            BoardEvent::Resized => EventSource::Window,
            BoardEvent::VisibilityChanged { .. } => EventSource::Visibility,
            BoardEvent::SlotClicked(_) => EventSource::SlotPointer,
            BoardEvent::SlotEntered(_) | BoardEvent::SlotLeft(_) => EventSource::SlotHover,
            BoardEvent::QuestionClicked => EventSource::Question,
            BoardEvent::Key(_) => EventSource::Keyboard,
            BoardEvent::SlotChosen(_)
            | BoardEvent::FileChosen(_)
            | BoardEvent::UrlSubmitted(_) => EventSource::Controls,
            BoardEvent::FileDecoded { .. }
            | BoardEvent::PreloadFinished { .. }
            | BoardEvent::ImageSettled { .. } => EventSource::Loader,
            BoardEvent::DragOver(_) | BoardEvent::DragLeft(_) | BoardEvent::FileDropped { .. } => {
                EventSource::DragDrop
            }
        }
    }
}

/// The part of the board a handler acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Connections,
    Photos,
    Particles,
    Animations,
    Stage,
    Scheduler,
}

pub type Handler<C, F> = fn(&mut C, &BoardEvent<F>, f64);

/// Event source to ordered handlers, filled once while the owner is built.
pub struct SubscriptionTable<C, F> {
    routes: BTreeMap<EventSource, Vec<(Component, Handler<C, F>)>>,
}

impl<C, F> SubscriptionTable<C, F> {
    pub fn new() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    pub fn on(mut self, source: EventSource, component: Component, handler: Handler<C, F>) -> Self {
        self.routes
            .entry(source)
            .or_default()
            .push((component, handler));
        self
    }

    pub fn handlers(&self, source: EventSource) -> &[(Component, Handler<C, F>)] {
        self.routes.get(&source).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn components(&self, source: EventSource) -> Vec<Component> {
        self.handlers(source)
            .iter()
            .map(|(component, _)| *component)
            .collect()
    }

    pub fn sources(&self) -> impl Iterator<Item = EventSource> + '_ {
        self.routes.keys().copied()
    }
}

impl<C, F> Default for SubscriptionTable<C, F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Trace(Vec<&'static str>);

    fn first(trace: &mut Trace, _: &BoardEvent<()>, _: f64) {
        trace.0.push("first");
    }

    fn second(trace: &mut Trace, _: &BoardEvent<()>, _: f64) {
        trace.0.push("second");
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let table = SubscriptionTable::new()
            .on(EventSource::SlotPointer, Component::Animations, first)
            .on(EventSource::SlotPointer, Component::Particles, second);
        let mut trace = Trace::default();
        let event = BoardEvent::SlotClicked(SlotId::new("photo1"));
        for (_, handler) in table.handlers(event.source()) {
            handler(&mut trace, &event, 0.0);
        }
        assert_eq!(trace.0, vec!["first", "second"]);
        assert_eq!(
            table.components(EventSource::SlotPointer),
            vec![Component::Animations, Component::Particles]
        );
    }

    #[test]
    fn unknown_source_has_no_handlers() {
        let table: SubscriptionTable<Trace, ()> = SubscriptionTable::new();
        assert!(table.handlers(EventSource::Keyboard).is_empty());
    }
}
