use crate::runtime::data_structures::value::Value;
use std::{cell::RefCell, rc::Rc};
use tokio::sync::mpsc::UnboundedSender;

/// What the interpreter tells its host while it runs.  Events arrive in program order, a word's
/// `WordComplete` always follows its `WordStarting`.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// A word or literal is about to run.
    WordStarting { name: String, stack_effect: String },

    /// A word or literal finished.  The stack is a copy taken at that moment.
    WordComplete { name: String, stack: Vec<Value> },

    /// Printable output.
    Output(String),

    /// A formatted error message, with its hint when there is one.
    Error(String),

    /// Compile state was entered or left, or the interpreter was reset.
    StateChanged,
}

/// Receives the interpreter's events.
pub trait Observer {
    fn notify(&mut self, event: &EngineEvent);
}

/// Forward events to another task.  A closed channel is ignored.
impl Observer for UnboundedSender<EngineEvent> {
    fn notify(&mut self, event: &EngineEvent) {
        let _ = self.send(event.clone());
    }
}

/// Records every event.  Clones share the same log, so keep one and hand the other to the
/// interpreter.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<EngineEvent>>>,
}

impl Observer for EventLog {
    fn notify(&mut self, event: &EngineEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

impl EventLog {
    pub fn new() -> EventLog {
        EventLog::default()
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.borrow().clone()
    }

    /// All output text joined together.
    pub fn output(&self) -> String {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Output(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Each piece of output as it was emitted.
    pub fn outputs(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Output(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Error(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
