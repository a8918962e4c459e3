//! Publish/subscribe hub between a question source and its observers.
//!
//! Observers are held weakly and addressed by [`ObserverHandle`]. Dispatch is
//! synchronous, in registration order, over a snapshot of the registry taken
//! before the first delivery, so callbacks may register or remove observers
//! (including themselves) without disturbing the dispatch in progress.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, warn};

use crate::error::{DispatchError, ObserverError, QuizError};

static NEXT_SOURCE_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Identifies the question source an event came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId {
    serial: u64,
    name: String,
}

impl SourceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            serial: NEXT_SOURCE_SERIAL.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.serial)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReport {
    pub source: SourceId,
    pub correct: bool,
    /// Present only for wrong answers.
    pub log_entry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    Answered(AnswerReport),
    NextRequested,
    HomeRequested,
    /// Any other named event, delivered without guaranteed handling.
    Custom(String),
}

impl QuizEvent {
    pub const ANSWERED: &'static str = "answered";
    pub const NEXT: &'static str = "next";
    pub const HOME: &'static str = "home";

    pub fn name(&self) -> &str {
        match self {
            QuizEvent::Answered(_) => Self::ANSWERED,
            QuizEvent::NextRequested => Self::NEXT,
            QuizEvent::HomeRequested => Self::HOME,
            QuizEvent::Custom(name) => name,
        }
    }
}

impl FromStr for QuizEvent {
    type Err = QuizError;

    /// Maps a string-keyed event. `answered` carries a payload and cannot be
    /// built from its name alone.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::ANSWERED => Err(QuizError::UnknownEvent(s.to_string())),
            Self::NEXT => Ok(QuizEvent::NextRequested),
            Self::HOME => Ok(QuizEvent::HomeRequested),
            other => Ok(QuizEvent::Custom(other.to_string())),
        }
    }
}

pub trait QuizObserver {
    fn on_event(&mut self, event: &QuizEvent) -> Result<(), ObserverError>;
}

/// Opaque registration handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverHandle(u64);

impl ObserverHandle {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ObserverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

struct Entry {
    handle: ObserverHandle,
    identity: *const (),
    observer: Weak<RefCell<dyn QuizObserver>>,
}

#[derive(Default)]
pub struct Notifier {
    entries: RefCell<Vec<Entry>>,
    next_handle: Cell<u64>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handles: Vec<ObserverHandle> =
            self.entries.borrow().iter().map(|e| e.handle).collect();
        f.debug_struct("Notifier").field("observers", &handles).finish()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer`. Registering the same observer again returns the
    /// handle it already has.
    pub fn register<O: QuizObserver + 'static>(&self, observer: &Rc<RefCell<O>>) -> ObserverHandle {
        let identity = Rc::as_ptr(observer) as *const ();
        let mut entries = self.entries.borrow_mut();
        entries.retain(|e| e.observer.strong_count() > 0);

        if let Some(existing) = entries.iter().find(|e| e.identity == identity) {
            return existing.handle;
        }

        let handle = ObserverHandle(self.next_handle.get());
        self.next_handle.set(self.next_handle.get() + 1);

        let erased: Rc<RefCell<dyn QuizObserver>> = observer.clone();
        entries.push(Entry {
            handle,
            identity,
            observer: Rc::downgrade(&erased),
        });
        debug!("registered {handle}");
        handle
    }

    /// Removes a registration. Unknown handles are ignored.
    pub fn remove(&self, handle: ObserverHandle) {
        self.entries.borrow_mut().retain(|e| e.handle != handle);
    }

    pub fn contains(&self, handle: ObserverHandle) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|e| e.handle == handle && e.observer.strong_count() > 0)
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.observer.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `event` to every observer registered when the call starts.
    ///
    /// A failing or busy observer does not stop delivery to the rest; all
    /// failures are returned together once dispatch is over.
    pub fn notify(&self, event: &QuizEvent) -> Result<(), DispatchError> {
        let snapshot: Vec<(ObserverHandle, Weak<RefCell<dyn QuizObserver>>)> = {
            let mut entries = self.entries.borrow_mut();
            entries.retain(|e| e.observer.strong_count() > 0);
            entries
                .iter()
                .map(|e| (e.handle, e.observer.clone()))
                .collect()
        };
        debug!(
            "dispatching `{}` to {} observer(s)",
            event.name(),
            snapshot.len()
        );

        let mut failures = Vec::new();
        for (handle, weak) in snapshot {
            let Some(observer) = weak.upgrade() else {
                continue;
            };
            let delivered = match observer.try_borrow_mut() {
                Ok(mut observer) => observer.on_event(event),
                Err(_) => Err(ObserverError::Busy),
            };
            if let Err(err) = delivered {
                warn!("{handle} failed on `{}`: {err}", event.name());
                failures.push((handle, err));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError { failures })
        }
    }

    /// String-keyed entry point; see [`QuizEvent::from_str`].
    pub fn notify_named(&self, name: &str) -> Result<(), QuizError> {
        let event = name.parse::<QuizEvent>()?;
        self.notify(&event)?;
        Ok(())
    }
}

/// Anything that broadcasts quiz events to registered observers.
pub trait Testable {
    fn notifier(&self) -> &Notifier;

    fn register_observer<O: QuizObserver + 'static>(&self, observer: &Rc<RefCell<O>>) -> ObserverHandle {
        self.notifier().register(observer)
    }

    fn remove_observer(&self, handle: ObserverHandle) {
        self.notifier().remove(handle)
    }

    fn notify(&self, event: &QuizEvent) -> Result<(), DispatchError> {
        self.notifier().notify(event)
    }
}

impl Testable for Notifier {
    fn notifier(&self) -> &Notifier {
        self
    }
}
