//! ClientRegistry: one dispatcher per language profile.
//!
//! The text service owns a single registry and hands out dispatchers by
//! profile GUID.  A dispatcher is created on first use through the factory
//! given at construction, which decides the transport and retry budgets.
//! Removing a dispatcher flushes its language bar buttons from the host.

use std::collections::HashMap;

use pime_core::protocol::identity::format_guid;
use tracing::info;
use uuid::Uuid;

use super::dispatch_event::EventDispatcher;
use super::editor::EditorContext;
use super::request_response::QueueTransport;

type Factory<T> = Box<dyn FnMut(Uuid) -> EventDispatcher<T>>;

pub struct ClientRegistry<T> {
    dispatchers: HashMap<Uuid, EventDispatcher<T>>,
    factory: Factory<T>,
}

impl<T: QueueTransport> ClientRegistry<T> {
    pub fn new(factory: impl FnMut(Uuid) -> EventDispatcher<T> + 'static) -> Self {
        Self {
            dispatchers: HashMap::new(),
            factory: Box::new(factory),
        }
    }

    /// Returns the dispatcher for `profile`, creating it if needed.
    pub fn get_or_create(&mut self, profile: Uuid) -> &mut EventDispatcher<T> {
        let factory = &mut self.factory;
        self.dispatchers.entry(profile).or_insert_with(|| {
            let dispatcher = factory(profile);
            info!(
                profile = %format_guid(&profile),
                client = %dispatcher.identity(),
                "client created"
            );
            dispatcher
        })
    }

    pub fn get_mut(&mut self, profile: Uuid) -> Option<&mut EventDispatcher<T>> {
        self.dispatchers.get_mut(&profile)
    }

    /// Tears down and drops the dispatcher for `profile`.  Returns whether one existed.
    pub fn remove(&mut self, profile: Uuid, editor: &mut dyn EditorContext) -> bool {
        match self.dispatchers.remove(&profile) {
            Some(mut dispatcher) => {
                dispatcher.teardown(editor);
                info!(profile = %format_guid(&profile), "client removed");
                true
            }
            None => false,
        }
    }

    /// Tears down every dispatcher.
    pub fn teardown_all(&mut self, editor: &mut dyn EditorContext) {
        for (_, mut dispatcher) in self.dispatchers.drain() {
            dispatcher.teardown(editor);
        }
    }

    pub fn len(&self) -> usize {
        self.dispatchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dispatchers.is_empty()
    }
}
