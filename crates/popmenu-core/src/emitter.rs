//! Single-threaded publish/subscribe channels.
//!
//! Menus talk to each other through [`Emitter`]s: a panel announces hovered
//! items and close requests, a trigger listens. Every registration returns a
//! [`Subscription`] guard that unregisters the listener when it is dropped or
//! explicitly unsubscribed.
//!
//! Emission is re-entrant: listeners may subscribe, unsubscribe or emit on
//! the same emitter while it is dispatching. A listener removed during a
//! dispatch is not called for the remainder of that dispatch.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Unique ID for a listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

type Listener<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, Listener<T>)>>,
    completed: Cell<bool>,
}

impl<T> Registry<T> {
    fn contains(&self, id: ListenerId) -> bool {
        self.listeners.borrow().iter().any(|(lid, _)| *lid == id)
    }

    fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }
}

/// A multicast event channel.
///
/// Cloning an emitter yields another handle to the same channel.
pub struct Emitter<T> {
    registry: Rc<Registry<T>>,
}

impl<T: 'static> Emitter<T> {
    /// Create a new emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(Registry {
                next_id: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
                completed: Cell::new(false),
            }),
        }
    }

    /// Register a listener.
    ///
    /// Subscribing to a completed emitter returns a closed subscription.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        if self.registry.completed.get() {
            return Subscription::empty();
        }

        let id = ListenerId(self.registry.next_id.get());
        self.registry.next_id.set(id.0 + 1);
        self.registry
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let registry: Weak<Registry<T>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove(id);
            }
        })
    }

    /// Register a listener that runs at most once.
    pub fn subscribe_once<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let fired = Rc::new(Cell::new(false));
        let subscription = Rc::new(RefCell::new(None::<Subscription>));
        let slot = Rc::clone(&subscription);
        let inner = self.subscribe(move |value| {
            if fired.replace(true) {
                return;
            }
            if let Some(sub) = slot.borrow_mut().take() {
                sub.unsubscribe();
            }
            listener(value);
        });
        *subscription.borrow_mut() = Some(inner);

        Subscription::new(move || {
            if let Some(sub) = subscription.borrow_mut().take() {
                sub.unsubscribe();
            }
        })
    }

    /// Deliver a value to every registered listener, in registration order.
    pub fn emit(&self, value: &T) {
        if self.registry.completed.get() {
            return;
        }

        let snapshot: Vec<(ListenerId, Listener<T>)> = self
            .registry
            .listeners
            .borrow()
            .iter()
            .map(|(id, l)| (*id, Rc::clone(l)))
            .collect();

        for (id, listener) in snapshot {
            if self.registry.contains(id) {
                listener(value);
            }
        }
    }

    /// Drop every listener and refuse new ones.
    pub fn complete(&self) {
        self.registry.completed.set(true);
        self.registry.listeners.borrow_mut().clear();
    }

    /// Check if the emitter has been completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.registry.completed.get()
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.listeners.borrow().len()
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.registry.listeners.borrow().len())
            .field("completed", &self.registry.completed.get())
            .finish()
    }
}

/// Guard for a listener registration.
///
/// The listener stays registered until the guard is unsubscribed or dropped.
pub struct Subscription {
    teardown: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    /// Create a subscription with a teardown callback.
    pub fn new<F>(teardown: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            teardown: RefCell::new(Some(Box::new(teardown))),
        }
    }

    /// A subscription that is already closed.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            teardown: RefCell::new(None),
        }
    }

    /// Unregister the listener. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        let teardown = self.teardown.borrow_mut().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    /// Check if the subscription has been torn down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.teardown.borrow().is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A group of subscriptions torn down together.
#[derive(Debug, Default)]
pub struct SubscriptionBag {
    subscriptions: RefCell<Vec<Subscription>>,
}

impl SubscriptionBag {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscription to the bag.
    pub fn add(&self, subscription: Subscription) {
        self.subscriptions.borrow_mut().push(subscription);
    }

    /// Unsubscribe and remove everything in the bag.
    pub fn clear(&self) {
        let drained: Vec<Subscription> = self.subscriptions.borrow_mut().drain(..).collect();
        for subscription in drained {
            subscription.unsubscribe();
        }
    }

    /// Number of subscriptions held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    /// Check if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.borrow().is_empty()
    }
}
