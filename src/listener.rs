//! Change listeners for entities and archetypes.
//!
//! All notification is synchronous:
//! listeners run on the calling thread before the mutating call returns,
//! in the order the mutations happened.
//!
//! Listeners only receive shared references to the changed entity,
//! so they cannot mutate the entity or the world while they are being notified.
//! Work that needs to mutate in response to an event
//! should be recorded by the listener and applied after the mutating call returns.

use indexmap::IndexMap;

/// The kind of a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeKind {
    /// A component was added, or an entity joined an archetype.
    Add,
    /// A component was removed, or an entity left an archetype.
    Remove,
}

/// A handle returned when a listener is registered.
///
/// Pass it back to the `unsubscribe` method of the same entity or archetype to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subscription(u64);

/// An ordered set of listeners.
///
/// Each listener is either interested in one [`ChangeKind`] or in all changes.
pub(crate) struct Listeners<F: ?Sized> {
    next: u64,
    map:  IndexMap<Subscription, (Option<ChangeKind>, Box<F>)>,
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self { Self { next: 0, map: IndexMap::new() } }
}

impl<F: ?Sized> Listeners<F> {
    /// Registers a listener for `interest`, or for all changes if `interest` is `None`.
    pub(crate) fn insert(&mut self, interest: Option<ChangeKind>, listener: Box<F>) -> Subscription {
        let subscription = Subscription(self.next);
        self.next += 1;
        self.map.insert(subscription, (interest, listener));
        subscription
    }

    /// Deregisters a listener. Returns `false` if it was not registered.
    pub(crate) fn remove(&mut self, subscription: Subscription) -> bool {
        self.map.shift_remove(&subscription).is_some()
    }

    /// Invokes the listeners for a change of `kind`.
    ///
    /// Listeners interested in `kind` specifically are invoked first,
    /// followed by listeners interested in all changes,
    /// each group in registration order.
    pub(crate) fn emit(&mut self, kind: ChangeKind, mut invoke: impl FnMut(&mut F)) {
        for (interest, listener) in self.map.values_mut() {
            if *interest == Some(kind) {
                invoke(&mut **listener);
            }
        }
        for (interest, listener) in self.map.values_mut() {
            if interest.is_none() {
                invoke(&mut **listener);
            }
        }
    }

    /// Deregisters all listeners.
    ///
    /// Subscriptions issued before the call are never reissued.
    pub(crate) fn clear(&mut self) { self.map.clear() }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize { self.map.len() }
}

#[cfg(test)]
mod tests {
    use super::{ChangeKind, Listeners};

    type Listener = dyn FnMut(ChangeKind) -> &'static str;

    #[test]
    fn test_specific_before_combined() {
        let mut listeners = Listeners::<Listener>::default();
        listeners.insert(None, Box::new(|_| "all"));
        listeners.insert(Some(ChangeKind::Remove), Box::new(|_| "remove"));
        listeners.insert(Some(ChangeKind::Add), Box::new(|_| "add"));

        let mut seen = Vec::new();
        listeners.emit(ChangeKind::Add, |listener| seen.push(listener(ChangeKind::Add)));
        assert_eq!(seen, ["add", "all"]);
    }

    #[test]
    fn test_remove() {
        let mut listeners = Listeners::<Listener>::default();
        let sub = listeners.insert(None, Box::new(|_| "all"));
        assert!(listeners.remove(sub));
        assert!(!listeners.remove(sub));
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn test_clear_does_not_reissue() {
        let mut listeners = Listeners::<Listener>::default();
        let first = listeners.insert(None, Box::new(|_| "first"));
        listeners.clear();
        let second = listeners.insert(None, Box::new(|_| "second"));
        assert_ne!(first, second);
        assert!(!listeners.remove(first));
    }
}
