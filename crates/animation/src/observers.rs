use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Identifies a callback registered with an [`ObserverList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Change callback; observers read whatever state they need themselves.
pub type Listener = Rc<dyn Fn()>;

/// Ordered set of change callbacks keyed by [`ListenerId`].
///
/// All methods take `&self` so callbacks may add or remove listeners (or clear
/// the list) while a notification pass is running.
#[derive(Default)]
pub struct ObserverList {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(ListenerId, Listener)>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    /// Returns `false` when `id` was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|(entry, _)| *entry == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.borrow().iter().any(|(entry, _)| *entry == id)
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Calls every listener in registration order.
    ///
    /// The pass works on a snapshot: listeners added during it wait for the
    /// next pass, listeners removed during it are skipped.
    pub fn notify(&self) {
        let snapshot: Vec<(ListenerId, Listener)> = self.entries.borrow().clone();
        for (id, listener) in snapshot {
            if self.contains(id) {
                listener();
            }
        }
    }
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("listeners", &self.len())
            .finish()
    }
}
