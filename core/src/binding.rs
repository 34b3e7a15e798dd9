//! Observable values.
//!
//! A binding is a named value shared between a view model and the elements that display it.
//! Setting a binding to a value that differs from the current one notifies every watcher; setting
//! it to an equal value does nothing. What “differs” means is picked by the binding’s change
//! predicate: [`Equality`] for plain values and [`Ordering`] for values that only define a strict
//! order.
//!
//! Watchers are held weakly. A binding never keeps its watchers alive, and watchers that have been
//! dropped are pruned the next time the binding notifies.

use core::any::Any;
use core::fmt;
use core::marker::PhantomData;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};
use tracing::trace;

use crate::element::WindowRef;

/// Receives change notifications from bindings.
pub trait BindingWatcher: Send + Sync {
    /// Called after `binding` changed. The new value can be read from the binding.
    fn binding_changed(&self, binding: &dyn Bindable);
}

/// A named observable value.
pub trait Bindable: Any + Send + Sync {
    /// The name the binding is looked up by.
    fn name(&self) -> &str;

    /// Adds a watcher. Adding the same watcher twice has no effect.
    fn watch(&self, watcher: Weak<dyn BindingWatcher>);

    /// Removes a watcher. Removing an unknown watcher has no effect.
    fn unwatch(&self, watcher: &Weak<dyn BindingWatcher>);

    fn as_any(&self) -> &dyn Any;

    /// For downcasting shared handles.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// Returns the list capability if this is a list binding.
    fn as_list(self: Arc<Self>) -> Option<Arc<dyn BindableList>> {
        None
    }
}

/// An observable sequence.
pub trait BindableList: Bindable {
    /// Number of elements.
    fn size(&self) -> usize;

    /// A copy of the element at `index`, type-erased.
    fn get_dyn(&self, index: usize) -> Option<Box<dyn Any + Send>>;
}

/// Decides whether a new value counts as a change.
pub trait ChangePredicate<T>: Send + Sync + 'static {
    fn differs(a: &T, b: &T) -> bool;
}

/// Values are different if they are not equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equality;

impl<T: PartialEq> ChangePredicate<T> for Equality {
    fn differs(a: &T, b: &T) -> bool {
        a != b
    }
}

/// A strict ordering for values that are not (or should not be) compared for equality.
pub trait Ordered {
    fn less(&self, other: &Self) -> bool;
}

/// Values are different if either one orders before the other.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ordering;

impl<T: Ordered> ChangePredicate<T> for Ordering {
    fn differs(a: &T, b: &T) -> bool {
        a.less(b) || b.less(a)
    }
}

/// Watcher bookkeeping shared by all binding types.
#[derive(Default)]
struct Watchers {
    list: Mutex<Vec<Weak<dyn BindingWatcher>>>,
    notifying: AtomicBool,
    pending: AtomicBool,
}

impl Watchers {
    fn watch(&self, watcher: Weak<dyn BindingWatcher>) {
        let mut list = self.list.lock();
        if !list.iter().any(|w| Weak::ptr_eq(w, &watcher)) {
            list.push(watcher);
        }
    }

    fn unwatch(&self, watcher: &Weak<dyn BindingWatcher>) {
        self.list.lock().retain(|w| !Weak::ptr_eq(w, watcher));
    }

    /// Upgrades all watchers and drops the dead ones.
    fn live(&self) -> Vec<Arc<dyn BindingWatcher>> {
        let mut list = self.list.lock();
        let mut live = Vec::with_capacity(list.len());
        list.retain(|w| match w.upgrade() {
            Some(w) => {
                live.push(w);
                true
            }
            None => false,
        });
        live
    }

    fn len(&self) -> usize {
        self.list.lock().len()
    }

    /// Notifies all watchers of a change.
    ///
    /// If this binding is already notifying (a watcher set it again, or another thread did), the
    /// round is queued and run by the notifying call after its current round.
    fn notify(&self, binding: &dyn Bindable) {
        self.pending.store(true, AtomicOrdering::SeqCst);
        loop {
            if self
                .notifying
                .compare_exchange(
                    false,
                    true,
                    AtomicOrdering::SeqCst,
                    AtomicOrdering::SeqCst,
                )
                .is_err()
            {
                trace!(binding = binding.name(), "deferring notification");
                return;
            }

            while self.pending.swap(false, AtomicOrdering::SeqCst) {
                // no lock is held while watchers run
                let watchers = self.live();
                trace!(
                    binding = binding.name(),
                    watchers = watchers.len(),
                    "notifying"
                );
                for watcher in watchers {
                    watcher.binding_changed(binding);
                }
            }

            self.notifying.store(false, AtomicOrdering::SeqCst);
            if !self.pending.load(AtomicOrdering::SeqCst) {
                return;
            }
        }
    }
}

/// An observable single value.
pub struct Binding<T, C = Equality> {
    name: String,
    value: Mutex<T>,
    watchers: Watchers,
    _predicate: PhantomData<fn() -> C>,
}

/// A binding for values compared through [`Ordered`].
pub type StructBinding<T> = Binding<T, Ordering>;

impl<T, C> Binding<T, C>
where
    T: Clone + Send + 'static,
    C: ChangePredicate<T>,
{
    pub fn new(name: impl Into<String>, value: T) -> Arc<Self> {
        Arc::new(Binding {
            name: name.into(),
            value: Mutex::new(value),
            watchers: Watchers::default(),
            _predicate: PhantomData,
        })
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.value.lock().clone()
    }

    /// Runs `f` with a reference to the current value.
    ///
    /// The binding is locked while `f` runs; `f` must not set this binding.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.lock())
    }

    /// Sets the value and notifies watchers if it changed. Returns whether it changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = self.value.lock();
            if !C::differs(&current, &value) {
                return false;
            }
            *current = value;
        }
        self.watchers.notify(self);
        true
    }

    /// Number of registered watchers, including ones that have not been pruned yet.
    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }
}

impl<T, C> Bindable for Binding<T, C>
where
    T: Clone + Send + 'static,
    C: ChangePredicate<T>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn watch(&self, watcher: Weak<dyn BindingWatcher>) {
        self.watchers.watch(watcher);
    }

    fn unwatch(&self, watcher: &Weak<dyn BindingWatcher>) {
        self.watchers.unwatch(watcher);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Binding<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("value", &*self.value.lock())
            .finish()
    }
}

/// An observable sequence of values.
///
/// Two sequences are equal if they have the same length and are element-wise equal under the
/// binding’s change predicate.
pub struct ListBinding<T, C = Equality> {
    name: String,
    values: Mutex<Vec<T>>,
    watchers: Watchers,
    _predicate: PhantomData<fn() -> C>,
}

/// A list binding for values compared through [`Ordered`].
pub type StructListBinding<T> = ListBinding<T, Ordering>;

impl<T, C> ListBinding<T, C>
where
    T: Clone + Send + 'static,
    C: ChangePredicate<T>,
{
    pub fn new(name: impl Into<String>, values: Vec<T>) -> Arc<Self> {
        Arc::new(ListBinding {
            name: name.into(),
            values: Mutex::new(values),
            watchers: Watchers::default(),
            _predicate: PhantomData,
        })
    }

    /// Returns a copy of the sequence.
    pub fn get(&self) -> Vec<T> {
        self.values.lock().clone()
    }

    /// Returns a copy of the element at `index`.
    pub fn get_at(&self, index: usize) -> Option<T> {
        self.values.lock().get(index).cloned()
    }

    pub fn size(&self) -> usize {
        self.values.lock().len()
    }

    /// Replaces the sequence and notifies watchers if it changed. Returns whether it changed.
    pub fn set(&self, values: Vec<T>) -> bool {
        {
            let mut current = self.values.lock();
            let same = current.len() == values.len()
                && current
                    .iter()
                    .zip(values.iter())
                    .all(|(a, b)| !C::differs(a, b));
            if same {
                return false;
            }
            *current = values;
        }
        self.watchers.notify(self);
        true
    }
}

impl<T, C> Bindable for ListBinding<T, C>
where
    T: Clone + Send + 'static,
    C: ChangePredicate<T>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn watch(&self, watcher: Weak<dyn BindingWatcher>) {
        self.watchers.watch(watcher);
    }

    fn unwatch(&self, watcher: &Weak<dyn BindingWatcher>) {
        self.watchers.unwatch(watcher);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn as_list(self: Arc<Self>) -> Option<Arc<dyn BindableList>> {
        Some(self)
    }
}

impl<T, C> BindableList for ListBinding<T, C>
where
    T: Clone + Send + 'static,
    C: ChangePredicate<T>,
{
    fn size(&self) -> usize {
        ListBinding::size(self)
    }

    fn get_dyn(&self, index: usize) -> Option<Box<dyn Any + Send>> {
        self.get_at(index).map(|v| Box::new(v) as Box<dyn Any + Send>)
    }
}

impl<T: fmt::Debug, C> fmt::Debug for ListBinding<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ListBinding")
            .field("name", &self.name)
            .field("values", &*self.values.lock())
            .finish()
    }
}

/// A local copy of a binding’s value.
///
/// Elements keep their displayed value in a mirror: changes to the attached binding are copied
/// into it and invalidate the window, and local edits are written back with
/// [`write_back`](Mirror::write_back). Only edits made since the binding last changed are written
/// back, so a stale local copy never overwrites a value set from elsewhere (e.g. a worker thread).
pub struct Mirror<T, C = Equality> {
    state: Mutex<MirrorState<T>>,
    window: Option<WindowRef>,
    _predicate: PhantomData<fn() -> C>,
}

struct MirrorState<T> {
    value: T,
    edited: bool,
}

impl<T, C> Mirror<T, C>
where
    T: Clone + Send + 'static,
    C: ChangePredicate<T>,
{
    pub fn new(value: T, window: Option<WindowRef>) -> Arc<Self> {
        Arc::new(Mirror {
            state: Mutex::new(MirrorState {
                value,
                edited: false,
            }),
            window,
            _predicate: PhantomData,
        })
    }

    /// Starts watching `binding` and takes over its current value.
    pub fn attach(self: &Arc<Self>, binding: &Binding<T, C>) {
        let watcher: Weak<dyn BindingWatcher> = Arc::downgrade(self) as Weak<Self>;
        binding.watch(watcher);
        self.take_over(binding);
    }

    /// Stops watching `binding`.
    pub fn detach(self: &Arc<Self>, binding: &Binding<T, C>) {
        let watcher: Weak<dyn BindingWatcher> = Arc::downgrade(self) as Weak<Self>;
        binding.unwatch(&watcher);
    }

    pub fn get(&self) -> T {
        self.state.lock().value.clone()
    }

    /// Edits the local value without touching the binding.
    pub fn set(&self, value: T) {
        let mut state = self.state.lock();
        state.value = value;
        state.edited = true;
    }

    /// Sets `binding` to the local value if it was edited since the binding last changed.
    ///
    /// Returns whether the binding changed.
    pub fn write_back(&self, binding: &Binding<T, C>) -> bool {
        let edited = {
            let mut state = self.state.lock();
            if !state.edited {
                return false;
            }
            state.edited = false;
            state.value.clone()
        };
        binding.set(edited)
    }

    fn take_over(&self, binding: &Binding<T, C>) {
        let value = binding.get();
        let mut state = self.state.lock();
        state.value = value;
        state.edited = false;
    }
}

impl<T, C> BindingWatcher for Mirror<T, C>
where
    T: Clone + Send + 'static,
    C: ChangePredicate<T>,
{
    fn binding_changed(&self, binding: &dyn Bindable) {
        if let Some(binding) = binding.as_any().downcast_ref::<Binding<T, C>>() {
            self.take_over(binding);
            if let Some(window) = &self.window {
                window.invalidate();
            }
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Mirror<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Mirror")
            .field("value", &state.value)
            .field("edited", &state.edited)
            .finish()
    }
}

/// Bindings by name.
#[derive(Default)]
pub struct BindingTable {
    bindings: HashMap<String, Arc<dyn Bindable>>,
}

impl BindingTable {
    pub fn new() -> BindingTable {
        BindingTable::default()
    }

    /// Adds a binding under its own name, replacing any binding with the same name.
    pub fn insert(&mut self, binding: Arc<dyn Bindable>) {
        self.bindings.insert(binding.name().to_string(), binding);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Bindable>> {
        self.bindings.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for BindingTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.bindings.keys()).finish()
    }
}
