//! Observable metadata properties.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Receives `(name, old_value, new_value)` every time a property is set.
///
/// Any `Fn(&str, &T, &T)` closure is a listener.
pub trait PropertyListener<T> {
    fn property_changed(&self, name: &str, old_value: &T, new_value: &T);
}

impl<T, F> PropertyListener<T> for F
where
    F: Fn(&str, &T, &T),
{
    fn property_changed(&self, name: &str, old_value: &T, new_value: &T) {
        self(name, old_value, new_value)
    }
}

/// A named value with an ordered list of listeners.
///
/// Listeners are registered as `Rc` handles and identified by pointer, so the
/// handle passed to [`Property::add_property_listener`] is the one to pass to
/// [`Property::remove_property_listener`].
///
/// Equality and hashing follow the current value, which `set_value` changes
/// through `&self`; a property used as a set or map key must not be set while
/// it is stored there.
pub struct Property<T> {
    name: String,
    value: RefCell<T>,
    listeners: RefCell<Vec<Rc<dyn PropertyListener<T>>>>,
}

impl<T: Clone> Property<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value: RefCell::new(value),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_value(&self) -> T {
        self.value.borrow().clone()
    }

    /// Replaces the value and notifies every listener, in registration order,
    /// before returning.
    ///
    /// Setting the current value again still notifies (with `old == new`).
    /// Listeners added while a notification is running only see later
    /// changes. Nothing stops a listener from setting the property it
    /// observes; doing so recurses, and it is up to the listener to stop.
    pub fn set_value(&self, new_value: T) {
        let old_value = self.value.replace(new_value.clone());
        let listeners = self.listeners.borrow().clone();
        log::trace!(
            "property '{}' set, notifying {} listener(s)",
            self.name,
            listeners.len()
        );
        for listener in &listeners {
            listener.property_changed(&self.name, &old_value, &new_value);
        }
    }

    /// Appends a listener. The same handle may be registered more than once
    /// and then fires once per registration.
    pub fn add_property_listener(&self, listener: Rc<dyn PropertyListener<T>>) {
        self.listeners.borrow_mut().push(listener);
    }

    /// Removes the first registration of `listener`. Returns `false` if it
    /// was not registered.
    pub fn remove_property_listener(&self, listener: &Rc<dyn PropertyListener<T>>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter().position(|l| Rc::ptr_eq(l, listener)) {
            Some(pos) => {
                listeners.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl<T: PartialEq> PartialEq for Property<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && *self.value.borrow() == *other.value.borrow()
    }
}

impl<T: Eq> Eq for Property<T> {}

impl<T: Hash> Hash for Property<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.value.borrow().hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("value", &*self.value.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
