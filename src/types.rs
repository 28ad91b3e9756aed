use std::fmt::{self, Debug, Formatter};
use std::ops::Deref;

/// A single captured path parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Param {
    pub key: String,
    pub value: String,
}

/// The ordered list of parameters captured by one lookup.
///
/// Parameters appear in the order they are declared in the route path, so
/// reading them by index is safe.
///
/// Truncating a `Params` keeps the slots it already allocated: the next
/// lookup overwrites their strings in place, which is what lets a pooled
/// [`Context`](crate::Context) match requests without reallocating.
#[derive(Clone, Default)]
pub struct Params {
    slots: Vec<Param>,
    len: usize,
}

impl Params {
    /// Creates an empty list.
    pub fn new() -> Params {
        Params::default()
    }

    /// Creates an empty list with room for `capacity` parameters.
    pub fn with_capacity(capacity: usize) -> Params {
        Params {
            slots: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    /// Returns the value of the first parameter named `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gon::{Param, Params};
    ///
    /// let params = Params::from(vec![Param {
    ///     key: "id".to_owned(),
    ///     value: "42".to_owned(),
    /// }]);
    /// assert_eq!(params.get("id"), Some("42"));
    /// assert_eq!(params.get("name"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|param| param.key == key).map(|param| param.value.as_str())
    }

    /// Number of parameters the list can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Shortens the list to `len` parameters, keeping the backing storage.
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// Removes every parameter, keeping the backing storage.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub(crate) fn push(&mut self, key: &str, value: &str) {
        if let Some(slot) = self.slots.get_mut(self.len) {
            slot.key.clear();
            slot.key.push_str(key);
            slot.value.clear();
            slot.value.push_str(value);
        } else {
            self.slots.push(Param {
                key: key.to_owned(),
                value: value.to_owned(),
            });
        }
        self.len += 1;
    }

    pub(crate) fn reserve_total(&mut self, capacity: usize) {
        if self.slots.capacity() < capacity {
            self.slots.reserve_exact(capacity - self.slots.len());
        }
    }
}

impl Deref for Params {
    type Target = [Param];

    fn deref(&self) -> &[Param] {
        &self.slots[..self.len]
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Vec<Param>> for Params {
    fn from(slots: Vec<Param>) -> Params {
        let len = slots.len();
        Params { slots, len }
    }
}

impl PartialEq for Params {
    fn eq(&self, other: &Params) -> bool {
        **self == **other
    }
}

impl Eq for Params {}

impl Debug for Params {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A registered route, as reported by [`Engine::routes`](crate::Engine::routes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: String,
    pub path: String,
    pub handlers: usize,
}
