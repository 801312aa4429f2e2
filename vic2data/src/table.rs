//! Insertion-ordered entity storage addressed by typed indices.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use serde::{Serialize, Serializer};

use crate::error::TableError;

/// Stable position of an entity inside its [`Table`].
///
/// Indices stay valid however much the table grows, so they are what
/// entities store to refer to each other.
pub struct Idx<T> {
    raw: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Idx<T> {
    fn try_new(index: usize) -> Option<Self> {
        let raw = u32::try_from(index).ok()?;
        Some(Self {
            raw,
            _marker: PhantomData,
        })
    }

    /// Index of an entry already in a table; [`Table::add`] keeps those in range.
    fn new(index: usize) -> Self {
        debug_assert!(u32::try_from(index).is_ok());
        Self {
            raw: index as u32,
            _marker: PhantomData,
        }
    }

    /// 0-based position in the owning table.
    pub fn index(self) -> usize {
        self.raw as usize
    }
}

impl<T> Clone for Idx<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Idx<T> {}

impl<T> PartialEq for Idx<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Idx<T> {}

impl<T> Hash for Idx<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for Idx<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Idx({})", self.raw)
    }
}

impl<T> Serialize for Idx<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.raw)
    }
}

/// Entities looked up by exact name.
pub trait Named {
    fn name(&self) -> &str;
}

macro_rules! named {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::table::Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        })+
    };
}

/// A growable table for one entity kind.
///
/// Tables only grow while their load phase runs. Once frozen they refuse new
/// entries, and only then may other entities size per-entry side arrays with
/// [`Table::dense`].
#[derive(Debug, Clone)]
pub struct Table<T> {
    kind: &'static str,
    items: Vec<T>,
    frozen: bool,
}

impl<T> Table<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            items: Vec::new(),
            frozen: false,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Moves `item` into the table. The table owns it from now on.
    pub fn add(&mut self, item: T) -> Result<Idx<T>, TableError> {
        if self.frozen {
            return Err(TableError::Frozen(self.kind));
        }
        let idx = Idx::try_new(self.items.len()).ok_or(TableError::Full(self.kind))?;
        self.items.push(item);
        Ok(idx)
    }

    pub fn get(&self, idx: Idx<T>) -> Option<&T> {
        self.items.get(idx.index())
    }

    pub fn get_mut(&mut self, idx: Idx<T>) -> Option<&mut T> {
        self.items.get_mut(idx.index())
    }

    /// Index of the entry at 0-based `position`, if there is one.
    pub fn idx_at(&self, position: usize) -> Option<Idx<T>> {
        (position < self.items.len()).then(|| Idx::new(position))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn entries(&self) -> impl Iterator<Item = (Idx<T>, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (Idx::new(i), item))
    }

    pub fn position(&self, pred: impl Fn(&T) -> bool) -> Option<Idx<T>> {
        self.items.iter().position(pred).map(Idx::new)
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Drops every entry and reopens the table.
    pub fn clear(&mut self) {
        self.items.clear();
        self.frozen = false;
    }

    pub fn ensure_frozen(&self) -> Result<(), TableError> {
        if self.frozen {
            Ok(())
        } else {
            Err(TableError::NotFrozen(self.kind))
        }
    }

    /// One `fill` per entry, for arrays indexed by this table's [`Idx`].
    pub fn dense<V: Clone>(&self, fill: V) -> Result<Vec<V>, TableError> {
        self.ensure_frozen()?;
        Ok(vec![fill; self.items.len()])
    }
}

impl<T: Named> Table<T> {
    pub fn find(&self, name: &str) -> Option<Idx<T>> {
        self.position(|item| item.name() == name)
    }
}

impl<T> Index<Idx<T>> for Table<T> {
    type Output = T;

    fn index(&self, idx: Idx<T>) -> &T {
        &self.items[idx.index()]
    }
}

impl<T> IndexMut<Idx<T>> for Table<T> {
    fn index_mut(&mut self, idx: Idx<T>) -> &mut T {
        &mut self.items[idx.index()]
    }
}

impl<'a, T> IntoIterator for &'a Table<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing {
        name: String,
    }

    named!(Thing);

    fn thing(name: &str) -> Thing {
        Thing { name: name.into() }
    }

    #[test]
    fn test_indices_survive_growth() {
        let mut table = Table::new("thing");
        let first = table.add(thing("first")).unwrap();
        for i in 0..1000 {
            table.add(thing(&format!("filler{}", i))).unwrap();
        }
        assert_eq!(table[first].name, "first");
        assert_eq!(table.find("filler999").map(Idx::index), Some(1000));
        assert_eq!(table.find("missing"), None);
    }

    #[test]
    fn test_frozen_table_rejects_adds() {
        let mut table = Table::new("thing");
        table.add(thing("a")).unwrap();
        table.freeze();
        assert_eq!(table.add(thing("b")), Err(TableError::Frozen("thing")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_dense_requires_frozen() {
        let mut table = Table::new("thing");
        table.add(thing("a")).unwrap();
        table.add(thing("b")).unwrap();
        assert_eq!(table.dense(0.0), Err(TableError::NotFrozen("thing")));
        table.freeze();
        assert_eq!(table.dense(false), Ok(vec![false, false]));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_index_past_u32_is_refused() {
        assert_eq!(Idx::<Thing>::try_new(u32::MAX as usize).map(Idx::index), Some(u32::MAX as usize));
        assert_eq!(Idx::<Thing>::try_new(u32::MAX as usize + 1), None);
    }

    #[test]
    fn test_clear_reopens() {
        let mut table = Table::new("thing");
        table.add(thing("a")).unwrap();
        table.freeze();
        table.clear();
        assert!(table.is_empty());
        assert!(!table.is_frozen());
        assert!(table.add(thing("b")).is_ok());
        assert_eq!(table.idx_at(0).map(Idx::index), Some(0));
        assert_eq!(table.idx_at(1), None);
    }
}
