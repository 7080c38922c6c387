//! Item capabilities for inventories.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::core::{downcast_object, ObjectRef, StoreObject};
use crate::util::{Error, Result};
use crate::wire;

/// Anything with a name can live in an inventory.
pub trait InventoryItem {
    fn name(&self) -> Cow<'_, str>;
}

impl<T: InventoryItem + ?Sized> InventoryItem for Rc<T> {
    fn name(&self) -> Cow<'_, str> {
        (**self).name()
    }
}

impl<T: InventoryItem + ?Sized> InventoryItem for Box<T> {
    fn name(&self) -> Cow<'_, str> {
        (**self).name()
    }
}

pub type CompareFn<T> = Box<dyn Fn(&T, &T) -> Ordering>;
pub type RenameFn<T> = Box<dyn Fn(&mut T, &str)>;
pub type CopyFn<T> = Box<dyn Fn(&T) -> Result<T>>;
pub type FixedFn<T> = Box<dyn Fn(&T) -> bool>;

/// Optional per-inventory item capabilities.
///
/// Without a comparator the inventory keeps insertion order; without a
/// rename or copy function the matching operations fail with
/// [`Error::Unsupported`]; without a fixed predicate every item is
/// deletable.
pub struct ItemType<T> {
    pub(crate) compare: Option<CompareFn<T>>,
    pub(crate) rename: Option<RenameFn<T>>,
    pub(crate) copy: Option<CopyFn<T>>,
    pub(crate) is_fixed: Option<FixedFn<T>>,
}

impl<T> ItemType<T> {
    /// No capabilities.
    pub fn new() -> Self {
        Self {
            compare: None,
            rename: None,
            copy: None,
            is_fixed: None,
        }
    }

    pub fn with_compare(mut self, f: impl Fn(&T, &T) -> Ordering + 'static) -> Self {
        self.compare = Some(Box::new(f));
        self
    }

    pub fn with_rename(mut self, f: impl Fn(&mut T, &str) + 'static) -> Self {
        self.rename = Some(Box::new(f));
        self
    }

    pub fn with_copy(mut self, f: impl Fn(&T) -> Result<T> + 'static) -> Self {
        self.copy = Some(Box::new(f));
        self
    }

    pub fn with_fixed(mut self, f: impl Fn(&T) -> bool + 'static) -> Self {
        self.is_fixed = Some(Box::new(f));
        self
    }

    pub fn can_compare(&self) -> bool {
        self.compare.is_some()
    }

    pub fn can_rename(&self) -> bool {
        self.rename.is_some()
    }

    pub fn can_copy(&self) -> bool {
        self.copy.is_some()
    }

    pub(crate) fn compare(&self, a: &T, b: &T) -> Option<Ordering> {
        self.compare.as_ref().map(|f| f(a, b))
    }

    pub(crate) fn fixed(&self, item: &T) -> bool {
        self.is_fixed.as_ref().is_some_and(|f| f(item))
    }
}

impl<T: InventoryItem> ItemType<T> {
    /// Items ordered by name.
    pub fn by_name() -> Self {
        Self::new().with_compare(|a: &T, b: &T| a.name().cmp(&b.name()))
    }
}

impl<T> Default for ItemType<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ItemType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemType")
            .field("compare", &self.can_compare())
            .field("rename", &self.can_rename())
            .field("copy", &self.can_copy())
            .field("fixed", &self.is_fixed.is_some())
            .finish()
    }
}

/// Copy an object item through the wire codec.
///
/// Suitable as an [`ItemType::with_copy`] function for `Rc<X>` items.
pub fn codec_copy<X: StoreObject>(item: &Rc<X>) -> Result<Rc<X>> {
    let object: ObjectRef = Rc::clone(item) as ObjectRef;
    let copy = wire::duplicate_object(&object)?;
    downcast_object::<X>(&copy).ok_or_else(|| {
        Error::other(format!(
            "duplicate of {} has a different type",
            object.type_name()
        ))
    })
}
