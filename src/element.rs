//! Host element handles
//!
//! The controller never needs a full UI tree, only enough of the click
//! target to name it: a tag, a class list, a parent link and an attribute
//! bag the menu can mark as `active`. Hosts mirror their widgets or DOM
//! nodes into [`Element`]s, or build them directly.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

#[derive(Debug)]
struct ElementData {
    tag_name: Option<String>,
    classes: Vec<String>,
    attributes: RefCell<BTreeMap<String, String>>,
    parent: RefCell<Weak<ElementData>>,
}

/// A cheap, clonable handle to a node of the host's element tree
///
/// Equality is identity: two handles are equal when they point at the same
/// node.
#[derive(Debug, Clone)]
pub struct Element {
    inner: Rc<ElementData>,
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Element {}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self::from_parts(Some(tag_name.into()), Vec::new())
    }

    /// A node without a tag name (text node, foreign object)
    pub fn anonymous() -> Self {
        Self::from_parts(None, Vec::new())
    }

    fn from_parts(tag_name: Option<String>, classes: Vec<String>) -> Self {
        Self {
            inner: Rc::new(ElementData {
                tag_name,
                classes,
                attributes: RefCell::new(BTreeMap::new()),
                parent: RefCell::new(Weak::new()),
            }),
        }
    }

    pub fn with_classes<I, S>(tag_name: impl Into<String>, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_parts(
            Some(tag_name.into()),
            classes.into_iter().map(Into::into).collect(),
        )
    }

    /// Attach this element under `parent`
    ///
    /// The link is weak: the host keeps its tree alive.
    pub fn append_to(&self, parent: &Element) {
        *self.inner.parent.borrow_mut() = Rc::downgrade(&parent.inner);
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.inner.tag_name.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.inner.classes
    }

    pub fn parent(&self) -> Option<Element> {
        self.inner
            .parent
            .borrow()
            .upgrade()
            .map(|inner| Element { inner })
    }

    // === Attributes ===

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner
            .attributes
            .borrow_mut()
            .insert(name.into(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.inner.attributes.borrow_mut().remove(name);
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.inner.attributes.borrow().contains_key(name)
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner.attributes.borrow().get(name).cloned()
    }

    // === Tree walking ===

    /// Whether `self` is `other` or one of its descendants
    pub fn is_within(&self, other: &Element) -> bool {
        self.find_ancestor(None, |el| el == other).is_some()
    }

    /// Find the nearest element, starting with `self`, that matches
    /// `predicate`
    ///
    /// The walk stops after testing `root`; elements above it are never
    /// visited. With no root the walk goes up to the top of the tree.
    pub fn find_ancestor<F>(&self, root: Option<&Element>, mut predicate: F) -> Option<Element>
    where
        F: FnMut(&Element) -> bool,
    {
        let mut current = Some(self.clone());
        while let Some(element) = current {
            if predicate(&element) {
                return Some(element);
            }
            if root.is_some_and(|root| *root == element) {
                return None;
            }
            current = element.parent();
        }
        None
    }
}
