//! Node handles, classes and the class registry.
//!
//! A [`NodeClass`] is the static description of one node variant: its
//! display name, 4-character wire tag and parameter table. Classes are plain
//! `static` data (see the [`node_class!`](crate::node_class) macro), and a
//! [`ClassRegistry`] maps tags to the closed set of classes a deserializer
//! will instantiate.
//!
//! A [`Node`] is one live instance: its class plus the option storage the
//! parameter dispatcher fills in. Nodes are handed out as [`NodeRef`]
//! (`Rc<Node>`), so a parsed scene graph is reference-counted and shared
//! subtrees stay shared.

use crate::params::{OptionStore, ParamDesc};
use crate::value::ParamValue;
use indexmap::IndexMap;
use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// A 4-character code identifying which node variant a line instantiates.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeTag([u8; 4]);

impl NodeTag {
    #[must_use]
    pub const fn new(tag: [u8; 4]) -> Self {
        NodeTag(tag)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() { b as char } else { '.' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeTag({self})")
    }
}

/// The static description of one node variant.
pub struct NodeClass {
    pub name: &'static str,
    pub tag: NodeTag,
    pub params: &'static [ParamDesc],
}

impl NodeClass {
    /// Looks up a parameter descriptor by exact key match. Composite dotted
    /// keys are ordinary table entries, so they match here too.
    #[must_use]
    pub fn find_param(&self, key: &str) -> Option<&ParamDesc> {
        self.params.iter().find(|p| p.key == key)
    }
}

impl fmt::Debug for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeClass")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("params", &self.params.len())
            .finish()
    }
}

/// The closed set of node classes a deserializer can instantiate, keyed by
/// wire tag.
#[derive(Default)]
pub struct ClassRegistry {
    classes: IndexMap<NodeTag, &'static NodeClass>,
}

impl ClassRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a list of classes.
    #[must_use]
    pub fn with_classes(classes: &[&'static NodeClass]) -> Self {
        let mut registry = Self::new();
        for class in classes {
            registry.register(class);
        }
        registry
    }

    /// Registers a class under its tag, replacing any previous class with
    /// the same tag.
    pub fn register(&mut self, class: &'static NodeClass) {
        self.classes.insert(class.tag, class);
    }

    #[must_use]
    pub fn get(&self, tag: NodeTag) -> Option<&'static NodeClass> {
        self.classes.get(&tag).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// A reference-counted handle to a live node.
pub type NodeRef = Rc<Node>;

/// One live node instance: a class plus its option storage.
pub struct Node {
    class: &'static NodeClass,
    opts: RefCell<OptionStore>,
}

impl Node {
    pub(crate) fn create(class: &'static NodeClass) -> NodeRef {
        Rc::new(Node {
            class,
            opts: RefCell::new(OptionStore::new()),
        })
    }

    #[must_use]
    pub fn class(&self) -> &'static NodeClass {
        self.class
    }

    #[must_use]
    pub fn tag(&self) -> NodeTag {
        self.class.tag
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.class.name
    }

    /// Returns a copy of the decoded value for `key`, or `None` if the
    /// parameter was never assigned.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<ParamValue> {
        self.opts.borrow().get(key).cloned()
    }

    pub(crate) fn opts(&self) -> RefMut<'_, OptionStore> {
        self.opts.borrow_mut()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("class", &self.class.name)
            .field("tag", &self.class.tag)
            .finish()
    }
}
