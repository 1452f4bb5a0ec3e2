//! Parameter descriptors and per-node option storage.
//!
//! Every node class declares its parameters as a static table of
//! [`ParamDesc`] entries: a key, a wire type, optional flags, and the
//! constant/allowed-type tables some types need. Descriptors are
//! `const`-constructible so class tables can live in `static` data.
//!
//! [`OptionStore`] is the storage the parameter dispatcher writes decoded
//! values into, one named slot per assigned parameter. It owns the
//! validation the wire decoders cannot do on their own: declared-type
//! matching, flags/select constant resolution, and allowed-node-type checks
//! for node-valued parameters.
//!
//! ```rust
//! use scenewire::{ParamDesc, ParamType};
//!
//! const PARAMS: &[ParamDesc] = &[
//!     ParamDesc::new("edge0", ParamType::Vec3),
//!     ParamDesc::new("blend", ParamType::F32).allow_node(),
//! ];
//! assert!(PARAMS[1].allows_node());
//! ```

use crate::error::{Error, Result};
use crate::node::{NodeRef, NodeTag};
use crate::value::{NodeDict, ParamValue};
use bitflags::bitflags;
use indexmap::IndexMap;

/// The wire type of one parameter, selecting which decoder handles its
/// value token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamType {
    I32,
    U32,
    Bool,
    F32,
    F64,
    Rational,
    Flags,
    Select,
    Str,
    Data,
    IVec2,
    IVec3,
    IVec4,
    UVec2,
    UVec3,
    UVec4,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    Node,
    NodeList,
    F64List,
    NodeDict,
}

bitflags! {
    /// Behavioral flags on a parameter descriptor.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ParamFlags: u32 {
        /// The parameter may be written as a `!<hexid>` node reference even
        /// when its declared type is a literal.
        const ALLOW_NODE = 1 << 0;
    }
}

/// One named constant a flags or select parameter can resolve to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Choice {
    pub name: &'static str,
    pub value: i32,
}

impl Choice {
    #[must_use]
    pub const fn new(name: &'static str, value: i32) -> Self {
        Choice { name, value }
    }
}

/// The static description of one named, typed parameter of a node class.
#[derive(Debug)]
pub struct ParamDesc {
    pub key: &'static str,
    pub ty: ParamType,
    pub flags: ParamFlags,
    /// Named constants for `Flags`/`Select` parameters.
    pub choices: &'static [Choice],
    /// Tags a node-valued assignment must match, when restricted.
    pub node_types: Option<&'static [NodeTag]>,
}

impl ParamDesc {
    #[must_use]
    pub const fn new(key: &'static str, ty: ParamType) -> Self {
        ParamDesc {
            key,
            ty,
            flags: ParamFlags::empty(),
            choices: &[],
            node_types: None,
        }
    }

    /// Marks the parameter as accepting a node reference in place of its
    /// literal value.
    #[must_use]
    pub const fn allow_node(mut self) -> Self {
        self.flags = self.flags.union(ParamFlags::ALLOW_NODE);
        self
    }

    #[must_use]
    pub const fn with_choices(mut self, choices: &'static [Choice]) -> Self {
        self.choices = choices;
        self
    }

    #[must_use]
    pub const fn with_node_types(mut self, tags: &'static [NodeTag]) -> Self {
        self.node_types = Some(tags);
        self
    }

    /// Whether a `!<hexid>` token is accepted for this parameter.
    #[must_use]
    pub fn allows_node(&self) -> bool {
        self.flags.contains(ParamFlags::ALLOW_NODE) || matches!(self.ty, ParamType::Node)
    }

    fn check_node_type(&self, node: &NodeRef) -> Result<()> {
        if let Some(allowed) = self.node_types {
            if !allowed.contains(&node.tag()) {
                return Err(Error::DisallowedNode { found: node.tag() });
            }
        }
        Ok(())
    }
}

fn value_matches(ty: ParamType, value: &ParamValue) -> bool {
    matches!(
        (ty, value),
        (ParamType::I32, ParamValue::I32(_))
            | (ParamType::U32, ParamValue::U32(_))
            | (ParamType::Bool, ParamValue::Bool(_))
            | (ParamType::F32, ParamValue::F32(_))
            | (ParamType::F64, ParamValue::F64(_))
            | (ParamType::Rational, ParamValue::Rational(_))
            | (ParamType::Flags, ParamValue::Flags(_))
            | (ParamType::Select, ParamValue::Select(_))
            | (ParamType::Str, ParamValue::Str(_))
            | (ParamType::Data, ParamValue::Data(_))
            | (ParamType::IVec2, ParamValue::IVec2(_))
            | (ParamType::IVec3, ParamValue::IVec3(_))
            | (ParamType::IVec4, ParamValue::IVec4(_))
            | (ParamType::UVec2, ParamValue::UVec2(_))
            | (ParamType::UVec3, ParamValue::UVec3(_))
            | (ParamType::UVec4, ParamValue::UVec4(_))
            | (ParamType::Vec2, ParamValue::Vec2(_))
            | (ParamType::Vec3, ParamValue::Vec3(_))
            | (ParamType::Vec4, ParamValue::Vec4(_))
            | (ParamType::Mat4, ParamValue::Mat4(_))
            | (ParamType::Node, ParamValue::Node(_))
            | (ParamType::NodeList, ParamValue::NodeList(_))
            | (ParamType::F64List, ParamValue::F64List(_))
            | (ParamType::NodeDict, ParamValue::NodeDict(_))
    )
}

/// Typed per-node parameter storage.
///
/// Slots are created on first assignment; a parameter that never appears on
/// the wire simply has no slot.
#[derive(Debug, Default)]
pub struct OptionStore {
    slots: IndexMap<&'static str, ParamValue>,
}

impl OptionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.slots.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Assigns a decoded literal value, checking it against the declared
    /// parameter type.
    pub(crate) fn set(&mut self, desc: &ParamDesc, value: ParamValue) -> Result<()> {
        if !value_matches(desc.ty, &value) {
            return Err(Error::TypeMismatch { declared: desc.ty });
        }
        self.slots.insert(desc.key, value);
        Ok(())
    }

    /// Assigns a node reference, either to a `Node`-typed parameter or as a
    /// reference override on an `ALLOW_NODE` literal parameter.
    pub(crate) fn set_node(&mut self, desc: &ParamDesc, node: NodeRef) -> Result<()> {
        if !desc.allows_node() {
            return Err(Error::TypeMismatch { declared: desc.ty });
        }
        desc.check_node_type(&node)?;
        self.slots.insert(desc.key, ParamValue::Node(node));
        Ok(())
    }

    /// Appends node references to a `NodeList` parameter.
    pub(crate) fn add_nodes(&mut self, desc: &ParamDesc, nodes: Vec<NodeRef>) -> Result<()> {
        if desc.ty != ParamType::NodeList {
            return Err(Error::TypeMismatch { declared: desc.ty });
        }
        for node in &nodes {
            desc.check_node_type(node)?;
        }
        match self
            .slots
            .entry(desc.key)
            .or_insert_with(|| ParamValue::NodeList(Vec::new()))
        {
            ParamValue::NodeList(list) => {
                list.try_reserve(nodes.len()).map_err(|_| Error::OutOfMemory)?;
                list.extend(nodes);
                Ok(())
            }
            _ => Err(Error::TypeMismatch { declared: desc.ty }),
        }
    }

    /// Appends doubles to an `F64List` parameter.
    pub(crate) fn add_f64s(&mut self, desc: &ParamDesc, vals: Vec<f64>) -> Result<()> {
        if desc.ty != ParamType::F64List {
            return Err(Error::TypeMismatch { declared: desc.ty });
        }
        match self
            .slots
            .entry(desc.key)
            .or_insert_with(|| ParamValue::F64List(Vec::new()))
        {
            ParamValue::F64List(list) => {
                list.try_reserve(vals.len()).map_err(|_| Error::OutOfMemory)?;
                list.extend(vals);
                Ok(())
            }
            _ => Err(Error::TypeMismatch { declared: desc.ty }),
        }
    }

    /// Inserts one key-node pair into a `NodeDict` parameter.
    pub(crate) fn set_dict_entry(
        &mut self,
        desc: &ParamDesc,
        key: String,
        node: NodeRef,
    ) -> Result<()> {
        if desc.ty != ParamType::NodeDict {
            return Err(Error::TypeMismatch { declared: desc.ty });
        }
        desc.check_node_type(&node)?;
        match self
            .slots
            .entry(desc.key)
            .or_insert_with(|| ParamValue::NodeDict(NodeDict::new()))
        {
            ParamValue::NodeDict(dict) => {
                dict.insert(key, node);
                Ok(())
            }
            _ => Err(Error::TypeMismatch { declared: desc.ty }),
        }
    }

    /// Resolves a flags token against the descriptor's constants and stores
    /// the resulting bitmask. Tokens are `+`-separated constant names; `0`
    /// (or an empty token) clears the mask.
    pub(crate) fn set_flags(&mut self, desc: &ParamDesc, token: &str) -> Result<()> {
        if desc.ty != ParamType::Flags {
            return Err(Error::TypeMismatch { declared: desc.ty });
        }
        let mask = if token.is_empty() || token == "0" {
            0
        } else {
            let mut mask = 0;
            for name in token.split('+') {
                let choice = desc
                    .choices
                    .iter()
                    .find(|c| c.name == name)
                    .ok_or_else(|| Error::UnknownConstant {
                        token: name.to_string(),
                    })?;
                mask |= choice.value;
            }
            mask
        };
        self.slots.insert(desc.key, ParamValue::Flags(mask));
        Ok(())
    }

    /// Resolves a select token to exactly one named constant.
    pub(crate) fn set_select(&mut self, desc: &ParamDesc, token: &str) -> Result<()> {
        if desc.ty != ParamType::Select {
            return Err(Error::TypeMismatch { declared: desc.ty });
        }
        let choice = desc
            .choices
            .iter()
            .find(|c| c.name == token)
            .ok_or_else(|| Error::UnknownConstant {
                token: token.to_string(),
            })?;
        self.slots.insert(desc.key, ParamValue::Select(choice.value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeClass};

    static LEAF: NodeClass = NodeClass {
        name: "Leaf",
        tag: NodeTag::new(*b"LEAF"),
        params: &[],
    };

    static OTHER: NodeClass = NodeClass {
        name: "Other",
        tag: NodeTag::new(*b"OTHR"),
        params: &[],
    };

    const SCALAR: ParamDesc = ParamDesc::new("scalar", ParamType::F32);
    const REF_SCALAR: ParamDesc = ParamDesc::new("ref_scalar", ParamType::F32).allow_node();
    const CHILDREN: ParamDesc = ParamDesc::new("children", ParamType::NodeList);
    const LEAF_TAGS: &[NodeTag] = &[NodeTag::new(*b"LEAF")];
    const LEAF_ONLY: ParamDesc =
        ParamDesc::new("leaf", ParamType::Node).with_node_types(LEAF_TAGS);
    const MODE: ParamDesc = ParamDesc::new("mode", ParamType::Select)
        .with_choices(&[Choice::new("linear", 0), Choice::new("nearest", 1)]);
    const FEATURES: ParamDesc = ParamDesc::new("features", ParamType::Flags)
        .with_choices(&[Choice::new("a", 1), Choice::new("b", 2), Choice::new("c", 4)]);

    #[test]
    fn set_checks_declared_type() {
        let mut store = OptionStore::new();
        store.set(&SCALAR, ParamValue::F32(1.5)).unwrap();
        assert_eq!(store.get("scalar").unwrap().as_f32(), Some(1.5));
        assert!(matches!(
            store.set(&SCALAR, ParamValue::I32(1)),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn node_override_requires_flag() {
        let mut store = OptionStore::new();
        let node = Node::create(&LEAF);
        assert!(store.set_node(&SCALAR, node.clone()).is_err());
        store.set_node(&REF_SCALAR, node).unwrap();
        assert!(store.get("ref_scalar").unwrap().as_node().is_some());
    }

    #[test]
    fn node_type_restriction() {
        let mut store = OptionStore::new();
        store.set_node(&LEAF_ONLY, Node::create(&LEAF)).unwrap();
        assert!(matches!(
            store.set_node(&LEAF_ONLY, Node::create(&OTHER)),
            Err(Error::DisallowedNode { .. })
        ));
    }

    #[test]
    fn list_add_semantics_append() {
        let mut store = OptionStore::new();
        store.add_nodes(&CHILDREN, vec![Node::create(&LEAF)]).unwrap();
        store
            .add_nodes(&CHILDREN, vec![Node::create(&LEAF), Node::create(&OTHER)])
            .unwrap();
        assert_eq!(store.get("children").unwrap().as_nodes().unwrap().len(), 3);
    }

    #[test]
    fn select_resolution() {
        let mut store = OptionStore::new();
        store.set_select(&MODE, "nearest").unwrap();
        assert_eq!(store.get("mode").unwrap().as_select(), Some(1));
        assert!(matches!(
            store.set_select(&MODE, "cubic"),
            Err(Error::UnknownConstant { .. })
        ));
    }

    #[test]
    fn flags_union() {
        let mut store = OptionStore::new();
        store.set_flags(&FEATURES, "a+c").unwrap();
        assert_eq!(store.get("features").unwrap().as_flags(), Some(5));
        store.set_flags(&FEATURES, "0").unwrap();
        assert_eq!(store.get("features").unwrap().as_flags(), Some(0));
        assert!(store.set_flags(&FEATURES, "a+z").is_err());
    }
}
