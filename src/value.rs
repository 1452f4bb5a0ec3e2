//! Decoded parameter values.
//!
//! [`ParamValue`] is the tagged union a node line decodes into: one variant
//! per parameter value shape the wire format knows about, from plain scalars
//! to fixed vectors, blobs and node references. A value exists transiently
//! during one parameter assignment and then lives inside the owning node's
//! option storage.
//!
//! ## Extracting values
//!
//! ```rust
//! use scenewire::ParamValue;
//!
//! let v = ParamValue::Vec3([1.0, 0.0, 0.0]);
//! assert_eq!(v.as_vec3(), Some([1.0, 0.0, 0.0]));
//! assert_eq!(v.as_i32(), None);
//! ```

use crate::node::NodeRef;
use indexmap::IndexMap;
use std::fmt;

/// A signed rational number, kept as the exact `num/den` pair from the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// An ordered dictionary of string keys to node references.
///
/// Insertion order is preserved, matching the order the pairs appear on the
/// wire.
#[derive(Clone, Debug, Default)]
pub struct NodeDict(IndexMap<String, NodeRef>);

impl NodeDict {
    #[must_use]
    pub fn new() -> Self {
        NodeDict(IndexMap::new())
    }

    /// Inserts a key-node pair, returning the previous node for that key if
    /// one was set.
    pub fn insert(&mut self, key: String, node: NodeRef) -> Option<NodeRef> {
        self.0.insert(key, node)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&NodeRef> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over key-node pairs in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, NodeRef> {
        self.0.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, NodeRef> {
        self.0.keys()
    }
}

impl IntoIterator for NodeDict {
    type Item = (String, NodeRef);
    type IntoIter = indexmap::map::IntoIter<String, NodeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, NodeRef)> for NodeDict {
    fn from_iter<T: IntoIterator<Item = (String, NodeRef)>>(iter: T) -> Self {
        NodeDict(IndexMap::from_iter(iter))
    }
}

/// A decoded parameter value, one variant per wire value shape.
///
/// Booleans are tri-state: the wire sentinel `-1` decodes to `None`
/// ("unset"), everything else to `Some`. Flags and selects carry the
/// resolved integer constant, not the textual token.
#[derive(Clone, Debug)]
pub enum ParamValue {
    I32(i32),
    U32(u32),
    Bool(Option<bool>),
    F32(f32),
    F64(f64),
    Rational(Rational),
    Flags(i32),
    Select(i32),
    Str(String),
    Data(Vec<u8>),
    IVec2([i32; 2]),
    IVec3([i32; 3]),
    IVec4([i32; 4]),
    UVec2([u32; 2]),
    UVec3([u32; 3]),
    UVec4([u32; 4]),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
    Node(NodeRef),
    NodeList(Vec<NodeRef>),
    F64List(Vec<f64>),
    NodeDict(NodeDict),
}

impl ParamValue {
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ParamValue::I32(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ParamValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the tri-state boolean: `Some(None)` is an explicit "unset".
    #[must_use]
    pub fn as_bool(&self) -> Option<Option<bool>> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ParamValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::F64(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_rational(&self) -> Option<Rational> {
        match self {
            ParamValue::Rational(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the resolved flags bitmask.
    #[must_use]
    pub fn as_flags(&self) -> Option<i32> {
        match self {
            ParamValue::Flags(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the resolved select constant.
    #[must_use]
    pub fn as_select(&self) -> Option<i32> {
        match self {
            ParamValue::Select(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            ParamValue::Data(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_ivec2(&self) -> Option<[i32; 2]> {
        match self {
            ParamValue::IVec2(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_ivec3(&self) -> Option<[i32; 3]> {
        match self {
            ParamValue::IVec3(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_ivec4(&self) -> Option<[i32; 4]> {
        match self {
            ParamValue::IVec4(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_uvec2(&self) -> Option<[u32; 2]> {
        match self {
            ParamValue::UVec2(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_uvec3(&self) -> Option<[u32; 3]> {
        match self {
            ParamValue::UVec3(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_uvec4(&self) -> Option<[u32; 4]> {
        match self {
            ParamValue::UVec4(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vec2(&self) -> Option<[f32; 2]> {
        match self {
            ParamValue::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match self {
            ParamValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vec4(&self) -> Option<[f32; 4]> {
        match self {
            ParamValue::Vec4(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mat4(&self) -> Option<[f32; 16]> {
        match self {
            ParamValue::Mat4(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            ParamValue::Node(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_nodes(&self) -> Option<&[NodeRef]> {
        match self {
            ParamValue::NodeList(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64s(&self) -> Option<&[f64]> {
        match self {
            ParamValue::F64List(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_dict(&self) -> Option<&NodeDict> {
        match self {
            ParamValue::NodeDict(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` for the node-reference variants (single, list, dict).
    #[must_use]
    pub fn holds_nodes(&self) -> bool {
        matches!(
            self,
            ParamValue::Node(_) | ParamValue::NodeList(_) | ParamValue::NodeDict(_)
        )
    }
}
