//! # scenewire
//!
//! A deserializer for the Node.GL scene description format: a compact,
//! line-oriented textual encoding of a directed graph of typed,
//! parameterized nodes.
//!
//! ## What is the format?
//!
//! A document is a version header followed by one line per node. Each line
//! starts with a 4-character type tag and continues with `key:value`
//! parameter tokens:
//!
//! ```text
//! # Node.GL v1.0.0
//! TRGL edge0:7fz0,0z0,0z0 edge1:0z0,7fz0,0z0 edge2:0z0,0z0,7fz0
//! RNDR geometry:!0
//! ```
//!
//! Floats travel as their exact IEEE-754 bit pattern (hex exponent, a
//! `z`/`Z` sentinel, hex mantissa), so values round-trip without depending
//! on the host's decimal conversion. Nodes reference earlier nodes by small
//! backward ids, which makes every parsed graph acyclic by construction.
//! See the [`format`] module for the full encoding reference.
//!
//! ## Key Properties
//!
//! - **Single-pass**: one left-to-right scan, no backtracking
//! - **Bit-exact numerics**: floats reproduce their source bit patterns,
//!   including subnormals, infinities and NaN payloads
//! - **Atomic**: on any failure every node created so far is released; a
//!   partial graph is never observable
//! - **Closed class set**: nodes instantiate from a [`ClassRegistry`] of
//!   static [`NodeClass`] tables, so the dispatchable surface is explicit
//!
//! ## Quick Start
//!
//! ```rust
//! use scenewire::{classes, from_str};
//!
//! let registry = classes::default_registry();
//! let scene = "\
//! ## Node.GL v1.0.0
//! TRGL edge0:7fz0,0z0,0z0 edge1:0z0,7fz0,0z0 edge2:0z0,0z0,7fz0
//! ";
//!
//! let root = from_str(scene, &registry).unwrap();
//! assert_eq!(root.name(), "Triangle");
//! assert_eq!(root.param("edge0").unwrap().as_vec3(), Some([1.0, 0.0, 0.0]));
//! ```
//!
//! ## Custom node classes
//!
//! The built-in [`classes`] cover common scene vocabulary; applications
//! with their own node types declare them with [`node_class!`] and register
//! them explicitly:
//!
//! ```rust
//! use scenewire::{from_str, node_class, ClassRegistry, ParamDesc, ParamType};
//!
//! node_class!(LABEL, "Label", b"LABL", [
//!     ParamDesc::new("text", ParamType::Str),
//!     ParamDesc::new("scale", ParamType::F32),
//! ]);
//!
//! let registry = ClassRegistry::with_classes(&[&LABEL]);
//! let root = from_str("# Node.GL v1.0.0\nLABL text:hello%20world\n", &registry).unwrap();
//! assert_eq!(root.param("text").unwrap().as_str(), Some("hello world"));
//! ```

pub mod classes;
pub mod de;
pub mod error;
pub mod format;
pub mod macros;
pub mod node;
pub mod params;
mod scan;
pub mod value;

pub use de::Deserializer;
pub use error::{Error, ErrorKind, Result};
pub use node::{ClassRegistry, Node, NodeClass, NodeRef, NodeTag};
pub use params::{Choice, OptionStore, ParamDesc, ParamFlags, ParamType};
pub use value::{NodeDict, ParamValue, Rational};

use std::fmt;
use std::io;

/// A `major.minor.micro` format version triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

/// The format version this crate reads. Documents must match it exactly;
/// there is no range or compatibility check.
pub const VERSION: Version = Version {
    major: 1,
    minor: 0,
    micro: 0,
};

/// Deserializes a scene document and returns its last node.
///
/// The returned handle is the caller's sole ownership reference to the
/// graph: everything the root references (directly or transitively) stays
/// alive through it, and everything else created during the parse has
/// already been released.
///
/// # Examples
///
/// ```rust
/// use scenewire::{classes, from_str};
///
/// let registry = classes::default_registry();
/// let root = from_str("# Node.GL v1.0.0\nGRUP\n", &registry).unwrap();
/// assert_eq!(root.name(), "Group");
/// ```
///
/// # Errors
///
/// Returns an error if the header is malformed or its version differs from
/// [`VERSION`], if a line names an unknown type tag or parameter, or if any
/// value token is malformed. No nodes survive a failed parse.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(input: &str, registry: &ClassRegistry) -> Result<NodeRef> {
    Deserializer::new(input, registry).deserialize()
}

/// Deserializes a scene document from raw bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 or do not form a valid
/// scene document.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(v: &[u8], registry: &ClassRegistry) -> Result<NodeRef> {
    let s = std::str::from_utf8(v).map_err(|_| Error::literal("utf-8 document"))?;
    from_str(s, registry)
}

/// Deserializes a scene document from an I/O stream.
///
/// The whole stream is read before parsing starts; the format has no
/// incremental mode.
///
/// # Errors
///
/// Returns an error if reading fails or the content is not a valid scene
/// document.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(mut reader: R, registry: &ClassRegistry) -> Result<NodeRef>
where
    R: io::Read,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string, registry)
}
