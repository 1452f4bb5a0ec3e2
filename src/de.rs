//! Scene deserialization.
//!
//! This module provides the [`Deserializer`] that parses a serialized scene
//! document into a live node graph.
//!
//! ## Overview
//!
//! A document is processed in a single left-to-right pass:
//!
//! - the header line is validated against the exact supported format
//!   version;
//! - each following line instantiates one node from its 4-character type
//!   tag and drives the parameter dispatcher across its `key:value` tokens;
//! - node references are backward ids resolved against the nodes already
//!   created, so a reference can never point at the node being built or at
//!   a later one — the resulting graph is acyclic by construction.
//!
//! Every node is pushed onto an internal registry the moment it is created.
//! On success the last node is handed to the caller with its own ownership
//! reference and the registry is dropped; on any failure the registry drop
//! releases everything created so far. Partial graphs are never observable.
//!
//! ## Usage
//!
//! Most users should use [`from_str`](crate::from_str) in the crate root:
//!
//! ```rust
//! use scenewire::{classes, from_str};
//!
//! let registry = classes::default_registry();
//! let scene = "# Node.GL v1.0.0\nTRGL edge0:7fz0,0z0,0z0 edge1:0z0,7fz0,0z0\n";
//! let root = from_str(scene, &registry).unwrap();
//! assert_eq!(root.name(), "Triangle");
//! ```

use crate::error::{Error, Result};
use crate::node::{ClassRegistry, Node, NodeRef, NodeTag};
use crate::params::{ParamDesc, ParamType};
use crate::scan;
use crate::value::ParamValue;
use crate::{Version, VERSION};
use log::{debug, error};
use std::rc::Rc;

const HEADER_PREFIX: &str = "# Node.GL v";

/// Resolves a backward reference id against the nodes visible to the line
/// being parsed: id `i` names the node created `i` steps before the current
/// one. O(1), never allocates.
fn resolve(visible: &[NodeRef], id: u32) -> Result<NodeRef> {
    let available = visible.len();
    (id as usize)
        .checked_add(1)
        .and_then(|off| available.checked_sub(off))
        .map(|index| Rc::clone(&visible[index]))
        .ok_or(Error::BadReference { id, available })
}

/// Converts a decoded list into a fixed-arity array, failing on any other
/// element count.
fn fixed<T, const N: usize>(vals: Vec<T>) -> Result<[T; N]> {
    let found = vals.len();
    vals.try_into().map_err(|_| Error::Arity {
        expected: N,
        found,
    })
}

/// The scene deserializer.
///
/// Holds the input cursor and the in-progress node registry for one
/// deserialization pass. Created via [`Deserializer::new`], consumed by
/// [`Deserializer::deserialize`].
pub struct Deserializer<'r, 'de> {
    input: &'de str,
    pos: usize,
    registry: &'r ClassRegistry,
    nodes: Vec<NodeRef>,
}

impl<'r, 'de> Deserializer<'r, 'de> {
    #[must_use]
    pub fn new(input: &'de str, registry: &'r ClassRegistry) -> Self {
        Deserializer {
            input,
            pos: 0,
            registry,
            nodes: Vec::new(),
        }
    }

    /// Runs the full document parse and returns the last created node.
    ///
    /// # Errors
    ///
    /// Returns an error if the header or any node line is malformed; every
    /// node created up to that point is released before returning.
    pub fn deserialize(mut self) -> Result<NodeRef> {
        self.parse_document()
        // dropping `self` releases the registry; on success the clone taken
        // for the caller keeps the root (and everything it references) alive
    }

    fn rest(&self) -> &'de str {
        &self.input[self.pos..]
    }

    fn parse_document(&mut self) -> Result<NodeRef> {
        self.parse_header()?;
        while self.rest().len() >= 4 {
            self.parse_node_line()?;
        }
        self.nodes.last().cloned().ok_or(Error::EmptyScene)
    }

    /// Validates the `# Node.GL v<major>.<minor>.<micro>` header against the
    /// exact supported version and advances past the header line.
    fn parse_header(&mut self) -> Result<()> {
        let rest = self.rest();
        let header = rest.strip_prefix(HEADER_PREFIX).ok_or(Error::InvalidHeader)?;

        let (major, n1) = scan::scan_u32(header).map_err(|_| Error::InvalidHeader)?;
        if header.as_bytes().get(n1) != Some(&b'.') {
            return Err(Error::InvalidHeader);
        }
        let (minor, n2) = scan::scan_u32(&header[n1 + 1..]).map_err(|_| Error::InvalidHeader)?;
        if header.as_bytes().get(n1 + 1 + n2) != Some(&b'.') {
            return Err(Error::InvalidHeader);
        }
        let (micro, _) =
            scan::scan_u32(&header[n1 + n2 + 2..]).map_err(|_| Error::InvalidHeader)?;

        let found = Version {
            major,
            minor,
            micro,
        };
        if found != VERSION {
            error!("mismatching version: {found} != {VERSION}");
            return Err(Error::VersionMismatch {
                found,
                expected: VERSION,
            });
        }

        let eol = rest.find('\n').map_or(rest.len(), |i| i + 1);
        self.pos += eol;
        Ok(())
    }

    /// Instantiates the node a line describes and applies its parameters.
    fn parse_node_line(&mut self) -> Result<()> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let tag = NodeTag::new([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if !rest.is_char_boundary(4) {
            return Err(Error::UnknownNodeType(tag));
        }
        let class = self.registry.get(tag).ok_or(Error::UnknownNodeType(tag))?;
        self.pos += 4;
        if self.rest().as_bytes().first() == Some(&b' ') {
            self.pos += 1;
        }

        let node = Node::create(class);
        self.nodes.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
        self.nodes.push(Rc::clone(&node));
        debug!("created {} node", class.name);

        let rest = self.rest();
        let (line, advance) = match rest.find('\n') {
            Some(eol) => (&rest[..eol], eol + 1),
            None => (rest, rest.len()),
        };
        self.set_node_params(line, &node)?;
        self.pos += advance;
        Ok(())
    }

    /// Walks one line's `key:value` tokens: looks each key up in the node's
    /// parameter table, dispatches the value, and advances by the consumed
    /// length. A space continues the loop; anything else ends it.
    fn set_node_params(&self, line: &'de str, node: &NodeRef) -> Result<()> {
        if node.class().params.is_empty() {
            return Ok(());
        }
        let mut s = line;
        loop {
            let Some(colon) = s.find(':') else { break };
            let key = &s[..colon];
            let Some(desc) = node.class().find_param(key) else {
                error!("unable to find parameter {}.{}", node.name(), key);
                return Err(Error::UnknownParameter {
                    class: node.name(),
                    key: key.to_string(),
                });
            };
            s = &s[colon + 1..];

            let consumed = match self.parse_param(node, desc, s) {
                Ok(n) => n,
                Err(err) => {
                    let err = err.for_param(node.name(), desc.key);
                    error!("{err}");
                    return Err(err);
                }
            };
            s = &s[consumed..];
            if !s.starts_with(' ') {
                break;
            }
            s = &s[1..];
        }
        Ok(())
    }

    /// Decodes one value token per the parameter's declared type and writes
    /// it into the node's option storage. Returns the consumed length.
    ///
    /// A `!` prefix on a parameter that accepts node references always
    /// parses a single backward reference, overriding the declared type.
    fn parse_param(&self, node: &NodeRef, desc: &ParamDesc, s: &str) -> Result<usize> {
        // The node being built is always the last registry entry; it is not
        // visible to its own references.
        let visible = &self.nodes[..self.nodes.len().saturating_sub(1)];

        if desc.allows_node() && s.starts_with('!') {
            let (id, n) = scan::scan_hex_u32(&s[1..])?;
            let target = resolve(visible, id)?;
            node.opts().set_node(desc, target)?;
            return Ok(n + 1);
        }

        match desc.ty {
            ParamType::I32 => {
                let (v, n) = scan::scan_i32(s)?;
                node.opts().set(desc, ParamValue::I32(v))?;
                Ok(n)
            }
            ParamType::U32 => {
                let (v, n) = scan::scan_u32(s)?;
                node.opts().set(desc, ParamValue::U32(v))?;
                Ok(n)
            }
            ParamType::Bool => {
                let (v, n) = scan::scan_bool(s)?;
                node.opts().set(desc, ParamValue::Bool(v))?;
                Ok(n)
            }
            ParamType::F32 => {
                let (v, n) = scan::scan_f32(s)?;
                node.opts().set(desc, ParamValue::F32(v))?;
                Ok(n)
            }
            ParamType::F64 => {
                let (v, n) = scan::scan_f64(s)?;
                node.opts().set(desc, ParamValue::F64(v))?;
                Ok(n)
            }
            ParamType::Rational => {
                let (v, n) = scan::scan_rational(s)?;
                node.opts().set(desc, ParamValue::Rational(v))?;
                Ok(n)
            }
            ParamType::Flags => {
                let tok = scan::token(s);
                node.opts().set_flags(desc, tok)?;
                Ok(tok.len())
            }
            ParamType::Select => {
                let tok = scan::token(s);
                node.opts().set_select(desc, tok)?;
                Ok(tok.len())
            }
            ParamType::Str => {
                let tok = scan::token(s);
                let decoded = scan::unescape(tok)?;
                node.opts().set(desc, ParamValue::Str(decoded))?;
                Ok(tok.len())
            }
            ParamType::Data => {
                let (v, n) = scan::scan_data(s)?;
                node.opts().set(desc, ParamValue::Data(v))?;
                Ok(n)
            }
            ParamType::IVec2 => {
                let (vals, n) = scan::scan_list(s, scan::scan_i32)?;
                node.opts().set(desc, ParamValue::IVec2(fixed(vals)?))?;
                Ok(n)
            }
            ParamType::IVec3 => {
                let (vals, n) = scan::scan_list(s, scan::scan_i32)?;
                node.opts().set(desc, ParamValue::IVec3(fixed(vals)?))?;
                Ok(n)
            }
            ParamType::IVec4 => {
                let (vals, n) = scan::scan_list(s, scan::scan_i32)?;
                node.opts().set(desc, ParamValue::IVec4(fixed(vals)?))?;
                Ok(n)
            }
            ParamType::UVec2 => {
                let (vals, n) = scan::scan_list(s, scan::scan_u32)?;
                node.opts().set(desc, ParamValue::UVec2(fixed(vals)?))?;
                Ok(n)
            }
            ParamType::UVec3 => {
                let (vals, n) = scan::scan_list(s, scan::scan_u32)?;
                node.opts().set(desc, ParamValue::UVec3(fixed(vals)?))?;
                Ok(n)
            }
            ParamType::UVec4 => {
                let (vals, n) = scan::scan_list(s, scan::scan_u32)?;
                node.opts().set(desc, ParamValue::UVec4(fixed(vals)?))?;
                Ok(n)
            }
            ParamType::Vec2 => {
                let (vals, n) = scan::scan_list(s, scan::scan_f32)?;
                node.opts().set(desc, ParamValue::Vec2(fixed(vals)?))?;
                Ok(n)
            }
            ParamType::Vec3 => {
                let (vals, n) = scan::scan_list(s, scan::scan_f32)?;
                node.opts().set(desc, ParamValue::Vec3(fixed(vals)?))?;
                Ok(n)
            }
            ParamType::Vec4 => {
                let (vals, n) = scan::scan_list(s, scan::scan_f32)?;
                node.opts().set(desc, ParamValue::Vec4(fixed(vals)?))?;
                Ok(n)
            }
            ParamType::Mat4 => {
                let (vals, n) = scan::scan_list(s, scan::scan_f32)?;
                node.opts().set(desc, ParamValue::Mat4(fixed(vals)?))?;
                Ok(n)
            }
            ParamType::Node => {
                let (id, n) = scan::scan_hex_u32(s)?;
                let target = resolve(visible, id)?;
                node.opts().set_node(desc, target)?;
                Ok(n)
            }
            ParamType::NodeList => {
                let (ids, n) = scan::scan_list(s, scan::scan_hex_u32)?;
                let mut targets: Vec<NodeRef> = Vec::new();
                targets
                    .try_reserve_exact(ids.len())
                    .map_err(|_| Error::OutOfMemory)?;
                for id in ids {
                    targets.push(resolve(visible, id)?);
                }
                node.opts().add_nodes(desc, targets)?;
                Ok(n)
            }
            ParamType::F64List => {
                let (vals, n) = scan::scan_list(s, scan::scan_f64)?;
                node.opts().add_f64s(desc, vals)?;
                Ok(n)
            }
            ParamType::NodeDict => {
                let (kvs, n) = scan::scan_kvs(s)?;
                for (key, id) in kvs {
                    let target = resolve(visible, id)?;
                    node.opts().set_dict_entry(desc, key, target)?;
                }
                Ok(n)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_class;
    use crate::params::Choice;

    node_class!(PROBE, "Probe", b"PRBE", [
        ParamDesc::new("i", ParamType::I32),
        ParamDesc::new("u", ParamType::U32),
        ParamDesc::new("b", ParamType::Bool),
        ParamDesc::new("f", ParamType::F32).allow_node(),
        ParamDesc::new("d", ParamType::F64),
        ParamDesc::new("fps", ParamType::Rational),
        ParamDesc::new("name", ParamType::Str),
        ParamDesc::new("blob", ParamType::Data),
        ParamDesc::new("uv", ParamType::Vec2),
        ParamDesc::new("pos", ParamType::Vec3),
        ParamDesc::new("cells", ParamType::IVec3),
        ParamDesc::new("m", ParamType::Mat4),
        ParamDesc::new("child", ParamType::Node),
        ParamDesc::new("kids", ParamType::NodeList),
        ParamDesc::new("times", ParamType::F64List),
        ParamDesc::new("texs", ParamType::NodeDict),
        ParamDesc::new("mode", ParamType::Select)
            .with_choices(&[Choice::new("repeat", 0), Choice::new("clamp", 1)]),
        ParamDesc::new("caps", ParamType::Flags)
            .with_choices(&[Choice::new("x", 1), Choice::new("y", 2)]),
    ]);

    fn registry() -> ClassRegistry {
        ClassRegistry::with_classes(&[&PROBE])
    }

    fn parse(doc: &str) -> Result<NodeRef> {
        Deserializer::new(doc, &registry()).deserialize()
    }

    #[test]
    fn scalar_params() {
        let root = parse("# Node.GL v1.0.0\nPRBE i:-5 u:7 b:-1 fps:30000/1001\n").unwrap();
        assert_eq!(root.param("i").unwrap().as_i32(), Some(-5));
        assert_eq!(root.param("u").unwrap().as_u32(), Some(7));
        assert_eq!(root.param("b").unwrap().as_bool(), Some(None));
        assert_eq!(
            root.param("fps").unwrap().as_rational().unwrap().to_string(),
            "30000/1001"
        );
    }

    #[test]
    fn float_params_are_bit_exact() {
        let root = parse("# Node.GL v1.0.0\nPRBE f:-7fz0 d:3ffZ8000000000000\n").unwrap();
        assert_eq!(root.param("f").unwrap().as_f32(), Some(-1.0));
        assert_eq!(root.param("d").unwrap().as_f64(), Some(1.5));
    }

    #[test]
    fn string_and_blob_params() {
        let root = parse("# Node.GL v1.0.0\nPRBE name:a%20b blob:2,00ff i:1\n").unwrap();
        assert_eq!(root.param("name").unwrap().as_str(), Some("a b"));
        assert_eq!(root.param("blob").unwrap().as_data(), Some(&[0x00, 0xff][..]));
        // the cursor advanced correctly over the blob to the next parameter
        assert_eq!(root.param("i").unwrap().as_i32(), Some(1));
    }

    #[test]
    fn vector_params_enforce_arity() {
        let root = parse("# Node.GL v1.0.0\nPRBE pos:7fz0,0z0,0z0 cells:1,2,3\n").unwrap();
        assert_eq!(root.param("pos").unwrap().as_vec3(), Some([1.0, 0.0, 0.0]));
        assert_eq!(root.param("cells").unwrap().as_ivec3(), Some([1, 2, 3]));

        assert!(parse("# Node.GL v1.0.0\nPRBE pos:7fz0,0z0\n").is_err());
        assert!(parse("# Node.GL v1.0.0\nPRBE pos:7fz0,0z0,0z0,0z0\n").is_err());
    }

    #[test]
    fn select_and_flags_params() {
        let root = parse("# Node.GL v1.0.0\nPRBE mode:clamp caps:x+y\n").unwrap();
        assert_eq!(root.param("mode").unwrap().as_select(), Some(1));
        assert_eq!(root.param("caps").unwrap().as_flags(), Some(3));
    }

    #[test]
    fn backward_references() {
        let doc = "# Node.GL v1.0.0\nPRBE i:1\nPRBE i:2\nPRBE child:1 kids:0,1 texs:a=0,b=1\n";
        let root = parse(doc).unwrap();
        let child = root.param("child").unwrap();
        let child = child.as_node().unwrap();
        assert_eq!(child.param("i").unwrap().as_i32(), Some(1));

        let kids = root.param("kids").unwrap();
        let kids = kids.as_nodes().unwrap().to_vec();
        assert_eq!(kids[0].param("i").unwrap().as_i32(), Some(2));
        assert_eq!(kids[1].param("i").unwrap().as_i32(), Some(1));

        let texs = root.param("texs").unwrap();
        let texs = texs.as_dict().unwrap().clone();
        assert_eq!(texs.get("a").unwrap().param("i").unwrap().as_i32(), Some(2));
    }

    #[test]
    fn reference_override_on_literal_param() {
        let doc = "# Node.GL v1.0.0\nPRBE i:1\nPRBE f:!0\n";
        let root = parse(doc).unwrap();
        let target = root.param("f").unwrap();
        assert_eq!(
            target.as_node().unwrap().param("i").unwrap().as_i32(),
            Some(1)
        );
    }

    #[test]
    fn out_of_range_reference_fails() {
        let err = parse("# Node.GL v1.0.0\nPRBE child:0\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Parameter { key: "child", .. }
        ));

        // id equal to the visible node count is out of range
        assert!(parse("# Node.GL v1.0.0\nPRBE i:1\nPRBE child:1\n").is_err());
    }

    #[test]
    fn unknown_key_names_class_and_key() {
        let err = parse("# Node.GL v1.0.0\nPRBE nope:1\n").unwrap_err();
        match err {
            Error::UnknownParameter { class, key } => {
                assert_eq!(class, "Probe");
                assert_eq!(key, "nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn header_is_strict() {
        assert!(matches!(
            parse("# Node.GL v1.0.1\nPRBE i:1\n").unwrap_err(),
            Error::VersionMismatch { .. }
        ));
        assert!(matches!(
            parse("# Node.GL 1.0.0\nPRBE i:1\n").unwrap_err(),
            Error::InvalidHeader
        ));
        assert!(matches!(
            parse("PRBE i:1\n").unwrap_err(),
            Error::InvalidHeader
        ));
    }

    #[test]
    fn header_only_is_empty() {
        assert!(matches!(
            parse("# Node.GL v1.0.0\n").unwrap_err(),
            Error::EmptyScene
        ));
    }

    #[test]
    fn unknown_tag_fails() {
        assert!(matches!(
            parse("# Node.GL v1.0.0\nXXXX i:1\n").unwrap_err(),
            Error::UnknownNodeType(_)
        ));
    }

    #[test]
    fn missing_trailing_newline_is_fine() {
        let root = parse("# Node.GL v1.0.0\nPRBE i:42").unwrap();
        assert_eq!(root.param("i").unwrap().as_i32(), Some(42));
    }

    #[test]
    fn f64list_appends() {
        let root = parse("# Node.GL v1.0.0\nPRBE times:0Z0,3ffZ0 times:400Z0\n").unwrap();
        let times = root.param("times").unwrap();
        assert_eq!(times.as_f64s(), Some(&[0.0, 1.0, 2.0][..]));
    }

    #[test]
    fn success_leaves_root_refcount_at_one() {
        let doc = "# Node.GL v1.0.0\nPRBE i:1\nPRBE child:0\n";
        let root = parse(doc).unwrap();
        assert_eq!(Rc::strong_count(&root), 1);
        // the child is kept alive solely through the root's slot
        let child = root.param("child").unwrap().as_node().unwrap().clone();
        assert_eq!(Rc::strong_count(&child), 2);
    }
}
