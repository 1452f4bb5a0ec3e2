//! Built-in node classes.
//!
//! A small closed set of classes covering the common scene-graph vocabulary:
//! geometry, grouping, transforms, animation keyframes, a camera and a
//! render pass. They are enough to parse typical serialized scenes and to
//! serve as a template for registering custom classes.
//!
//! ```rust
//! use scenewire::{classes, from_str};
//!
//! let registry = classes::default_registry();
//! let scene = "# Node.GL v1.0.0\nTRGL edge0:7fz0,0z0,0z0\n";
//! let root = from_str(scene, &registry).unwrap();
//! assert_eq!(root.name(), "Triangle");
//! ```

use crate::node::{ClassRegistry, NodeTag};
use crate::node_class;
use crate::params::{Choice, ParamDesc, ParamType};

const TRANSFORM_TAG: NodeTag = NodeTag::new(*b"TSFM");
const ANIMKF_TAG: NodeTag = NodeTag::new(*b"ANKF");
const TRIANGLE_TAG: NodeTag = NodeTag::new(*b"TRGL");

node_class!(pub TRIANGLE, "Triangle", b"TRGL", [
    ParamDesc::new("edge0", ParamType::Vec3),
    ParamDesc::new("edge1", ParamType::Vec3),
    ParamDesc::new("edge2", ParamType::Vec3),
]);

node_class!(pub TRANSFORM, "Transform", b"TSFM", [
    ParamDesc::new("child", ParamType::Node),
    ParamDesc::new("matrix", ParamType::Mat4),
]);

node_class!(pub ANIMKEYFRAMESCALAR, "AnimKeyFrameScalar", b"ANKF", [
    ParamDesc::new("time", ParamType::F64),
    ParamDesc::new("value", ParamType::F64),
    ParamDesc::new("easing", ParamType::Select).with_choices(&[
        Choice::new("linear", 0),
        Choice::new("quadratic_in", 1),
        Choice::new("quadratic_out", 2),
        Choice::new("cubic_in", 3),
        Choice::new("cubic_out", 4),
    ]),
    ParamDesc::new("easing_args", ParamType::F64List),
]);

node_class!(pub CAMERA, "Camera", b"CMRA", [
    ParamDesc::new("child", ParamType::Node),
    ParamDesc::new("eye", ParamType::Vec3),
    ParamDesc::new("center", ParamType::Vec3),
    ParamDesc::new("up", ParamType::Vec3),
    ParamDesc::new("perspective", ParamType::Vec4),
    ParamDesc::new("eye_transform", ParamType::Node).with_node_types(&[TRANSFORM_TAG]),
    ParamDesc::new("center_transform", ParamType::Node).with_node_types(&[TRANSFORM_TAG]),
    ParamDesc::new("up_transform", ParamType::Node).with_node_types(&[TRANSFORM_TAG]),
    ParamDesc::new("fov_animkf", ParamType::NodeList).with_node_types(&[ANIMKF_TAG]),
]);

node_class!(pub GROUP, "Group", b"GRUP", [
    ParamDesc::new("children", ParamType::NodeList),
]);

node_class!(pub RENDER, "Render", b"RNDR", [
    ParamDesc::new("geometry", ParamType::Node).with_node_types(&[TRIANGLE_TAG]),
    ParamDesc::new("textures", ParamType::NodeDict),
    ParamDesc::new("uniforms", ParamType::NodeDict),
    ParamDesc::new("label", ParamType::Str),
]);

/// Builds a registry holding every built-in class.
#[must_use]
pub fn default_registry() -> ClassRegistry {
    ClassRegistry::with_classes(&[
        &TRIANGLE,
        &TRANSFORM,
        &ANIMKEYFRAMESCALAR,
        &CAMERA,
        &GROUP,
        &RENDER,
    ])
}
