//! Error types for scene deserialization.
//!
//! Every decoder in the crate propagates failure upward through [`Result`];
//! the document driver is the only place that performs cleanup. Callers that
//! only care about the broad failure class can use [`Error::kind`], which
//! collapses the contextual variants into an [`ErrorKind`].
//!
//! ## Examples
//!
//! ```rust
//! use scenewire::{classes, from_str, ErrorKind};
//!
//! let registry = classes::default_registry();
//! let err = from_str("# Node.GL v9.9.9\n", &registry).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::InvalidData);
//! ```

use crate::node::NodeTag;
use crate::params::ParamType;
use crate::Version;
use thiserror::Error;

/// Broad failure classification, the only part of an error that is stable
/// across releases. Message text is for humans and may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input does not conform to the scene format, references a node
    /// that does not exist, or names an unknown type/parameter/constant.
    InvalidData,
    /// A buffer or registry allocation failed.
    OutOfMemory,
    /// Reading the input from an `io::Read` source failed.
    Io,
}

/// Represents all possible errors that can occur while deserializing a scene.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error while reading input
    #[error("IO error: {0}")]
    Io(String),

    /// The document does not start with a well-formed header line
    #[error("invalid serialized scene: malformed header")]
    InvalidHeader,

    /// The header version is not exactly the supported version
    #[error("mismatching version: {found} != {expected}")]
    VersionMismatch { found: Version, expected: Version },

    /// The document contains a valid header but no node lines
    #[error("serialized scene contains no nodes")]
    EmptyScene,

    /// No class is registered for a type tag
    #[error("unknown node type {0}")]
    UnknownNodeType(NodeTag),

    /// A `key:value` token names a parameter the node class does not declare
    #[error("unable to find parameter {class}.{key}")]
    UnknownParameter { class: &'static str, key: String },

    /// A parameter value failed to decode or apply; wraps the cause with the
    /// node class and parameter key for diagnostics
    #[error("unable to set parameter {class}.{key}: {source}")]
    Parameter {
        class: &'static str,
        key: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// A scalar literal is malformed for its expected encoding
    #[error("malformed {expected} literal")]
    Literal { expected: &'static str },

    /// A fixed-arity vector/matrix saw the wrong number of elements
    #[error("expected {expected} comma-separated elements, found {found}")]
    Arity { expected: usize, found: usize },

    /// A backward reference id does not resolve to an earlier node
    #[error("backward reference {id:#x} does not resolve ({available} nodes visible)")]
    BadReference { id: u32, available: usize },

    /// A data blob declared more bytes than the line provides
    #[error("data blob declares {size} bytes but only {available} hex digits remain")]
    TruncatedData { size: usize, available: usize },

    /// A dictionary key exceeds the 63-character bound
    #[error("dictionary key of {len} characters exceeds the 63-character limit")]
    KeyTooLong { len: usize },

    /// A flags/select token names no known constant
    #[error("unknown constant {token:?}")]
    UnknownConstant { token: String },

    /// A decoded value does not match the declared parameter type
    #[error("value does not match the declared {declared:?} parameter type")]
    TypeMismatch { declared: ParamType },

    /// A node-valued parameter received a node of a type it does not accept
    #[error("node type {found} is not accepted by this parameter")]
    DisallowedNode { found: NodeTag },

    /// A buffer or registry allocation failed
    #[error("out of memory")]
    OutOfMemory,
}

impl Error {
    /// Classifies this error into its broad [`ErrorKind`].
    ///
    /// Contextual wrappers ([`Error::Parameter`]) report the kind of their
    /// underlying cause.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::OutOfMemory => ErrorKind::OutOfMemory,
            Error::Parameter { source, .. } => source.kind(),
            _ => ErrorKind::InvalidData,
        }
    }

    /// Creates a malformed-literal error for the given encoding name.
    pub(crate) fn literal(expected: &'static str) -> Self {
        Error::Literal { expected }
    }

    /// Wraps an error with the class and parameter key it occurred on.
    pub(crate) fn for_param(self, class: &'static str, key: &'static str) -> Self {
        Error::Parameter {
            class,
            key,
            source: Box::new(self),
        }
    }

    /// Creates an I/O error for input reading failures.
    pub(crate) fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
