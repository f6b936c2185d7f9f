//! Marker — the identifier of one UI node.
//!
//! A marker is its path and nothing else. The selector and the attribute
//! props are recomputed from the path on demand.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::error::SegmentError;
use crate::path;

/// The test attribute written onto rendered elements.
pub const ATTR_NAME: &str = "data-test";

/// Path segment separator.
pub const SEPARATOR: char = '/';

/// Identifier for one node of a marker tree.
///
/// Two markers with the same value are equal; there is no other identity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Marker {
    value: String,
}

impl Marker {
    /// Wrap a path verbatim. No validation is done.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Full path, e.g. `root/footer/brands`.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Attribute-equality selector: `[data-test='<value>']`.
    ///
    /// Quotes and brackets inside the value are not escaped.
    pub fn selector(&self) -> String {
        format!("[{ATTR_NAME}='{}']", self.value)
    }

    /// Single-entry attribute mapping for the rendering layer.
    pub fn node_props(&self) -> NodeProps {
        NodeProps {
            value: self.value.clone(),
        }
    }

    /// Path of a child segment under this marker.
    #[inline]
    pub fn child_path(&self, segment: impl fmt::Display) -> String {
        path::join(&self.value, segment)
    }

    /// Leaf marker for a child segment.
    pub fn child(&self, segment: impl fmt::Display) -> Marker {
        Marker::new(self.child_path(segment))
    }

    /// Like [`child`](Self::child), but rejects segments that would produce
    /// an ambiguous path or a malformed selector.
    pub fn try_child(&self, segment: impl fmt::Display) -> Result<Marker, SegmentError> {
        let segment = segment.to_string();
        path::validate_segment(&segment).inspect_err(|err| {
            tracing::debug!(parent = %self.value, %err, "rejected child segment");
        })?;
        Ok(self.child(segment))
    }

    /// Path segments from the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        path::segments(&self.value)
    }

    /// Depth in the tree (0 = root segment).
    #[inline]
    pub fn depth(&self) -> usize {
        path::depth_of(&self.value)
    }

    /// The enclosing node, or `None` for a root marker.
    pub fn parent(&self) -> Option<Marker> {
        path::parent_of(&self.value).map(Marker::new)
    }

    /// Is this marker under (or equal to) `ancestor`?
    #[inline]
    pub fn is_descendant_of(&self, ancestor: &Marker) -> bool {
        path::is_descendant_of(&self.value, &ancestor.value)
    }

    pub fn into_value(self) -> String {
        self.value
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<&str> for Marker {
    fn from(value: &str) -> Self {
        Marker::new(value)
    }
}

impl From<String> for Marker {
    fn from(value: String) -> Self {
        Marker::new(value)
    }
}

impl AsMarker for Marker {
    #[inline]
    fn as_marker(&self) -> &Marker {
        self
    }
}

/// Serializes as `{ "value", "selector", "nodeProps" }`.
impl Serialize for Marker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Marker", 3)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("selector", &self.selector())?;
        state.serialize_field("nodeProps", &self.node_props())?;
        state.end()
    }
}

/// Anything that carries a marker: leaf markers, composite and keyed nodes.
///
/// Schemas must produce an `AsMarker` value, so every schema output exposes
/// the same `value` / `selector` / `node_props` trio.
pub trait AsMarker {
    fn as_marker(&self) -> &Marker;

    #[inline]
    fn value(&self) -> &str {
        self.as_marker().value()
    }

    fn selector(&self) -> String {
        self.as_marker().selector()
    }

    fn node_props(&self) -> NodeProps {
        self.as_marker().node_props()
    }
}

/// The attribute mapping `{ ATTR_NAME: value }`.
///
/// Always exactly one entry, keyed by [`ATTR_NAME`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeProps {
    value: String,
}

impl NodeProps {
    /// Attribute name (always [`ATTR_NAME`]).
    #[inline]
    pub fn name(&self) -> &'static str {
        ATTR_NAME
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Map-style lookup: `Some(value)` only for [`ATTR_NAME`].
    pub fn get(&self, key: &str) -> Option<&str> {
        (key == ATTR_NAME).then_some(self.value.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The single `(name, value)` entry.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        std::iter::once((ATTR_NAME, self.value.as_str()))
    }
}

impl IntoIterator for NodeProps {
    type Item = (&'static str, String);
    type IntoIter = std::iter::Once<(&'static str, String)>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once((ATTR_NAME, self.value))
    }
}

/// Serializes as a one-entry map.
impl Serialize for NodeProps {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(ATTR_NAME, &self.value)?;
        map.end()
    }
}
