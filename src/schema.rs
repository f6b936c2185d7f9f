//! Schema combinators — build marker trees from a declarative description.
//!
//! A [`Schema`] turns a path into a marker. Three constructors compose them:
//!
//! ```text
//! simple            "root"  → Marker
//! complex({k: S})   "root"  → Composite   .field("k")  → S("root/k")
//! by_key(S)         "items" → Keyed       .get(3)      → S("items/3")
//! ```
//!
//! Children are never stored. Every `field` / `get` call instantiates the
//! child schema again from the parent's path, so subtrees a test never
//! visits are never built.

use std::fmt;
use std::sync::Arc;

use crate::error::SegmentError;
use crate::marker::{AsMarker, Marker, NodeProps};
use crate::path;

/// Anything that produces a marker from a path.
///
/// Implemented by the three constructors, by code generated with
/// [`markers!`](crate::markers), and by any `Fn(&str) -> impl AsMarker`.
pub trait Schema {
    type Output: AsMarker;

    fn instantiate(&self, value: &str) -> Self::Output;
}

impl<F, O> Schema for F
where
    F: Fn(&str) -> O,
    O: AsMarker,
{
    type Output = O;

    #[inline]
    fn instantiate(&self, value: &str) -> O {
        self(value)
    }
}

// =============================================================================
// Leaf
// =============================================================================

/// Leaf constructor: the marker for `value`, nothing else.
#[inline]
pub fn simple(value: &str) -> Marker {
    Marker::new(value)
}

/// Nameable form of [`simple`], for places that need a `Default` type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Simple;

impl Schema for Simple {
    type Output = Marker;

    #[inline]
    fn instantiate(&self, value: &str) -> Marker {
        simple(value)
    }
}

// =============================================================================
// Keyed
// =============================================================================

/// Keyed constructor: wrap `schema` so its instances are addressed by
/// runtime keys (list items, table rows).
pub fn by_key<S: Schema>(schema: S) -> ByKey<S> {
    ByKey::new(schema)
}

/// Schema for a container of keyed children. See [`by_key`].
#[derive(Debug)]
pub struct ByKey<S> {
    schema: Arc<S>,
}

impl<S> ByKey<S> {
    pub fn new(schema: S) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }
}

impl<S> Clone for ByKey<S> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
        }
    }
}

impl<S: Default> Default for ByKey<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Schema> Schema for ByKey<S> {
    type Output = Keyed<S>;

    fn instantiate(&self, value: &str) -> Keyed<S> {
        Keyed {
            marker: simple(value),
            schema: Arc::clone(&self.schema),
        }
    }
}

/// A container marker that also addresses its children by key.
///
/// ```text
/// let items = by_key(simple).instantiate("items");
/// items.value()  → "items"
/// items.get(2)   → Marker("items/2")
/// ```
pub struct Keyed<S> {
    marker: Marker,
    schema: Arc<S>,
}

impl<S: Schema> Keyed<S> {
    /// Child for `key`: the wrapped schema at `<value>/<key>`.
    ///
    /// The key is stringified and appended verbatim.
    pub fn get(&self, key: impl fmt::Display) -> S::Output {
        self.schema.instantiate(&self.marker.child_path(key))
    }

    /// Like [`get`](Self::get), but rejects keys that are empty or contain
    /// the separator, quotes, or brackets.
    pub fn try_get(&self, key: impl fmt::Display) -> Result<S::Output, SegmentError> {
        let key = key.to_string();
        path::validate_segment(&key).inspect_err(|err| {
            tracing::debug!(container = %self.marker, %err, "rejected key");
        })?;
        Ok(self.get(key))
    }
}

impl<S> Keyed<S> {
    #[inline]
    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    #[inline]
    pub fn value(&self) -> &str {
        self.marker.value()
    }

    pub fn selector(&self) -> String {
        self.marker.selector()
    }

    pub fn node_props(&self) -> NodeProps {
        self.marker.node_props()
    }
}

impl<S> AsMarker for Keyed<S> {
    #[inline]
    fn as_marker(&self) -> &Marker {
        &self.marker
    }
}

impl<S> Clone for Keyed<S> {
    fn clone(&self) -> Self {
        Self {
            marker: self.marker.clone(),
            schema: Arc::clone(&self.schema),
        }
    }
}

/// Keyed containers compare by marker; the wrapped schema has no identity.
impl<S> PartialEq for Keyed<S> {
    fn eq(&self, other: &Self) -> bool {
        self.marker == other.marker
    }
}

impl<S> Eq for Keyed<S> {}

impl<S> fmt::Debug for Keyed<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyed")
            .field("marker", &self.marker)
            .finish_non_exhaustive()
    }
}

impl<S> fmt::Display for Keyed<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.marker, f)
    }
}

// =============================================================================
// Type-erased schema
// =============================================================================

/// A schema with its output converted to [`Node`], so differently shaped
/// children can sit in one [`Complex`].
#[derive(Clone)]
pub struct AnySchema(Arc<dyn Fn(&str) -> Node + Send + Sync>);

impl AnySchema {
    pub fn new<S>(schema: S) -> Self
    where
        S: Schema + Send + Sync + 'static,
        S::Output: Into<Node>,
    {
        Self::from_arc(Arc::new(schema))
    }

    fn from_arc<S>(schema: Arc<S>) -> Self
    where
        S: Schema + Send + Sync + 'static,
        S::Output: Into<Node>,
    {
        Self(Arc::new(move |value: &str| -> Node {
            schema.instantiate(value).into()
        }))
    }
}

impl Schema for AnySchema {
    type Output = Node;

    #[inline]
    fn instantiate(&self, value: &str) -> Node {
        (self.0)(value)
    }
}

impl fmt::Debug for AnySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AnySchema(..)")
    }
}

// =============================================================================
// Composite
// =============================================================================

type Fields = Arc<Vec<(String, AnySchema)>>;

/// Composite constructor from a name → schema mapping.
///
/// ```text
/// complex([("header", AnySchema::new(simple))]).instantiate("root")
///     .field("header") → Marker("root/header")
/// ```
///
/// An empty mapping gives a plain root marker.
pub fn complex<I, K>(fields: I) -> Complex
where
    I: IntoIterator<Item = (K, AnySchema)>,
    K: Into<String>,
{
    fields
        .into_iter()
        .fold(Complex::new(), |acc, (name, schema)| acc.insert(name.into(), schema))
}

/// Schema with named children. Built with [`Complex::field`] or [`complex`].
///
/// Fields keep declaration order. Declaring a name twice replaces the
/// earlier schema in place.
#[derive(Clone, Default)]
pub struct Complex {
    fields: Fields,
}

impl Complex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a child named `name`.
    ///
    /// The child's output must convert into [`Node`]. Schemas with a custom
    /// output type are still usable through `markers!` typed accessors.
    pub fn field<S>(self, name: impl Into<String>, schema: S) -> Self
    where
        S: Schema + Send + Sync + 'static,
        S::Output: Into<Node>,
    {
        self.insert(name.into(), AnySchema::new(schema))
    }

    fn insert(mut self, name: String, schema: AnySchema) -> Self {
        let fields = Arc::make_mut(&mut self.fields);
        match fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = schema,
            None => fields.push((name, schema)),
        }
        self
    }

    /// Declared field names, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Schema for Complex {
    type Output = Composite;

    fn instantiate(&self, value: &str) -> Composite {
        Composite {
            marker: simple(value),
            fields: Arc::clone(&self.fields),
        }
    }
}

impl fmt::Debug for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Complex")
            .field("fields", &self.fields().collect::<Vec<_>>())
            .finish()
    }
}

/// A marker with named children, produced by [`Complex`].
#[derive(Clone)]
pub struct Composite {
    marker: Marker,
    fields: Fields,
}

impl Composite {
    /// Instantiate the child `name` at `<value>/<name>`.
    ///
    /// Runs the child schema on every call. Returns `None` for an
    /// undeclared name.
    pub fn field(&self, name: &str) -> Option<Node> {
        let Some((_, schema)) = self.fields.iter().find(|(field, _)| field == name) else {
            tracing::trace!(parent = %self.marker, field = name, "undeclared field");
            return None;
        };
        Some(schema.instantiate(&self.marker.child_path(name)))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
    }

    /// Declared field names, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    #[inline]
    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    #[inline]
    pub fn value(&self) -> &str {
        self.marker.value()
    }

    pub fn selector(&self) -> String {
        self.marker.selector()
    }

    pub fn node_props(&self) -> NodeProps {
        self.marker.node_props()
    }
}

impl AsMarker for Composite {
    #[inline]
    fn as_marker(&self) -> &Marker {
        &self.marker
    }
}

/// Equal when the markers and the declared field names match.
impl PartialEq for Composite {
    fn eq(&self, other: &Self) -> bool {
        self.marker == other.marker && self.fields().eq(other.fields())
    }
}

impl Eq for Composite {}

impl fmt::Debug for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite")
            .field("marker", &self.marker)
            .field("fields", &self.fields().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.marker, f)
    }
}

// =============================================================================
// Node
// =============================================================================

/// Output of a type-erased schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Leaf(Marker),
    Composite(Composite),
    Keyed(Keyed<AnySchema>),
}

impl Node {
    #[inline]
    pub fn marker(&self) -> &Marker {
        match self {
            Node::Leaf(marker) => marker,
            Node::Composite(composite) => composite.marker(),
            Node::Keyed(keyed) => keyed.marker(),
        }
    }

    #[inline]
    pub fn value(&self) -> &str {
        self.marker().value()
    }

    pub fn selector(&self) -> String {
        self.marker().selector()
    }

    pub fn node_props(&self) -> NodeProps {
        self.marker().node_props()
    }

    /// Named child of a composite node. `None` for other nodes.
    pub fn field(&self, name: &str) -> Option<Node> {
        match self {
            Node::Composite(composite) => composite.field(name),
            _ => None,
        }
    }

    /// Keyed child of a keyed node. `None` for other nodes.
    pub fn key(&self, key: impl fmt::Display) -> Option<Node> {
        match self {
            Node::Keyed(keyed) => Some(keyed.get(key)),
            _ => None,
        }
    }

    /// Walk a relative path: composite nodes look up fields, keyed nodes
    /// use the segment as a key.
    ///
    /// ```text
    /// root.resolve("footer/brands/items/3") == root.field("footer")?
    ///     .field("brands")?.field("items")?.key("3")
    /// ```
    pub fn resolve(&self, relative: &str) -> Option<Node> {
        let mut node = self.clone();
        if relative.is_empty() {
            return Some(node);
        }
        for segment in path::segments(relative) {
            node = match &node {
                Node::Composite(composite) => composite.field(segment)?,
                Node::Keyed(keyed) => keyed.get(segment),
                Node::Leaf(marker) => {
                    tracing::trace!(%marker, segment, "cannot descend into a leaf");
                    return None;
                }
            };
        }
        Some(node)
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Node::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    pub fn as_keyed(&self) -> Option<&Keyed<AnySchema>> {
        match self {
            Node::Keyed(keyed) => Some(keyed),
            _ => None,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }
}

impl AsMarker for Node {
    #[inline]
    fn as_marker(&self) -> &Marker {
        self.marker()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.marker(), f)
    }
}

impl From<Marker> for Node {
    fn from(marker: Marker) -> Self {
        Node::Leaf(marker)
    }
}

impl From<Composite> for Node {
    fn from(composite: Composite) -> Self {
        Node::Composite(composite)
    }
}

impl<S> From<Keyed<S>> for Node
where
    S: Schema + Send + Sync + 'static,
    S::Output: Into<Node>,
{
    fn from(keyed: Keyed<S>) -> Self {
        Node::Keyed(Keyed {
            marker: keyed.marker,
            schema: Arc::new(AnySchema::from_arc(keyed.schema)),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
