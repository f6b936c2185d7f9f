//! # Hierarchical Test Markers (selector-tag)
//!
//! Declare a tree of named UI regions once, then use the same declaration to
//! tag rendered elements (`node_props`) and to find them again from a test
//! driver (`selector`).
//!
//! ## Design
//!
//! Every node is identified by its path from the root, joined with `/`:
//!
//! ```text
//! root
//! └── footer                root/footer
//!     └── brands            root/footer/brands
//!         └── items         root/footer/brands/items
//!             └── <key>     root/footer/brands/items/3
//! ```
//!
//! The path is the only identity a node has. The attribute props and the
//! selector string are both derived from it:
//!
//! ```text
//! value     = "root/footer/brands/items/3"
//! selector  = "[data-test='root/footer/brands/items/3']"
//! nodeProps = { "data-test": "root/footer/brands/items/3" }
//! ```
//!
//! ## Schemas
//!
//! A schema is anything that turns a path into a marker. Three constructors
//! compose them:
//!
//! - [`simple`]: a leaf marker.
//! - [`complex`] / [`Complex`]: named children, built on every access.
//! - [`by_key`]: a container whose children are addressed by runtime keys.
//!
//! ```ignore
//! use selector_tag::*;
//!
//! let page = Complex::new()
//!     .field("header", simple)
//!     .field("footer", Complex::new().field("items", by_key(simple)));
//!
//! let root = page.instantiate("root");
//! let item = root.field("footer").and_then(|f| f.field("items")).and_then(|i| i.key(3));
//! assert_eq!(item.unwrap().value(), "root/footer/items/3");
//! ```
//!
//! For trees known at compile time, the [`markers!`] macro generates one typed
//! accessor method per declared child.

pub mod error;
pub mod marker;
pub mod path;
pub mod schema;

pub use error::SegmentError;
pub use marker::{AsMarker, Marker, NodeProps, ATTR_NAME, SEPARATOR};
pub use path::{depth_of, is_descendant_of, join, parent_of, segments, validate_segment};
pub use schema::{
    by_key, complex, simple, AnySchema, ByKey, Complex, Composite, Keyed, Node, Schema, Simple,
};
pub use selector_tag_macro::markers;
