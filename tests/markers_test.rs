use std::sync::atomic::{AtomicUsize, Ordering};

use selector_tag::*;

/// Counts every instantiation, to observe when children are built.
#[derive(Clone, Copy, Debug, Default)]
pub struct CountingLeaf;

pub static COUNTING_BUILDS: AtomicUsize = AtomicUsize::new(0);

impl Schema for CountingLeaf {
    type Output = Marker;

    fn instantiate(&self, value: &str) -> Marker {
        COUNTING_BUILDS.fetch_add(1, Ordering::SeqCst);
        simple(value)
    }
}

/// A schema whose output is its own marker-carrying type, with no
/// conversion into the type-erased `Node`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WidgetSchema;

#[derive(Clone, Debug, PartialEq)]
pub struct Widget {
    marker: Marker,
}

impl Widget {
    pub fn label(&self) -> Marker {
        self.marker.child("label")
    }
}

impl AsMarker for Widget {
    fn as_marker(&self) -> &Marker {
        &self.marker
    }
}

impl Schema for WidgetSchema {
    type Output = Widget;

    fn instantiate(&self, value: &str) -> Widget {
        Widget {
            marker: simple(value),
        }
    }
}

// Typed accessors only: `widget` is not marked `#[dynamic]`
markers! {
    pub mod dashboard {
        title;
        widget: crate::WidgetSchema;
        widgets[]: crate::WidgetSchema;
        sidebar {
            links[];
        }
    }
}

// Shared card layout, reused below as an external schema
markers! {
    pub mod card {
        title;
        price;
    }
}

markers! {
    /// Markers for the storefront page.
    pub mod storefront {
        /// Top navigation bar.
        header;
        appPage {
            footer {
                brands {
                    items[];
                }
            }
        }
        rows[] {
            title;
            price;
        }
        #[dynamic]
        featured: crate::card::Schema;
        #[dynamic]
        cards[]: crate::card::Schema;
        #[dynamic]
        lazy: crate::CountingLeaf;
        r#type;
        empty {}
    }
}

#[test]
fn test_root_marker() {
    let root = storefront::root("root");

    assert_eq!(root.value(), "root");
    assert_eq!(root.selector(), "[data-test='root']");
    assert_eq!(root.node_props().get(ATTR_NAME), Some("root"));
}

#[test]
fn test_nested_path() {
    let root = storefront::root("root");
    let item = root.appPage().footer().brands().items().get("3");

    assert_eq!(item.value(), "root/appPage/footer/brands/items/3");
    assert_eq!(item.selector(), "[data-test='root/appPage/footer/brands/items/3']");
}

#[test]
fn test_keyed_container_has_own_marker() {
    let items = storefront::root("root").appPage().footer().brands().items();

    assert_eq!(items.value(), "root/appPage/footer/brands/items");
    assert_eq!(items.get(2).value(), "root/appPage/footer/brands/items/2");
    assert_eq!(items.get(2), items.get("2"));
}

#[test]
fn test_keyed_branch_items() {
    let rows = storefront::root("root").rows();
    let row = rows.get("sku-1");

    assert_eq!(rows.value(), "root/rows");
    assert_eq!(row.value(), "root/rows/sku-1");
    assert_eq!(row.title().value(), "root/rows/sku-1/title");
    assert_eq!(row.price().selector(), "[data-test='root/rows/sku-1/price']");
}

#[test]
fn test_external_schema() {
    let root = storefront::root("root");

    assert_eq!(root.featured().title().value(), "root/featured/title");
    assert_eq!(root.cards().get(4).price().value(), "root/cards/4/price");
}

#[test]
fn test_external_schema_with_custom_output() {
    let root = dashboard::root("dash");

    assert_eq!(root.widget().value(), "dash/widget");
    assert_eq!(root.widget().label().value(), "dash/widget/label");
    assert_eq!(root.widgets().get(2).selector(), "[data-test='dash/widgets/2']");
    assert_eq!(dashboard::FIELDS, &["title", "widget", "widgets", "sidebar"]);

    // Levels without custom outputs still bridge to the dynamic API
    let sidebar: Node = root.sidebar().into();
    assert_eq!(sidebar.resolve("links/4").unwrap().value(), "dash/sidebar/links/4");
}

#[test]
fn test_raw_ident_segment() {
    assert_eq!(storefront::root("root").r#type().value(), "root/type");
}

#[test]
fn test_empty_branch_is_plain_marker() {
    let empty = storefront::root("root").empty();

    assert_eq!(empty.value(), "root/empty");
    assert!(storefront::empty::FIELDS.is_empty());
}

#[test]
fn test_children_built_on_every_read() {
    let root = storefront::root("root");
    assert_eq!(COUNTING_BUILDS.load(Ordering::SeqCst), 0);

    let first = root.lazy();
    assert_eq!(COUNTING_BUILDS.load(Ordering::SeqCst), 1);

    let second = root.lazy();
    assert_eq!(COUNTING_BUILDS.load(Ordering::SeqCst), 2);

    assert_eq!(first, second);
    assert_eq!(first.value(), "root/lazy");
}

#[test]
fn test_same_root_gives_equal_trees() {
    let a = storefront::root("root");
    let b = storefront::root("root");

    assert_eq!(a, b);
    assert_eq!(a.rows().get(1).title(), b.rows().get(1).title());
    assert_eq!(a.featured(), b.featured());
}

#[test]
fn test_static_and_dynamic_agree() {
    let root = storefront::root("root");
    let dynamic: Node = root.clone().into();

    let item = dynamic.resolve("appPage/footer/brands/items/3").unwrap();
    assert_eq!(
        item.value(),
        root.appPage().footer().brands().items().get(3).value()
    );

    let price = dynamic.resolve("cards/9/price").unwrap();
    assert_eq!(price.value(), root.cards().get(9).price().value());

    let fields: Vec<&str> = dynamic.as_composite().unwrap().fields().collect();
    assert_eq!(fields, storefront::FIELDS);
}

#[test]
fn test_generated_schema_is_a_schema() {
    fn instantiate_with<S: Schema>(schema: S, value: &str) -> String {
        schema.instantiate(value).value().to_string()
    }

    assert_eq!(instantiate_with(card::Schema, "card"), "card");
    assert_eq!(instantiate_with(by_key(card::Schema), "cards"), "cards");
    assert_eq!(
        by_key(card::Schema).instantiate("cards").get(1).title().value(),
        "cards/1/title"
    );
}

#[test]
fn test_serialization() {
    let header = storefront::root("root").header();
    let json = serde_json::to_value(&header).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "value": "root/header",
            "selector": "[data-test='root/header']",
            "nodeProps": { "data-test": "root/header" }
        })
    );
}

#[test]
fn test_display_writes_path() {
    let root = storefront::root("app");
    assert_eq!(root.to_string(), "app");
    assert_eq!(root.rows().to_string(), "app/rows");
    assert_eq!(format!("{}", root.appPage().footer()), "app/appPage/footer");
}
