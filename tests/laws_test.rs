//! Path, selector and keyed-addressing laws over arbitrary segments.

use proptest::prelude::*;
use selector_tag::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,12}"
}

proptest! {
    /// Reading child `k` of a composite at `v` yields `v/k`.
    #[test]
    fn composite_child_path(root in segment(), key in segment()) {
        let schema = Complex::new().field(key.clone(), simple);
        let child = schema.instantiate(&root).field(&key).unwrap();
        prop_assert_eq!(child.value(), format!("{root}/{key}"));
    }

    /// A chain a → b → c ends at "a/b/c".
    #[test]
    fn nested_chain_path(a in segment(), b in segment(), c in segment()) {
        let schema = Complex::new().field(b.clone(), Complex::new().field(c.clone(), simple));
        let root: Node = schema.instantiate(&a).into();
        let deepest = root.field(&b).and_then(|node| node.field(&c)).unwrap();
        prop_assert_eq!(deepest.value(), format!("{a}/{b}/{c}"));
    }

    /// selector and node_props are functions of value for every marker kind.
    #[test]
    fn selector_and_props_follow_value(root in segment(), key in segment()) {
        let nodes: Vec<Node> = vec![
            simple(&root).into(),
            Complex::new().instantiate(&root).into(),
            by_key(simple).instantiate(&root).into(),
            by_key(simple).instantiate(&root).get(&key).into(),
        ];

        for node in nodes {
            prop_assert_eq!(node.selector(), format!("[data-test='{}']", node.value()));
            let props: Vec<(&str, String)> = node.node_props().into_iter().collect();
            prop_assert_eq!(props, vec![(ATTR_NAME, node.value().to_string())]);
        }
    }

    /// Distinct keys give markers that differ only in the last segment.
    #[test]
    fn keyed_addressing(root in segment(), x in segment(), y in segment()) {
        prop_assume!(x != y);
        let items = by_key(simple).instantiate(&root);
        let (mx, my) = (items.get(&x), items.get(&y));

        prop_assert_eq!(mx.value(), format!("{root}/{x}"));
        prop_assert_ne!(mx.value(), my.value());
        prop_assert_eq!(mx.parent(), my.parent());
        prop_assert_eq!(mx.parent(), Some(simple(&root)));
    }

    /// Numeric keys are stringified.
    #[test]
    fn numeric_keys(root in segment(), n in 0u64..1_000_000) {
        let items = by_key(simple).instantiate(&root);
        prop_assert_eq!(items.get(n), items.get(n.to_string()));
    }
}

#[test]
fn scenario_empty_root() {
    let root = complex(Vec::<(&str, AnySchema)>::new()).instantiate("root");
    let json = serde_json::to_value(root.marker()).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "value": "root",
            "selector": "[data-test='root']",
            "nodeProps": { "data-test": "root" }
        })
    );
}

#[test]
fn scenario_nested_keyed_item() {
    let schema = Complex::new().field("header", simple).field(
        "footer",
        Complex::new().field("brands", Complex::new().field("items", by_key(simple))),
    );

    let root: Node = schema.instantiate("root").into();
    let item = root.resolve("footer/brands/items/3").unwrap();
    assert_eq!(item.value(), "root/footer/brands/items/3");
}

#[test]
fn scenario_keyed_numeric() {
    let items = by_key(simple).instantiate("items");
    assert_eq!(items.value(), "items");
    assert_eq!(items.get(2).value(), "items/2");
}
