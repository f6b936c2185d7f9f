//! Basic marker tree definition and use.
//!
//! This example shows how to:
//! - Define a marker hierarchy with the `markers!` macro
//! - Read attribute props for the rendering layer
//! - Read selectors for a test driver
//! - Build the same tree at runtime with the combinators

use selector_tag::*;

markers! {
    pub mod storefront {
        header {
            logo;
            search;
        }
        appPage {
            footer {
                brands {
                    items[];
                }
            }
        }
        products[] {
            title;
            price;
            addToCart;
        }
    }
}

fn main() {
    println!("=== Storefront Markers Example ===\n");

    let root = storefront::root("root");

    // 1. Attribute props, as the rendering layer would apply them
    println!("Attribute props:");
    for (name, value) in root.header().logo().node_props() {
        println!("  <img {}=\"{}\">", name, value);
    }
    println!();

    // 2. Selectors, as a test driver would query them
    println!("Selectors:");
    println!("  search      = {}", root.header().search().selector());
    println!("  brand #3    = {}", root.appPage().footer().brands().items().get(3).selector());
    println!("  add to cart = {}", root.products().get("sku-42").addToCart().selector());
    println!();

    // 3. The container of keyed children has its own marker
    let products = root.products();
    println!("Keyed container:");
    println!("  products    = {}", products.selector());
    println!("  depth       = {}", products.marker().depth());
    println!();

    // 4. The same tree, built at runtime
    let dynamic: Node = root.into();
    if let Some(node) = dynamic.resolve("products/sku-42/price") {
        println!("Runtime lookup:");
        println!("  'products/sku-42/price' → {}", node.value());
    }
    println!();

    // 5. Combinators without the macro
    let banner = Complex::new()
        .field("title", simple)
        .field("slides", by_key(Complex::new().field("caption", simple)));
    let caption = banner
        .instantiate("banner")
        .field("slides")
        .and_then(|slides| slides.key(1))
        .and_then(|slide| slide.field("caption"));
    if let Some(caption) = caption {
        println!("Combinators:");
        println!("  {}", serde_json::to_string(caption.marker()).unwrap_or_default());
    }
}
