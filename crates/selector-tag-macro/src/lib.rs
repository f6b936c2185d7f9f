use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::{braced, bracketed, token, Attribute, Error, Ident, Result, Token, Type, Visibility};

use proc_macro_crate::{crate_name, FoundCrate};

/// Child names that would collide with the generated node's own methods.
const RESERVED_FIELDS: &[&str] = &["value", "selector", "node_props", "marker"];

/// Branch names that would collide with the generated `Node` / `Schema` items.
const RESERVED_BRANCHES: &[&str] = &["Node", "Schema"];

enum NodeKind {
    /// `name;`
    Leaf,
    /// `name { ... }`
    Branch(Vec<Node>),
    /// `name: path::To::Schema;`
    External(Type),
}

struct Node {
    /// Forwarded onto the accessor (doc comments, `#[deprecated]`, ...).
    attrs: Vec<Attribute>,
    name: Ident,
    /// `name[]`: children addressed by runtime key.
    keyed: bool,
    /// `#[dynamic]` on an external child: its output converts into
    /// `selector_tag::Node`.
    dynamic: bool,
    kind: NodeKind,
}

impl Node {
    /// Path segment for this node. Raw identifiers lose their `r#` prefix.
    fn segment(&self) -> String {
        self.name.unraw().to_string()
    }
}

struct MarkersInput {
    attrs: Vec<Attribute>,
    vis: Visibility,
    root: Ident,
    nodes: Vec<Node>,
}

impl Parse for MarkersInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;
        input.parse::<Token![mod]>()?;
        let root: Ident = input.parse()?;
        let content;
        braced!(content in input);
        let nodes = parse_nodes(&content)?;
        Ok(Self {
            attrs,
            vis,
            root,
            nodes,
        })
    }
}

fn parse_nodes(input: ParseStream) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();
    while !input.is_empty() {
        let mut attrs = input.call(Attribute::parse_outer)?;
        let before = attrs.len();
        attrs.retain(|attr| !attr.path().is_ident("dynamic"));
        let dynamic = attrs.len() != before;

        let name: Ident = input.parse()?;

        // Optional keyed marker: name[]
        let keyed = if input.peek(token::Bracket) {
            let inner;
            bracketed!(inner in input);
            if !inner.is_empty() {
                return Err(inner.error("expected `[]`"));
            }
            true
        } else {
            false
        };

        let kind = if input.peek(token::Brace) {
            let content;
            braced!(content in input);
            NodeKind::Branch(parse_nodes(&content)?)
        } else if input.peek(Token![:]) {
            input.parse::<Token![:]>()?;
            let ty: Type = input.parse()?;
            input.parse::<Token![;]>()?;
            NodeKind::External(ty)
        } else {
            input.parse::<Token![;]>()?;
            NodeKind::Leaf
        };

        if dynamic && !matches!(kind, NodeKind::External(_)) {
            return Err(Error::new(
                name.span(),
                "`#[dynamic]` only applies to external schema children (`name: Type;`)",
            ));
        }

        nodes.push(Node {
            attrs,
            name,
            keyed,
            dynamic,
            kind,
        });
    }
    Ok(nodes)
}

// =============================================================================
// Validation (runs at macro expansion time)
// =============================================================================

/// Reject duplicate and reserved child names, reporting every offender.
fn validate_nodes(nodes: &[Node], errors: &mut Vec<Error>) {
    let mut seen: Vec<String> = Vec::with_capacity(nodes.len());

    for node in nodes {
        let segment = node.segment();

        if seen.contains(&segment) {
            errors.push(Error::new(
                node.name.span(),
                format!("duplicate marker `{segment}` under the same parent"),
            ));
        }

        if RESERVED_FIELDS.contains(&segment.as_str()) {
            errors.push(Error::new(
                node.name.span(),
                format!("`{segment}` is reserved: it would shadow the node's own `{segment}()`"),
            ));
        }

        if let NodeKind::Branch(children) = &node.kind {
            if RESERVED_BRANCHES.contains(&segment.as_str()) {
                errors.push(Error::new(
                    node.name.span(),
                    format!("`{segment}` cannot name a branch: it collides with the generated `{segment}` type"),
                ));
            }
            validate_nodes(children, errors);
        }

        seen.push(segment);
    }
}

/// Can this level convert into the type-erased `selector_tag::Node`?
///
/// Leaves and keyed leaves always can. An external child only when it is
/// marked `#[dynamic]`, and a branch only when its own level can.
fn is_dynamic(nodes: &[Node]) -> bool {
    nodes.iter().all(|node| match &node.kind {
        NodeKind::Leaf => true,
        NodeKind::Branch(children) => is_dynamic(children),
        NodeKind::External(_) => node.dynamic,
    })
}

// =============================================================================
// Crate path resolution
// =============================================================================

fn selector_crate_path() -> TokenStream2 {
    match crate_name("selector-tag") {
        Ok(FoundCrate::Itself) => {
            quote!(::selector_tag)
        }
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Err(_) => quote!(::selector_tag),
    }
}

// =============================================================================
// Code generation
// =============================================================================

/// Schema type and accessor output type for one child.
///
/// ```text
/// header;              Simple                 → Marker
/// items[];             ByKey<Simple>          → Keyed<Simple>
/// footer { .. }        footer::Schema         → footer::Node
/// rows[] { .. }        ByKey<rows::Schema>    → Keyed<rows::Schema>
/// card: Ty;            Ty                     → <Ty as Schema>::Output
/// cards[]: Ty;         ByKey<Ty>              → Keyed<Ty>
/// ```
fn child_types(node: &Node, krate: &TokenStream2) -> (TokenStream2, TokenStream2) {
    let name = &node.name;
    let item = match &node.kind {
        NodeKind::Leaf => quote!(#krate::Simple),
        NodeKind::Branch(_) => quote!(#name::Schema),
        NodeKind::External(ty) => quote!(#ty),
    };

    if node.keyed {
        (quote!(#krate::ByKey<#item>), quote!(#krate::Keyed<#item>))
    } else {
        let output = match &node.kind {
            NodeKind::Leaf => quote!(#krate::Marker),
            NodeKind::Branch(_) => quote!(#name::Node),
            NodeKind::External(ty) => quote!(<#ty as #krate::Schema>::Output),
        };
        (item, output)
    }
}

/// Generate the items of one composite level: its `Node` type with one
/// accessor per child, its unit `Schema`, and nested modules for branches.
///
/// Strategy:
/// - Each branch becomes a module named after its segment
/// - Children of a branch are nested modules inside it, so equal names under
///   different parents never conflict
/// - Accessors instantiate the child schema on every call; nothing is cached
///
/// Example:
/// ```ignore
/// markers! {
///     pub mod page {
///         header;
///         footer {
///             items[];
///         }
///     }
/// }
///
/// // Generates:
/// pub mod page {
///     pub struct Node { marker: Marker }
///     impl Node {
///         pub fn header(&self) -> Marker { .. }       // "<root>/header"
///         pub fn footer(&self) -> footer::Node { .. } // "<root>/footer"
///     }
///     pub struct Schema;
///     pub fn root(value: &str) -> Node { .. }
///
///     pub mod footer {
///         pub struct Node { marker: Marker }
///         impl Node {
///             pub fn items(&self) -> Keyed<Simple> { .. }
///         }
///         pub struct Schema;
///     }
/// }
///
/// // Usage:
/// page::root("root").footer().items().get(3).value() // "root/footer/items/3"
/// ```
fn generate_level(children: &[Node], krate: &TokenStream2) -> TokenStream2 {
    let mut accessors = Vec::with_capacity(children.len());
    let mut dynamic_fields = Vec::with_capacity(children.len());
    let mut segment_lits = Vec::with_capacity(children.len());
    let mut modules = Vec::new();

    for child in children {
        let name = &child.name;
        let attrs = &child.attrs;
        let segment_lit = syn::LitStr::new(&child.segment(), Span::call_site());
        let (schema_ty, output_ty) = child_types(child, krate);

        accessors.push(quote! {
            #(#attrs)*
            #[inline]
            pub fn #name(&self) -> #output_ty {
                #krate::Schema::instantiate(
                    &<#schema_ty as ::core::default::Default>::default(),
                    &self.marker.child_path(#segment_lit),
                )
            }
        });

        dynamic_fields.push(quote! {
            .field(#segment_lit, <#schema_ty as ::core::default::Default>::default())
        });

        if let NodeKind::Branch(grandchildren) = &child.kind {
            let level = generate_level(grandchildren, krate);
            modules.push(quote! {
                #[allow(non_snake_case, non_camel_case_types)]
                pub mod #name {
                    #[allow(unused_imports)]
                    use super::*;

                    #level
                }
            });
        }

        segment_lits.push(segment_lit);
    }

    // Only levels whose children all convert into `selector_tag::Node` get
    // the `complex()` / `From` bridge.
    let bridge = if is_dynamic(children) {
        quote! {
            impl Schema {
                /// The same tree as a type-erased `Complex`.
                pub fn complex() -> #krate::Complex {
                    #krate::Complex::new()
                        #(#dynamic_fields)*
                }
            }

            impl ::core::convert::From<Node> for #krate::Node {
                fn from(node: Node) -> Self {
                    #krate::Schema::instantiate(&Schema::complex(), node.value()).into()
                }
            }
        }
    } else {
        TokenStream2::new()
    };

    quote! {
        /// Declared child segments, in declaration order.
        pub const FIELDS: &[&str] = &[#(#segment_lits),*];

        /// Instantiated marker for this level.
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub struct Node {
            marker: #krate::Marker,
        }

        #[allow(non_snake_case)]
        impl Node {
            /// Full path of this node.
            #[inline]
            pub fn value(&self) -> &str {
                self.marker.value()
            }

            pub fn selector(&self) -> ::std::string::String {
                self.marker.selector()
            }

            pub fn node_props(&self) -> #krate::NodeProps {
                self.marker.node_props()
            }

            #[inline]
            pub fn marker(&self) -> &#krate::Marker {
                &self.marker
            }

            #(#accessors)*
        }

        impl #krate::AsMarker for Node {
            #[inline]
            fn as_marker(&self) -> &#krate::Marker {
                &self.marker
            }
        }

        impl ::core::fmt::Display for Node {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.marker, f)
            }
        }

        /// Schema for this level.
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct Schema;

        impl #krate::Schema for Schema {
            type Output = Node;

            #[inline]
            fn instantiate(&self, value: &str) -> Node {
                Node {
                    marker: #krate::simple(value),
                }
            }
        }

        #bridge

        #(#modules)*
    }
}

fn expand(input: MarkersInput) -> Result<TokenStream2> {
    let mut errors = Vec::new();
    validate_nodes(&input.nodes, &mut errors);
    if let Some(combined) = errors.into_iter().reduce(|mut acc, err| {
        acc.combine(err);
        acc
    }) {
        return Err(combined);
    }

    let krate = selector_crate_path();
    let level = generate_level(&input.nodes, &krate);

    let attrs = input.attrs;
    let vis = input.vis;
    let root = input.root;

    Ok(quote! {
        #(#attrs)*
        #[allow(non_snake_case, non_camel_case_types)]
        #vis mod #root {
            #[allow(unused_imports)]
            use super::*;

            #level

            /// Instantiate the tree with `value` as the root segment.
            pub fn root(value: &str) -> Node {
                #krate::Schema::instantiate(&Schema, value)
            }
        }
    })
}

// =============================================================================
// Entry point
// =============================================================================

/// Declare a marker tree with one typed accessor per child.
///
/// ```ignore
/// markers! {
///     pub mod storefront {
///         /// Top navigation bar.
///         header;
///         footer {
///             brands {
///                 items[];
///             }
///         }
///         rows[] {
///             title;
///             price;
///         }
///         #[dynamic]
///         card: crate::card::Schema;
///     }
/// }
///
/// let page = storefront::root("root");
/// page.footer().brands().items().get(3).value(); // "root/footer/brands/items/3"
/// page.rows().get("sku-1").title().selector();   // "[data-test='root/rows/sku-1/title']"
/// ```
#[proc_macro]
pub fn markers(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as MarkersInput);
    match expand(input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
