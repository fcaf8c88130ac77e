use proc_macro2::{Span, TokenStream};
use quote::{quote, quote_spanned, ToTokens};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Field, Ident, Index, Lit, Meta, NestedMeta};

use crate::util::ErrorLog;

pub fn expand_derive_vertex(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    if let Data::Struct(ref data) = input.data {
        let struct_name = &input.ident;
        let mod_path = quote!(_glbind::vertex);
        let mut log = ErrorLog::new();

        let vertex_fields: Vec<VertexField> = data
            .fields
            .iter()
            .enumerate()
            .map(|(position, field)| VertexField::from_ast(field, position, &mut log))
            .collect();

        let recurse = vertex_fields.iter().map(|f| {
            let field_member = f
                .ident
                .clone()
                .map(|i| i.into_token_stream())
                .unwrap_or_else(|| Index::from(f.position).into_token_stream());
            let name = &f.name;
            let span = f.span;

            let layout = match &f.attribute {
                Some(attribute) => {
                    let location = attribute.location;
                    let size = attribute.size;
                    let attrib_type = Ident::new(&attribute.attrib_type, span);
                    let normalized = attribute.normalized;

                    quote_spanned! {span=>
                        ::std::option::Option::Some(#mod_path::AttributeLayout {
                            location: #location,
                            size: #size,
                            attrib_type: #mod_path::VertexAttribType::#attrib_type,
                            normalized: #normalized,
                        })
                    }
                }
                None => quote!(::std::option::Option::None),
            };

            let divisor = match f.divisor {
                Some(divisor) => quote!(::std::option::Option::Some(#divisor)),
                None => quote!(::std::option::Option::None),
            };

            quote! {
                #mod_path::VertexField {
                    name: #name,
                    offset_in_bytes: _glbind::__private::memoffset::offset_of!(Self, #field_member),
                    layout: #layout,
                    divisor: #divisor,
                }
            }
        });

        let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

        let impl_block = quote! {
            #[automatically_derived]
            unsafe impl #impl_generics #mod_path::Vertex for #struct_name #ty_generics #where_clause {
                fn fields() -> ::std::vec::Vec<#mod_path::VertexField> {
                    ::std::vec![
                        #(#recurse),*
                    ]
                }
            }
        };

        let suffix = struct_name.unraw().to_string();
        let dummy_const = Ident::new(&format!("_IMPL_VERTEX_FOR_{}", suffix), Span::call_site());

        let generated = quote! {
            #[allow(non_upper_case_globals, unused_attributes, unused_qualifications)]
            const #dummy_const: () = {
                #[allow(unknown_lints)]
                #[allow(rust_2018_idioms)]
                extern crate glbind as _glbind;

                #impl_block
            };
        };

        log.compile().map(|_| generated)
    } else {
        Err(syn::Error::new_spanned(
            &input.ident,
            "`Vertex` can only be derived for a struct.",
        ))
    }
}

struct VertexField {
    ident: Option<Ident>,
    name: String,
    position: usize,
    attribute: Option<AttributeField>,
    divisor: Option<u32>,
    span: Span,
}

struct AttributeField {
    location: u32,
    size: u32,
    attrib_type: String,
    normalized: bool,
}

impl VertexField {
    fn from_ast(ast: &Field, position: usize, log: &mut ErrorLog) -> Self {
        let name = ast
            .ident
            .as_ref()
            .map(|i| i.unraw().to_string())
            .unwrap_or_else(|| position.to_string());

        let attribute_attrs: Vec<&Attribute> = ast
            .attrs
            .iter()
            .filter(|a| a.path.is_ident("vertex_attribute"))
            .collect();
        let divisor_attrs: Vec<&Attribute> = ast
            .attrs
            .iter()
            .filter(|a| a.path.is_ident("vertex_divisor"))
            .collect();

        let attribute = match attribute_attrs.as_slice() {
            [] => None,
            [attr] => parse_attribute(attr, &name, log),
            [_, repeated, ..] => {
                log.log_error(
                    repeated.span(),
                    format!(
                        "#[vertex_attribute] must not be defined more than once for field `{}`.",
                        name
                    ),
                );

                None
            }
        };

        let divisor = match divisor_attrs.as_slice() {
            [] => None,
            [attr] => parse_divisor(attr, &name, log),
            [_, repeated, ..] => {
                log.log_error(
                    repeated.span(),
                    format!(
                        "#[vertex_divisor] must not be defined more than once for field `{}`.",
                        name
                    ),
                );

                None
            }
        };

        if let (Some(_), Some(attr)) = (divisor, divisor_attrs.first()) {
            if attribute_attrs.is_empty() {
                log.log_error(
                    attr.span(),
                    format!(
                        "Field `{}` declares a #[vertex_divisor], but is not marked as a \
                         #[vertex_attribute].",
                        name
                    ),
                );
            }
        }

        VertexField {
            ident: ast.ident.clone(),
            name,
            position,
            attribute,
            divisor,
            span: ast.span(),
        }
    }
}

/// The variants of `glbind::vertex::VertexAttribType`.
const ATTRIB_TYPES: [&str; 15] = [
    "Byte",
    "UnsignedByte",
    "Short",
    "UnsignedShort",
    "Int",
    "UnsignedInt",
    "Float",
    "Double",
    "HalfFloat",
    "Fixed",
    "Int64Arb",
    "UnsignedInt64Arb",
    "UnsignedInt2101010Rev",
    "UnsignedInt10f11f11fRev",
    "Int2101010Rev",
];

fn parse_attribute(
    attr: &Attribute,
    field_name: &str,
    log: &mut ErrorLog,
) -> Option<AttributeField> {
    let meta_items: Vec<NestedMeta> = match attr.parse_meta() {
        Ok(Meta::List(ref meta)) => meta.nested.iter().cloned().collect(),
        Ok(Meta::Path(_)) => Vec::new(),
        _ => {
            log.log_error(
                attr.span(),
                format!(
                    "Malformed #[vertex_attribute] attribute for field `{}`.",
                    field_name
                ),
            );

            return None;
        }
    };

    let malformed = |option: &str, expected: &str| {
        format!(
            "Malformed #[vertex_attribute] attribute for field `{}`: expected `{}` to be {}.",
            field_name, option, expected
        )
    };

    let mut location = None;
    let mut size = None;
    let mut attrib_type = None;
    let mut normalized = false;

    for meta_item in meta_items.into_iter() {
        match meta_item {
            NestedMeta::Meta(Meta::NameValue(ref m)) if m.path.is_ident("location") => {
                match parse_u32(&m.lit) {
                    Some(value) => location = Some(value),
                    None => log.log_error(m.lit.span(), malformed("location", "a u32 integer")),
                }
            }
            NestedMeta::Meta(Meta::NameValue(ref m)) if m.path.is_ident("size") => {
                match parse_u32(&m.lit) {
                    Some(0) => log.log_error(
                        m.lit.span(),
                        format!(
                            "Malformed #[vertex_attribute] attribute for field `{}`: `size` \
                             must not be `0`.",
                            field_name
                        ),
                    ),
                    Some(value) => size = Some(value),
                    None => log.log_error(m.lit.span(), malformed("size", "a u32 integer")),
                }
            }
            NestedMeta::Meta(Meta::NameValue(ref m)) if m.path.is_ident("attrib_type") => {
                match &m.lit {
                    Lit::Str(s) if ATTRIB_TYPES.contains(&s.value().as_str()) => {
                        attrib_type = Some(s.value())
                    }
                    Lit::Str(s) => log.log_error(
                        s.span(),
                        format!(
                            "Malformed #[vertex_attribute] attribute for field `{}`: `{}` is \
                             not a `VertexAttribType` variant; expected one of {}.",
                            field_name,
                            s.value(),
                            ATTRIB_TYPES.join(", ")
                        ),
                    ),
                    lit => log.log_error(
                        lit.span(),
                        malformed("attrib_type", "a string naming a `VertexAttribType` variant"),
                    ),
                }
            }
            NestedMeta::Meta(Meta::Path(ref p)) if p.is_ident("normalized") => normalized = true,
            NestedMeta::Meta(Meta::NameValue(ref m)) if m.path.is_ident("normalized") => {
                match m.lit {
                    Lit::Bool(ref b) => normalized = b.value,
                    ref lit => log.log_error(lit.span(), malformed("normalized", "a boolean")),
                }
            }
            other => log.log_error(
                other.span(),
                format!(
                    "Malformed #[vertex_attribute] attribute for field `{}`: unrecognized \
                     option `{}`.",
                    field_name,
                    other.to_token_stream()
                ),
            ),
        }
    }

    let missing = [
        (location.is_none(), "a binding location"),
        (size.is_none(), "a size"),
        (attrib_type.is_none(), "an attribute type"),
    ];

    for (_, what) in missing.iter().filter(|(is_missing, _)| *is_missing) {
        log.log_error(
            attr.span(),
            format!(
                "Field `{}` is marked a vertex attribute, but does not declare {}.",
                field_name, what
            ),
        );
    }

    match (location, size, attrib_type) {
        (Some(location), Some(size), Some(attrib_type)) => Some(AttributeField {
            location,
            size,
            attrib_type,
            normalized,
        }),
        _ => None,
    }
}

fn parse_divisor(attr: &Attribute, field_name: &str, log: &mut ErrorLog) -> Option<u32> {
    let lit = match attr.parse_meta() {
        Ok(Meta::List(ref meta)) if meta.nested.len() == 1 => match meta.nested.first() {
            Some(NestedMeta::Lit(lit)) => Some(lit.clone()),
            _ => None,
        },
        Ok(Meta::NameValue(ref meta)) => Some(meta.lit.clone()),
        _ => None,
    };

    let divisor = lit.as_ref().and_then(parse_u32);

    if divisor.is_none() {
        log.log_error(
            attr.span(),
            format!(
                "Malformed #[vertex_divisor] attribute for field `{}`: expected a single \
                 non-negative integer, e.g. `#[vertex_divisor(1)]`.",
                field_name
            ),
        );
    }

    divisor
}

fn parse_u32(lit: &Lit) -> Option<u32> {
    if let Lit::Int(ref i) = lit {
        i.base10_parse().ok()
    } else {
        None
    }
}
