//! Derive macro implementation for envcfg

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Fields};

mod attrs;

use attrs::{FieldAttrs, StructAttrs};

/// `EnvCfg` derive macro
///
/// Implements `envcfg::Record` so the struct can be populated by a registry.
/// Only fields carrying an `#[env]` attribute are populated; the rest keep
/// their current value.
///
/// # Supported Attributes
///
/// **Struct-level**:
/// - `#[env(prefix = "PREFIX_")]`: Add prefix to every key
///
/// **Field-level**:
/// - `#[env]`: Read the upper-cased field name
/// - `#[env(name = "KEY")]`: Read `KEY`
/// - `#[env(name = "KEY1,KEY2")]`: Pass both values to a two-argument converter
/// - `#[env(default = "value")]`: Use `value` if the key is unset, one per key
///
/// # Example
///
/// See the `envcfg` crate documentation for usage examples.
#[proc_macro_derive(EnvCfg, attributes(env))]
pub fn derive_envcfg(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let record_name = struct_name.to_string();

    let struct_attrs = StructAttrs::from_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    struct_name,
                    "EnvCfg only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "EnvCfg only supports structs",
            ));
        }
    };

    let mut field_calls = Vec::new();
    let mut tagged_types = Vec::new();
    for field in fields {
        let Some(attrs) = FieldAttrs::from_field(field, &struct_attrs.prefix)? else {
            continue;
        };

        let field_ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "EnvCfg only supports named fields"))?;
        tagged_types.push(&field.ty);
        let field_name = field_ident.to_string();
        let keys = attrs.keys;
        let defaults = match attrs.default {
            Some(default) => quote! { ::core::option::Option::Some(#default) },
            None => quote! { ::core::option::Option::None },
        };

        field_calls.push(quote! {
            fields.field(
                ::envcfg::FieldSpec {
                    name: #field_name,
                    keys: #keys,
                    defaults: #defaults,
                },
                &mut self.#field_ident,
            )?;
        });
    }

    // Converters are looked up by TypeId, so every populated type must be 'static
    let mut generics = input.generics.clone();
    if !generics.params.is_empty() {
        let where_clause = generics.make_where_clause();
        for ty in tagged_types {
            where_clause.predicates.push(parse_quote!(#ty: 'static));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::envcfg::Record for #struct_name #ty_generics #where_clause {
            const NAME: &'static str = #record_name;

            #[allow(unused_variables)]
            fn populate_fields(
                &mut self,
                fields: &mut ::envcfg::Fields<'_>,
            ) -> ::core::result::Result<(), ::envcfg::Error> {
                #(#field_calls)*
                ::core::result::Result::Ok(())
            }
        }
    })
}
