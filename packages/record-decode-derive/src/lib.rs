//! `#[derive(Record)]`: generates the static field descriptor table plus
//! the `Decode` and `ToValue` impls for a named struct, so user types go
//! through the engine's single resolution path.
//!
//! Field attributes:
//!
//! ```ignore
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     #[record(tag(column = "login_name"))]
//!     login_name: String,
//!     #[record(tag(column = "age,omitempty"))]
//!     age: Option<i32>,
//!     #[record(flatten)]
//!     audit: Audit,
//!     #[record(remain)]
//!     extra: BTreeMap<String, Value>,
//! }
//! ```
//!
//! The deriving struct must implement `Default`; unmatched and failed
//! fields keep their default values.

use std::collections::HashMap;

use darling::{ast::Data, FromDeriveInput, FromField};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

#[derive(FromDeriveInput)]
#[darling(attributes(record), supports(struct_named))]
struct RecordInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<(), RecordField>,
}

#[derive(FromField)]
#[darling(attributes(record))]
struct RecordField {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    /// `tag(column = "name,option")`, any number of tag keys.
    #[darling(default)]
    tag: Option<HashMap<String, String>>,
    #[darling(default)]
    flatten: bool,
    #[darling(default)]
    remain: bool,
}

#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let parsed = match RecordInput::from_derive_input(&input) {
        Ok(parsed) => parsed,
        Err(err) => return err.write_errors().into(),
    };
    expand(parsed).into()
}

fn expand(input: RecordInput) -> proc_macro2::TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match input.data.as_ref().take_struct() {
        Some(fields) => fields.fields,
        None => {
            return darling::Error::unsupported_shape("only named structs are supported")
                .write_errors()
        }
    };

    let specs = fields.iter().map(|field| {
        let field_name = field
            .ident
            .as_ref()
            .expect("named struct field")
            .to_string();
        // Deterministic descriptor order regardless of map iteration.
        let mut tags: Vec<(&String, &String)> = field
            .tag
            .iter()
            .flat_map(|map| map.iter())
            .collect();
        tags.sort();
        let tag_keys = tags.iter().map(|(key, _)| key.as_str());
        let tag_values = tags.iter().map(|(_, value)| value.as_str());

        let flatten = field.flatten;
        let remain = field.remain;
        let sub_fields = if field.flatten {
            let ty = &field.ty;
            quote!(::core::option::Option::Some(
                <#ty as ::record_decode::RecordTarget>::fields
            ))
        } else {
            quote!(::core::option::Option::None)
        };

        quote! {
            ::record_decode::FieldSpec {
                name: #field_name,
                tags: &[#((#tag_keys, #tag_values)),*],
                flatten: #flatten,
                remain: #remain,
                sub_fields: #sub_fields,
            }
        }
    });

    let decode_arms = fields.iter().enumerate().map(|(idx, field)| {
        let ident = field.ident.as_ref().expect("named struct field");
        let ty = &field.ty;
        quote! {
            #idx => {
                if let ::core::option::Option::Some(v) =
                    config.decode_at::<#ty>(field_path, field_value, errors)
                {
                    out.#ident = v;
                }
            }
        }
    });

    let project_stmts = fields.iter().enumerate().map(|(idx, field)| {
        let ident = field.ident.as_ref().expect("named struct field");
        quote! {
            config.project_field(
                &fields[#idx],
                ::record_decode::ToValue::to_value(&self.#ident, config),
                &mut out,
            );
        }
    });

    quote! {
        impl #impl_generics ::record_decode::RecordTarget for #name #ty_generics #where_clause {
            fn fields() -> &'static [::record_decode::FieldSpec] {
                static FIELDS: &[::record_decode::FieldSpec] = &[#(#specs),*];
                FIELDS
            }
        }

        impl #impl_generics ::record_decode::Decode for #name #ty_generics #where_clause {
            const KIND: ::record_decode::Kind = ::record_decode::Kind::Struct;

            fn decode_value(
                config: &::record_decode::Config,
                path: &str,
                value: &::record_decode::Value,
                errors: &mut ::record_decode::ErrorBag,
            ) -> ::core::option::Option<Self> {
                let mut out = <Self as ::core::default::Default>::default();
                config.decode_struct(
                    path,
                    value,
                    errors,
                    <Self as ::record_decode::RecordTarget>::fields(),
                    &mut |config, idx, field_path, field_value, errors| match idx {
                        #(#decode_arms)*
                        _ => {}
                    },
                )?;
                ::core::option::Option::Some(out)
            }
        }

        impl #impl_generics ::record_decode::ToValue for #name #ty_generics #where_clause {
            fn to_value(&self, config: &::record_decode::Config) -> ::record_decode::Value {
                let fields = <Self as ::record_decode::RecordTarget>::fields();
                let mut out = ::record_decode::Record::new();
                #(#project_stmts)*
                ::record_decode::Value::Record(out)
            }
        }
    }
}
