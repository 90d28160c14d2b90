use matches2::option_match;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::{Error, Result};

use crate::util::{Attr, Named};

const SUFFIX: &str = "Component";

pub(crate) fn imp(args: TokenStream, input: TokenStream) -> Result<TokenStream> {
    let args: Attr<FnOpt> = syn::parse2(args)?;

    let crate_name = args
        .find_one(|opt| option_match!(opt, FnOpt::ArchonAs(_, ts) => ts))?
        .map_or_else(|| quote!(::archon), |(_, ts)| ts.clone());

    let input: syn::DeriveInput = syn::parse2(input)?;
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "components cannot have generic parameters because all instantiations would share \
             the same component type",
        ));
    }

    let name = match args.find_one(|opt| option_match!(opt, FnOpt::Name(_, lit) => lit))? {
        Some((_, lit)) => {
            let name = lit.value();
            if name.is_empty() {
                return Err(Error::new_spanned(lit, "component name must not be empty"));
            }
            name
        }
        None => {
            let name = derive_name(&input.ident.unraw().to_string());
            if name.is_empty() {
                return Err(Error::new_spanned(
                    &input.ident,
                    "cannot derive a component name from this type name, specify one with \
                     `name = \"...\"`",
                ));
            }
            name
        }
    };

    let attach = args.find_one(|opt| option_match!(opt, FnOpt::Attach(_, path) => path))?.map(
        |(_, path)| {
            quote! {
                fn on_attach(&mut self, entity: #crate_name::entity::EntityId) {
                    #path(self, entity)
                }
            }
        },
    );
    let detach = args.find_one(|opt| option_match!(opt, FnOpt::Detach(_, path) => path))?.map(
        |(_, path)| {
            quote! {
                fn on_detach(&mut self, entity: #crate_name::entity::EntityId) {
                    #path(self, entity)
                }
            }
        },
    );

    let patch = match args.find_one(|opt| matches!(opt, FnOpt::Patch).then_some(&()))? {
        Some(_) => Some(patch_impl(&crate_name, &input)?),
        None => None,
    };

    let ident = &input.ident;

    Ok(quote! {
        #input

        #patch

        impl #crate_name::comp::Component for #ident {
            const TYPE: #crate_name::comp::ComponentType =
                #crate_name::comp::ComponentType::new(#name);

            #attach
            #detach
        }
    })
}

/// Strips the `Component` suffix and lowercases the first letter,
/// e.g. `BorderRadiusComponent` becomes `borderRadius`.
fn derive_name(ident: &str) -> String {
    let stem = ident.strip_suffix(SUFFIX).unwrap_or(ident);
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Implements `Patch` so that an object patch only writes the fields it names.
///
/// Field keys follow `#[serde(rename = "...")]`.
/// Fields with `#[serde(skip)]` or `#[serde(skip_deserializing)]` cannot be patched.
/// Types without named fields use the default implementation, which replaces the whole value.
fn patch_impl(crate_name: &TokenStream, input: &syn::DeriveInput) -> Result<TokenStream> {
    let ident = &input.ident;

    let fields = match &input.data {
        syn::Data::Struct(syn::DataStruct { fields: syn::Fields::Named(fields), .. }) => {
            &fields.named
        }
        _ => return Ok(quote!(impl #crate_name::comp::Patch for #ident {})),
    };

    let mut keys = Vec::new();
    let mut idents = Vec::new();
    let mut tys = Vec::new();
    for field in fields {
        let serde = SerdeField::parse(&field.attrs)?;
        if serde.skip {
            continue;
        }

        let field_ident = field.ident.as_ref().expect("named fields have identifiers");
        keys.push(serde.rename.unwrap_or_else(|| field_ident.unraw().to_string()));
        idents.push(field_ident);
        tys.push(&field.ty);
    }
    let locals: Vec<_> =
        idents.iter().map(|ident| format_ident!("__patch_{}", ident.unraw())).collect();

    Ok(quote! {
        impl #crate_name::comp::Patch for #ident {
            #[allow(unused_mut, unused_variables)]
            fn patch(&mut self, fields: #crate_name::comp::patch::Fields) -> #crate_name::comp::patch::Result {
                #(
                    let mut #locals: ::std::option::Option<#tys> = ::std::option::Option::None;
                )*

                for (key, value) in fields {
                    match key.as_str() {
                        #(
                            #keys => #locals = ::std::option::Option::Some(#crate_name::comp::patch::field(value)?),
                        )*
                        _ => return ::std::result::Result::Err(
                            #crate_name::comp::patch::unknown_field(&key, &[#(#keys),*]),
                        ),
                    }
                }

                #(
                    if let ::std::option::Option::Some(value) = #locals {
                        self.#idents = value;
                    }
                )*
                ::std::result::Result::Ok(())
            }
        }
    })
}

/// The `#[serde(...)]` options of a field that affect patching.
#[derive(Default)]
struct SerdeField {
    skip:   bool,
    rename: Option<String>,
}

impl SerdeField {
    fn parse(attrs: &[syn::Attribute]) -> Result<Self> {
        let mut ret = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") || meta.path.is_ident("skip_deserializing") {
                    ret.skip = true;
                } else if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                    ret.rename = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                    return Ok(());
                }

                // other options are irrelevant, but their arguments must be consumed
                if meta.input.peek(syn::Token![=]) {
                    meta.value()?.parse::<syn::Expr>()?;
                } else if meta.input.peek(syn::token::Paren) {
                    let _args;
                    let _ = syn::parenthesized!(_args in meta.input);
                }
                Ok(())
            })?;
        }

        Ok(ret)
    }
}

enum FnOpt {
    ArchonAs(syn::token::Paren, TokenStream),
    Patch,
    Name(syn::Token![=], syn::LitStr),
    Attach(syn::Token![=], syn::Path),
    Detach(syn::Token![=], syn::Path),
}

impl Parse for Named<FnOpt> {
    fn parse(input: ParseStream) -> Result<Self> {
        let name = input.parse::<syn::Ident>()?;

        let value = match name.to_string().as_str() {
            "archon_as" => {
                let inner;
                let paren = syn::parenthesized!(inner in input);
                let args = inner.parse()?;
                FnOpt::ArchonAs(paren, args)
            }
            "patch" => FnOpt::Patch,
            "name" => {
                let eq: syn::Token![=] = input.parse()?;
                let lit = input.parse::<syn::LitStr>()?;
                FnOpt::Name(eq, lit)
            }
            "attach" => {
                let eq: syn::Token![=] = input.parse()?;
                let path = input.parse::<syn::Path>()?;
                FnOpt::Attach(eq, path)
            }
            "detach" => {
                let eq: syn::Token![=] = input.parse()?;
                let path = input.parse::<syn::Path>()?;
                FnOpt::Detach(eq, path)
            }
            _ => return Err(Error::new_spanned(&name, format!("Unknown argument `{}`", name))),
        };

        Ok(Named { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::{derive_name, SerdeField};

    #[test]
    fn test_strip_suffix_and_lowercase() {
        assert_eq!(derive_name("PositionComponent"), "position");
        assert_eq!(derive_name("BorderRadiusComponent"), "borderRadius");
    }

    #[test]
    fn test_no_suffix() {
        assert_eq!(derive_name("Card"), "card");
        assert_eq!(derive_name("BoxShadow"), "boxShadow");
    }

    #[test]
    fn test_suffix_only_at_end() {
        assert_eq!(derive_name("ComponentList"), "componentList");
    }

    #[test]
    fn test_bare_suffix_is_empty() {
        assert_eq!(derive_name("Component"), "");
    }

    #[test]
    fn test_serde_field_options() {
        let input: syn::DeriveInput = syn::parse_quote! {
            struct Cached {
                #[serde(default, rename = "tag")]
                label: String,
                #[serde(skip)]
                cache: Vec<u32>,
                #[serde(with = "codec", skip_deserializing)]
                derived: u32,
                #[serde(rename(serialize = "out"))]
                plain: u32,
            }
        };
        let syn::Data::Struct(data) = &input.data else { unreachable!() };
        let parsed: Vec<_> = data
            .fields
            .iter()
            .map(|field| {
                let serde = SerdeField::parse(&field.attrs).expect("valid serde options");
                (serde.skip, serde.rename)
            })
            .collect();

        assert_eq!(
            parsed,
            [(false, Some("tag".to_string())), (true, None), (true, None), (false, None)]
        );
    }
}
