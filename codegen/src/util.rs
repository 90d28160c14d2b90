use proc_macro2::Span;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Error, Result};

/// A comma-separated list of `name` / `name = value` / `name(...)` options.
pub(crate) struct Attr<T> {
    pub(crate) items: Vec<Named<T>>,
}

impl<T> Default for Attr<T> {
    fn default() -> Self { Self { items: Vec::new() } }
}

impl<T> Parse for Attr<T>
where
    Named<T>: Parse,
{
    fn parse(input: ParseStream) -> Result<Self> {
        let items = Punctuated::<Named<T>, syn::Token![,]>::parse_terminated(input)?;
        Ok(Self { items: items.into_iter().collect() })
    }
}

impl<T> Attr<T> {
    /// Finds the only option accepted by `matcher`.
    ///
    /// Returns an error spanning the second occurrence if the option is repeated.
    pub(crate) fn find_one<'t, U: ?Sized>(
        &'t self,
        matcher: impl Fn(&'t T) -> Option<&'t U>,
    ) -> Result<Option<(Span, &'t U)>> {
        let mut found = None;

        for item in &self.items {
            if let Some(value) = matcher(&item.value) {
                if found.is_some() {
                    return Err(Error::new_spanned(
                        &item.name,
                        format!("Argument `{}` cannot be specified multiple times", item.name),
                    ));
                }
                found = Some((item.name.span(), value));
            }
        }

        Ok(found)
    }
}

pub(crate) struct Named<T> {
    pub(crate) name:  syn::Ident,
    pub(crate) value: T,
}
