//! Common stuff shared across all the derive implementation

use darling::util::Override;
use darling::{FromDeriveInput, FromField, FromVariant};
use proc_macro2::{Span, TokenStream};
use quote::quote;

fn default_path() -> syn::Path {
    syn::parse_quote!(__crate::export::Default::default)
}

pub fn make_literal_int(i: usize) -> syn::LitInt {
    syn::LitInt::new(&i.to_string(), Span::call_site())
}

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(bsondoc))]
pub struct BsondocOptions {
    pub ident: syn::Ident,
    /// Specify a path to the bsondoc crate instance to use when referring to
    /// bsondoc APIs from generated code. This is normally only applicable when
    /// invoking re-exported bsondoc derives from a public macro in a different
    /// crate.
    #[darling(default, rename = "crate")]
    pub crate_path: Option<syn::Path>,
}

impl BsondocOptions {
    pub fn crate_path_or_default(&self) -> syn::Path {
        self.crate_path
            .clone()
            .unwrap_or_else(|| syn::parse_quote!(bsondoc))
    }
}

#[derive(Default, FromField)]
#[darling(default, attributes(bsondoc))]
pub struct BsondocFieldOptions {
    pub ident: Option<syn::Ident>,
    /// Key used in the document instead of the field name
    pub rename: Option<String>,
    /// Skips field (de)serialization. The field must implement `Default::default()`
    /// or specify any default function with `#[bsondoc(default = "path::to::default_function")`
    pub skip: bool,
    /// Use the default implementation when this field is missing.
    ///
    /// It's also possible to specify a function to create the default value like so:
    /// `#[bsondoc(default = "path::to::default_function")`
    pub default: Option<Override<syn::Path>>,
}

impl BsondocFieldOptions {
    /// Key of the field, `index` is used for tuple fields
    pub fn name(&self, index: usize) -> String {
        match (&self.rename, &self.ident) {
            (Some(rename), _) => rename.clone(),
            (None, Some(ident)) => ident.to_string(),
            (None, None) => index.to_string(),
        }
    }

    /// Returns the default behavior
    pub fn default_behavior(&self) -> Option<syn::Path> {
        use Override::*;
        match &self.default {
            Some(Explicit(path)) => Some(path.clone()),
            Some(Inherit) => Some(default_path()),
            None => None,
        }
    }

    /// Returns the default behavior forced on, used when the field is skipped
    pub fn default_behavior_forced(&self) -> syn::Path {
        self.default_behavior().unwrap_or_else(default_path)
    }
}

#[derive(FromVariant)]
#[darling(attributes(bsondoc))]
pub struct BsondocVariantOptions {
    pub ident: syn::Ident,
    /// Rename variant ident
    #[darling(default)]
    pub rename: Option<String>,
}

impl BsondocVariantOptions {
    pub fn name(&self) -> String {
        match &self.rename {
            Some(name) => name.clone(),
            None => self.ident.to_string(),
        }
    }
}

/// Copies the where clause of `generics` and requires `bound` on every type
/// parameter.
pub fn where_clause_with_bound(generics: &syn::Generics, bound: TokenStream) -> syn::WhereClause {
    let new_predicates = generics.type_params().map::<syn::WherePredicate, _>(|param| {
        let param = &param.ident;
        syn::parse_quote!(#param: #bound)
    });

    let mut generics = generics.clone();
    let where_clause = generics.make_where_clause();
    where_clause.predicates.extend(new_predicates);
    where_clause.clone()
}

/// Error for a shape the derives cannot handle.
pub fn unsupported<T: quote::ToTokens>(tokens: T, message: &str) -> TokenStream {
    syn::Error::new_spanned(tokens, message).to_compile_error()
}

/// Tokens that open the hidden block every derive expands into.
pub fn preamble(crate_path: &syn::Path) -> TokenStream {
    quote! {
        #[allow(unused_imports)]
        use #crate_path as __crate;
    }
}
