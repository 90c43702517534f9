#![recursion_limit = "128"]

extern crate proc_macro;

mod common;
mod de;
mod ser;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// The error side holds `compile_error!` tokens, already rendered from the
/// darling or syn error, so both sides expand the same way.
type DeriveResult<T> = std::result::Result<T, proc_macro2::TokenStream>;

fn expand(result: DeriveResult<proc_macro2::TokenStream>) -> TokenStream {
    match result {
        Ok(tokens) | Err(tokens) => tokens.into(),
    }
}

#[proc_macro_derive(Serialize, attributes(bsondoc))]
pub fn derive_serialize(input: TokenStream) -> TokenStream {
    expand(ser::derive(parse_macro_input!(input as DeriveInput)))
}

#[proc_macro_derive(Deserialize, attributes(bsondoc))]
pub fn derive_deserialize(input: TokenStream) -> TokenStream {
    expand(de::derive(parse_macro_input!(input as DeriveInput)))
}
