use darling::{FromDeriveInput, FromField, FromVariant};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DataEnum, DataStruct, DeriveInput, Fields};

use crate::common::*;
use crate::DeriveResult;

pub fn derive(input: DeriveInput) -> DeriveResult<TokenStream> {
    let options = BsondocOptions::from_derive_input(&input).map_err(|err| err.write_errors())?;
    let body = match &input.data {
        Data::Struct(DataStruct { fields, .. }) => derive_struct(fields)?,
        Data::Enum(enumeration) => derive_enum(&input, enumeration)?,
        Data::Union(_) => return Err(unsupported(&input.ident, "unions aren't supported")),
    };

    let ident = &input.ident;
    let preamble = preamble(&options.crate_path_or_default());
    let where_clause = where_clause_with_bound(&input.generics, quote!(__crate::ser::Serialize));
    let (impl_generics, ty_generics, _) = input.generics.split_for_impl();

    Ok(quote! {
        #[doc(hidden)]
        #[allow(non_upper_case_globals, unused_attributes, unused_qualifications)]
        const _: () = {
            #preamble

            impl #impl_generics __crate::ser::Serialize for #ident #ty_generics #where_clause {
                fn begin(&self, __v: __crate::ser::Visitor) -> __crate::Result<__crate::ser::Done> {
                    #body
                }
            }
        };
    })
}

fn derive_struct(fields: &Fields) -> DeriveResult<TokenStream> {
    match fields {
        Fields::Named(named) => {
            let mut field = vec![];
            let mut field_name = vec![];

            for f in &named.named {
                let opt = BsondocFieldOptions::from_field(f).map_err(|err| err.write_errors())?;
                if opt.skip {
                    continue;
                }
                field_name.push(opt.name(0));
                field.push(f.ident.clone());
            }

            Ok(quote! {
                __v.map()?
                    #(.field(#field_name, &self.#field)?)*
                    .done()
            })
        }
        // Newtypes are written as what they wrap.
        Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => Ok(quote! {
            __crate::ser::Serialize::begin(&self.0, __v)
        }),
        Fields::Unnamed(unnamed) => {
            let index = (0..unnamed.unnamed.len()).map(make_literal_int);
            Ok(quote! {
                __v.seq()?
                    #(.element(&self.#index)?)*
                    .done()
            })
        }
        Fields::Unit => Ok(quote! { __v.null() }),
    }
}

fn derive_enum(input: &DeriveInput, enumeration: &DataEnum) -> DeriveResult<TokenStream> {
    let ident = &input.ident;
    let mut variant = vec![];
    let mut variant_name = vec![];

    for v in &enumeration.variants {
        if !matches!(v.fields, Fields::Unit) {
            return Err(unsupported(
                v,
                "only simple enum variants without fields are supported",
            ));
        }
        let opt = BsondocVariantOptions::from_variant(v).map_err(|err| err.write_errors())?;
        variant_name.push(opt.name());
        variant.push(opt.ident);
    }

    if variant.is_empty() {
        return Ok(quote! { match *self {} });
    }

    Ok(quote! {
        match self {
            #(
                #ident::#variant => __v.string(#variant_name),
            )*
        }
    })
}
