use darling::{FromDeriveInput, FromField, FromVariant};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DataEnum, DataStruct, DeriveInput, Fields};

use crate::common::*;
use crate::DeriveResult;

pub fn derive(input: DeriveInput) -> DeriveResult<TokenStream> {
    let options = BsondocOptions::from_derive_input(&input).map_err(|err| err.write_errors())?;
    let body = match &input.data {
        Data::Struct(DataStruct { fields, .. }) => derive_struct(&input, fields)?,
        Data::Enum(enumeration) => derive_enum(&input, enumeration)?,
        Data::Union(_) => return Err(unsupported(&input.ident, "unions aren't supported")),
    };

    let ident = &input.ident;
    let preamble = preamble(&options.crate_path_or_default());
    let where_clause = where_clause_with_bound(&input.generics, quote!(__crate::Deserialize));
    let (impl_generics, ty_generics, _) = input.generics.split_for_impl();

    Ok(quote! {
        #[doc(hidden)]
        #[allow(non_upper_case_globals, unused_attributes, unused_qualifications)]
        const _: () = {
            #preamble

            impl #impl_generics __crate::Deserialize for #ident #ty_generics #where_clause {
                fn deserialize<__D: __crate::de::Deserializer>(__d: __D) -> __crate::Result<Self> {
                    #body
                }
            }
        };
    })
}

fn derive_struct(input: &DeriveInput, fields: &Fields) -> DeriveResult<TokenStream> {
    let ident = &input.ident;

    match fields {
        Fields::Named(named) => {
            let mut field = vec![];
            let mut field_value = vec![];
            let mut skipped = vec![];
            let mut skipped_default = vec![];

            for f in &named.named {
                let opt = BsondocFieldOptions::from_field(f).map_err(|err| err.write_errors())?;

                if opt.skip {
                    skipped.push(f.ident.clone());
                    skipped_default.push(opt.default_behavior_forced());
                    continue;
                }

                let name = opt.name(0);
                // Fields with a default fall back to it, the rest fail when absent
                field_value.push(match opt.default_behavior() {
                    Some(default) => quote! {
                        __crate::de::MapAccess::field_opt(&mut __m, #name)?.unwrap_or_else(#default)
                    },
                    None => quote! {
                        __crate::de::MapAccess::field(&mut __m, #name)?
                    },
                });
                field.push(f.ident.clone());
            }

            Ok(quote! {
                #[allow(unused_mut)]
                let mut __m = __crate::de::Deserializer::deserialize_map(__d)?;
                __crate::export::Ok(#ident {
                    #(#field: #field_value,)*
                    #(#skipped: #skipped_default(),)*
                })
            })
        }
        Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => Ok(quote! {
            __crate::export::Ok(#ident(__crate::Deserialize::deserialize(__d)?))
        }),
        Fields::Unnamed(unnamed) => {
            let index = (0..unnamed.unnamed.len()).map(make_literal_int);
            Ok(quote! {
                let mut __s = __crate::de::Deserializer::deserialize_seq(__d)?;
                __crate::export::Ok(#ident(
                    #(
                        __crate::de::SeqAccess::next_element(&mut __s)?
                            .ok_or_else(|| __crate::Error::missing_element(#index))?,
                    )*
                ))
            })
        }
        Fields::Unit => Ok(quote! {
            __crate::de::Deserializer::deserialize_primitive_as(__d, "null", |__p| {
                if __p.is_null() {
                    __crate::export::Some(#ident)
                } else {
                    __crate::export::None
                }
            })
        }),
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

    Ok(quote! {
        let __name: __crate::export::String = __crate::de::Deserializer::deserialize_string(__d)?;
        match __name.as_str() {
            #( #variant_name => __crate::export::Ok(#ident::#variant), )*
            __variant => __crate::export::Err(__crate::Error::unknown_variant(__variant)),
        }
    })
}
