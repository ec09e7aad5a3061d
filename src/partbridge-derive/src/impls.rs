use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{
    Data, DeriveInput, Error as SynError, Field, Fields, GenericArgument, LitStr, PathArguments,
    Result as SynResult, Type,
};

use crate::attrs::{self, FieldImport};

pub fn expand_part(input: DeriveInput) -> SynResult<TokenStream2> {
    let part_attrs = attrs::parse_part_attributes(&input.attrs)?;

    let Data::Struct(data) = &input.data else {
        return Err(SynError::new(
            input.ident.span(),
            "`#[derive(Part)]` supports structs only",
        ));
    };
    let fields: Vec<&Field> = match &data.fields {
        Fields::Named(named) => named.named.iter().collect(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(unnamed) => {
            return Err(SynError::new(
                unnamed.span(),
                "`#[derive(Part)]` requires named fields",
            ));
        }
    };

    let mut import_statements = Vec::new();
    let mut assign_arms = Vec::new();
    let mut flatten_routes = Vec::new();

    for field in fields {
        let ident = field.ident.as_ref().unwrap();
        match attrs::parse_field_attributes(field)? {
            FieldImport::Plain => {}
            FieldImport::Import { name, recompose } => {
                let inner = option_inner(&field.ty).ok_or_else(|| {
                    SynError::new(field.ty.span(), "an `#[import]` field must be an `Option<T>`")
                })?;
                let member = LitStr::new(&ident.to_string(), ident.span());

                let contract = match &name {
                    Some(name) => quote! { ::partbridge::contract::named::<#inner>(#name) },
                    None => quote! { ::partbridge::contract::of::<#inner>() },
                };
                let constructor = if recompose {
                    quote! { ::partbridge::part::ImportPoint::recomposable }
                } else {
                    quote! { ::partbridge::part::ImportPoint::new }
                };
                import_statements.push(quote! {
                    imports.push(#constructor(#member, #contract));
                });

                assign_arms.push(quote! {
                    #member => match ::partbridge::part::Downcast::downcast::<#inner>(value) {
                        ::std::result::Result::Ok(value) => {
                            self.#ident = ::std::option::Option::Some(*value);
                            ::std::result::Result::Ok(())
                        }
                        ::std::result::Result::Err(_) => ::std::result::Result::Err(
                            ::partbridge::engine::CompositionError::ImportTypeMismatch {
                                member: ::std::borrow::ToOwned::to_owned(member),
                                expected: ::std::any::type_name::<#inner>(),
                            },
                        ),
                    },
                });
            }
            FieldImport::Flatten => {
                let member = LitStr::new(&ident.to_string(), ident.span());
                let prefix = LitStr::new(&format!("{ident}."), ident.span());

                import_statements.push(quote! {
                    imports.extend(
                        ::partbridge::part::Part::imports(&self.#ident)
                            .into_iter()
                            .map(|point| point.prefixed(#member)),
                    );
                });
                flatten_routes.push(quote! {
                    if let ::std::option::Option::Some(rest) = other.strip_prefix(#prefix) {
                        return ::partbridge::part::Part::assign(&mut self.#ident, rest, value);
                    }
                });
            }
        }
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let composition_fns = if import_statements.is_empty() {
        TokenStream2::new()
    } else {
        quote! {
            fn imports(&self) -> ::std::vec::Vec<::partbridge::part::ImportPoint> {
                let mut imports = ::std::vec::Vec::new();
                #(#import_statements)*
                imports
            }

            fn assign(
                &mut self,
                member: &str,
                value: ::std::boxed::Box<dyn ::partbridge::part::Managed>,
            ) -> ::std::result::Result<(), ::partbridge::engine::CompositionError> {
                match member {
                    #(#assign_arms)*
                    other => {
                        #(#flatten_routes)*
                        ::std::result::Result::Err(
                            ::partbridge::engine::CompositionError::UnknownMember {
                                part: ::std::any::type_name::<Self>(),
                                member: ::std::borrow::ToOwned::to_owned(other),
                            },
                        )
                    }
                }
            }
        }
    };

    let opt_out_fn = if part_attrs.not_composable {
        quote! {
            fn not_composable(&self) -> bool {
                true
            }
        }
    } else {
        TokenStream2::new()
    };

    Ok(quote! {
        impl #impl_generics ::partbridge::part::Part for #name #ty_generics #where_clause {
            #composition_fns
            #opt_out_fn
        }
    })
}

fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
