//! `#[decisions]` attribute implementation.
//!
//! Turns an `impl` block containing `authorize_to_<action>` methods into that
//! same block plus a `warden::Target` implementation:
//!
//! ```rust,ignore
//! #[decisions]
//! impl Document {
//!     fn authorize_to_delete(&self, user: &User, #[keyed] force: Option<bool>) -> Answer { .. }
//! }
//! ```
//!
//! Generates:
//!
//! ```rust,ignore
//! impl ::warden::Target for Document {
//!     type Error = ::warden::DispatchError;
//!
//!     fn decide(&self, action: &::warden::Action, arguments: &::warden::Arguments)
//!         -> Result<::warden::Answer, Self::Error>
//!     {
//!         match action.as_str() {
//!             "delete" => {
//!                 arguments.expect_at_most(1usize)?;
//!                 arguments.expect_keywords(&["force"])?;
//!                 let __warden_0 = arguments.positional::<User>(0usize)?;
//!                 let __warden_1 = arguments.keyed_opt::<bool>("force")?.cloned();
//!                 ::warden::IntoDecision::into_decision(
//!                     self.authorize_to_delete(__warden_0, __warden_1),
//!                 )
//!             }
//!             _ => Err(::warden::Target::missing(self, action)),
//!         }
//!     }
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    FnArg, GenericArgument, ImplItem, ItemImpl, Pat, PathArguments, Type, parse_macro_input,
};

const PREFIX: &str = "authorize_to_";
const KEYED: &str = "keyed";

/// Implementation used by `#[decisions]`.
pub fn generate(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut error: Option<syn::Path> = None;
    let options = syn::meta::parser(|meta| {
        if meta.path.is_ident("error") {
            error = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported decisions option, expected `error = Type`"))
        }
    });
    parse_macro_input!(attr with options);

    let mut input = parse_macro_input!(item as ItemImpl);
    match generate_target(&mut input, error) {
        Ok(target) => quote! {
            #input
            #target
        }
        .into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// How a decision method parameter is pulled out of the arguments.
enum Source {
    Positional(usize),
    Keyed(String),
}

/// Shape of the parameter type.
enum Shape<'a> {
    Borrowed(&'a Type),
    Owned(&'a Type),
    OptionalBorrowed(&'a Type),
    OptionalOwned(&'a Type),
    Text,
    OptionalText,
}

fn generate_target(input: &mut ItemImpl, error: Option<syn::Path>) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[decisions] must be applied to an inherent impl block",
        ));
    }

    let mut arms = Vec::new();

    for item in input.items.iter_mut() {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let name = method.sig.ident.to_string();
        let Some(action) = name.strip_prefix(PREFIX) else {
            continue;
        };
        if action.is_empty() {
            return Err(syn::Error::new_spanned(
                &method.sig.ident,
                "decision method needs an action name after `authorize_to_`",
            ));
        }

        match method.sig.inputs.first() {
            Some(FnArg::Receiver(receiver))
                if receiver.reference.is_some() && receiver.mutability.is_none() => {}
            _ => {
                return Err(syn::Error::new_spanned(
                    &method.sig,
                    "decision methods must take `&self`",
                ));
            }
        }

        let mut bindings = Vec::new();
        let mut values = Vec::new();
        let mut keywords = Vec::new();
        let mut positional = 0usize;

        for (index, argument) in method.sig.inputs.iter_mut().skip(1).enumerate() {
            let FnArg::Typed(parameter) = argument else {
                continue;
            };

            let keyed = parameter.attrs.iter().any(|attr| attr.path().is_ident(KEYED));
            parameter.attrs.retain(|attr| !attr.path().is_ident(KEYED));

            let source = if keyed {
                let Pat::Ident(ident) = parameter.pat.as_ref() else {
                    return Err(syn::Error::new_spanned(
                        &parameter.pat,
                        "#[keyed] parameters must be plain identifiers",
                    ));
                };
                let key = ident.ident.to_string();
                let key = key.strip_prefix("r#").unwrap_or(&key).to_string();
                keywords.push(key.clone());
                Source::Keyed(key)
            } else {
                positional += 1;
                Source::Positional(positional - 1)
            };

            let binding = format_ident!("__warden_{}", index);
            let extraction = extract(&source, shape(&parameter.ty)?);
            bindings.push(quote! { let #binding = #extraction; });
            values.push(binding);
        }

        let ident = &method.sig.ident;
        arms.push(quote! {
            #action => {
                arguments.expect_at_most(#positional)?;
                arguments.expect_keywords(&[#(#keywords),*])?;
                #(#bindings)*
                ::warden::IntoDecision::into_decision(self.#ident(#(#values),*))
            }
        });
    }

    let error = match error {
        Some(path) => quote! { #path },
        None => quote! { ::warden::DispatchError },
    };
    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::warden::Target for #self_ty #where_clause {
            type Error = #error;

            fn decide(
                &self,
                action: &::warden::Action,
                arguments: &::warden::Arguments,
            ) -> ::core::result::Result<::warden::Answer, Self::Error> {
                match action.as_str() {
                    #(#arms)*
                    _ => ::core::result::Result::Err(::warden::Target::missing(self, action)),
                }
            }
        }
    })
}

fn shape(ty: &Type) -> syn::Result<Shape<'_>> {
    if let Type::Reference(reference) = ty
        && reference.mutability.is_none()
    {
        return Ok(if is_str(&reference.elem) {
            Shape::Text
        } else {
            Shape::Borrowed(sized(&reference.elem)?)
        });
    }
    if let Some(inner) = option_of(ty) {
        return Ok(match inner {
            Type::Reference(reference) if reference.mutability.is_none() => {
                if is_str(&reference.elem) {
                    Shape::OptionalText
                } else {
                    Shape::OptionalBorrowed(sized(&reference.elem)?)
                }
            }
            other => Shape::OptionalOwned(other),
        });
    }
    Ok(Shape::Owned(ty))
}

fn is_str(ty: &Type) -> bool {
    matches!(ty, Type::Path(path) if path.qself.is_none() && path.path.is_ident("str"))
}

/// Arguments are stored as sized values, so only sized types can be borrowed
/// from them. `&str` is the one unsized borrow with its own extraction.
fn sized(ty: &Type) -> syn::Result<&Type> {
    match ty {
        Type::Slice(slice) => Err(syn::Error::new_spanned(
            slice,
            "decision parameters cannot borrow a slice, take `&Vec<T>` instead",
        )),
        Type::TraitObject(_) | Type::ImplTrait(_) => Err(syn::Error::new_spanned(
            ty,
            "decision parameters must borrow a concrete sized type",
        )),
        _ => Ok(ty),
    }
}

/// `T` for `Option<T>` (also `std::option::Option<T>`), otherwise `None`.
fn option_of(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.first() {
        Some(GenericArgument::Type(inner)) if arguments.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn extract(source: &Source, shape: Shape<'_>) -> TokenStream2 {
    let (required, optional, text, optional_text, at) = match source {
        Source::Positional(index) => (
            quote! { positional },
            quote! { positional_opt },
            quote! { positional_str },
            quote! { positional_str_opt },
            quote! { #index },
        ),
        Source::Keyed(key) => (
            quote! { keyed_value },
            quote! { keyed_opt },
            quote! { keyed_str },
            quote! { keyed_str_opt },
            quote! { #key },
        ),
    };

    match shape {
        Shape::Borrowed(ty) => quote! { arguments.#required::<#ty>(#at)? },
        Shape::Owned(ty) => {
            quote! { ::core::clone::Clone::clone(arguments.#required::<#ty>(#at)?) }
        }
        Shape::OptionalBorrowed(ty) => quote! { arguments.#optional::<#ty>(#at)? },
        Shape::OptionalOwned(ty) => quote! { arguments.#optional::<#ty>(#at)?.cloned() },
        Shape::Text => quote! { arguments.#text(#at)? },
        Shape::OptionalText => quote! { arguments.#optional_text(#at)? },
    }
}
