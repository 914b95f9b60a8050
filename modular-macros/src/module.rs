//! Module-related macros.
//!
//! This module contains:
//! - `#[module]` - Attribute macro deriving a `Module` implementation from an impl block

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, Expr, ExprArray, Ident, ImplItem, ItemImpl, Lit, LitStr, Path, Token, Type,
    ext::IdentExt,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Path the generated code reaches `modular-core` through by default.
const DEFAULT_CORE_PATH: &str = "::modular::__core";

/// Arguments for the `#[module]` macro.
pub(crate) struct ModuleArgs {
    pub name: Option<String>,
    pub events: Vec<String>,
    pub krate: Option<Path>,
}

impl Parse for ModuleArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;
        let mut events = Vec::new();
        let mut krate = None;

        while !input.is_empty() {
            // `crate` is a keyword, so plain `Ident` parsing would reject it.
            let ident = Ident::parse_any(input)?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: LitStr = input.parse()?;
                    name = Some(lit.value());
                }
                "crate" => {
                    let lit: LitStr = input.parse()?;
                    krate = Some(lit.parse::<Path>()?);
                }
                "events" => {
                    let array: ExprArray = input.parse()?;
                    for elem in array.elems {
                        match elem {
                            Expr::Lit(expr) => match expr.lit {
                                Lit::Str(lit) => events.push(lit.value()),
                                other => {
                                    return Err(syn::Error::new_spanned(
                                        other,
                                        "event names must be string literals",
                                    ));
                                }
                            },
                            other => {
                                return Err(syn::Error::new_spanned(
                                    other,
                                    "event names must be string literals",
                                ));
                            }
                        }
                    }
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ModuleArgs {
            name,
            events,
            krate,
        })
    }
}

/// Arguments for an `#[operation]` marker inside a `#[module]` block.
struct OperationArgs {
    name: Option<String>,
}

impl Parse for OperationArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: LitStr = input.parse()?;
                    name = Some(lit.value());
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(OperationArgs { name })
    }
}

fn is_operation(attr: &Attribute) -> bool {
    attr.path().is_ident("operation")
}

/// Entry point name declared by an `#[operation]` attribute.
fn operation_name(attr: &Attribute, method: &Ident) -> syn::Result<String> {
    let args = match &attr.meta {
        syn::Meta::Path(_) => OperationArgs { name: None },
        _ => attr.parse_args::<OperationArgs>()?,
    };
    Ok(args.name.unwrap_or_else(|| method.to_string()))
}

fn type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

/// Implementation of the `#[module]` macro.
pub fn module_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ModuleArgs);
    let mut input = parse_macro_input!(item as ItemImpl);

    if let Some((_, path, _)) = &input.trait_ {
        return syn::Error::new_spanned(path, "#[module] must be placed on an inherent impl block")
            .to_compile_error()
            .into();
    }

    let mut op_names = Vec::new();
    let mut op_fns = Vec::new();

    for item in &mut input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let Some(pos) = method.attrs.iter().position(is_operation) else {
            continue;
        };
        let attr = method.attrs.remove(pos);

        if method.sig.receiver().is_none() {
            return syn::Error::new_spanned(
                &method.sig,
                "operations must take `&self, ctx: &mut CallContext<'_>, calldata: &[Felt]`",
            )
            .to_compile_error()
            .into();
        }

        match operation_name(&attr, &method.sig.ident) {
            Ok(name) => op_names.push(name),
            Err(err) => return err.to_compile_error().into(),
        }
        op_fns.push(method.sig.ident.clone());
    }

    let self_ty = &input.self_ty;
    let module_name = match args.name.or_else(|| type_name(self_ty)) {
        Some(name) => name,
        None => {
            return syn::Error::new_spanned(self_ty, "cannot infer module name, use #[module(name = \"...\")]")
                .to_compile_error()
                .into();
        }
    };
    let events = &args.events;
    let core = match args.krate {
        Some(path) => path,
        None => match syn::parse_str::<Path>(DEFAULT_CORE_PATH) {
            Ok(path) => path,
            Err(err) => return err.to_compile_error().into(),
        },
    };
    let (impl_generics, _ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        #input

        impl #impl_generics #core::Module for #self_ty #where_clause {
            fn descriptor(&self) -> #core::ModuleDescriptor {
                #core::ModuleDescriptor::new(#module_name)
                    #(.function(#op_names))*
                    #(.event(#events))*
            }

            fn invoke(
                &self,
                __ctx: &mut #core::CallContext<'_>,
                __selector: #core::Selector,
                __calldata: &[#core::Felt],
            ) -> #core::ModularResult<::std::vec::Vec<#core::Felt>> {
                #(
                    if __selector == #core::Selector::from_name(#op_names) {
                        return self.#op_fns(__ctx, __calldata);
                    }
                )*
                ::core::result::Result::Err(#core::ModularError::EntryPointNotFound {
                    module: __ctx.code_address(),
                    selector: __selector,
                })
            }
        }
    };

    TokenStream::from(expanded)
}
