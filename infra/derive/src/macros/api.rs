use super::derived_traits;
use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, ItemFn, ItemStruct, Lit, LitStr, MetaNameValue, Token};

/// Expands `#[api_model]`: response DTO derives plus an optional serde rename policy.
pub fn expand_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    let rename_all = match parse_rename_all(args) {
        Ok(rename_all) => rename_all,
        Err(err) => return err.to_compile_error(),
    };

    let derives = derived_traits(&input.attrs);
    let missing: Vec<TokenStream> = [
        ("Debug", quote!(Debug)),
        ("Clone", quote!(Clone)),
        ("Serialize", quote!(::serde::Serialize)),
    ]
    .into_iter()
    .filter(|(name, _)| !derives.contains(*name))
    .map(|(_, tokens)| tokens)
    .collect();

    let derive_attr = if missing.is_empty() { quote!() } else { quote!(#[derive(#(#missing),*)]) };
    let schema_attr = if derives.contains("ToSchema") {
        quote!()
    } else {
        quote!(#[cfg_attr(feature = "server", derive(::utoipa::ToSchema))])
    };

    let rename_attr = match (rename_all, existing_rename_all(&input.attrs)) {
        (Some(wanted), Some(existing)) if wanted.value() != existing.value() => {
            return syn::Error::new_spanned(
                existing,
                "conflicting serde rename_all; drop it or match api_model(rename_all = \"...\")",
            )
            .to_compile_error();
        },
        (Some(wanted), None) => quote!(#[serde(rename_all = #wanted)]),
        _ => quote!(),
    };

    quote! {
        #derive_attr
        #schema_attr
        #rename_attr
        #input
    }
}

/// Expands `#[api_handler]`: forwards the arguments to `utoipa::path` behind the
/// consumer's `server` feature.
pub fn expand_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = &input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[cfg_attr(feature = "server", ::utoipa::path(#args))]
        #vis #sig #block
    }
}

fn parse_rename_all(args: TokenStream) -> syn::Result<Option<LitStr>> {
    let metas = Punctuated::<MetaNameValue, Token![,]>::parse_terminated.parse2(args)?;
    let mut rename_all = None;

    for meta in metas {
        if !meta.path.is_ident("rename_all") {
            return Err(syn::Error::new_spanned(meta.path, "expected `rename_all = \"...\"`"));
        }
        let Expr::Lit(ExprLit { lit: Lit::Str(lit), .. }) = &meta.value else {
            return Err(syn::Error::new_spanned(&meta.value, "rename_all must be a string literal"));
        };
        if rename_all.replace(lit.clone()).is_some() {
            return Err(syn::Error::new_spanned(meta.path, "duplicate rename_all"));
        }
    }

    Ok(rename_all)
}

fn existing_rename_all(attrs: &[Attribute]) -> Option<LitStr> {
    let mut found = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                found = Some(meta.value()?.parse::<LitStr>()?);
            } else if meta.input.peek(Token![=]) {
                let _: Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
    }

    found
}
