// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, ItemFn, LitStr, Result, Token, parse_macro_input};

/// Attribute macro wrapping the errors of a function.
///
/// Supports expressions like:
/// - `#[wrap_err("failed to read file: {}", path.display())]`
/// - `#[wrap_err("error in {}: {}", name, value.len())]`
/// - `#[wrap_err("simple message")]`
/// - `#[wrap_err("param interpolation: {param}")]`
///
/// See the main `unravel` crate documentation for detailed usage examples.
#[cfg_attr(test, mutants::skip)] // procedural macro API cannot be used in tests directly
pub fn wrap_err(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = proc_macro2::TokenStream::from(args);
    let input = parse_macro_input!(input as ItemFn);

    impl_wrap_err_attribute(args, input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn impl_wrap_err_attribute(message_args: proc_macro2::TokenStream, mut fn_definition: ItemFn) -> Result<proc_macro2::TokenStream> {
    let message_expr = if message_args.is_empty() {
        let fn_name = &fn_definition.sig.ident;
        quote! { ::core::concat!("error in function ", ::core::stringify!(#fn_name)) }
    } else {
        syn::parse2::<Message>(message_args)?.into_token_stream()
    };

    let return_type = check_return_type(&fn_definition.sig.output)?;
    let asyncness = &fn_definition.sig.asyncness;
    let await_suffix = asyncness.is_some().then(|| quote! { .await });
    let body = &fn_definition.block;

    // the wrap runs in the function's own frame, not in a closure, so it is recorded as the wrap site
    let block = quote! {
        {
            let __unravel_result: #return_type = (#asyncness || #body)() #await_suffix;
            match __unravel_result {
                ::core::result::Result::Ok(__unravel_value) => ::core::result::Result::Ok(__unravel_value),
                ::core::result::Result::Err(__unravel_error) => ::core::result::Result::Err(
                    ::core::convert::From::from(unravel::Error::wrap(__unravel_error, #message_expr))
                ),
            }
        }
    };

    fn_definition.block = syn::parse2(block)?;

    Ok(quote! { #fn_definition })
}

/// The attribute arguments: a message literal, optionally followed by format arguments.
struct Message {
    literal: LitStr,
    args: Punctuated<Expr, Token![,]>,
}

impl Parse for Message {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        let literal = input
            .parse::<LitStr>()
            .map_err(|err| syn::Error::new(err.span(), "wrap_err expects a string literal message"))?;

        let args = if input.is_empty() {
            Punctuated::new()
        } else {
            input.parse::<Token![,]>()?;
            Punctuated::parse_terminated(input)?
        };

        Ok(Self { literal, args })
    }
}

impl ToTokens for Message {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let literal = &self.literal;
        let interpolates = self.literal.value().contains(['{', '}']);

        if self.args.is_empty() && !interpolates {
            literal.to_tokens(tokens);
        } else {
            let args = self.args.iter();
            tokens.extend(quote! { ::std::format!(#literal #(, #args)*) });
        }
    }
}

/// Check that the function declares a return type and hand it back.
fn check_return_type(output: &syn::ReturnType) -> Result<&syn::Type> {
    match output {
        syn::ReturnType::Type(_, ty) => {
            if let syn::Type::ImplTrait(impl_trait) = ty.as_ref() {
                return Err(syn::Error::new(
                    impl_trait.span(),
                    "wrap_err cannot be applied to functions returning `impl Trait`",
                ));
            }
            Ok(ty.as_ref())
        }
        syn::ReturnType::Default => Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "wrap_err can only be applied to functions returning Result",
        )),
    }
}
