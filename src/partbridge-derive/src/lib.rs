mod attrs;
mod impls;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the part implementation from `#[import]` field attributes.
///
/// Import fields must be `Option<T>`; the generated `imports` declares one
/// import point per annotated field, and `assign` writes resolved exports
/// back. `#[import(flatten)]` delegates to an embedded part, qualifying its
/// members with the field name. `#[part(not_composable)]` on the struct opts
/// the whole type out of composition.
#[proc_macro_derive(Part, attributes(part, import))]
pub fn derive_part(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match impls::expand_part(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}
