extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod util;
mod vertex;

#[proc_macro_derive(Vertex, attributes(vertex_attribute, vertex_divisor))]
pub fn derive_vertex(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    vertex::expand_derive_vertex(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
