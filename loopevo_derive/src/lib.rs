use proc_macro::TokenStream;
use quote::quote;
use syn::*;

/// Derives `Display` for a fieldless enum, printing each variant as its
/// lowercase name, the way the opcodes appear in the IR text form
/// (`Add` -> `add`, `Lshr` -> `lshr`).
#[proc_macro_derive(OpDisplay)]
pub fn op_display(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);

	let name = input.ident;
	let Data::Enum(DataEnum { variants, .. }) = input.data else {
		panic!("OpDisplay can only be derived for enums");
	};

	let cases = variants.into_iter().map(|v| {
		let variant_name = &v.ident;
		let variant_str = variant_name.to_string().to_lowercase();
		quote! {
			Self::#variant_name => write!(f, #variant_str),
		}
	});

	quote! {
		impl std::fmt::Display for #name {
			fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
				match self {
					#(#cases)*
				}
			}
		}
	}
	.into()
}
