use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, FnArg, ItemFn, PatType, Type};

fn formatted_arg_error_msg(arg_name: &str, arg_pos: usize, fn_name: &str) -> String {
    format!(
        "Expected argument {} ('{}') to be f64, for {}",
        arg_pos, arg_name, fn_name
    )
}

/// Turns a plain `fn name(a: f64, ...) -> f64` into a `Builtin` constant named
/// after the function in upper case. `Builtin` must be in scope at the call site.
#[proc_macro_attribute]
pub fn builtin_fn(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let fn_name = &input.sig.ident;
    let fn_args = &input.sig.inputs;
    let fn_body = &input.block;
    let fn_output = &input.sig.output;
    let const_name = format_ident!("{}", fn_name.to_string().to_uppercase());
    let name_literal = fn_name.to_string();

    let mut arg_extractions = Vec::new();

    for (i, arg) in fn_args.iter().enumerate() {
        let FnArg::Typed(PatType { pat, ty, .. }) = arg else {
            return syn::Error::new_spanned(arg, "builtin functions cannot take self")
                .to_compile_error()
                .into();
        };

        let arg_name = match **pat {
            syn::Pat::Ident(ref ident) => &ident.ident,
            _ => {
                return syn::Error::new_spanned(pat, "unsupported argument pattern")
                    .to_compile_error()
                    .into()
            }
        };

        let is_f64 = matches!(
            **ty,
            Type::Path(ref type_path) if type_path.path.is_ident("f64")
        );
        if !is_f64 {
            let err_msg = formatted_arg_error_msg(&arg_name.to_string(), i, &name_literal);
            return syn::Error::new_spanned(ty, err_msg).to_compile_error().into();
        }

        arg_extractions.push(quote! {
            let #arg_name: f64 = args[#i];
        });
    }

    let args_len = arg_extractions.len();
    let expanded = quote! {
        pub const #const_name: Builtin = Builtin {
            name: #name_literal,
            arity: #args_len,
            call: {
                fn __call(args: &[f64]) #fn_output {
                    #(#arg_extractions)*

                    #fn_body
                }
                __call
            },
        };
    };

    TokenStream::from(expanded)
}
