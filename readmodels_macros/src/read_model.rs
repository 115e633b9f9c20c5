use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr};

pub fn derive_read_model(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let type_name = match extract_type_name(&input) {
        Ok(type_name) => type_name,
        Err(err) => return err.to_compile_error().into(),
    };

    let id_field = match extract_id_field(&input) {
        Ok(id_field) => id_field,
        Err(err) => return err.to_compile_error().into(),
    };

    let identified = id_field.map(|field| {
        quote! {
            impl #impl_generics ::readmodels::Identified for #name #ty_generics #where_clause {
                fn document_id(&self) -> ::readmodels::DocumentId {
                    ::core::convert::Into::into(::core::clone::Clone::clone(&self.#field))
                }
            }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::readmodels::ReadModel for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;
        }

        #identified
    };

    TokenStream::from(expanded)
}

fn extract_type_name(input: &DeriveInput) -> syn::Result<String> {
    for attr in &input.attrs {
        if !attr.path().is_ident("readmodel") {
            continue;
        }

        let mut type_name = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                type_name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `name = \"...\"`"))
            }
        })?;

        if let Some(name) = type_name {
            return Ok(name);
        }
    }

    Ok(input.ident.to_string())
}

fn extract_id_field(input: &DeriveInput) -> syn::Result<Option<syn::Ident>> {
    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "ReadModel can only be derived for structs",
        ));
    };

    let Fields::Named(fields) = &data_struct.fields else {
        return Ok(None);
    };

    for field in &fields.named {
        for attr in &field.attrs {
            if !attr.path().is_ident("readmodel") {
                continue;
            }

            let mut is_id = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    is_id = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `id`"))
                }
            })?;

            if is_id {
                return Ok(field.ident.clone());
            }
        }
    }

    Ok(None)
}
