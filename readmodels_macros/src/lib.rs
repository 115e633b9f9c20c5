mod read_model;

use proc_macro::TokenStream;

/// Derive macro for the `ReadModel` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Serialize, Deserialize, ReadModel)]
/// #[readmodel(name = "Read.Orders.OrderSummary")]
/// struct OrderSummary {
///     #[serde(rename = "_id")]
///     #[readmodel(id)]
///     pub id: String,
///     pub total: i64,
/// }
/// ```
///
/// - `#[readmodel(name = "...")]` sets the fully qualified type name the
///   collection name is derived from. If omitted, defaults to the struct name.
/// - `#[readmodel(id)]` marks the identifier field and additionally derives
///   `Identified`. The field type must implement `Clone + Into<DocumentId>`.
#[proc_macro_derive(ReadModel, attributes(readmodel))]
pub fn derive_read_model(input: TokenStream) -> TokenStream {
    read_model::derive_read_model(input)
}
