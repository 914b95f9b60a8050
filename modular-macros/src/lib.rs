use proc_macro::TokenStream;

mod module;

/// Derive a `Module` implementation from an inherent impl block.
///
/// Methods marked `#[operation]` become entry points. The entry point name
/// defaults to the method name; override it with
/// `#[operation(name = "camelCaseName")]`. Each operation must have the
/// signature
/// `fn(&self, ctx: &mut CallContext<'_>, calldata: &[Felt]) -> ModularResult<Vec<Felt>>`.
///
/// Generated code reaches the core types through `::modular::__core`, so a
/// dependency on `modular` is enough. Crates that depend on `modular-core`
/// directly pass `crate = "::modular_core"` instead.
///
/// # Example
///
/// ```rust,ignore
/// struct Counter;
///
/// #[module(name = "Counter", events = ["Incremented"])]
/// impl Counter {
///     #[operation(name = "increment")]
///     fn increment(&self, ctx: &mut CallContext<'_>, _calldata: &[Felt]) -> ModularResult<Vec<Felt>> {
///         Ok(Vec::new())
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn module(attr: TokenStream, item: TokenStream) -> TokenStream {
    module::module_impl(attr, item)
}
