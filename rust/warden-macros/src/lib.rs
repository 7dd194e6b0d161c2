#![warn(missing_docs)]

//! Procedural macros for warden.
//!
//! Use them through `warden`, which re-exports them when its default `macros`
//! feature is enabled. The generated code refers to `::warden` paths and does
//! not work without it.

use proc_macro::TokenStream;

mod decisions;

/// Derive `warden::Target` from the `authorize_to_<action>` methods of an
/// `impl` block.
///
/// Every method whose name starts with `authorize_to_` becomes the decision
/// method for the action named by the rest of the identifier. The generated
/// `Target::decide` switches on the action, pulls each parameter out of the
/// call's arguments and forwards the method's return value unmodified. Any
/// other action fails with `DispatchError::MissingCapability`.
///
/// # Parameters
///
/// Parameters are taken from positional arguments in declaration order.
/// Parameters marked `#[keyed]` are taken from keyed arguments by their
/// name instead. The parameter type decides how the value is extracted:
///
/// | Parameter type | Extraction |
/// |----------------|------------|
/// | `&T`           | borrowed, required |
/// | `T`            | cloned, required |
/// | `Option<&T>`   | borrowed, optional |
/// | `Option<T>`    | cloned, optional |
/// | `&str`         | `&'static str` or `String`, required |
/// | `Option<&str>` | `&'static str` or `String`, optional |
///
/// Other unsized borrows such as `&[T]` or `&dyn Trait` are rejected at
/// compile time; take `&Vec<T>` or the concrete type instead.
///
/// Passing more positional arguments than declared, or a keyed argument the
/// method does not declare, is a dispatch error. An empty set of keyed
/// arguments is always accepted.
///
/// # Return values
///
/// Decision methods may return anything implementing
/// `warden::IntoDecision<Error>`: an `Answer`, a `bool`, a reason string, or
/// a `Result` of any of those whose error converts into the target's error.
///
/// # Options
///
/// `#[decisions(error = MyError)]` sets the target's error type (default
/// `warden::DispatchError`). It must implement `From<warden::DispatchError>`.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug)]
/// struct Project {
///     members: Vec<UserId>,
/// }
///
/// #[warden::decisions]
/// impl Project {
///     fn authorize_to_show(&self, user: &UserId) -> bool {
///         self.members.contains(user)
///     }
///
///     fn authorize_to_archive(&self, user: &UserId, #[keyed] force: Option<bool>) -> Answer {
///         if force.unwrap_or(false) { Answer::Allowed } else { Answer::deny("archiving requires force") }
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn decisions(attr: TokenStream, item: TokenStream) -> TokenStream {
    decisions::generate(attr, item)
}
