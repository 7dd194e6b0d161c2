//! Convention-based authorization decisions.
//!
//! `warden` answers one question: may this subject perform this action on
//! this target? It does not define *what* is allowed. Policy lives on the
//! target itself, in decision methods named `authorize_to_<action>`. This
//! crate standardizes how such a method is found, how arguments reach it, and
//! what shape its answer takes.
//!
//! # Quick Example
//!
//! ```rust
//! # #[cfg(feature = "macros")]
//! # mod example {
//! use warden::{args, decisions, Answer, Authorizer, Outcome, Can};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! pub struct User(pub &'static str);
//!
//! #[derive(Debug, Clone)]
//! pub struct Document {
//!     pub owner: User,
//! }
//!
//! #[decisions]
//! impl Document {
//!     fn authorize_to_delete(&self, user: &User) -> Answer {
//!         if *user == self.owner {
//!             Answer::Allowed
//!         } else {
//!             Answer::deny("not owner")
//!         }
//!     }
//! }
//!
//! pub fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let document = Document { owner: User("alice") };
//!     let authorizer = Authorizer::new();
//!
//!     // Query
//!     assert!(authorizer.is_allowed("delete", &document, args![User("alice")])?);
//!
//!     // Branch without writing the conditional
//!     let label = authorizer
//!         .can("delete", &document, args![User("bob")])?
//!         .run(|| "Delete")?
//!         .otherwise(|_reason| "Request deletion")?
//!         .into_value();
//!     assert_eq!(label, Some("Request deletion"));
//!
//!     // Fail fast
//!     let denial = authorizer
//!         .authorize_or_fail("delete", &document, args![User("bob")])
//!         .unwrap_err();
//!     assert_eq!(
//!         denial.to_string(),
//!         r#"Cannot [delete, Document { owner: User("alice") }, User("bob")] because not owner"#
//!     );
//!     Ok(())
//! }
//! # }
//! # #[cfg(feature = "macros")]
//! # example::example().unwrap();
//! ```
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Authorizer`] | Dispatches an action to a target, merging default arguments |
//! | [`Target`] | Capability interface: routes actions to decision methods |
//! | [`Answer`] | `Allowed`, or `Denied` with a [`Reason`] |
//! | [`Outcome`] | Chainable `run` / `otherwise` over an answer, polarity [`Can`] or [`Cannot`] |
//! | [`Arguments`] | Positional and keyed arguments for decision methods |
//! | [`Unauthorized`] | Structured denial signal from [`Authorizer::authorize_or_fail`] |
//!
//! # Decision methods
//!
//! A [`Target`] routes an [`Action`] to its decision method. The
//! `#[decisions]` attribute (feature `macros`, on by default) generates that
//! routing from an `impl` block: every method named `authorize_to_<action>`
//! becomes the handler for `<action>`. Parameters are taken from the
//! arguments in order; parameters marked `#[keyed]` are taken by name.
//! Actions without a method fail with
//! [`DispatchError::MissingCapability`].

mod error;
pub use error::*;

mod action;
pub use action::*;

mod argument;
pub use argument::*;

mod answer;
pub use answer::*;

mod target;
pub use target::*;

mod outcome;
pub use outcome::*;

mod authorizer;
pub use authorizer::*;

/// Attribute macro deriving [`Target`] from `authorize_to_*` methods.
#[cfg(feature = "macros")]
pub use warden_macros::decisions;
