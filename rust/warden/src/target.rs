use crate::{Action, Answer, Arguments, DispatchError};
use std::error::Error;
use std::fmt::Debug;

/// Something an action can be authorized against.
///
/// A target owns its decision methods, one per supported action, named
/// `authorize_to_<action>` by convention. `decide` is the single entry point
/// the [`Authorizer`](crate::Authorizer) calls: it switches on the action,
/// invokes the matching decision method with the (already merged) arguments
/// and returns its answer unmodified. An action without a decision method is
/// a [`DispatchError::MissingCapability`], never a silent denial.
///
/// Writing the switch by hand is fine, but most targets let
/// [`#[decisions]`](crate::decisions) generate it from their
/// `authorize_to_*` methods.
///
/// ```
/// use warden::{Action, Answer, Arguments, DispatchError, Target};
///
/// #[derive(Debug)]
/// struct Page {
///     published: bool,
/// }
///
/// impl Target for Page {
///     type Error = DispatchError;
///
///     fn decide(&self, action: &Action, arguments: &Arguments) -> Result<Answer, Self::Error> {
///         match action.as_str() {
///             "show" => {
///                 arguments.expect_at_most(0)?;
///                 Ok(self.published.into())
///             }
///             _ => Err(self.missing(action)),
///         }
///     }
/// }
///
/// let page = Page { published: true };
/// assert_eq!(page.decide(&Action::new("show"), &Arguments::new()), Ok(Answer::Allowed));
/// assert!(page.decide(&Action::new("edit"), &Arguments::new()).is_err());
/// ```
pub trait Target: Debug {
    /// Error produced by the decision methods or by dispatching to them.
    type Error: Error + From<DispatchError>;

    /// Route `action` to its decision method and return the raw answer.
    fn decide(&self, action: &Action, arguments: &Arguments) -> Result<Answer, Self::Error>;

    /// The error for an action this target has no decision method for.
    fn missing(&self, action: &Action) -> Self::Error {
        DispatchError::MissingCapability {
            action: action.clone(),
            method: action.method_name(),
            target: std::any::type_name::<Self>(),
        }
        .into()
    }
}

impl<T: Target + ?Sized> Target for &T {
    type Error = T::Error;

    fn decide(&self, action: &Action, arguments: &Arguments) -> Result<Answer, Self::Error> {
        (**self).decide(action, arguments)
    }

    fn missing(&self, action: &Action) -> Self::Error {
        (**self).missing(action)
    }
}

impl<T: Target + ?Sized> Target for std::sync::Arc<T> {
    type Error = T::Error;

    fn decide(&self, action: &Action, arguments: &Arguments) -> Result<Answer, Self::Error> {
        (**self).decide(action, arguments)
    }

    fn missing(&self, action: &Action) -> Self::Error {
        (**self).missing(action)
    }
}
