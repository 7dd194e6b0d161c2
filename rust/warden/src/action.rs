use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// Prefix every decision method name starts with.
pub const DECISION_PREFIX: &str = "authorize_to_";

/// Identifier of the operation being checked for permission
/// (e.g. `show`, `delete`).
///
/// An action maps to exactly one decision method on a target, named by
/// prefixing the action with [`DECISION_PREFIX`]:
///
/// ```
/// use warden::Action;
///
/// let action = Action::from("delete");
/// assert_eq!(action.method_name(), "authorize_to_delete");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Action(Cow<'static, str>);

impl Action {
    /// Create an action from a static name.
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The bare action name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the decision method this action dispatches to.
    pub fn method_name(&self) -> String {
        format!("{DECISION_PREFIX}{}", self.0)
    }
}

impl From<&'static str> for Action {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl From<&Action> for Action {
    fn from(value: &Action) -> Self {
        value.clone()
    }
}

impl AsRef<str> for Action {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Action {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Action {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
