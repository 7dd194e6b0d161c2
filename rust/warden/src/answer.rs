use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// Human-readable explanation of why an action was denied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reason(Cow<'static, str>);

impl Reason {
    /// Create a reason from a static message.
    pub const fn new(message: &'static str) -> Self {
        Self(Cow::Borrowed(message))
    }

    /// The reason text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Reason {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for Reason {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl PartialEq<str> for Reason {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Reason {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Display for Reason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a decision method returns.
///
/// [`Answer::Allowed`] is the single success value. Anything else is a
/// denial, and the value it carries is the reason. There is no other test for
/// success: a reason is never inspected for "truthiness".
///
/// ```
/// use warden::Answer;
///
/// assert!(Answer::from(true).is_allowed());
/// assert_eq!(Answer::from("not owner").reason().map(|r| r.as_str()), Some("not owner"));
/// // `false` is just another non-success value.
/// assert_eq!(Answer::from(false).reason().map(|r| r.as_str()), Some("false"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    /// The action is permitted.
    Allowed,
    /// The action is denied for the given reason.
    Denied(Reason),
}

impl Answer {
    /// Permit the action.
    pub const fn allow() -> Self {
        Self::Allowed
    }

    /// Deny the action with `reason`.
    pub fn deny(reason: impl Into<Reason>) -> Self {
        Self::Denied(reason.into())
    }

    /// True iff this is [`Answer::Allowed`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// The denial reason, if denied.
    pub fn reason(&self) -> Option<&Reason> {
        match self {
            Self::Allowed => None,
            Self::Denied(reason) => Some(reason),
        }
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        if value {
            Self::Allowed
        } else {
            Self::Denied(Reason::new("false"))
        }
    }
}

impl From<Reason> for Answer {
    fn from(reason: Reason) -> Self {
        Self::Denied(reason)
    }
}

impl From<&'static str> for Answer {
    fn from(reason: &'static str) -> Self {
        Self::Denied(reason.into())
    }
}

impl From<String> for Answer {
    fn from(reason: String) -> Self {
        Self::Denied(reason.into())
    }
}

impl<R: Into<Reason>> From<Result<(), R>> for Answer {
    fn from(value: Result<(), R>) -> Self {
        match value {
            Ok(()) => Self::Allowed,
            Err(reason) => Self::Denied(reason.into()),
        }
    }
}

impl Display for Answer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allowed => f.write_str("allowed"),
            Self::Denied(reason) => write!(f, "denied: {reason}"),
        }
    }
}

/// Conversion from whatever a decision method returns into the decision the
/// dispatcher hands back.
///
/// Plain answers (anything `Into<Answer>`) never fail; `Result`s propagate
/// their error through `E` unchanged.
pub trait IntoDecision<E> {
    /// Turn this return value into a decision.
    fn into_decision(self) -> Result<Answer, E>;
}

impl<E> IntoDecision<E> for Answer {
    fn into_decision(self) -> Result<Answer, E> {
        Ok(self)
    }
}

impl<E> IntoDecision<E> for bool {
    fn into_decision(self) -> Result<Answer, E> {
        Ok(self.into())
    }
}

impl<E> IntoDecision<E> for Reason {
    fn into_decision(self) -> Result<Answer, E> {
        Ok(self.into())
    }
}

impl<E> IntoDecision<E> for &'static str {
    fn into_decision(self) -> Result<Answer, E> {
        Ok(self.into())
    }
}

impl<E> IntoDecision<E> for String {
    fn into_decision(self) -> Result<Answer, E> {
        Ok(self.into())
    }
}

impl<A, F, E> IntoDecision<E> for Result<A, F>
where
    A: Into<Answer>,
    F: Into<E>,
{
    fn into_decision(self) -> Result<Answer, E> {
        self.map(Into::into).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_only_treats_allowed_as_success() {
        assert!(Answer::allow().is_allowed());
        assert!(!Answer::deny("nope").is_allowed());
        assert!(!Answer::from(false).is_allowed());
        assert!(!Answer::from(String::new()).is_allowed());
    }

    #[test]
    fn it_exposes_reason_only_when_denied() {
        assert_eq!(Answer::Allowed.reason(), None);
        assert_eq!(
            Answer::deny("not owner").reason(),
            Some(&Reason::new("not owner"))
        );
    }

    #[test]
    fn it_converts_unit_results() {
        let allowed: Answer = Ok::<(), &'static str>(()).into();
        let denied: Answer = Err::<(), _>("locked").into();

        assert_eq!(allowed, Answer::Allowed);
        assert_eq!(denied, Answer::deny("locked"));
    }

    #[test]
    fn it_propagates_errors_through_decisions() {
        #[derive(Debug, PartialEq)]
        struct Broken;

        let failed: Result<Answer, Broken> = Err::<bool, Broken>(Broken).into_decision();
        assert_eq!(failed, Err(Broken));

        let plain: Result<Answer, Broken> = "archived".into_decision();
        assert_eq!(plain, Ok(Answer::deny("archived")));
    }
}
