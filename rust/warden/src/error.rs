use crate::{Action, Argument, Arguments, Reason};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Errors raised while routing an action to a target's decision method.
///
/// These are caller errors, not denials: the target could not even be asked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The target has no decision method for the action.
    #[error("{target} does not respond to `{method}` (action `{action}`)")]
    MissingCapability {
        /// The requested action.
        action: Action,
        /// The decision method name derived from the action.
        method: String,
        /// Type name of the target.
        target: &'static str,
    },

    /// A required positional argument was not supplied.
    #[error("missing positional argument at index {index}")]
    MissingArgument {
        /// Position of the missing argument.
        index: usize,
    },

    /// A required keyed argument was not supplied.
    #[error("missing keyed argument `{key}`")]
    MissingKeyword {
        /// The missing key.
        key: String,
    },

    /// An argument was supplied with a different type than the decision
    /// method declares.
    #[error("argument `{argument}` has type `{found}`, expected `{expected}`")]
    ArgumentType {
        /// Index or key of the argument.
        argument: String,
        /// Declared type.
        expected: &'static str,
        /// Supplied type.
        found: &'static str,
    },

    /// More positional arguments than the decision method accepts.
    #[error("wrong number of arguments (given {given}, expected at most {expected})")]
    TooManyArguments {
        /// Number of positional parameters declared.
        expected: usize,
        /// Number of positional arguments supplied.
        given: usize,
    },

    /// A keyed argument the decision method does not declare.
    #[error("unknown keyed argument `{key}`")]
    UnknownKeyword {
        /// The unexpected key.
        key: String,
    },
}

/// One of the two single-fire gates on an [`Outcome`](crate::Outcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// [`Outcome::run`](crate::Outcome)
    Run,
    /// [`Outcome::otherwise`](crate::Outcome)
    Otherwise,
}

impl Display for Gate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Run => f.write_str("run"),
            Self::Otherwise => f.write_str("otherwise"),
        }
    }
}

/// Programmer errors when using an [`Outcome`](crate::Outcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    /// The gate was already used on this outcome.
    #[error("`{0}` can only be called once per outcome")]
    AlreadyRan(Gate),
}

/// Signal raised by [`Authorizer::authorize_or_fail`](crate::Authorizer::authorize_or_fail)
/// when the decision method denies the action.
///
/// Carries everything needed to explain the denial: the reason, the action,
/// the target, and the effective arguments (defaults merged with the
/// call-site arguments).
#[derive(Clone)]
pub struct Unauthorized {
    reason: Reason,
    action: Action,
    target: Argument,
    arguments: Arguments,
    message: String,
}

impl Unauthorized {
    /// Build the signal and render its message.
    pub fn new(reason: Reason, action: Action, target: Argument, arguments: Arguments) -> Self {
        let message = render(&reason, &action, &target, &arguments);
        Self {
            reason,
            action,
            target,
            arguments,
            message,
        }
    }

    /// Why the action was denied.
    pub fn reason(&self) -> &Reason {
        &self.reason
    }

    /// The denied action.
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// The target the action was denied on.
    pub fn target(&self) -> &Argument {
        &self.target
    }

    /// Effective positional arguments the decision method received.
    pub fn args(&self) -> &[Argument] {
        self.arguments.positionals()
    }

    /// Effective keyed arguments the decision method received.
    pub fn kwargs(&self) -> &BTreeMap<String, Argument> {
        self.arguments.keywords()
    }

    /// All effective arguments.
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// The rendered `Cannot [...] because ...` message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Serializable snapshot for handling and rendering layers.
    pub fn report(&self) -> DenialReport {
        DenialReport {
            reason: self.reason.clone(),
            action: self.action.clone(),
            target: format!("{:?}", self.target),
            args: self.args().iter().map(|arg| format!("{arg:?}")).collect(),
            kwargs: self
                .kwargs()
                .iter()
                .map(|(key, value)| (key.clone(), format!("{value:?}")))
                .collect(),
            message: self.message.clone(),
        }
    }
}

fn render(reason: &Reason, action: &Action, target: &Argument, arguments: &Arguments) -> String {
    let mut call = format!("{action}, {target:?}");
    for argument in arguments.positionals() {
        call.push_str(&format!(", {argument:?}"));
    }
    for (key, value) in arguments.keywords() {
        call.push_str(&format!(", {key}: {value:?}"));
    }
    format!("Cannot [{call}] because {reason}")
}

impl Debug for Unauthorized {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unauthorized")
            .field("reason", &self.reason)
            .field("action", &self.action)
            .field("target", &self.target)
            .field("arguments", &self.arguments)
            .finish()
    }
}

impl Display for Unauthorized {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for Unauthorized {}

/// Serializable form of an [`Unauthorized`] signal. Values are rendered with
/// their `Debug` representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialReport {
    /// Why the action was denied.
    pub reason: Reason,
    /// The denied action.
    pub action: Action,
    /// The target, rendered.
    pub target: String,
    /// Effective positional arguments, rendered.
    pub args: Vec<String>,
    /// Effective keyed arguments, rendered.
    pub kwargs: BTreeMap<String, String>,
    /// The rendered message.
    pub message: String,
}

/// Error type for [`Authorizer::authorize_or_fail`](crate::Authorizer::authorize_or_fail).
pub enum AuthorizeError<E: Error> {
    /// The decision method denied the action.
    Unauthorized(Unauthorized),
    /// The decision method (or dispatch to it) failed.
    Decision(E),
}

impl<E: Error> AuthorizeError<E> {
    /// The denial signal, if this is a denial.
    pub fn unauthorized(&self) -> Option<&Unauthorized> {
        match self {
            Self::Unauthorized(signal) => Some(signal),
            Self::Decision(_) => None,
        }
    }
}

impl<E: Error> Debug for AuthorizeError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized(e) => f.debug_tuple("Unauthorized").field(e).finish(),
            Self::Decision(e) => f.debug_tuple("Decision").field(e).finish(),
        }
    }
}

impl<E: Error> Display for AuthorizeError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized(e) => write!(f, "{e}"),
            Self::Decision(e) => write!(f, "Decision error: {e}"),
        }
    }
}

impl<E: Error + 'static> Error for AuthorizeError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unauthorized(e) => Some(e),
            Self::Decision(e) => Some(e),
        }
    }
}

impl<E: Error> From<Unauthorized> for AuthorizeError<E> {
    fn from(value: Unauthorized) -> Self {
        Self::Unauthorized(value)
    }
}
