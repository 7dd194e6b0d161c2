//! Chainable outcome of an authorization decision.
//!
//! An [`Outcome`] pairs a decision [`Answer`] with a polarity: [`Can`]
//! outcomes run their block when the action is allowed, [`Cannot`] outcomes
//! when it is denied. `otherwise` covers the opposite case, so callers can
//! branch on a decision without writing the conditional themselves:
//!
//! ```
//! use warden::{Answer, Outcome};
//!
//! let label = Outcome::can(Answer::deny("archived"))
//!     .run(|| "edit".to_string())?
//!     .otherwise(|reason| format!("locked: {reason}"))?
//!     .into_value();
//!
//! assert_eq!(label.as_deref(), Some("locked: archived"));
//! # Ok::<(), warden::UsageError>(())
//! ```
//!
//! Each of `run` and `otherwise` fires at most once per outcome; calling
//! either a second time is a [`UsageError`].

use crate::{Answer, Gate, Reason, UsageError};
use std::fmt::{Debug, Display, Formatter};
use std::marker::PhantomData;

/// Which case an outcome's `run` block is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolarityKind {
    /// `run` fires when allowed.
    Can,
    /// `run` fires when denied.
    Cannot,
}

impl Display for PolarityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Can => f.write_str("can"),
            Self::Cannot => f.write_str("cannot"),
        }
    }
}

/// Type-level polarity of an [`Outcome`].
pub trait Polarity: sealed::Sealed {
    /// Runtime view of this polarity.
    const KIND: PolarityKind;
}

/// Polarity of outcomes whose `run` block fires when the action is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Can;

/// Polarity of outcomes whose `run` block fires when the action is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cannot;

impl Polarity for Can {
    const KIND: PolarityKind = PolarityKind::Can;
}

impl Polarity for Cannot {
    const KIND: PolarityKind = PolarityKind::Cannot;
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Can {}
    impl Sealed for super::Cannot {}
}

/// Outcome of an authorization decision with polarity `P`, capturing the
/// value of whichever attached block ran as `V`.
pub struct Outcome<P: Polarity, V = ()> {
    answer: Answer,
    ran: bool,
    otherwise_ran: bool,
    value: Option<V>,
    polarity: PhantomData<P>,
}

impl<V> Outcome<Can, V> {
    /// Outcome whose `run` block fires when `answer` allows the action.
    pub fn can(answer: impl Into<Answer>) -> Self {
        Self::new(answer.into())
    }

    /// Run `block` if the action is allowed, capturing its return value.
    pub fn run(self, block: impl FnOnce() -> V) -> Result<Self, UsageError> {
        self.fire(Gate::Run, |reason| match reason {
            None => Some(block()),
            Some(_) => None,
        })
    }

    /// Run `block` with the reason if the action is denied, capturing its
    /// return value.
    pub fn otherwise(self, block: impl FnOnce(&Reason) -> V) -> Result<Self, UsageError> {
        self.fire(Gate::Otherwise, |reason| reason.map(block))
    }
}

impl<V> Outcome<Cannot, V> {
    /// Outcome whose `run` block fires when `answer` denies the action.
    pub fn cannot(answer: impl Into<Answer>) -> Self {
        Self::new(answer.into())
    }

    /// Run `block` with the reason if the action is denied, capturing its
    /// return value.
    pub fn run(self, block: impl FnOnce(&Reason) -> V) -> Result<Self, UsageError> {
        self.fire(Gate::Run, |reason| reason.map(block))
    }

    /// Run `block` if the action is allowed, capturing its return value.
    pub fn otherwise(self, block: impl FnOnce() -> V) -> Result<Self, UsageError> {
        self.fire(Gate::Otherwise, |reason| match reason {
            None => Some(block()),
            Some(_) => None,
        })
    }
}

impl<P: Polarity, V> Outcome<P, V> {
    fn new(answer: Answer) -> Self {
        Self {
            answer,
            ran: false,
            otherwise_ran: false,
            value: None,
            polarity: PhantomData,
        }
    }

    /// Close `gate`, then hand the denial reason (or `None` when allowed) to
    /// `block`, which returns a value only if it ran.
    fn fire(
        mut self,
        gate: Gate,
        block: impl FnOnce(Option<&Reason>) -> Option<V>,
    ) -> Result<Self, UsageError> {
        let closed = match gate {
            Gate::Run => &mut self.ran,
            Gate::Otherwise => &mut self.otherwise_ran,
        };
        if *closed {
            return Err(UsageError::AlreadyRan(gate));
        }
        *closed = true;

        match block(self.answer.reason()) {
            Some(value) => {
                tracing::trace!(polarity = %P::KIND, %gate, "outcome block ran");
                self.value = Some(value);
            }
            None => tracing::trace!(polarity = %P::KIND, %gate, "outcome block skipped"),
        }
        Ok(self)
    }

    /// True iff the decision allowed the action, whatever the polarity.
    pub fn is_authorized(&self) -> bool {
        self.answer.is_allowed()
    }

    /// The denial reason, if the action was denied.
    pub fn reason(&self) -> Option<&Reason> {
        self.answer.reason()
    }

    /// The raw decision answer.
    pub fn answer(&self) -> &Answer {
        &self.answer
    }

    /// Value returned by the block that ran, if any.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Consume the outcome, keeping the captured value.
    pub fn into_value(self) -> Option<V> {
        self.value
    }

    /// Which case `run` fires for.
    pub fn polarity(&self) -> PolarityKind {
        P::KIND
    }
}

impl<P: Polarity, V: Debug> Debug for Outcome<P, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outcome")
            .field("polarity", &P::KIND)
            .field("answer", &self.answer)
            .field("ran", &self.ran)
            .field("otherwise_ran", &self.otherwise_ran)
            .field("value", &self.value)
            .finish()
    }
}
