//! Positional and keyed arguments forwarded to decision methods.
//!
//! Decision methods receive whatever the caller (and the authorizer's
//! defaults) supply: the acting subject, related entities, flags. Those
//! values are heterogeneous, so each one is stored as a shared, type-erased
//! [`Argument`] that can be downcast back to its concrete type at the
//! decision site.

use crate::DispatchError;
use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Anything that can travel as an argument: inspectable and shareable.
///
/// Blanket-implemented for every `Any + Debug + Send + Sync` type.
pub trait Value: Any + Debug + Send + Sync {
    /// View this value as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Name of the concrete type, used in error messages.
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Debug + Send + Sync> Value for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// A single shared argument value.
#[derive(Clone)]
pub struct Argument(Arc<dyn Value>);

impl Argument {
    /// Wrap a value. An `Argument` passed in is shared, not wrapped again.
    pub fn new<T: Value>(value: T) -> Self {
        if let Some(argument) = (&value as &dyn Any).downcast_ref::<Argument>() {
            return argument.clone();
        }
        Self(Arc::new(value))
    }

    /// Borrow the value as `T` if that is its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value().as_any().downcast_ref::<T>()
    }

    /// Whether the value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value().as_any().is::<T>()
    }

    /// Borrow the value as text if it is a `&'static str` or a `String`.
    pub fn as_str(&self) -> Option<&str> {
        let any = self.value().as_any();
        match any.downcast_ref::<&'static str>() {
            Some(text) => Some(*text),
            None => any.downcast_ref::<String>().map(String::as_str),
        }
    }

    /// Name of the concrete type of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.value().type_name()
    }

    // `Arc<dyn Value>` is itself a `Value`, so always go through the pointee.
    fn value(&self) -> &dyn Value {
        &*self.0
    }
}

impl Debug for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self.value(), f)
    }
}

/// Ordered positional arguments plus keyed arguments.
///
/// An empty keyed map and "no keyed arguments" are the same thing: there is
/// no way to tell them apart through this type.
///
/// ```
/// use warden::Arguments;
///
/// let arguments = Arguments::new().arg(1_u32).arg("two").keyed("draft", true);
/// assert_eq!(arguments.len(), 3);
/// assert_eq!(arguments.positionals().len(), 2);
/// assert_eq!(arguments.positional::<u32>(0).ok(), Some(&1));
/// assert_eq!(arguments.keyed_value::<bool>("draft").ok(), Some(&true));
/// ```
#[derive(Clone, Default)]
pub struct Arguments {
    positional: Vec<Argument>,
    keyed: BTreeMap<String, Argument>,
}

impl Arguments {
    /// No arguments at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg<T: Value>(mut self, value: T) -> Self {
        self.positional.push(Argument::new(value));
        self
    }

    /// Append an already wrapped positional argument.
    pub fn push(&mut self, argument: Argument) {
        self.positional.push(argument);
    }

    /// Set a keyed argument, replacing any previous value under `key`.
    pub fn keyed<T: Value>(mut self, key: impl Into<String>, value: T) -> Self {
        self.keyed.insert(key.into(), Argument::new(value));
        self
    }

    /// Set an already wrapped keyed argument.
    pub fn insert(&mut self, key: impl Into<String>, argument: Argument) {
        self.keyed.insert(key.into(), argument);
    }

    /// Number of positional and keyed arguments together.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyed.len()
    }

    /// True when there are neither positional nor keyed arguments.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyed.is_empty()
    }

    /// Positional arguments in call order.
    pub fn positionals(&self) -> &[Argument] {
        &self.positional
    }

    /// Keyed arguments ordered by key.
    pub fn keywords(&self) -> &BTreeMap<String, Argument> {
        &self.keyed
    }

    /// Raw positional argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.positional.get(index)
    }

    /// Raw keyed argument under `key`.
    pub fn get_keyed(&self, key: &str) -> Option<&Argument> {
        self.keyed.get(key)
    }

    /// Positional argument at `index`, downcast to `T`.
    pub fn positional<T: Any>(&self, index: usize) -> Result<&T, DispatchError> {
        self.positional_opt(index)?
            .ok_or(DispatchError::MissingArgument { index })
    }

    /// Positional argument at `index` if present, downcast to `T`.
    ///
    /// A present argument of the wrong type is still an error.
    pub fn positional_opt<T: Any>(&self, index: usize) -> Result<Option<&T>, DispatchError> {
        cast(self.positional.get(index), || index.to_string(), Argument::downcast_ref::<T>)
    }

    /// Positional argument at `index` as text. See [`Argument::as_str`].
    pub fn positional_str(&self, index: usize) -> Result<&str, DispatchError> {
        self.positional_str_opt(index)?
            .ok_or(DispatchError::MissingArgument { index })
    }

    /// Positional argument at `index` as text, if present.
    pub fn positional_str_opt(&self, index: usize) -> Result<Option<&str>, DispatchError> {
        cast(self.positional.get(index), || index.to_string(), Argument::as_str)
    }

    /// Keyed argument under `key`, downcast to `T`.
    pub fn keyed_value<T: Any>(&self, key: &str) -> Result<&T, DispatchError> {
        self.keyed_opt(key)?
            .ok_or_else(|| DispatchError::MissingKeyword { key: key.into() })
    }

    /// Keyed argument under `key` if present, downcast to `T`.
    pub fn keyed_opt<T: Any>(&self, key: &str) -> Result<Option<&T>, DispatchError> {
        cast(self.keyed.get(key), || key.into(), Argument::downcast_ref::<T>)
    }

    /// Keyed argument under `key` as text. See [`Argument::as_str`].
    pub fn keyed_str(&self, key: &str) -> Result<&str, DispatchError> {
        self.keyed_str_opt(key)?
            .ok_or_else(|| DispatchError::MissingKeyword { key: key.into() })
    }

    /// Keyed argument under `key` as text, if present.
    pub fn keyed_str_opt(&self, key: &str) -> Result<Option<&str>, DispatchError> {
        cast(self.keyed.get(key), || key.into(), Argument::as_str)
    }

    /// Fails when more than `limit` positional arguments were given.
    pub fn expect_at_most(&self, limit: usize) -> Result<(), DispatchError> {
        if self.positional.len() > limit {
            return Err(DispatchError::TooManyArguments {
                expected: limit,
                given: self.positional.len(),
            });
        }
        Ok(())
    }

    /// Fails on the first keyed argument whose key is not in `known`.
    ///
    /// An empty keyed set always passes.
    pub fn expect_keywords(&self, known: &[&str]) -> Result<(), DispatchError> {
        match self.keyed.keys().find(|key| !known.contains(&key.as_str())) {
            Some(key) => Err(DispatchError::UnknownKeyword { key: key.clone() }),
            None => Ok(()),
        }
    }

    /// `defaults` followed by `self`: default positionals are prepended and
    /// call-site keyed arguments win on collision.
    pub fn merged_onto(self, defaults: &Arguments) -> Arguments {
        let mut positional = defaults.positional.clone();
        positional.extend(self.positional);

        let mut keyed = defaults.keyed.clone();
        keyed.extend(self.keyed);

        Arguments { positional, keyed }
    }
}

fn cast<'a, T: ?Sized>(
    argument: Option<&'a Argument>,
    label: impl FnOnce() -> String,
    view: impl FnOnce(&'a Argument) -> Option<&'a T>,
) -> Result<Option<&'a T>, DispatchError> {
    let Some(argument) = argument else {
        return Ok(None);
    };
    match view(argument) {
        Some(value) => Ok(Some(value)),
        None => Err(DispatchError::ArgumentType {
            argument: label(),
            expected: type_name::<T>(),
            found: argument.type_name(),
        }),
    }
}

impl Debug for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        list.entries(&self.positional);
        for (key, value) in &self.keyed {
            list.entry(&format_args!("{key}: {value:?}"));
        }
        list.finish()
    }
}

/// Build [`Arguments`] from positional values, optionally followed by
/// `;` and `key = value` pairs.
///
/// ```
/// use warden::args;
///
/// let arguments = args![1_i32, 2_i32; draft = true];
/// assert_eq!(arguments.positionals().len(), 2);
/// assert!(arguments.get_keyed("draft").is_some());
///
/// let keyed_only = args![; project = "apollo"];
/// assert!(keyed_only.positionals().is_empty());
/// assert_eq!(keyed_only.len(), 1);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Arguments::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Arguments::new()$(.arg($value))+
    };
    ($($value:expr),* ; $($key:ident = $keyed:expr),* $(,)?) => {
        $crate::Arguments::new()$(.arg($value))*$(.keyed(stringify!($key), $keyed))*
    };
}
