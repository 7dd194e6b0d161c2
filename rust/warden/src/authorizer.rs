use crate::{
    Action, Answer, Argument, Arguments, AuthorizeError, Can, Cannot, Outcome, Target,
    Unauthorized, Value,
};

/// Resolves an action on a target to a decision by calling the target's
/// `authorize_to_<action>` decision method.
///
/// An authorizer may carry default arguments that are passed to every
/// decision method: default positional arguments are prepended to the
/// call-site ones and default keyed arguments are overridden by call-site
/// keyed arguments with the same key. Defaults are fixed at construction, so
/// one authorizer can be shared freely between concurrent decisions.
///
/// ```
/// use warden::{args, Action, Answer, Arguments, Authorizer, DispatchError, Target};
///
/// #[derive(Debug)]
/// struct Document {
///     owner: &'static str,
/// }
///
/// impl Target for Document {
///     type Error = DispatchError;
///
///     fn decide(&self, action: &Action, arguments: &Arguments) -> Result<Answer, Self::Error> {
///         match action.as_str() {
///             "delete" => {
///                 let user = arguments.positional::<&str>(0)?;
///                 Ok(if *user == self.owner { Answer::Allowed } else { Answer::deny("not owner") })
///             }
///             _ => Err(self.missing(action)),
///         }
///     }
/// }
///
/// let document = Document { owner: "alice" };
/// let authorizer = Authorizer::new().acting_as("alice");
///
/// assert!(authorizer.is_allowed("delete", &document, args![])?);
/// assert!(Authorizer::new().is_denied("delete", &document, args!["bob"])?);
/// # Ok::<(), DispatchError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    defaults: Arguments,
}

impl Authorizer {
    /// An authorizer without default arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// An authorizer passing `defaults` to every decision method.
    pub fn with_defaults(defaults: Arguments) -> Self {
        Self { defaults }
    }

    /// Start building an authorizer with default arguments.
    pub fn builder() -> AuthorizerBuilder {
        AuthorizerBuilder::default()
    }

    /// The default arguments merged into every call.
    pub fn defaults(&self) -> &Arguments {
        &self.defaults
    }

    /// A copy of this authorizer that passes `subject` as the first
    /// positional argument to every decision method, ahead of the existing
    /// defaults.
    pub fn acting_as<S: Value>(&self, subject: S) -> Self {
        let mut defaults = Arguments::new();
        defaults.push(Argument::new(subject));
        Self {
            defaults: self.defaults.clone().merged_onto(&defaults),
        }
    }

    /// Decide `action` on `target` and wrap the answer in an outcome whose
    /// `run` block fires when the action is allowed.
    pub fn can<T, V>(
        &self,
        action: impl Into<Action>,
        target: &T,
        arguments: Arguments,
    ) -> Result<Outcome<Can, V>, T::Error>
    where
        T: Target + ?Sized,
    {
        let (answer, _) = self.authorize(&action.into(), target, arguments)?;
        Ok(Outcome::can(answer))
    }

    /// Decide `action` on `target` and wrap the answer in an outcome whose
    /// `run` block fires when the action is denied.
    pub fn cannot<T, V>(
        &self,
        action: impl Into<Action>,
        target: &T,
        arguments: Arguments,
    ) -> Result<Outcome<Cannot, V>, T::Error>
    where
        T: Target + ?Sized,
    {
        let (answer, _) = self.authorize(&action.into(), target, arguments)?;
        Ok(Outcome::cannot(answer))
    }

    /// True iff the decision method answers [`Answer::Allowed`].
    pub fn is_allowed<T>(
        &self,
        action: impl Into<Action>,
        target: &T,
        arguments: Arguments,
    ) -> Result<bool, T::Error>
    where
        T: Target + ?Sized,
    {
        let (answer, _) = self.authorize(&action.into(), target, arguments)?;
        Ok(answer.is_allowed())
    }

    /// Negation of [`Authorizer::is_allowed`].
    pub fn is_denied<T>(
        &self,
        action: impl Into<Action>,
        target: &T,
        arguments: Arguments,
    ) -> Result<bool, T::Error>
    where
        T: Target + ?Sized,
    {
        self.is_allowed(action, target, arguments).map(|allowed| !allowed)
    }

    /// Succeed if the action is allowed, otherwise fail with an
    /// [`Unauthorized`] signal carrying the reason, action, target and the
    /// effective arguments.
    ///
    /// Errors from the decision method are passed through as
    /// [`AuthorizeError::Decision`].
    pub fn authorize_or_fail<T>(
        &self,
        action: impl Into<Action>,
        target: &T,
        arguments: Arguments,
    ) -> Result<(), AuthorizeError<T::Error>>
    where
        T: Target + Clone + Value,
    {
        let action = action.into();
        let (answer, effective) = self
            .authorize(&action, target, arguments)
            .map_err(AuthorizeError::Decision)?;

        match answer {
            Answer::Allowed => Ok(()),
            Answer::Denied(reason) => {
                let signal =
                    Unauthorized::new(reason, action, Argument::new(target.clone()), effective);
                tracing::debug!(error = %signal, "authorization failed");
                Err(signal.into())
            }
        }
    }

    /// Merge defaults into `arguments` and ask `target` to decide `action`.
    /// Returns the raw answer together with the effective arguments.
    fn authorize<T>(
        &self,
        action: &Action,
        target: &T,
        arguments: Arguments,
    ) -> Result<(Answer, Arguments), T::Error>
    where
        T: Target + ?Sized,
    {
        let arguments = arguments.merged_onto(&self.defaults);
        let answer = target.decide(action, &arguments)?;

        tracing::debug!(
            %action,
            method = %action.method_name(),
            target = std::any::type_name::<T>(),
            args = arguments.positionals().len(),
            kwargs = arguments.keywords().len(),
            %answer,
            "authorization decided"
        );

        Ok((answer, arguments))
    }
}

/// Builder for an [`Authorizer`] with default arguments.
///
/// ```
/// use warden::Authorizer;
///
/// let authorizer = Authorizer::builder().arg(1_i32).arg(2_i32).keyed("x", 1_i32).build();
/// assert_eq!(authorizer.defaults().positionals().len(), 2);
/// assert!(authorizer.defaults().get_keyed("x").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AuthorizerBuilder {
    defaults: Arguments,
}

impl AuthorizerBuilder {
    /// Add a default positional argument.
    pub fn arg<T: Value>(mut self, value: T) -> Self {
        self.defaults = self.defaults.arg(value);
        self
    }

    /// Add a default keyed argument.
    pub fn keyed<T: Value>(mut self, key: impl Into<String>, value: T) -> Self {
        self.defaults = self.defaults.keyed(key, value);
        self
    }

    /// Finish building.
    pub fn build(self) -> Authorizer {
        Authorizer::with_defaults(self.defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DispatchError, args};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use testresult::TestResult;

    /// Records what it was asked and answers with a fixed value.
    #[derive(Debug)]
    struct Recorder {
        answer: Answer,
        calls: Mutex<Vec<(String, Vec<i32>, Vec<(String, i32)>)>>,
    }

    impl Recorder {
        fn answering(answer: impl Into<Answer>) -> Self {
            Self {
                answer: answer.into(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn last_call(&self) -> Option<(String, Vec<i32>, Vec<(String, i32)>)> {
            self.calls.lock().ok()?.last().cloned()
        }
    }

    impl Target for Recorder {
        type Error = DispatchError;

        fn decide(&self, action: &Action, arguments: &Arguments) -> Result<Answer, Self::Error> {
            let positional = arguments
                .positionals()
                .iter()
                .filter_map(|arg| arg.downcast_ref::<i32>().copied())
                .collect();
            let keyed = arguments
                .keywords()
                .iter()
                .filter_map(|(key, arg)| arg.downcast_ref::<i32>().map(|v| (key.clone(), *v)))
                .collect();
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((action.method_name(), positional, keyed));
            }
            Ok(self.answer.clone())
        }
    }

    /// A target without any decision methods.
    #[derive(Debug, Clone)]
    struct Blank;

    impl Target for Blank {
        type Error = DispatchError;

        fn decide(&self, action: &Action, _: &Arguments) -> Result<Answer, Self::Error> {
            Err(self.missing(action))
        }
    }

    #[test]
    fn it_answers_queries_when_allowed() -> TestResult {
        let target = Recorder::answering(true);
        let authorizer = Authorizer::new();

        assert!(authorizer.is_allowed("show", &target, args![])?);
        assert!(!authorizer.is_denied("show", &target, args![])?);

        let can: Outcome<Can> = authorizer.can("show", &target, args![])?;
        let cannot: Outcome<Cannot> = authorizer.cannot("show", &target, args![])?;
        assert!(can.is_authorized());
        assert!(cannot.is_authorized());
        Ok(())
    }

    #[test]
    fn it_exposes_reason_when_denied() -> TestResult {
        let target = Recorder::answering("Unauthorized");
        let authorizer = Authorizer::new();

        assert!(!authorizer.is_allowed("show", &target, args![])?);
        assert!(authorizer.is_denied("show", &target, args![])?);

        let can: Outcome<Can> = authorizer.can("show", &target, args![])?;
        let cannot: Outcome<Cannot> = authorizer.cannot("show", &target, args![])?;
        assert_eq!(can.reason().map(|r| r.as_str()), Some("Unauthorized"));
        assert_eq!(cannot.reason().map(|r| r.as_str()), Some("Unauthorized"));
        Ok(())
    }

    #[test]
    fn it_dispatches_to_the_named_decision_method() -> TestResult {
        let target = Recorder::answering(true);
        Authorizer::new().is_allowed("show", &target, args![1, 2, 3; d = 4])?;

        assert_eq!(
            target.last_call(),
            Some((
                "authorize_to_show".to_string(),
                vec![1, 2, 3],
                vec![("d".to_string(), 4)]
            ))
        );
        Ok(())
    }

    #[test]
    fn it_merges_default_arguments() -> TestResult {
        let target = Recorder::answering(true);
        let authorizer = Authorizer::builder().arg(1).arg(2).keyed("x", 1).build();

        authorizer.is_allowed("show", &target, args![3; y = 2])?;
        assert_eq!(
            target.last_call().map(|(_, positional, keyed)| (positional, keyed)),
            Some((vec![1, 2, 3], vec![("x".into(), 1), ("y".into(), 2)]))
        );

        authorizer.is_allowed("show", &target, args![; x = 9])?;
        assert_eq!(
            target.last_call().map(|(_, positional, keyed)| (positional, keyed)),
            Some((vec![1, 2], vec![("x".into(), 9)]))
        );
        Ok(())
    }

    #[test]
    fn it_leaves_defaults_untouched_between_calls() -> TestResult {
        let target = Recorder::answering(true);
        let authorizer = Authorizer::builder().arg(1).build();

        authorizer.is_allowed("show", &target, args![2])?;
        authorizer.is_allowed("show", &target, args![])?;

        assert_eq!(
            target.last_call().map(|(_, positional, _)| positional),
            Some(vec![1])
        );
        assert_eq!(authorizer.defaults().positionals().len(), 1);
        Ok(())
    }

    #[test]
    fn it_prepends_the_acting_subject() -> TestResult {
        let target = Recorder::answering(true);
        let authorizer = Authorizer::builder().arg(2).build().acting_as(1);

        authorizer.is_allowed("show", &target, args![3])?;
        assert_eq!(
            target.last_call().map(|(_, positional, _)| positional),
            Some(vec![1, 2, 3])
        );
        Ok(())
    }

    #[test]
    fn it_fails_with_the_effective_arguments() {
        #[derive(Debug, Clone)]
        struct Locked;

        impl Target for Locked {
            type Error = DispatchError;

            fn decide(&self, _: &Action, _: &Arguments) -> Result<Answer, Self::Error> {
                Ok(Answer::deny("locked"))
            }
        }

        let authorizer = Authorizer::builder().arg(1).keyed("x", 1).build();
        let error = authorizer
            .authorize_or_fail("show", &Locked, args![2; y = 2])
            .err();

        let Some(AuthorizeError::Unauthorized(signal)) = &error else {
            panic!("expected an authorization failure, got {error:?}");
        };
        assert_eq!(signal.reason(), "locked");
        assert_eq!(signal.action(), "show");
        assert!(signal.target().is::<Locked>());
        assert_eq!(signal.args().len(), 2);
        assert_eq!(signal.kwargs().len(), 2);
        assert_eq!(
            signal.message(),
            "Cannot [show, Locked, 1, 2, x: 1, y: 2] because locked"
        );
    }

    #[test]
    fn it_propagates_missing_capabilities() {
        let error = Authorizer::new().is_allowed("destroy", &Blank, args![]).err();
        assert_eq!(
            error,
            Some(DispatchError::MissingCapability {
                action: Action::new("destroy"),
                method: "authorize_to_destroy".into(),
                target: std::any::type_name::<Blank>(),
            })
        );

        let failure = Authorizer::new().authorize_or_fail("destroy", &Blank, args![]);
        assert!(matches!(failure, Err(AuthorizeError::Decision(_))));
    }
}
