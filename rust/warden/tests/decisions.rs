//! Tests for targets whose dispatch is generated by `#[decisions]`.
#![cfg(feature = "macros")]

mod decisions {
    use std::fmt;
    use testresult::TestResult;
    use warden::{
        Action, Answer, Arguments, Authorizer, Can, Cannot, DispatchError, Outcome, Target, args,
        decisions,
    };

    #[derive(Debug, Clone, PartialEq)]
    struct User {
        id: u32,
    }

    #[derive(Debug, Clone)]
    struct Resource {
        owner: User,
        archived: bool,
    }

    #[decisions]
    impl Resource {
        fn authorize_to_show(&self) -> bool {
            !self.archived
        }

        fn authorize_to_update(&self, user: &User) -> Answer {
            if *user == self.owner {
                Answer::Allowed
            } else {
                Answer::deny("not owner")
            }
        }

        fn authorize_to_transfer(&self, user: User, #[keyed] to: &User) -> Answer {
            if user != self.owner {
                Answer::deny("not owner")
            } else if to.id == user.id {
                Answer::deny("already owner")
            } else {
                Answer::Allowed
            }
        }

        fn authorize_to_archive(
            &self,
            user: &User,
            note: Option<&String>,
            #[keyed] force: Option<bool>,
        ) -> Answer {
            let check = || -> Result<(), &'static str> {
                if *user != self.owner {
                    return Err("not owner");
                }
                if note.is_none() && !force.unwrap_or(false) {
                    return Err("archiving needs a note");
                }
                Ok(())
            };
            check().into()
        }

        // Not a decision method; left alone.
        fn owner_id(&self) -> u32 {
            self.owner.id
        }
    }

    fn resource() -> Resource {
        Resource {
            owner: User { id: 1 },
            archived: false,
        }
    }

    #[test]
    fn it_routes_actions_to_decision_methods() -> TestResult {
        let resource = resource();
        let authorizer = Authorizer::new();

        assert!(authorizer.is_allowed("show", &resource, args![])?);
        assert!(authorizer.is_allowed("update", &resource, args![User { id: 1 }])?);
        assert!(authorizer.is_denied("update", &resource, args![User { id: 2 }])?);
        assert_eq!(resource.owner_id(), 1);
        Ok(())
    }

    #[test]
    fn it_reports_missing_decision_methods() {
        let error = Authorizer::new()
            .is_allowed("destroy", &resource(), args![])
            .err();

        assert!(matches!(
            error,
            Some(DispatchError::MissingCapability { ref method, .. }) if method == "authorize_to_destroy"
        ));
    }

    #[test]
    fn it_does_not_expose_helpers_as_actions() {
        let error = Resource::decide(&resource(), &Action::new("id"), &Arguments::new()).err();
        assert!(matches!(error, Some(DispatchError::MissingCapability { .. })));

        let error = resource()
            .decide(&Action::new("owner_id"), &Arguments::new())
            .err();
        assert!(matches!(error, Some(DispatchError::MissingCapability { .. })));
    }

    #[test]
    fn it_reads_keyed_parameters_by_name() -> TestResult {
        let resource = resource();
        let authorizer = Authorizer::new().acting_as(User { id: 1 });

        assert!(authorizer.is_allowed("transfer", &resource, args![; to = User { id: 2 }])?);

        let outcome: Outcome<Can> =
            authorizer.can("transfer", &resource, args![; to = User { id: 1 }])?;
        assert_eq!(outcome.reason().map(|r| r.as_str()), Some("already owner"));
        Ok(())
    }

    #[test]
    fn it_supports_optional_parameters() -> TestResult {
        let resource = resource();
        let authorizer = Authorizer::new().acting_as(User { id: 1 });

        assert!(authorizer.is_denied("archive", &resource, args![])?);
        assert!(authorizer.is_allowed("archive", &resource, args![String::from("done")])?);
        assert!(authorizer.is_allowed("archive", &resource, args![; force = true])?);
        Ok(())
    }

    #[test]
    fn it_denies_with_the_reason_from_the_method() -> TestResult {
        let outcome: Outcome<Can> = Authorizer::new().can(
            "archive",
            &resource(),
            args![User { id: 9 }],
        )?;
        assert_eq!(outcome.reason().map(|r| r.as_str()), Some("not owner"));
        Ok(())
    }

    #[test]
    fn it_accepts_calls_without_keyed_arguments() -> TestResult {
        // `update` declares no keyed parameters; an empty keyed set is the
        // same as none at all.
        let resource = resource();
        let explicit_empty = Arguments::new().arg(User { id: 1 });
        assert!(Authorizer::new().is_allowed("update", &resource, explicit_empty)?);
        assert!(Authorizer::new().is_allowed("update", &resource, args![User { id: 1 }; ])?);
        Ok(())
    }

    #[test]
    fn it_rejects_undeclared_arguments() {
        let resource = resource();
        let authorizer = Authorizer::new();

        assert_eq!(
            authorizer
                .is_allowed("show", &resource, args![User { id: 1 }])
                .err(),
            Some(DispatchError::TooManyArguments {
                expected: 0,
                given: 1
            })
        );
        assert_eq!(
            authorizer
                .is_allowed("update", &resource, args![User { id: 1 }; force = true])
                .err(),
            Some(DispatchError::UnknownKeyword {
                key: "force".into()
            })
        );
    }

    #[test]
    fn it_rejects_missing_and_mistyped_arguments() {
        let resource = resource();
        let authorizer = Authorizer::new();

        assert_eq!(
            authorizer.is_allowed("update", &resource, args![]).err(),
            Some(DispatchError::MissingArgument { index: 0 })
        );
        assert!(matches!(
            authorizer.is_allowed("update", &resource, args![42_u32]).err(),
            Some(DispatchError::ArgumentType { .. })
        ));
        assert_eq!(
            Authorizer::new()
                .acting_as(User { id: 1 })
                .is_allowed("transfer", &resource, args![])
                .err(),
            Some(DispatchError::MissingKeyword { key: "to".into() })
        );
    }

    /// Error type for targets whose decision methods can fail.
    #[derive(Debug, PartialEq)]
    enum LedgerError {
        Dispatch(DispatchError),
        Unavailable,
    }

    impl fmt::Display for LedgerError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Dispatch(e) => write!(f, "{e}"),
                Self::Unavailable => f.write_str("ledger unavailable"),
            }
        }
    }

    impl std::error::Error for LedgerError {}

    impl From<DispatchError> for LedgerError {
        fn from(value: DispatchError) -> Self {
            Self::Dispatch(value)
        }
    }

    #[derive(Debug, Clone)]
    struct Ledger {
        online: bool,
    }

    #[decisions(error = LedgerError)]
    impl Ledger {
        fn authorize_to_write(&self) -> Result<bool, LedgerError> {
            if self.online {
                Ok(true)
            } else {
                Err(LedgerError::Unavailable)
            }
        }
    }

    #[test]
    fn it_propagates_decision_errors_unchanged() -> TestResult {
        let authorizer = Authorizer::new();

        assert!(authorizer.is_allowed("write", &Ledger { online: true }, args![])?);
        assert_eq!(
            authorizer
                .is_allowed("write", &Ledger { online: false }, args![])
                .err(),
            Some(LedgerError::Unavailable)
        );
        assert_eq!(
            authorizer
                .authorize_or_fail("write", &Ledger { online: false }, args![])
                .err()
                .map(|e| e.to_string()),
            Some("Decision error: ledger unavailable".to_string())
        );
        assert!(matches!(
            authorizer.is_allowed("read", &Ledger { online: true }, args![]).err(),
            Some(LedgerError::Dispatch(DispatchError::MissingCapability { .. }))
        ));
        Ok(())
    }

    #[test]
    fn it_propagates_decision_errors_through_outcomes() {
        let authorizer = Authorizer::new();
        let offline = Ledger { online: false };

        let can: Result<Outcome<Can>, LedgerError> = authorizer.can("write", &offline, args![]);
        assert_eq!(can.err(), Some(LedgerError::Unavailable));

        let cannot: Result<Outcome<Cannot>, LedgerError> =
            authorizer.cannot("write", &offline, args![]);
        assert_eq!(cannot.err(), Some(LedgerError::Unavailable));
    }

    #[derive(Debug, Clone)]
    struct Board {
        moderators: Vec<&'static str>,
    }

    #[decisions]
    impl Board {
        fn authorize_to_post(&self, role: &str, #[keyed] channel: Option<&str>) -> Answer {
            match channel {
                Some("announcements") if !self.moderators.iter().any(|m| *m == role) => {
                    Answer::deny("moderators only")
                }
                _ => Answer::Allowed,
            }
        }
    }

    #[test]
    fn it_borrows_text_parameters() -> TestResult {
        let board = Board {
            moderators: vec!["moderator"],
        };
        let authorizer = Authorizer::new();

        assert!(authorizer.is_allowed("post", &board, args!["guest"])?);
        assert!(authorizer.is_denied(
            "post",
            &board,
            args![String::from("guest"); channel = "announcements"]
        )?);
        assert!(authorizer.is_allowed(
            "post",
            &board,
            args!["moderator"; channel = String::from("announcements")]
        )?);
        assert!(matches!(
            authorizer.is_allowed("post", &board, args![7_u8]).err(),
            Some(DispatchError::ArgumentType { expected: "str", .. })
        ));
        Ok(())
    }
}
