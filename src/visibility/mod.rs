//! Profile visibility policy.
//!
//! [`evaluate`] is a pure function over a viewer, a subject and the
//! relationship facts between them. Rules apply in order and the first
//! match wins:
//!
//! | # | Condition                                   | Decision |
//! |---|---------------------------------------------|----------|
//! | 1 | viewer is the subject                        | Full     |
//! | 2 | subject blocked viewer, viewer not admin     | Denied   |
//! | 3 | subject is public                            | Full     |
//! | 4 | private subject, viewer admin                | Full (audited when not friends) |
//! | 5 | private subject, viewer is a friend          | Full     |
//! | 6 | otherwise                                    | Denied   |
//!
//! A denied viewer receives only [`ProfileIdentity`]: an allow-list of
//! fields needed to render a private-profile notice.

mod policy;

pub use policy::{evaluate, AccessDecision, Evaluation, ProfileIdentity};
