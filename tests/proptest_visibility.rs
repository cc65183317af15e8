//! Property-based tests for visibility precedence.
//!
//! These tests verify, over arbitrary flag combinations:
//! - Owner override: a user always sees their own profile
//! - Block dominance: a block from the subject denies non-admins
//! - Public default: an unblocking public subject is always visible
//! - Admin audit: only non-friend admin views of private profiles are flagged

use proptest::prelude::*;
use verdant_core::directory::{Role, User};
use verdant_core::relationship::UserId;
use verdant_core::visibility::{evaluate, AccessDecision};

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Member), Just(Role::Admin)]
}

prop_compose! {
    fn user_strategy()(
        roles in prop::collection::btree_set(role_strategy(), 0..2),
        is_private in any::<bool>(),
        disable_friend_requests in any::<bool>(),
    ) -> User {
        let mut user = User::new(UserId::new(), "Quince")
            .private(is_private)
            .refusing_requests(disable_friend_requests);
        user.roles = roles;
        user
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn owner_override(
        user in user_strategy(),
        blocked in any::<bool>(),
        friends in any::<bool>(),
    ) {
        let result = evaluate(&user, &user, blocked, friends);
        prop_assert_eq!(result.decision, AccessDecision::Full);
        prop_assert!(!result.admin_bypass_non_friend);
    }

    #[test]
    fn block_dominance(
        viewer in user_strategy(),
        subject in user_strategy(),
        friends in any::<bool>(),
    ) {
        prop_assume!(!viewer.is_admin());
        let result = evaluate(&viewer, &subject, true, friends);
        prop_assert_eq!(result.decision, AccessDecision::Denied);
    }

    #[test]
    fn public_default(
        viewer in user_strategy(),
        subject in user_strategy(),
        friends in any::<bool>(),
    ) {
        let subject = subject.private(false);
        let result = evaluate(&viewer, &subject, false, friends);
        prop_assert_eq!(result.decision, AccessDecision::Full);
        prop_assert!(!result.admin_bypass_non_friend);
    }

    #[test]
    fn admin_bypass_flag_only_for_private_non_friends(
        viewer in user_strategy(),
        subject in user_strategy(),
        blocked in any::<bool>(),
        friends in any::<bool>(),
    ) {
        let result = evaluate(&viewer, &subject, blocked, friends);
        let expected = viewer.is_admin() && subject.is_private && !friends;
        prop_assert_eq!(result.admin_bypass_non_friend, expected);
        if viewer.is_admin() {
            prop_assert_eq!(result.decision, AccessDecision::Full);
        }
    }

    #[test]
    fn private_profile_needs_friendship_or_admin(
        viewer in user_strategy(),
        subject in user_strategy(),
        blocked in any::<bool>(),
        friends in any::<bool>(),
    ) {
        let subject = subject.private(true);
        let result = evaluate(&viewer, &subject, blocked, friends);
        let expected = if viewer.is_admin() || (friends && !blocked) {
            AccessDecision::Full
        } else {
            AccessDecision::Denied
        };
        prop_assert_eq!(result.decision, expected);
    }
}
