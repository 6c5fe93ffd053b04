//! Role router: decides what the page shows for an auth state.

use uuid::Uuid;

use crate::client::view::{user_label, Panel, ViewState};
use crate::contract::model::{AuthUser, Profile};

/// Outcome of fetching the signed-in user's profile document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLookup {
    Found(Profile),
    Missing,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    SignedOut,
    Dashboard {
        uid: Uuid,
        label: String,
        panel: Panel,
        /// Only the user panel runs the roster feed.
        start_feed: bool,
    },
    /// The profile could not be loaded; the session must be ended.
    ForceSignOut { reason: String },
}

pub fn route(auth: Option<(&AuthUser, ProfileLookup)>) -> RouteDecision {
    let Some((user, lookup)) = auth else {
        return RouteDecision::SignedOut;
    };
    match lookup {
        ProfileLookup::Found(profile) => {
            let panel = Panel::from(profile.role());
            RouteDecision::Dashboard {
                uid: user.uid,
                label: user_label(&profile.email, &profile.role),
                panel,
                start_feed: panel == Panel::User,
            }
        }
        ProfileLookup::Missing => RouteDecision::ForceSignOut {
            reason: format!("no profile document for {}", user.uid),
        },
        ProfileLookup::Failed(reason) => RouteDecision::ForceSignOut { reason },
    }
}

/// Apply a decision to the view. Signed-out states reset the dashboard.
pub fn apply(view: &mut ViewState, decision: &RouteDecision) {
    match decision {
        RouteDecision::Dashboard { label, panel, .. } => {
            view.user_label = label.clone();
            view.auth_visible = false;
            view.dashboard_visible = true;
            view.panel = *panel;
        }
        RouteDecision::SignedOut | RouteDecision::ForceSignOut { .. } => {
            view.auth_visible = true;
            view.dashboard_visible = false;
            view.user_label.clear();
            view.students.clear();
            view.panel = Panel::User;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::view::StudentRow;
    use crate::client::view::RowAction;

    fn user() -> AuthUser {
        AuthUser {
            uid: Uuid::new_v4(),
            email: "ada@example.com".into(),
        }
    }

    fn profile(role: &str) -> Profile {
        Profile {
            email: "ada@example.com".into(),
            role: role.into(),
        }
    }

    #[test]
    fn no_session_is_signed_out() {
        assert_eq!(route(None), RouteDecision::SignedOut);
    }

    #[test]
    fn user_profile_gets_user_panel_and_feed() {
        let u = user();
        let d = route(Some((&u, ProfileLookup::Found(profile("user")))));
        assert_eq!(
            d,
            RouteDecision::Dashboard {
                uid: u.uid,
                label: "ada@example.com (user)".into(),
                panel: Panel::User,
                start_feed: true,
            }
        );
    }

    #[test]
    fn admin_profile_gets_admin_panel_without_feed() {
        let u = user();
        match route(Some((&u, ProfileLookup::Found(profile("admin"))))) {
            RouteDecision::Dashboard {
                panel, start_feed, label, ..
            } => {
                assert_eq!(panel, Panel::Admin);
                assert!(!start_feed);
                assert_eq!(label, "ada@example.com (admin)");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_role_is_treated_as_user() {
        let u = user();
        match route(Some((&u, ProfileLookup::Found(profile("editor"))))) {
            RouteDecision::Dashboard { panel, label, .. } => {
                assert_eq!(panel, Panel::User);
                assert_eq!(label, "ada@example.com (editor)");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_or_failed_profile_forces_sign_out() {
        let u = user();
        assert!(matches!(
            route(Some((&u, ProfileLookup::Missing))),
            RouteDecision::ForceSignOut { .. }
        ));
        assert_eq!(
            route(Some((&u, ProfileLookup::Failed("offline".into())))),
            RouteDecision::ForceSignOut {
                reason: "offline".into()
            }
        );
    }

    #[test]
    fn signed_out_resets_dashboard() {
        let mut view = ViewState::default();
        apply(
            &mut view,
            &RouteDecision::Dashboard {
                uid: Uuid::new_v4(),
                label: "a (admin)".into(),
                panel: Panel::Admin,
                start_feed: false,
            },
        );
        assert!(!view.auth_visible);
        assert!(view.dashboard_visible);
        view.students.push(StudentRow {
            id: Uuid::new_v4(),
            label: "x".into(),
            actions: [RowAction::Edit, RowAction::Delete],
        });

        apply(&mut view, &RouteDecision::SignedOut);
        assert!(view.auth_visible);
        assert!(!view.dashboard_visible);
        assert!(view.students.is_empty());
        assert_eq!(view.panel, Panel::User);
        assert!(view.user_label.is_empty());
    }
}
