use crate::{
    routes,
    search::{SearchPhase, SearchState},
    session::Session,
    users::UserSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowButton {
    /// Signed out, or the card is the viewer's own.
    Hidden,
    Loading,
    Following,
    Follow,
}

impl FollowButton {
    pub fn label(&self) -> &'static str {
        match self {
            FollowButton::Hidden => "",
            FollowButton::Loading => "...",
            FollowButton::Following => "Following",
            FollowButton::Follow => "Follow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCard {
    pub user: UserSummary,
    pub avatar_initial: char,
    pub profile_path: String,
    pub follow_button: FollowButton,
}

/// What the search page shows right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchView {
    Prompt,
    Searching,
    Results(Vec<UserCard>),
    NoMatches { query: String },
}

impl SearchView {
    pub fn from_state(state: &SearchState, session: Option<&Session>) -> Self {
        if state.phase == SearchPhase::Searching {
            return SearchView::Searching;
        }

        if !state.results.is_empty() {
            let cards = state
                .results
                .iter()
                .map(|user| UserCard {
                    user: user.clone(),
                    avatar_initial: user.avatar_initial(),
                    profile_path: routes::profile_path(&user.id),
                    follow_button: follow_button(state, session, user),
                })
                .collect();
            return SearchView::Results(cards);
        }

        if !state.query.is_empty() {
            return SearchView::NoMatches {
                query: state.query.clone(),
            };
        }

        SearchView::Prompt
    }
}

fn follow_button(state: &SearchState, session: Option<&Session>, user: &UserSummary) -> FollowButton {
    match session {
        None => FollowButton::Hidden,
        Some(session) if session.is_self(&user.id) => FollowButton::Hidden,
        Some(_) if state.follow_loading.get(&user.id) => FollowButton::Loading,
        Some(_) if state.following.get(&user.id) => FollowButton::Following,
        Some(_) => FollowButton::Follow,
    }
}
