use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::join_all;
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::{
    notify::{Notification, Notifier},
    search::{SearchPhase, SearchQuery, SearchState, SearchView},
    session::Session,
    users::{api::UsersApi, UserId, UserSummary},
};

/// Owns the state of the user search page and drives its API calls.
///
/// Operations take `&self` and may overlap on one task. The state lock is
/// never held across an await.
pub struct SearchController {
    api: Arc<dyn UsersApi>,
    session: Option<Session>,
    notifier: Notifier,
    state: Mutex<SearchState>,
}

impl SearchController {
    pub fn new(api: Arc<dyn UsersApi>, session: Option<Session>, notifier: Notifier) -> Self {
        Self {
            api,
            session,
            notifier,
            state: Mutex::new(SearchState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Keystroke handler.
    pub fn set_query(&self, query: &str) {
        self.lock().query = query.to_string();
    }

    pub fn clear_query(&self) {
        self.lock().query.clear();
    }

    pub fn snapshot(&self) -> SearchState {
        self.lock().clone()
    }

    pub fn view(&self) -> SearchView {
        SearchView::from_state(&self.lock(), self.session.as_ref())
    }

    pub fn is_following(&self, user_id: &UserId) -> bool {
        self.lock().following.get(user_id)
    }

    pub fn is_follow_loading(&self, user_id: &UserId) -> bool {
        self.lock().follow_loading.get(user_id)
    }

    /// Runs the search for the query currently typed in.
    pub async fn submit(&self) {
        let query = self.lock().query.clone();
        self.search_users(&query).await;
    }

    /// Searches users and then checks follow status for each non-self result.
    ///
    /// Blank input is ignored. A failed search keeps the previous results.
    pub async fn search_users(&self, query: &str) {
        let Some(search) = SearchQuery::new(query) else {
            return;
        };

        let generation = {
            let mut state = self.lock();
            state.query = query.to_string();

            if let Err(e) = search.validate() {
                debug!("rejected search query: {}", e);
                self.notifier.send(Notification::error(
                    "Error",
                    "Search query must be between 1 and 100 characters",
                ));
                return;
            }

            state.generation += 1;
            state.phase = SearchPhase::Searching;
            state.generation
        };

        let outcome = self.api.search_users(&search.q).await;

        let (epoch, targets) = {
            let mut state = self.lock();
            if state.generation != generation {
                debug!("dropping results of superseded search {:?}", search.q);
                return;
            }

            match outcome {
                Err(e) => {
                    error!("Error searching users: {}", e);
                    state.phase = SearchPhase::Failed;
                    self.notifier.send(Notification::error(
                        "Error",
                        "Failed to search users. Please try again.",
                    ));
                    return;
                }
                Ok(users) => {
                    info!("search {:?} returned {} users", search.q, users.len());
                    let targets = self.check_targets(&users);
                    state.phase = if users.is_empty() {
                        SearchPhase::Empty
                    } else {
                        SearchPhase::Results
                    };
                    state.results = users;
                    state
                        .following
                        .replace(targets.iter().map(|id| (id.clone(), false)).collect());
                    state
                        .follow_loading
                        .replace(targets.iter().map(|id| (id.clone(), true)).collect());
                    state.epoch += 1;
                    (state.epoch, targets)
                }
            }
        };

        join_all(
            targets
                .into_iter()
                .map(|user_id| self.check_follow_status(epoch, user_id)),
        )
        .await;
    }

    /// Users whose follow status needs checking: everyone but the viewer.
    fn check_targets(&self, users: &[UserSummary]) -> Vec<UserId> {
        match &self.session {
            None => Vec::new(),
            Some(session) => users
                .iter()
                .filter(|user| !session.is_self(&user.id))
                .map(|user| user.id.clone())
                .collect(),
        }
    }

    async fn check_follow_status(&self, epoch: u64, user_id: UserId) {
        let outcome = self.api.check_follow(&user_id).await;

        let mut state = self.lock();
        if state.epoch != epoch {
            debug!("dropping stale follow check for {}", user_id);
            return;
        }

        match outcome {
            Ok(is_following) => state.following.set(user_id.clone(), is_following),
            Err(e) => warn!("Error checking follow status for {}: {}", user_id, e),
        }
        state.follow_loading.set(user_id, false);
    }

    /// Follows or unfollows `user_id` depending on the current status.
    pub async fn handle_follow(&self, user_id: &UserId) {
        let Some(session) = &self.session else {
            self.notifier.send(Notification::error(
                "Sign in required",
                "Please sign in to follow users",
            ));
            return;
        };

        if session.is_self(user_id) {
            self.notifier
                .send(Notification::error("Error", "You cannot follow yourself"));
            return;
        }

        let (epoch, was_following) = {
            let mut state = self.lock();
            if state.follow_loading.get(user_id) {
                debug!("follow request for {} already in flight", user_id);
                return;
            }
            state.follow_loading.set(user_id.clone(), true);
            (state.epoch, state.following.get(user_id))
        };

        let outcome = if was_following {
            self.api.unfollow(user_id).await
        } else {
            self.api.follow(user_id).await
        };

        let mut state = self.lock();
        let current = state.epoch == epoch;

        match outcome {
            Ok(()) => {
                if current {
                    state.following.set(user_id.clone(), !was_following);
                } else {
                    debug!("follow maps rebuilt while updating {}", user_id);
                }

                let notification = if was_following {
                    info!("unfollowed {}", user_id);
                    Notification::info("Unfollowed", "You are no longer following this user")
                } else {
                    info!("followed {}", user_id);
                    Notification::info("Following", "You are now following this user")
                };
                self.notifier.send(notification);
            }
            Err(e) => {
                error!("Error following/unfollowing user {}: {}", user_id, e);
                self.notifier.send(Notification::error(
                    "Error",
                    "Failed to update follow status. Please try again.",
                ));
            }
        }

        if current {
            state.follow_loading.set(user_id.clone(), false);
        } else {
            state.follow_loading.set_if_present(user_id, false);
        }
    }
}
