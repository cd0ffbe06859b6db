use std::collections::HashMap;

use serde::Serialize;
use validator::Validate;

use crate::users::{UserId, UserSummary};

pub mod controller;
pub mod view;

pub use controller::SearchController;
pub use view::{FollowButton, SearchView, UserCard};

/// A trimmed, non-empty search term.
#[derive(Debug, Clone, Validate)]
pub struct SearchQuery {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Search query must be between 1 and 100 characters"
    ))]
    pub q: String,
}

impl SearchQuery {
    /// `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let q = raw.trim();
        if q.is_empty() {
            None
        } else {
            Some(Self { q: q.to_string() })
        }
    }
}

/// Per-user boolean flags. Absent users read as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagMap(HashMap<UserId, bool>);

impl FlagMap {
    pub fn get(&self, user_id: &UserId) -> bool {
        self.0.get(user_id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, user_id: UserId, value: bool) {
        self.0.insert(user_id, value);
    }

    /// Updates an existing entry only. Returns whether one existed.
    pub fn set_if_present(&mut self, user_id: &UserId, value: bool) -> bool {
        match self.0.get_mut(user_id) {
            Some(flag) => {
                *flag = value;
                true
            }
            None => false,
        }
    }

    /// Swaps in a whole new map. Entries are never merged.
    pub fn replace(&mut self, fresh: FlagMap) {
        *self = fresh;
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.0.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(UserId, bool)> for FlagMap {
    fn from_iter<I: IntoIterator<Item = (UserId, bool)>>(iter: I) -> Self {
        FlagMap(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPhase {
    #[default]
    Idle,
    Searching,
    Results,
    Empty,
    Failed,
}

/// Everything the search page renders from.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub phase: SearchPhase,
    pub results: Vec<UserSummary>,
    pub following: FlagMap,
    pub follow_loading: FlagMap,
    /// Bumped when a search starts; older search responses are dropped.
    pub generation: u64,
    /// Bumped when the flag maps are rebuilt; older per-user responses are dropped.
    pub epoch: u64,
}
