use reqwest::Url;

use crate::users::UserId;

pub const SEARCH_HUB: &str = "/search";
pub const USER_SEARCH: &str = "/search/users";

/// A card on the search hub page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubSection {
    pub title: &'static str,
    pub path: &'static str,
    pub blurb: &'static str,
}

pub const HUB_SECTIONS: [HubSection; 3] = [
    HubSection {
        title: "Users",
        path: USER_SEARCH,
        blurb: "Find and follow other time travelers",
    },
    HubSection {
        title: "Posts",
        path: "/search/posts",
        blurb: "Search for historical posts by content or hashtags",
    },
    HubSection {
        title: "Historical Eras",
        path: "/search/eras",
        blurb: "Explore posts from different time periods",
    },
];

// Only used to borrow Url's query encoding; never requested.
const LOCAL_ORIGIN: &str = "http://pastforward.local";

/// Link the navbar search box navigates to. `None` for blank input.
pub fn user_search_path(query: &str) -> Option<String> {
    if query.trim().is_empty() {
        return None;
    }

    let mut url = Url::parse(LOCAL_ORIGIN).ok()?;
    url.set_path(USER_SEARCH);
    url.query_pairs_mut().append_pair("q", query);

    Some(format!("{}?{}", url.path(), url.query().unwrap_or_default()))
}

/// Extracts `q` from a user search link.
pub fn query_from_path(path: &str) -> Option<String> {
    let url = Url::parse(LOCAL_ORIGIN).ok()?.join(path).ok()?;
    if url.path() != USER_SEARCH {
        return None;
    }
    url.query_pairs()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned())
}

pub fn profile_path(user_id: &UserId) -> String {
    format!("/profile/{}", user_id)
}
