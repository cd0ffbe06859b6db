use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pastforward::{
    config::settings::Settings,
    notify::{Notification, Notifier, Variant},
    routes,
    search::{SearchController, SearchView},
    session::Session,
    users::api::HttpUsersApi,
};

enum Command {
    Search(String),
    Follow(usize),
    Open(usize),
    Clear,
    Hub,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
        let index = || rest.trim().parse::<usize>().ok();
        let cmd = match head {
            "/quit" | "/exit" => Command::Quit,
            "/clear" => Command::Clear,
            "/hub" => Command::Hub,
            "/follow" => index().map_or(Command::Unknown(line.to_string()), Command::Follow),
            "/open" => index().map_or(Command::Unknown(line.to_string()), Command::Open),
            _ if head.starts_with("/search") => match routes::query_from_path(line) {
                Some(query) => Command::Search(query),
                None => Command::Unknown(line.to_string()),
            },
            _ if head.starts_with('/') => Command::Unknown(line.to_string()),
            _ => Command::Search(line.to_string()),
        };
        Some(cmd)
    }
}

fn session_from(settings: &Settings) -> anyhow::Result<Option<Session>> {
    if let Some(token) = &settings.session_token {
        let session = Session::from_token(token, settings.jwt_secret.as_deref())
            .context("SESSION_TOKEN is not a valid session token")?;
        return Ok(Some(session));
    }
    Ok(settings.session_user_id.clone().map(Session::new))
}

fn render(view: &SearchView) {
    match view {
        SearchView::Prompt => {
            println!("Search for users");
            println!("Enter a name or username to find users to follow.");
        }
        SearchView::Searching => println!("Searching..."),
        SearchView::NoMatches { query } => {
            println!("No users found for {:?}", query);
            println!("No users match your search criteria. Try a different search term.");
        }
        SearchView::Results(cards) => {
            for (i, card) in cards.iter().enumerate() {
                let counts = card.user.counts;
                println!(
                    "{:>3}. [{}] {} @{}  posts {}  followers {}  following {}  {}",
                    i + 1,
                    card.avatar_initial,
                    card.user.display_name(),
                    card.user.username,
                    counts.posts,
                    counts.followers,
                    counts.following,
                    card.follow_button.label(),
                );
            }
        }
    }
}

fn flush_notifications(rx: &mut UnboundedReceiver<Notification>) {
    while let Ok(n) = rx.try_recv() {
        let marker = match n.variant {
            Variant::Default => "*",
            Variant::Destructive => "!",
        };
        println!("{} {}: {}", marker, n.title, n.description);
    }
}

fn card_id(view: &SearchView, index: usize) -> Option<pastforward::users::UserId> {
    match view {
        SearchView::Results(cards) => index
            .checked_sub(1)
            .and_then(|i| cards.get(i))
            .map(|card| card.user.id.clone()),
        _ => None,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::new();
    let session = session_from(&settings)?;
    let api = HttpUsersApi::new(&settings, session.as_ref())?;

    match &session {
        Some(s) => info!("signed in as {}", s.user_id),
        None => info!("browsing signed out"),
    }
    info!("using API at {}", settings.api_base_url);

    let (notifier, mut notifications) = Notifier::channel();
    let controller = SearchController::new(Arc::new(api), session, notifier);

    if let Some(initial) = std::env::args().nth(1) {
        let query = routes::query_from_path(&initial).unwrap_or(initial);
        controller.search_users(&query).await;
    }
    render(&controller.view());
    flush_notifications(&mut notifications);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        match command {
            Command::Quit => break,
            Command::Search(query) => controller.search_users(&query).await,
            Command::Clear => controller.clear_query(),
            Command::Hub => {
                for section in routes::HUB_SECTIONS {
                    println!("{:<16} {:<14} {}", section.title, section.path, section.blurb);
                }
                continue;
            }
            Command::Follow(n) => match card_id(&controller.view(), n) {
                Some(id) => controller.handle_follow(&id).await,
                None => println!("no result #{}", n),
            },
            Command::Open(n) => {
                match card_id(&controller.view(), n) {
                    Some(id) => println!("{}", routes::profile_path(&id)),
                    None => println!("no result #{}", n),
                }
                continue;
            }
            Command::Unknown(input) => {
                println!("unknown command: {}", input);
                continue;
            }
        }

        render(&controller.view());
        flush_notifications(&mut notifications);
    }

    Ok(())
}
