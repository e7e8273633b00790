use crate::api::{ApiClient, ClassifiedError};
use crate::cache::QueryCache;
use crate::config::RoasteryConfig;
use crate::session::{Session, SessionStore};
use crate::views::Page;
use anyhow::{Context, Result};
use std::io::Write;

pub mod catalog;
pub mod login;
pub mod orders;
pub mod products;

/// Everything a command needs to talk to the backend.
pub struct Console {
    pub settings: RoasteryConfig,
    pub sessions: SessionStore,
    pub cache: QueryCache,
}

impl Console {
    pub fn new(settings: RoasteryConfig) -> Self {
        let sessions = SessionStore::new(settings.session.file_path.clone());
        let cache = QueryCache::new(settings.cache.max_capacity, settings.cache.ttl());
        Self {
            settings,
            sessions,
            cache,
        }
    }

    pub fn anonymous_client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.settings.api).context("Failed to build API client")
    }

    pub fn page(&self, number: u32, limit: Option<u32>) -> Page {
        Page::new(number, limit.unwrap_or(self.settings.pagination.default_limit))
    }
}

/// Run `f` with an API client carrying the stored session's token.
pub async fn with_session<F, Fut, R>(console: &Console, f: F) -> Result<R>
where
    F: FnOnce(ApiClient, Session) -> Fut,
    Fut: std::future::Future<Output = Result<R>>,
{
    let session = match console.sessions.require().await {
        Ok(session) => session,
        Err(e) => {
            println!("🔒 {e}");
            return Err(e.into());
        }
    };

    print!("🔄 Connecting to {}... ", console.settings.api.base_url);
    std::io::stdout().flush()?;

    match console.anonymous_client() {
        Ok(client) => {
            println!("✅");
            f(session.authorize(client), session).await
        }
        Err(e) => {
            println!("❌");
            Err(e)
        }
    }
}

/// Print a classified failure with a follow-up hint and hand it back as an
/// error so the process exits non-zero.
pub fn report(error: ClassifiedError) -> anyhow::Error {
    println!("❌ {}", error.message);
    if error.kind.needs_login() {
        println!("   💡 Run 'roastery login' to start a new session");
    } else if error.kind.needs_refresh() {
        println!("   💡 Show the record again to load its current state");
    }
    error.into()
}

/// Ask a y/N question on stdin. `auto_approve` answers yes without asking.
pub fn confirm(prompt: &str, auto_approve: bool) -> Result<bool> {
    if auto_approve {
        return Ok(true);
    }

    print!("{prompt} [y/N]: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();

    if input != "y" && input != "yes" {
        println!("❌ Operation cancelled");
        return Ok(false);
    }
    Ok(true)
}

pub fn print_page_footer(page: Page, rows: usize) {
    println!();
    if page.is_last_page(rows) {
        println!("📄 Page {} (last page)", page.number);
    } else {
        println!(
            "📄 Page {} - use --page {} for more",
            page.number,
            page.next().number
        );
    }
}

pub async fn show_getting_started() -> Result<()> {
    println!("☕ Roastery - Operator Console");
    println!();
    println!("To get started:");
    println!("  🔑 roastery login --email you@shop.test   # Sign in");
    println!("  📋 roastery orders list                   # See incoming orders");
    println!("  🚚 roastery orders advance <id>           # Move an order forward");
    println!();
    println!("Catalog:");
    println!("  🫘 roastery beans list");
    println!("  📦 roastery forms list");
    println!("  🏷️  roastery products list");
    println!();
    println!("💡 Start with 'roastery login' to open a session!");
    Ok(())
}
