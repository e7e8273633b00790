use crate::api::{classify, sign_in, AuthApi, LoginError, Resource};
use crate::cache::QueryKey;
use crate::cli::commands::{report, with_session, Console};
use crate::session::Session;
use anyhow::Result;
use std::io::Write;

pub struct LoginCommand {
    pub email: String,
    pub password: Option<String>,
}

impl LoginCommand {
    pub fn new(email: String, password: Option<String>) -> Self {
        Self { email, password }
    }

    fn read_password(&self) -> Result<String> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }
        print!("🔑 Password: ");
        std::io::stdout().flush()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }

    pub async fn execute(&self, console: &Console) -> Result<()> {
        let password = self.read_password()?;
        let client = console.anonymous_client()?;

        println!("🔑 Signing in as {}...", self.email.trim());
        match sign_in(&client, &self.email, &password).await {
            Ok((signed_in, role)) => {
                let session = Session::new(signed_in.token, signed_in.user.email, role);
                console.sessions.save(&session).await?;
                println!("✅ Signed in as {} ({})", session.email, session.role);
                if !session.role.can_advance_orders() {
                    println!("   ℹ️  Only super admins can advance order status");
                }
                Ok(())
            }
            Err(LoginError::Api(classified)) => Err(report(classified)),
            Err(e) => {
                println!("❌ {e}");
                Err(e.into())
            }
        }
    }
}

pub struct LogoutCommand;

impl LogoutCommand {
    pub async fn execute(&self, console: &Console) -> Result<()> {
        console.sessions.clear().await?;
        console.cache.clear();
        println!("👋 Signed out");
        Ok(())
    }
}

pub struct WhoamiCommand;

impl WhoamiCommand {
    pub async fn execute(&self, console: &Console) -> Result<()> {
        with_session(console, |client, session| async move {
            let profile = console
                .cache
                .fetch(QueryKey::profile(), || client.profile())
                .await
                .map_err(|e| report(classify(&e, Resource::Profile)))?;

            println!();
            println!("👤 {} <{}>", profile.username, profile.email);
            println!("   🎭 Role: {}", session.role);
            println!(
                "   {} Account {}",
                if profile.is_active { "🟢" } else { "🔴" },
                if profile.is_active { "active" } else { "inactive" }
            );
            if let Some(created_at) = &profile.created_at {
                println!("   📅 Member since: {created_at}");
            }
            println!(
                "   🔐 Session started: {}",
                session.signed_in_at.format("%Y-%m-%d %H:%M UTC")
            );
            Ok(())
        })
        .await
    }
}
