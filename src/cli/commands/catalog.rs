use crate::api::ApiClient;
use crate::cli::commands::{confirm, report, with_session, Console};
use crate::cli::CatalogCommand;
use crate::workflows::CatalogService;
use anyhow::Result;
use std::sync::Arc;

/// Beans and forms share the same name-only record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Beans,
    Forms,
}

impl CatalogKind {
    fn title(&self) -> &'static str {
        match self {
            CatalogKind::Beans => "🫘 BEANS",
            CatalogKind::Forms => "📦 FORMS",
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            CatalogKind::Beans => "bean",
            CatalogKind::Forms => "form",
        }
    }
}

pub struct CatalogCommandRunner {
    pub kind: CatalogKind,
    pub command: CatalogCommand,
}

impl CatalogCommandRunner {
    pub fn new(kind: CatalogKind, command: CatalogCommand) -> Self {
        Self { kind, command }
    }

    pub async fn execute(&self, console: &Console) -> Result<()> {
        if let CatalogCommand::Delete { id, yes } = &self.command {
            let prompt = format!("Delete {} #{id}?", self.kind.noun());
            if !confirm(&prompt, *yes)? {
                return Ok(());
            }
        }

        with_session(console, |client, _session| async move {
            let catalog = CatalogService::new(Arc::new(client), console.cache.clone());
            self.run(&catalog).await
        })
        .await
    }

    async fn run(&self, catalog: &CatalogService<ApiClient>) -> Result<()> {
        let noun = self.kind.noun();
        match (&self.command, self.kind) {
            (CatalogCommand::List, kind) => {
                let rows: Vec<(u64, String)> = match kind {
                    CatalogKind::Beans => catalog
                        .list_beans()
                        .await
                        .map_err(report)?
                        .into_iter()
                        .map(|bean| (bean.id, bean.name))
                        .collect(),
                    CatalogKind::Forms => catalog
                        .list_forms()
                        .await
                        .map_err(report)?
                        .into_iter()
                        .map(|form| (form.id, form.name))
                        .collect(),
                };

                println!();
                println!("{}", kind.title());
                println!("──────────");
                if rows.is_empty() {
                    println!("   No {noun}s yet. Add one with 'roastery {noun}s add <name>'");
                }
                for (id, name) in rows {
                    println!("   #{id:<5} {name}");
                }
            }
            (CatalogCommand::Show { id }, kind) => {
                let name = match kind {
                    CatalogKind::Beans => catalog.get_bean(*id).await.map_err(report)?.name,
                    CatalogKind::Forms => catalog.get_form(*id).await.map_err(report)?.name,
                };
                println!();
                println!("#{id} {name}");
            }
            (CatalogCommand::Add { name }, kind) => {
                let message = match kind {
                    CatalogKind::Beans => catalog.create_bean(name).await,
                    CatalogKind::Forms => catalog.create_form(name).await,
                }
                .map_err(report)?;
                println!("✅ {message}");
            }
            (CatalogCommand::Rename { id, name }, kind) => {
                let message = match kind {
                    CatalogKind::Beans => catalog.edit_bean(*id, name).await,
                    CatalogKind::Forms => catalog.edit_form(*id, name).await,
                }
                .map_err(report)?;
                println!("✅ {message}");
            }
            (CatalogCommand::Delete { id, .. }, kind) => {
                let deleted = match kind {
                    CatalogKind::Beans => catalog.delete_bean(*id).await,
                    CatalogKind::Forms => catalog.delete_form(*id).await,
                };
                deleted.map_err(report)?;
                println!("🗑️  Deleted {noun} #{id}");
            }
        }
        Ok(())
    }
}
