use anyhow::Result;
use clap::Parser;
use roastery_admin::cli::commands::catalog::{CatalogCommandRunner, CatalogKind};
use roastery_admin::cli::commands::login::{LoginCommand, LogoutCommand, WhoamiCommand};
use roastery_admin::cli::commands::orders::{
    NextStatusCommand, OrderAdvanceCommand, OrderShowCommand, OrdersListCommand,
};
use roastery_admin::cli::commands::products::ProductsCommandRunner;
use roastery_admin::cli::commands::{show_getting_started, Console};
use roastery_admin::cli::{Cli, Commands, OrdersCommand};
use roastery_admin::{api_metrics, config, init_telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        // No subcommand: explain how to get going
        None => {
            return tokio::runtime::Runtime::new()?.block_on(async { show_getting_started().await })
        }
        Some(Commands::NextStatus { status }) => {
            return NextStatusCommand { status }.execute();
        }
        Some(command) => command,
    };

    let settings = config()?.clone();
    init_telemetry(&settings.observability)?;
    let console = Console::new(settings);

    let result = tokio::runtime::Runtime::new()?.block_on(async {
        match command {
            Commands::Login { email, password } => {
                LoginCommand::new(email, password).execute(&console).await
            }
            Commands::Logout => LogoutCommand.execute(&console).await,
            Commands::Whoami => WhoamiCommand.execute(&console).await,
            Commands::Orders { command } => match command {
                OrdersCommand::List {
                    status,
                    sort,
                    page,
                    limit,
                } => {
                    OrdersListCommand {
                        status,
                        sort,
                        page,
                        limit,
                    }
                    .execute(&console)
                    .await
                }
                OrdersCommand::Show { id } => OrderShowCommand { id }.execute(&console).await,
                OrdersCommand::Advance { id, yes } => {
                    OrderAdvanceCommand {
                        id,
                        auto_approve: yes,
                    }
                    .execute(&console)
                    .await
                }
            },
            Commands::Beans { command } => {
                CatalogCommandRunner::new(CatalogKind::Beans, command)
                    .execute(&console)
                    .await
            }
            Commands::Forms { command } => {
                CatalogCommandRunner::new(CatalogKind::Forms, command)
                    .execute(&console)
                    .await
            }
            Commands::Products { command } => {
                ProductsCommandRunner::new(command).execute(&console).await
            }
            Commands::NextStatus { status } => NextStatusCommand { status }.execute(),
        }
    });

    api_metrics().log_stats();
    result
}
