//! Command dispatch: one handler per subcommand

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands, FlagsCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, LoginMethod};
use crate::domain::Session;
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Login { paste }) => cmd_login(container, *paste),
        Some(Commands::Logout) => cmd_logout(container),
        Some(Commands::Auth) => cmd_auth(container, false, false),
        Some(Commands::Organization) => cmd_auth(container, true, false),
        Some(Commands::Project) => cmd_auth(container, false, true),
        Some(Commands::Flags { command }) => cmd_flags(container, command),
        Some(Commands::Config { command }) => cmd_config(container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `ph --help`".to_string(),
        )),
    }
}

#[instrument(skip(container))]
fn cmd_login(container: &ServiceContainer, paste: bool) -> CliResult<()> {
    let method = if paste {
        LoginMethod::Paste
    } else {
        container.settings.login_method
    };
    let session = container.session.login(method)?;
    print_session(container, &session);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_logout(container: &ServiceContainer) -> CliResult<()> {
    container.session.logout()?;
    Ok(())
}

#[instrument(skip(container))]
fn cmd_auth(
    container: &ServiceContainer,
    switch_organization: bool,
    switch_project: bool,
) -> CliResult<()> {
    let session = container
        .session
        .auth(switch_organization, switch_project)?;
    print_session(container, &session);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_flags(container: &ServiceContainer, command: &FlagsCommands) -> CliResult<()> {
    let flags = &container.flags;
    match command {
        FlagsCommands::List => {
            flags.list()?;
        }
        FlagsCommands::Show { id } => {
            flags.show(*id)?;
        }
        FlagsCommands::Create {
            key,
            description,
            rollout,
        } => flags.create(key, description, *rollout)?,
        FlagsCommands::Update {
            key,
            description,
            rollout,
        } => flags.update(key, description.as_deref(), *rollout)?,
        FlagsCommands::Delete { key } => flags.delete(key)?,
        FlagsCommands::Enable { key } => flags.set_active(key, true)?,
        FlagsCommands::Disable { key } => flags.set_active(key, false)?,
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let rendered = container.settings.to_toml()?;
            output::info(&rendered);
        }
        ConfigCommands::Path => {
            let config_path = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(no config directory)".to_string());
            output::action("Config", &config_path);
            output::action(
                "Credentials",
                &container.session.store().path().display(),
            );
        }
    }
    Ok(())
}

fn print_session(container: &ServiceContainer, session: &Session) {
    debug!("session ready for {}", container.settings.endpoint);
    output::header(&container.settings.endpoint);
    output::action("Organization", &session.organization);
    output::action("Project", &session.project);
}
