//! Command dispatch: settings, container and the selected subcommand.

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::{output, repl};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{DomainError, TopicId, TreeNodeConvert};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Execute the parsed command line.
#[instrument(level = "debug", skip(cli))]
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Some(Commands::Completion { shell }) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let project_dir = project_dir(cli)?;
    let mut settings = Settings::load(Some(&project_dir))?;
    if let Some(seed) = &cli.seed {
        settings.seed_file = Some(seed.clone());
    }
    debug!("settings: seed_file={:?}", settings.seed_file);

    if let Some(Commands::Config { command }) = &cli.command {
        return execute_config(command, &settings, &project_dir);
    }

    let container = ServiceContainer::new(settings);
    match cli.command.as_ref().unwrap_or(&Commands::Explore) {
        Commands::Explore => explore(&container),
        Commands::Tree => {
            let tree = container.load_tree()?;
            output::info(&tree.forest().to_tree_string());
            Ok(())
        }
        Commands::Path { id } => show_path(&container, id),
        Commands::Dump => {
            let tree = container.load_tree()?;
            let json = serde_json::to_string_pretty(&tree.snapshot())
                .map_err(|e| CliError::Usage(format!("serialize tree: {e}")))?;
            output::info(&json);
            Ok(())
        }
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| CliError::from(InfraError::io("get current directory", e))),
    }
}

fn explore(container: &ServiceContainer) -> CliResult<()> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| InfraError::io("start async runtime", e))?;
    runtime.block_on(repl::run(container))
}

fn show_path(container: &ServiceContainer, raw_id: &str) -> CliResult<()> {
    let id: TopicId = raw_id.parse()?;
    let tree = container.load_tree()?;
    if tree.lookup_by_id(&id).is_none() {
        return Err(DomainError::TopicNotFound(id.to_string()).into());
    }
    let path = tree.full_path(&id);
    if path.is_empty() {
        output::warning(&format!("{id} is outside the first root's tree"));
    }
    for entry in path {
        output::detail(&format!("{:<10} {}", entry.id, entry.prompt));
    }
    Ok(())
}

fn execute_config(
    command: &ConfigCommands,
    settings: &Settings,
    project_dir: &std::path::Path,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("no global config directory".into()))?
            } else {
                local_config_path(project_dir)
            };
            let fs = RealFileSystem;
            if fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            fs.ensure_parent(&path)
                .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;
            fs.write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::detail(&format!(
                    "global: {} {}",
                    path.display(),
                    exists_marker(path.exists())
                )),
                None => output::detail(&"global: (no config directory)"),
            }
            let local = local_config_path(project_dir);
            output::detail(&format!(
                "local:  {} {}",
                local.display(),
                exists_marker(local.exists())
            ));
            Ok(())
        }
    }
}

fn exists_marker(exists: bool) -> &'static str {
    if exists {
        "(exists)"
    } else {
        "(not found)"
    }
}
