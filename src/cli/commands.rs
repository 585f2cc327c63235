//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::ImportWarning;
use crate::cli::args::{Cli, Commands, ConfigCommands, Order};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{SelfParentPolicy, TraversalMode};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?,
    };

    match &cli.command {
        Some(Commands::Export {
            scene,
            output,
            viewport,
            strict,
        }) => {
            let mut settings = Settings::load(Some(&project_dir))?;
            if *strict {
                settings.self_parent = SelfParentPolicy::Reject;
            }
            let container = ServiceContainer::new(settings);
            cmd_export(&container, scene, output.as_deref(), *viewport)
        }
        Some(Commands::Tree { scene, order }) => {
            let container = ServiceContainer::new(Settings::load(Some(&project_dir))?);
            cmd_tree(&container, scene, *order)
        }
        Some(Commands::Config { command }) => cmd_config(command, &project_dir),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::InvalidArgs(
            "no command given, see --help".to_string(),
        )),
    }
}

#[instrument(skip(container))]
fn cmd_export(
    container: &ServiceContainer,
    scene: &Path,
    output: Option<&Path>,
    viewport: Option<usize>,
) -> CliResult<()> {
    let source = container.load_scene(scene)?;
    let service = container.export_service(source);

    let path: PathBuf = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| container.settings.output.clone());
    let viewport = viewport.unwrap_or(container.settings.viewport);
    debug!("export {} -> {} (viewport {})", scene.display(), path.display(), viewport);

    let result = service.export_to(&path, viewport)?;
    report_warnings(&result.warnings);
    output::success(&format!(
        "Exported {} nodes to {}",
        result.node_count - 1,
        path.display()
    ));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer, scene: &Path, order: Option<Order>) -> CliResult<()> {
    let source = container.load_scene(scene)?;
    let report = container.export_service(source).import()?;
    let tree = &report.tree;
    let root = tree
        .root()
        .map(|r| r.identifier().to_string())
        .unwrap_or_default();

    match order {
        None => output::info(&tree.show(&root)?),
        Some(order) => {
            let mode = match order {
                Order::Depth => TraversalMode::DepthFirst,
                Order::Breadth => TraversalMode::BreadthFirst,
            };
            for id in tree.traverse(&root, mode)? {
                output::info(tree.get(id)?);
            }
        }
    }
    output::detail(&format!(
        "{} nodes, depth {}",
        tree.len(),
        tree.depth(&root)?
    ));
    report_warnings(&report.warnings);
    Ok(())
}

fn cmd_config(command: &ConfigCommands, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            output::header("Config files");
            match global_config_path() {
                Some(p) => output::detail(&format!("global: {}", p.display())),
                None => output::detail("global: <no config directory>"),
            }
            output::detail(&format!(
                "local:  {}",
                local_config_path(project_dir).display()
            ));
        }
    }
    Ok(())
}

fn report_warnings(warnings: &[ImportWarning]) {
    for warning in warnings {
        output::warning(warning);
    }
}
