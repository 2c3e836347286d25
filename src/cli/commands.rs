//! Command dispatch: one handler per subcommand.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::export::{self, ExportFormat};
use crate::application::services::Outcome;
use crate::cli::args::{AttributeArg, Cli, Commands, ConfigCommands, EdgeCommands, NodeCommands};
use crate::cli::output;
use crate::cli::view::{node_label, tree_view};
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    attributes_from_entries, groups_of, Attributes, DomainError, EdgeMode, NewNode, NodeEdit,
    NodeId,
};
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Run the parsed command line, returning the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(exitcode::OK);
    };

    match command {
        Commands::Config { command } => return cmd_config(command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(exitcode::OK);
        }
        _ => {}
    }

    let container = ServiceContainer::new(load_settings(cli)?);
    debug!("document: {}", container.tree.location());

    match command {
        Commands::Init { force } => cmd_init(&container, *force),
        Commands::Show => cmd_show(&container),
        Commands::Check => cmd_check(&container),
        Commands::Node { command } => cmd_node(&container, command),
        Commands::Edge { command } => cmd_edge(&container, command),
        Commands::Export { format, output: target } => {
            cmd_export(&container, (*format).into(), target.as_deref())
        }
        Commands::Import { file } => cmd_import(&container, file),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(exitcode::OK),
    }
}

fn current_dir() -> CliResult<PathBuf> {
    Ok(std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?)
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let cwd = current_dir()?;
    let mut settings = Settings::load(Some(&cwd))?;
    if let Some(document) = &cli.document {
        settings.document_path = document.clone();
    }
    Ok(settings)
}

/// Print the diagnostics and a success line, return OK.
fn finish<T>(outcome: &Outcome<T>, message: impl std::fmt::Display) -> CliResult<i32> {
    output::diagnostics(&outcome.diagnostics);
    output::success(&message);
    Ok(exitcode::OK)
}

fn to_attributes(attrs: &[AttributeArg]) -> CliResult<Attributes> {
    let entries = attrs
        .iter()
        .map(|a| (a.name.as_str(), a.value.as_str(), a.display_in_tree));
    Ok(attributes_from_entries(entries)?)
}

// ============================================================
// Document commands
// ============================================================

#[instrument(skip(container))]
fn cmd_init(container: &ServiceContainer, force: bool) -> CliResult<i32> {
    if container.tree.exists()? && !force {
        return Err(CliError::Usage(format!(
            "document already exists: {} (use --force to overwrite)",
            container.tree.location()
        )));
    }
    let document = container.tree.reset()?;
    output::action("Created", &container.tree.location());
    if let Some(root) = document.root() {
        output::detail(&format!("root: {} ({})", root.name, root.id));
    }
    Ok(exitcode::OK)
}

fn cmd_show(container: &ServiceContainer) -> CliResult<i32> {
    let outcome = container.tree.load()?;
    match tree_view(&outcome.value) {
        Some(tree) => output::info(&tree),
        None => output::warning("document has no root node"),
    }
    output::diagnostics(&outcome.diagnostics);
    Ok(exitcode::OK)
}

fn cmd_check(container: &ServiceContainer) -> CliResult<i32> {
    let outcome = container.tree.load()?;
    if outcome.has_warnings() {
        output::diagnostics(&outcome.diagnostics);
        return Ok(exitcode::FINDINGS);
    }
    output::success(&format!(
        "{}: {} nodes, {} edges, no findings",
        container.tree.location(),
        outcome.value.nodes.len(),
        outcome.value.edges.len()
    ));
    Ok(exitcode::OK)
}

#[instrument(skip(container))]
fn cmd_export(
    container: &ServiceContainer,
    format: ExportFormat,
    output_path: Option<&Path>,
) -> CliResult<i32> {
    let outcome = container.tree.load()?;
    let document = &outcome.value;
    let rendered = export::render(format, &document.nodes, &document.edges)?;

    if output_path == Some(Path::new("-")) {
        print!("{rendered}");
        return Ok(exitcode::OK);
    }
    let target = match output_path {
        Some(path) => path.to_path_buf(),
        None => container.settings.export_dir.join(format.file_name()),
    };
    container
        .fs
        .ensure_parent(&target)
        .map_err(|e| InfraError::io(format!("create {}", target.display()), e))?;
    container
        .fs
        .write(&target, &rendered)
        .map_err(|e| InfraError::io(format!("write {}", target.display()), e))?;

    output::diagnostics(&outcome.diagnostics);
    output::action("Exported", &target.display());
    if format == ExportFormat::Dot {
        output::detail(&format!("render with: dot -Tsvg {} -o attack_tree.svg", target.display()));
    }
    Ok(exitcode::OK)
}

#[instrument(skip(container))]
fn cmd_import(container: &ServiceContainer, file: &Path) -> CliResult<i32> {
    let content = container
        .fs
        .read_to_string(file)
        .map_err(|e| InfraError::io(format!("read {}", file.display()), e))?;
    let outcome = container.tree.import(&content, file)?;
    finish(
        &outcome,
        format!(
            "imported {} nodes, {} edges from {}",
            outcome.value.nodes.len(),
            outcome.value.edges.len(),
            file.display()
        ),
    )
}

// ============================================================
// Node commands
// ============================================================

fn cmd_node(container: &ServiceContainer, command: &NodeCommands) -> CliResult<i32> {
    let tree = &container.tree;
    match command {
        NodeCommands::Add {
            name,
            parent,
            probability,
            group,
            mode,
            attrs,
        } => {
            let mut new = NewNode::new(
                name.as_str(),
                NodeId::from(parent.as_str()),
                probability.as_str(),
            )
            .with_mode((*mode).into())
            .with_attributes(to_attributes(attrs)?);
            if let Some(group) = group {
                new = new.with_group(group.as_str());
            }
            let outcome = tree.add_node(new)?;
            finish(&outcome, format!("added '{}' ({})", name.trim(), outcome.value))
        }
        NodeCommands::Rename { node, new_name } => {
            let outcome = tree.rename_node(node, new_name)?;
            if outcome.value {
                finish(&outcome, format!("renamed '{node}' to '{}'", new_name.trim()))
            } else {
                finish(&outcome, "name unchanged")
            }
        }
        NodeCommands::Delete { node } => {
            let outcome = tree.delete_node(node)?;
            output::diagnostics(&outcome.diagnostics);
            let deleted = &outcome.value;
            output::success(&format!("deleted '{}'", deleted.node.name));
            if let Some(parent) = &deleted.new_parent {
                for child in &deleted.reparented {
                    output::success_detail(&format!("{child} moved to {parent}"));
                }
            }
            Ok(exitcode::OK)
        }
        NodeCommands::Move { node, new_parent } => {
            let outcome = tree.reparent_node(node, new_parent)?;
            if outcome.value {
                finish(&outcome, format!("moved '{node}' below '{new_parent}'"))
            } else {
                finish(&outcome, "parent unchanged")
            }
        }
        NodeCommands::Group { node, group } => {
            let outcome = tree.set_node_group(node, Some(group.as_str()))?;
            finish(&outcome, format!("group of '{node}' is now '{}'", group.trim()))
        }
        NodeCommands::Attrs { node, attrs } => {
            let outcome = tree.set_node_attributes(node, to_attributes(attrs)?)?;
            finish(&outcome, format!("'{node}' has {} attributes", attrs.len()))
        }
        NodeCommands::Edit {
            node,
            name,
            parent,
            mode,
            group,
            attrs,
            clear_attrs,
        } => {
            let attributes = if *clear_attrs {
                Some(Attributes::new())
            } else if attrs.is_empty() {
                None
            } else {
                Some(to_attributes(attrs)?)
            };
            let edit = NodeEdit {
                name: name.clone(),
                parent: parent.as_deref().map(NodeId::from),
                mode: mode.map(EdgeMode::from),
                group: group.clone(),
                attributes,
            };
            let outcome = tree.edit_node(node, edit)?;
            finish(&outcome, format!("updated '{node}'"))
        }
        NodeCommands::Show { node } => cmd_node_show(container, node),
        NodeCommands::List => {
            let outcome = tree.load()?;
            for node in &outcome.value.nodes {
                output::info(&format!("{}\t{}", node.id, node.name));
            }
            Ok(exitcode::OK)
        }
    }
}

fn cmd_node_show(container: &ServiceContainer, reference: &str) -> CliResult<i32> {
    let outcome = container.tree.load()?;
    let document = &outcome.value;
    let id = document.resolve_id(reference)?;
    let Some(node) = document.node(&id) else {
        return Err(DomainError::NodeNotFound(id).into());
    };
    let groups = groups_of(&document.nodes);

    output::header(&node_label(node, None, &groups));
    output::detail(&format!("id: {}", node.id));
    if let Some(group) = &node.group {
        output::detail(&format!("group: {group}"));
    }
    for (key, attr) in &node.attributes {
        let shown = if attr.display_in_tree { " (shown)" } else { "" };
        output::detail(&format!("{key}: {}{shown}", attr.value));
    }
    for edge in document.incoming_edges(&node.id) {
        let name = document.node(&edge.parent).map_or("?", |n| n.name.as_str());
        output::detail(&format!("parent: {name} [p={}]", edge.probability));
    }
    for edge in document.outgoing_edges(&node.id) {
        let name = document.node(&edge.child).map_or("?", |n| n.name.as_str());
        output::detail(&format!("child: {name} [p={}]", edge.probability));
    }
    Ok(exitcode::OK)
}

// ============================================================
// Edge commands
// ============================================================

fn cmd_edge(container: &ServiceContainer, command: &EdgeCommands) -> CliResult<i32> {
    let tree = &container.tree;
    match command {
        EdgeCommands::Add {
            parent,
            child,
            probability,
            color,
        } => {
            let outcome = tree.add_edge(parent, child, probability, color.as_deref())?;
            finish(&outcome, format!("connected '{parent}' -> '{child}'"))
        }
        EdgeCommands::Delete { parent, child } => {
            let outcome = tree.delete_edge(parent, child)?;
            finish(&outcome, format!("removed '{parent}' -> '{child}'"))
        }
        EdgeCommands::Probability {
            parent,
            child,
            probability,
        } => {
            let outcome = tree.edit_edge_probability(parent, child, probability)?;
            finish(
                &outcome,
                format!("'{parent}' -> '{child}' now {}", probability.trim()),
            )
        }
        EdgeCommands::Mode { node, mode } => {
            let mode = EdgeMode::from(*mode);
            let outcome = tree.toggle_edge_mode(node, mode)?;
            finish(&outcome, format!("edge into '{node}' is now {mode}"))
        }
    }
}

// ============================================================
// Config commands
// ============================================================

fn cmd_config(command: &ConfigCommands) -> CliResult<i32> {
    let cwd = current_dir()?;
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(&cwd))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".into())
                })?
            } else {
                local_config_path(&cwd)
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
        }
        ConfigCommands::Path => {
            let local = local_config_path(&cwd);
            match global_config_path() {
                Some(global) => print_config_path("global", &global),
                None => output::detail("global: (unavailable)"),
            }
            print_config_path("local", &local);
        }
    }
    Ok(exitcode::OK)
}

fn print_config_path(label: &str, path: &Path) {
    let state = if path.exists() { "" } else { " (not found)" };
    output::detail(&format!("{label}: {}{state}", path.display()));
}
