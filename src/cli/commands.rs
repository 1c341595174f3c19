//! Command dispatch for the costtree CLI

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::CostTree;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    classify_with, format_currency, format_number, format_quantity, sort_by_category,
    CompositionLine, CostNode, DomainError, DomainResult, NavigationState, NodeId,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;
use crate::tree_traits::{node_label, RenderContext, TreeNodeConvert};

/// Flags of the `tree` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeOptions<'a> {
    pub expand: &'a [NodeId],
    pub all: bool,
    pub budget: Option<&'a str>,
    pub select: Option<&'a NodeId>,
}

/// How `show` lays out composition lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ShowLayout {
    /// Subtotal order, one flat list
    #[default]
    Flat,
    /// Flat list ordered by unit category
    ByCategory,
    /// One block per subtotal link
    Grouped,
}

/// A titled (or untitled) list of composition lines.
#[derive(Debug, Clone, PartialEq)]
pub struct LineBlock {
    pub title: Option<String>,
    pub lines: Vec<CompositionLine>,
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    execute_with(cli, Arc::new(RealFileSystem))
}

/// Dispatch `cli` against the given filesystem.
pub fn execute_with(cli: &Cli, fs: Arc<dyn FileSystem>) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => _config(cli, command),
        Some(command) => {
            let data_dir = resolve_data_dir(cli, fs.as_ref())?;
            let settings = Settings::load(Some(&data_dir))?;
            let container = ServiceContainer::with_deps(settings, fs);
            match command {
                Commands::Tree {
                    expand,
                    all,
                    budget,
                    select,
                } => {
                    let opts = TreeOptions {
                        expand,
                        all: *all,
                        budget: budget.as_deref(),
                        select: select.as_ref(),
                    };
                    _tree(&container, &data_dir, opts)
                }
                Commands::Show {
                    cost_id,
                    by_category,
                    grouped,
                } => {
                    let layout = match (*grouped, *by_category) {
                        (true, _) => ShowLayout::Grouped,
                        (false, true) => ShowLayout::ByCategory,
                        (false, false) => ShowLayout::Flat,
                    };
                    _show(&container, &data_dir, cost_id, layout)
                }
                Commands::Stats => _stats(&container, &data_dir),
                Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
            }
        }
        None => Err(CliError::InvalidArgs(
            "no command given, see --help".to_string(),
        )),
    }
}

/// `-C` wins, then the configured `data_dir`, then the working directory.
fn resolve_data_dir(cli: &Cli, fs: &dyn FileSystem) -> CliResult<PathBuf> {
    let dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => match Settings::load(None)?.data_dir {
            Some(dir) => dir,
            None => std::env::current_dir()
                .map_err(|e| InfraError::io("determine working directory", e))?,
        },
    };
    if !fs.is_dir(&dir) {
        return Err(InfraError::NoDataDir(dir).into());
    }
    debug!("data_dir: {}", dir.display());
    Ok(dir)
}

fn render_context<'a>(
    container: &'a ServiceContainer,
    tree: &'a CostTree,
    state: &'a NavigationState,
) -> RenderContext<'a> {
    RenderContext {
        state,
        units: &tree.units,
        format: &container.settings.format,
        neutral_status: &container.settings.neutral_status,
    }
}

/// Navigation state for the `tree` flags.
///
/// Budget roots start expanded and every `--expand` id toggles, so naming a
/// root collapses it. `--all` expands every inner node instead. A selected
/// node has its ancestors revealed.
pub fn tree_state(tree: &CostTree, opts: &TreeOptions<'_>) -> DomainResult<NavigationState> {
    let mut state = NavigationState::new();
    if opts.all {
        state.expand_all(&tree.forest);
    } else {
        for root in &tree.forest {
            state.expand(root.id.clone());
        }
        for id in opts.expand {
            if tree.find(id).is_none() {
                return Err(DomainError::NodeNotFound(id.clone()));
            }
            state.toggle(id);
        }
    }

    if let Some(id) = opts.select {
        let node = tree
            .find(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.clone()))?;
        state.reveal(&tree.forest, id)?;
        state.select(node, &tree.compositions);
    }
    Ok(state)
}

/// Budget roots to paint, all of them unless `--budget` narrows it to one.
pub fn tree_roots<'a>(
    tree: &'a CostTree,
    budget: Option<&str>,
) -> DomainResult<Vec<&'a CostNode>> {
    match budget {
        Some(budget_id) => {
            let id = NodeId::budget(budget_id);
            let root = tree
                .forest
                .iter()
                .find(|r| r.id == id)
                .ok_or(DomainError::NodeNotFound(id))?;
            Ok(vec![root])
        }
        None => Ok(tree.forest.iter().collect()),
    }
}

/// Painted forest for the `tree` command, one block per budget root.
pub fn render_tree_view(
    container: &ServiceContainer,
    tree: &CostTree,
    opts: &TreeOptions<'_>,
) -> CliResult<(String, NavigationState)> {
    let state = tree_state(tree, opts)?;
    let ctx = render_context(container, tree, &state);
    let text = tree_roots(tree, opts.budget)?
        .into_iter()
        .map(|root| root.render(&ctx))
        .join("");
    Ok((text, state))
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, data_dir: &Path, opts: TreeOptions<'_>) -> CliResult<()> {
    let tree = container.budget_service.load(data_dir)?;
    let (text, state) = render_tree_view(container, &tree, &opts)?;
    output::info(text.trim_end());

    if let Some(selection) = state.selection() {
        output::header(&format!("Selected: {}", selection.node));
        if selection.node.is_budget() {
            output::detail("budget root, no compositions");
        } else {
            print_lines(container, &tree, &selection.compositions);
        }
    }
    Ok(())
}

/// Composition lines of a cost record laid out for `show`.
///
/// An empty result means no breakdown is available.
pub fn composition_blocks(
    tree: &CostTree,
    cost_id: &str,
    layout: ShowLayout,
) -> DomainResult<Vec<LineBlock>> {
    let id = NodeId::cost(cost_id);
    if tree.find(&id).is_none() {
        return Err(DomainError::NodeNotFound(id));
    }

    let blocks = match layout {
        ShowLayout::Grouped => tree
            .compositions
            .resolve_grouped(cost_id)
            .into_iter()
            .map(|group| LineBlock {
                title: Some(group.link.description.unwrap_or(group.link.id)),
                lines: group.lines,
            })
            .collect(),
        ShowLayout::Flat | ShowLayout::ByCategory => {
            let mut lines = tree.compositions.resolve(cost_id);
            if layout == ShowLayout::ByCategory {
                sort_by_category(&mut lines, &tree.units);
            }
            if lines.is_empty() {
                Vec::new()
            } else {
                vec![LineBlock { title: None, lines }]
            }
        }
    };
    Ok(blocks)
}

#[instrument(skip(container))]
fn _show(
    container: &ServiceContainer,
    data_dir: &Path,
    cost_id: &str,
    layout: ShowLayout,
) -> CliResult<()> {
    let tree = container.budget_service.load(data_dir)?;
    let blocks = composition_blocks(&tree, cost_id, layout)?;
    let id = NodeId::cost(cost_id);
    let node = tree
        .find(&id)
        .ok_or_else(|| DomainError::NodeNotFound(id.clone()))?;

    let mut state = NavigationState::new();
    state.select(node, &tree.compositions);
    let settings = &container.settings;
    let fmt = &settings.format;
    let unit = tree.units.abbreviate(&node.unit_id);

    let ctx = render_context(container, &tree, &state);
    output::header(&node_label(node, &ctx));
    output::field("budget", &node.budget_name);
    output::field(
        "level",
        &classify_with(node.depth, &node.status, &settings.neutral_status),
    );
    output::field("depth", &node.depth);
    output::field(
        "quantity",
        &format!("{} {}", format_quantity(node.quantity, fmt), unit),
    );
    output::field("unit cost", &format_currency(node.unit_cost, fmt));
    output::field("partial cost", &format_currency(node.partial_cost, fmt));
    output::field("children", &node.children.len());

    if blocks.is_empty() {
        output::detail("no breakdown available");
    }
    for block in &blocks {
        if let Some(title) = &block.title {
            output::header(&format!("Subtotal {title}"));
        }
        print_lines(container, &tree, &block.lines);
    }
    Ok(())
}

/// One display row per composition line, fields joined with ` | `.
pub fn line_rows(tree: &CostTree, settings: &Settings, lines: &[CompositionLine]) -> Vec<String> {
    let fmt = &settings.format;
    lines
        .iter()
        .map(|line| {
            let unit = tree.units.abbreviate(&line.unit_id);
            let category = tree.units.category(&line.unit_id).unwrap_or("-");
            [
                line.description.clone(),
                format!("{} {}", format_quantity(line.quantity, fmt), unit),
                format!(
                    "mag {}",
                    format_number(line.magnitude, fmt.quantity_decimals, fmt)
                ),
                format_currency(line.unit_cost, fmt),
                format_currency(line.partial_cost, fmt),
                category.to_string(),
            ]
            .iter()
            .join(" | ")
        })
        .collect()
}

fn print_lines(container: &ServiceContainer, tree: &CostTree, lines: &[CompositionLine]) {
    if lines.is_empty() {
        output::detail("no breakdown available");
        return;
    }
    for row in line_rows(tree, &container.settings, lines) {
        output::detail(&row);
    }
}

#[instrument(skip(container))]
fn _stats(container: &ServiceContainer, data_dir: &Path) -> CliResult<()> {
    let tree = container.budget_service.load(data_dir)?;
    let stats = tree.stats();
    output::field("budgets", &stats.budgets);
    output::field("records", &stats.records);
    output::field("max depth", &stats.max_depth);
    output::field("leaves", &stats.leaves);
    output::field("subtotals", &stats.subtotal_links);
    output::field("compositions", &stats.composition_lines);
    Ok(())
}

fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.data_dir.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::field("global", &path.display()),
                None => output::warning("cannot determine global config directory"),
            }
            if let Some(dir) = &cli.data_dir {
                output::field("local", &local_config_path(dir).display());
            }
        }
    }
    Ok(())
}
