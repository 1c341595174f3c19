//! Tests for the `tree` and `show` command logic

use std::fs;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use costtree::application::services::{BudgetService, CostTree};
use costtree::cli::commands::{
    composition_blocks, execute_with, line_rows, render_tree_view, tree_roots, tree_state,
    ShowLayout, TreeOptions,
};
use costtree::cli::{Cli, CliError};
use costtree::config::Settings;
use costtree::domain::{DomainError, NodeId};
use costtree::exitcode;
use costtree::infrastructure::di::ServiceContainer;
use costtree::infrastructure::traits::{MemoryFileSystem, RealFileSystem};
use costtree::util::testing;
use rstest::{fixture, rstest};

#[fixture]
fn tree() -> CostTree {
    testing::init_test_setup();
    BudgetService::new(Arc::new(RealFileSystem))
        .load(&testing::resource_dir("snapshot"))
        .unwrap()
}

/// The snapshot fixture copied into an in-memory filesystem under `/data`.
fn memory_snapshot() -> Arc<MemoryFileSystem> {
    let memfs = MemoryFileSystem::new();
    let dir = testing::resource_dir("snapshot");
    for entry in fs::read_dir(&dir).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_owned();
        memfs.add_file(
            Path::new("/data").join(name),
            fs::read_to_string(&path).unwrap(),
        );
    }
    Arc::new(memfs)
}

fn ids(raw: &[&str]) -> Vec<NodeId> {
    raw.iter().map(|s| s.parse().unwrap()).collect()
}

// ============================================================
// tree state
// ============================================================

#[rstest]
fn given_no_flags_when_building_tree_state_then_only_roots_are_expanded(tree: CostTree) {
    let state = tree_state(&tree, &TreeOptions::default()).unwrap();

    assert!(state.is_expanded(&NodeId::budget("B1")));
    assert!(state.is_expanded(&NodeId::budget("B2")));
    assert!(!state.is_expanded(&NodeId::cost("C1")));
    assert!(state.selection().is_none());
}

#[rstest]
fn given_expand_flag_when_building_tree_state_then_toggles_node_open(tree: CostTree) {
    let expand = ids(&["C1"]);
    let opts = TreeOptions {
        expand: &expand,
        ..TreeOptions::default()
    };

    let state = tree_state(&tree, &opts).unwrap();

    assert!(state.is_expanded(&NodeId::cost("C1")));
    assert!(!state.is_expanded(&NodeId::cost("C2")));
}

#[rstest]
fn given_budget_root_in_expand_when_building_tree_state_then_collapses_it(tree: CostTree) {
    let expand = ids(&["budget:B1"]);
    let opts = TreeOptions {
        expand: &expand,
        ..TreeOptions::default()
    };

    let state = tree_state(&tree, &opts).unwrap();

    assert!(!state.is_expanded(&NodeId::budget("B1")));
    assert!(state.is_expanded(&NodeId::budget("B2")));
}

#[rstest]
fn given_all_flag_when_building_tree_state_then_every_inner_node_is_open(tree: CostTree) {
    let opts = TreeOptions {
        all: true,
        ..TreeOptions::default()
    };

    let state = tree_state(&tree, &opts).unwrap();

    for id in ["C1", "C2"] {
        assert!(state.is_expanded(&NodeId::cost(id)), "{id} not expanded");
    }
    // leaves are never marked expanded
    assert!(!state.is_expanded(&NodeId::cost("C3")));
}

#[rstest]
fn given_select_flag_when_building_tree_state_then_reveals_and_lists_compositions(
    tree: CostTree,
) {
    // Arrange
    let select = NodeId::cost("C3");
    let opts = TreeOptions {
        select: Some(&select),
        ..TreeOptions::default()
    };

    // Act
    let state = tree_state(&tree, &opts).unwrap();

    // Assert
    assert!(state.is_expanded(&NodeId::cost("C1")));
    assert!(state.is_expanded(&NodeId::cost("C2")));
    let selection = state.selection().unwrap();
    assert_eq!(selection.node, select);
    let lines: Vec<&str> = selection
        .compositions
        .iter()
        .map(|l| l.id.as_str())
        .collect();
    assert_eq!(lines, vec!["L1", "L2", "L3"]);
}

#[rstest]
#[case::expand(&["NOPE"], None)]
#[case::select(&[], Some("NOPE"))]
fn given_unknown_id_when_building_tree_state_then_node_not_found(
    tree: CostTree,
    #[case] expand: &[&str],
    #[case] select: Option<&str>,
) {
    let expand = ids(expand);
    let select = select.map(NodeId::cost);
    let opts = TreeOptions {
        expand: &expand,
        select: select.as_ref(),
        ..TreeOptions::default()
    };

    let err = tree_state(&tree, &opts).unwrap_err();

    assert_eq!(err, DomainError::NodeNotFound(NodeId::cost("NOPE")));
}

// ============================================================
// roots and rendering
// ============================================================

#[rstest]
fn given_budget_filter_when_picking_roots_then_returns_only_that_budget(tree: CostTree) {
    let roots = tree_roots(&tree, Some("B2")).unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].budget_name, "Commercial");

    assert_eq!(tree_roots(&tree, None).unwrap().len(), 2);
    assert!(matches!(
        tree_roots(&tree, Some("B9")),
        Err(DomainError::NodeNotFound(_))
    ));
}

#[rstest]
fn given_default_options_when_rendering_view_then_paints_roots_and_first_level(tree: CostTree) {
    // Arrange
    colored::control::set_override(false);
    let container = ServiceContainer::with_deps(Settings::default(), memory_snapshot());

    // Act
    let (text, _) = render_tree_view(&container, &tree, &TreeOptions::default()).unwrap();

    // Assert
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5, "unexpected view:\n{text}");
    assert!(lines[0].contains("▾ Residential"));
    assert!(lines[1].contains("▸ 01 Foundations"));
    assert!(lines[1].contains("R$ 5.400,00"));
    assert!(lines[2].contains("· 02 Site cleanup"));
    assert!(lines[3].contains("▾ Commercial"));
    assert!(lines[4].contains("· 01 Facade"));
    assert!(!text.contains("Slabs"));
}

#[rstest]
fn given_select_and_budget_when_rendering_view_then_paints_path_of_one_budget(tree: CostTree) {
    colored::control::set_override(false);
    let container = ServiceContainer::with_deps(Settings::default(), memory_snapshot());
    let select = NodeId::cost("C3");
    let opts = TreeOptions {
        budget: Some("B1"),
        select: Some(&select),
        ..TreeOptions::default()
    };

    let (text, state) = render_tree_view(&container, &tree, &opts).unwrap();

    assert!(text.contains("Concrete slab"));
    assert!(!text.contains("Commercial"));
    assert!(state.is_selected(&select));
}

// ============================================================
// show
// ============================================================

#[rstest]
fn given_grouped_layout_when_collecting_blocks_then_titles_follow_subtotals(tree: CostTree) {
    let blocks = composition_blocks(&tree, "C3", ShowLayout::Grouped).unwrap();

    let titles: Vec<Option<&str>> = blocks.iter().map(|b| b.title.as_deref()).collect();
    assert_eq!(titles, vec![Some("Labor"), Some("Materials")]);
    assert_eq!(blocks[0].lines.len(), 1);
    assert_eq!(blocks[1].lines.len(), 2);
}

#[rstest]
fn given_link_without_description_when_grouping_then_title_is_link_id(tree: CostTree) {
    let blocks = composition_blocks(&tree, "D1", ShowLayout::Grouped).unwrap();

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].title.as_deref(), Some("S3"));
    assert!(blocks[0].lines.is_empty());
}

#[rstest]
#[case::flat(ShowLayout::Flat)]
#[case::by_category(ShowLayout::ByCategory)]
fn given_flat_layouts_when_collecting_blocks_then_single_untitled_block(
    tree: CostTree,
    #[case] layout: ShowLayout,
) {
    let blocks = composition_blocks(&tree, "C3", layout).unwrap();

    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].title.is_none());
    let ids: Vec<&str> = blocks[0].lines.iter().map(|l| l.id.as_str()).collect();
    // labor sorts before material, which matches subtotal order here
    assert_eq!(ids, vec!["L1", "L2", "L3"]);

    assert!(composition_blocks(&tree, "C4", layout).unwrap().is_empty());
}

#[rstest]
fn given_unknown_cost_when_collecting_blocks_then_node_not_found(tree: CostTree) {
    let err = composition_blocks(&tree, "NOPE", ShowLayout::Flat).unwrap_err();
    assert_eq!(err, DomainError::NodeNotFound(NodeId::cost("NOPE")));
}

#[rstest]
fn given_composition_lines_when_formatting_rows_then_joins_fields(tree: CostTree) {
    let lines = tree.compositions.resolve("C3");

    let rows = line_rows(&tree, &Settings::default(), &lines);

    assert_eq!(
        rows[0],
        "Mason | 18,00 h | mag 1,00 | R$ 22,00 | R$ 396,00 | 1-labor"
    );
    assert!(rows[1].starts_with("Ready-mix concrete | 12,60 m³"));
}

// ============================================================
// dispatch
// ============================================================

#[test]
fn given_snapshot_in_memory_when_running_commands_then_succeeds() {
    testing::init_test_setup();
    let fs = memory_snapshot();

    for args in [
        vec!["costtree", "-C", "/data", "stats"],
        vec!["costtree", "-C", "/data", "tree", "-s", "C3"],
        vec!["costtree", "-C", "/data", "show", "C3", "--grouped"],
    ] {
        let cli = Cli::parse_from(args.iter().copied());
        assert!(execute_with(&cli, fs.clone()).is_ok(), "{args:?} failed");
    }
}

#[rstest]
#[case::unknown_expand(&["tree", "-e", "NOPE"])]
#[case::unknown_select(&["tree", "-s", "budget:B9"])]
#[case::unknown_budget(&["tree", "-b", "B9"])]
#[case::unknown_show(&["show", "NOPE"])]
fn given_unknown_id_when_dispatching_then_exits_with_usage(#[case] args: &[&str]) {
    testing::init_test_setup();
    let cli = Cli::parse_from(["costtree", "-C", "/data"].iter().chain(args).copied());

    let err = execute_with(&cli, memory_snapshot()).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE, "{err}");
}

#[test]
fn given_missing_data_dir_when_dispatching_then_exits_with_noinput() {
    let cli = Cli::parse_from(["costtree", "-C", "/nowhere", "stats"]);

    let err = execute_with(&cli, Arc::new(MemoryFileSystem::new())).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_no_subcommand_when_dispatching_then_invalid_args() {
    let cli = Cli::parse_from(["costtree"]);

    let err = execute_with(&cli, Arc::new(MemoryFileSystem::new())).unwrap_err();

    assert!(matches!(err, CliError::InvalidArgs(_)));
    assert_eq!(err.exit_code(), exitcode::USAGE);
}
