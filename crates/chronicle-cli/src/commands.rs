//! CLI command implementations.

use chronicle_core::{Dataset, Dimension, Node, TimelineDate};
use chronicle_graph::{FilterCriteria, ImportanceWeights, TimelineGraph};
use colored::Colorize;
use std::fs;
use std::path::Path;
use tracing::info;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Loads the dataset at `path`, or the bundled sample, into a graph.
pub fn load_graph(path: Option<&Path>) -> Result<TimelineGraph> {
    let dataset = match path {
        Some(path) => Dataset::load(path)?,
        None => Dataset::sample()?,
    };
    Ok(TimelineGraph::from_dataset(dataset)?)
}

/// Combines command-line flags into filter criteria.
pub fn build_criteria(
    thresholds: &[(Dimension, u8)],
    all_branches: bool,
    from: Option<TimelineDate>,
    to: Option<TimelineDate>,
) -> FilterCriteria {
    thresholds
        .iter()
        .fold(FilterCriteria::default(), |criteria, (dimension, min)| {
            criteria.with_threshold(dimension.clone(), *min)
        })
        .with_all_branches(all_branches)
        .with_date_range(from, to)
}

fn not_found(id: &str) -> Result<()> {
    println!("No node with id \"{}\"", id);
    Ok(())
}

fn print_node_line(graph: &TimelineGraph, node: &Node) {
    let branch = graph
        .branch_of(&node.id)
        .map(|b| b.name())
        .unwrap_or_default();
    println!(
        "  {} {} {}",
        node.date.to_string().yellow(),
        node.title.cyan(),
        format!("({}, {})", node.id, branch).dimmed()
    );
}

fn node_json(graph: &TimelineGraph, node: &Node) -> serde_json::Value {
    serde_json::json!({
        "id": node.id,
        "title": node.title,
        "date": node.date.to_string(),
        "branch": graph.branch_of(&node.id).map(|b| b.id()),
    })
}

/// Show graph statistics.
pub fn stats(graph: &TimelineGraph, json: bool) -> Result<()> {
    let stats = graph.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Timeline".bold());
    println!("  Nodes:       {}", stats.node_count.to_string().cyan());
    println!("  Connections: {}", stats.edge_count.to_string().cyan());
    println!("  Branches:    {}", stats.branch_count.to_string().cyan());
    if stats.dangling_references > 0 {
        println!(
            "  {} {} connections waiting for a missing node",
            "!".yellow(),
            stats.dangling_references
        );
    }
    Ok(())
}

/// List branches with their members.
pub fn branches(graph: &TimelineGraph, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(graph.branches())?);
        return Ok(());
    }

    for branch in graph.branches() {
        let marker = if branch.is_main { "main" } else { "branch" };
        print!("{} {}", branch.name.bold(), format!("[{}]", marker).dimmed());
        if let Some(parent) = &branch.parent_id {
            print!(" forks from {}", parent);
            if let Some(start) = branch.start_date {
                print!(" at {}", start);
            }
        }
        println!();
        for node in graph.nodes_in_branch(&branch.id) {
            print_node_line(graph, node);
        }
        println!();
    }

    let unassigned = graph.unassigned_nodes();
    if !unassigned.is_empty() {
        println!("{}", chronicle_graph::UNKNOWN_BRANCH_NAME.bold());
        for node in unassigned {
            print_node_line(graph, node);
        }
    }
    Ok(())
}

/// Show one node in full.
pub fn show(graph: &TimelineGraph, id: &str, json: bool) -> Result<()> {
    let Some(node) = graph.get(id) else {
        return not_found(id);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(node)?);
        return Ok(());
    }

    println!("{} {}", node.title.cyan().bold(), format!("({})", node.id).dimmed());
    println!("  Date:   {}", node.date);
    if let Some(branch) = graph.branch_of(id) {
        println!("  Branch: {}", branch.name());
    }
    if !node.description.is_empty() {
        println!("  {}", node.description);
    }
    for (dimension, score) in node.scores.iter() {
        println!("  {:<14} {}", dimension.to_string(), score.value());
    }
    if !node.connections.is_empty() {
        println!("  Leads to: {}", node.connections.join(", "));
    }
    let incoming = graph.incoming(id);
    if !incoming.is_empty() {
        println!("  Led from: {}", incoming.join(", "));
    }
    Ok(())
}

/// Print nodes passing the filters.
pub fn filter(graph: &TimelineGraph, criteria: &FilterCriteria, json: bool) -> Result<()> {
    let nodes = graph.filter_nodes(criteria);
    info!("{} of {} nodes pass the filters", nodes.len(), graph.node_count());

    if json {
        let output: Vec<_> = nodes.iter().map(|n| node_json(graph, n)).collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if nodes.is_empty() {
        println!("No nodes match the current filters");
        return Ok(());
    }
    println!("{} nodes:\n", nodes.len());
    for node in nodes {
        print_node_line(graph, node);
    }
    Ok(())
}

/// Search titles and descriptions.
pub fn search(graph: &TimelineGraph, term: &str, limit: usize, json: bool) -> Result<()> {
    let matches: Vec<_> = graph.search_nodes(term).into_iter().take(limit).collect();

    if json {
        let output: Vec<_> = matches.iter().map(|n| node_json(graph, n)).collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No matches found for \"{}\"", term);
        return Ok(());
    }

    println!("Found {} matches:\n", matches.len());
    for node in matches {
        print_node_line(graph, node);
    }
    Ok(())
}

/// Print the shortest path between two nodes.
pub fn path(graph: &TimelineGraph, from: &str, to: &str, json: bool) -> Result<()> {
    let path = graph.find_path(from, to);

    if json {
        let output = serde_json::json!({
            "from": from,
            "to": to,
            "path": path,
            "connections": path.as_deref().map(|p| graph.path_connections(p)),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let Some(path) = path else {
        println!("No path from \"{}\" to \"{}\"", from, to);
        return Ok(());
    };

    println!("Path ({} hops):", path.len() - 1);
    for (i, id) in path.iter().enumerate() {
        let title = graph.get(id).map(|n| n.title.as_str()).unwrap_or_default();
        let arrow = if i == 0 { " " } else { "→" };
        println!("  {} {} {}", arrow, title.cyan(), format!("({})", id).dimmed());
    }
    Ok(())
}

/// Print every node reachable from `id`.
pub fn reachable(graph: &TimelineGraph, id: &str, json: bool) -> Result<()> {
    if !graph.contains(id) {
        return not_found(id);
    }

    let reach = graph.reachable_nodes(id);
    // Present the set in timeline order
    let nodes: Vec<&Node> = graph.nodes().filter(|n| reach.contains(n.id.as_str())).collect();

    if json {
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        println!("{}", serde_json::to_string_pretty(&ids)?);
        return Ok(());
    }

    println!("{} nodes reachable from {}:\n", nodes.len(), id.cyan());
    for node in nodes {
        print_node_line(graph, node);
    }
    Ok(())
}

/// Score one node.
pub fn importance(
    graph: &TimelineGraph,
    id: &str,
    weights: &ImportanceWeights,
    json: bool,
) -> Result<()> {
    let Some(breakdown) = graph.explain_importance(id, weights) else {
        return not_found(id);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
    } else {
        println!("{}", breakdown.title.cyan().bold());
        println!("{}", breakdown.summary());
    }
    Ok(())
}

/// Rank nodes by importance.
pub fn rank(
    graph: &TimelineGraph,
    limit: usize,
    weights: &ImportanceWeights,
    json: bool,
) -> Result<()> {
    let ranked = graph.rank_by_importance(weights, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    for (i, entry) in ranked.iter().enumerate() {
        let detail = format!(
            "(out {}, in {}, thematic {})",
            entry.out_degree, entry.in_degree, entry.thematic_total
        );
        println!(
            "{:>3}. {:>6.1}  {} {}",
            i + 1,
            entry.score,
            entry.title.cyan(),
            detail.dimmed()
        );
    }
    Ok(())
}

/// Write the graph back out as a dataset document.
pub fn export(graph: &TimelineGraph, output: Option<&Path>) -> Result<()> {
    let json = graph.to_dataset().to_json_pretty()?;

    match output {
        Some(path) => {
            fs::write(path, json)?;
            println!("{} Exported to {}", "✓".green(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_build_criteria() {
        let criteria = build_criteria(
            &[(Dimension::Technical, 8)],
            true,
            TimelineDate::from_ymd(1950, 1, 1),
            None,
        );
        let graph = load_graph(None).unwrap();
        let nodes = graph.filter_nodes(&criteria);
        assert!(!nodes.is_empty());
        assert!(nodes.iter().all(|n| n
            .scores
            .get(&Dimension::Technical)
            .is_some_and(|s| s.value() >= 8)));
        assert!(nodes.iter().any(|n| !graph.is_main_timeline(&n.id)));
    }

    #[test]
    fn test_unknown_ids_are_not_errors() {
        let graph = load_graph(None).unwrap();
        assert!(show(&graph, "ghost", false).is_ok());
        assert!(reachable(&graph, "ghost", true).is_ok());
        assert!(importance(&graph, "ghost", &ImportanceWeights::default(), false).is_ok());
        assert!(path(&graph, "ghost", "eliza", false).is_ok());
    }

    #[test]
    fn test_export_then_load() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("timeline.json");

        let graph = load_graph(None).unwrap();
        export(&graph, Some(file.as_path())).unwrap();

        let reloaded = load_graph(Some(file.as_path())).unwrap();
        assert_eq!(reloaded.stats(), graph.stats());
    }

    #[test]
    fn test_missing_dataset_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_graph(Some(dir.path().join("absent.json").as_path())).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
