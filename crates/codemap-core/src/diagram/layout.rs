//! Plain-text layout for parsed flowcharts, drawn as an ascii tree.
//!
//! A straight run of unlabelled steps stays at one depth; a node with
//! labelled or multiple outgoing edges nests one subtree per branch. A
//! branch that reaches an already drawn node ends in a `─▶ ID` reference.

use super::flowchart::{Direction, Edge, Flowchart, NodeShape};
use crate::error::RenderError;
use ascii_tree::{write_tree, Tree};

fn shaped(shape: NodeShape, label: &str) -> String {
    match shape {
        NodeShape::Process => format!("[ {label} ]"),
        NodeShape::Terminal => format!("(( {label} ))"),
        NodeShape::Rounded => format!("( {label} )"),
        NodeShape::Decision => format!("< {label} >"),
    }
}

fn arrow(direction: Direction) -> &'static str {
    match direction {
        Direction::TopDown => "↓",
        Direction::BottomUp => "↑",
        Direction::LeftRight => "→",
        Direction::RightLeft => "←",
    }
}

/// Entry nodes (no incoming edge) in declaration order, then every node so
/// that cycles without an entry are still drawn.
pub fn entry_points(chart: &Flowchart) -> Vec<usize> {
    let mut has_incoming = vec![false; chart.nodes.len()];
    for edge in &chart.edges {
        has_incoming[edge.to] = true;
    }
    (0..chart.nodes.len())
        .filter(|&i| !has_incoming[i])
        .chain(0..chart.nodes.len())
        .collect()
}

struct Walk<'a> {
    chart: &'a Flowchart,
    visited: Vec<bool>,
}

impl<'a> Walk<'a> {
    fn new(chart: &'a Flowchart) -> Self {
        Self {
            chart,
            visited: vec![false; chart.nodes.len()],
        }
    }

    fn title(&self, index: usize) -> String {
        let node = self.chart.node(index);
        format!("{} {}", node.id, shaped(node.shape, &node.label))
    }

    fn run(&mut self, mut index: usize) -> Vec<Tree> {
        let chart = self.chart;
        let mut steps = Vec::new();
        loop {
            self.visited[index] = true;
            let title = self.title(index);
            let edges: Vec<&'a Edge> = chart.outgoing(index).collect();
            match edges.as_slice() {
                [] => {
                    steps.push(Tree::Leaf(vec![title]));
                    return steps;
                }
                [only] if only.label.is_none() && !self.visited[only.to] => {
                    steps.push(Tree::Leaf(vec![title]));
                    index = only.to;
                }
                _ => {
                    let branches = edges.iter().map(|edge| self.branch(edge)).collect();
                    steps.push(Tree::Node(title, branches));
                    return steps;
                }
            }
        }
    }

    fn branch(&mut self, edge: &Edge) -> Tree {
        if self.visited[edge.to] {
            let target = &self.chart.node(edge.to).id;
            let reference = match &edge.label {
                Some(label) => format!("{label} ─▶ {target}"),
                None => format!("─▶ {target}"),
            };
            return Tree::Leaf(vec![reference]);
        }

        let label = edge.label.clone().unwrap_or_else(|| "─▶".to_string());
        Tree::Node(label, self.run(edge.to))
    }
}

/// Renders the chart as a tree whose root line names the flow direction.
pub fn render_text(chart: &Flowchart) -> Result<String, RenderError> {
    let mut walk = Walk::new(chart);
    let mut runs = Vec::new();
    for entry in entry_points(chart) {
        if !walk.visited[entry] {
            runs.extend(walk.run(entry));
        }
    }

    let root = Tree::Node(
        format!("flowchart {} {}", chart.direction, arrow(chart.direction)),
        runs,
    );
    let mut buffer = String::new();
    write_tree(&mut buffer, &root).map_err(|e| RenderError::Engine(e.to_string()))?;
    Ok(buffer.trim_end().to_string())
}
