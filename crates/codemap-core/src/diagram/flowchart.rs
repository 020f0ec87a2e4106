//! Flowchart model built from the Mermaid graph the service emits.
//!
//! Parsing is delegated to `mermaid_rs_renderer`; this module keeps only
//! what the text layout needs: nodes in declaration order, their shape
//! class, labelled edges and the header direction.

use crate::error::RenderError;
use mermaid_rs_renderer::ir::{self, DiagramKind};
use mermaid_rs_renderer::parser::parse_mermaid;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    TopDown,
    BottomUp,
    LeftRight,
    RightLeft,
}

impl From<ir::Direction> for Direction {
    fn from(direction: ir::Direction) -> Self {
        match direction {
            ir::Direction::TopDown => Direction::TopDown,
            ir::Direction::BottomTop => Direction::BottomUp,
            ir::Direction::LeftRight => Direction::LeftRight,
            ir::Direction::RightLeft => Direction::RightLeft,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Direction::TopDown => "TD",
            Direction::BottomUp => "BT",
            Direction::LeftRight => "LR",
            Direction::RightLeft => "RL",
        };
        f.write_str(token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Process,
    Terminal,
    Rounded,
    Decision,
}

impl From<ir::NodeShape> for NodeShape {
    fn from(shape: ir::NodeShape) -> Self {
        match shape {
            ir::NodeShape::Circle | ir::NodeShape::DoubleCircle => NodeShape::Terminal,
            ir::NodeShape::RoundRect | ir::NodeShape::Stadium => NodeShape::Rounded,
            ir::NodeShape::Diamond | ir::NodeShape::Hexagon => NodeShape::Decision,
            _ => NodeShape::Process,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Flowchart {
    pub direction: Direction,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Flowchart {
    pub fn parse(source: &str) -> Result<Self, RenderError> {
        let parsed = parse_mermaid(source).map_err(|e| RenderError::parse(e.to_string()))?;
        let graph = parsed.graph;
        if graph.kind != DiagramKind::Flowchart {
            return Err(RenderError::parse(format!(
                "expected a flowchart, found {:?}",
                graph.kind
            )));
        }

        let mut declared: Vec<&ir::Node> = graph.nodes.values().collect();
        if declared.is_empty() {
            return Err(RenderError::Empty);
        }
        declared.sort_by_key(|node| {
            graph
                .node_order
                .get(&node.id)
                .copied()
                .unwrap_or(usize::MAX)
        });

        let index: HashMap<&str, usize> = declared
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();
        let position = |id: &str| {
            index
                .get(id)
                .copied()
                .ok_or_else(|| RenderError::parse(format!("edge references unknown node `{id}`")))
        };

        let edges = graph
            .edges
            .iter()
            .map(|edge| {
                Ok(Edge {
                    from: position(&edge.from)?,
                    to: position(&edge.to)?,
                    label: edge
                        .label
                        .as_deref()
                        .map(str::trim)
                        .filter(|label| !label.is_empty())
                        .map(str::to_string),
                })
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        let nodes = declared
            .into_iter()
            .map(|node| Node {
                id: node.id.clone(),
                label: node.label.clone(),
                shape: node.shape.into(),
            })
            .collect();

        Ok(Flowchart {
            direction: graph.direction.into(),
            nodes,
            edges,
        })
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn outgoing(&self, index: usize) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.from == index)
    }
}
