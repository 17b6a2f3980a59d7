//! Genome tree and clade enumeration
//!
//! The tree is read once from a Newick string and never modified. Every
//! node must carry a genome name, internal nodes included, since each node
//! corresponds to a genome in the alignment.

use crate::core::clade::Clade;
use crate::core::error::{PipelineError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashSet;

/// Produces the clades of a tree in a deterministic order
pub trait CladeEnumerator {
    /// Enumerate every clade, leaves included. Calling this twice on the
    /// same input yields the same sequence.
    fn clades(&self) -> Result<Vec<Clade>>;
}

/// A fixed list of clades enumerates to itself
impl CladeEnumerator for Vec<Clade> {
    fn clades(&self) -> Result<Vec<Clade>> {
        Ok(self.clone())
    }
}

/// Rooted genome tree; edges point from parent to child and carry the
/// branch length
#[derive(Debug, Clone)]
pub struct GenomeTree {
    graph: DiGraph<String, f64>,
    root: NodeIndex,
}

impl GenomeTree {
    /// Parse a Newick string such as `((human:0.1,chimp:0.1)Anc1:0.2,gorilla)Anc0;`
    pub fn from_newick(newick: &str) -> Result<Self> {
        let mut parser = NewickParser::new(newick);
        let (root, _) = parser.parse_subtree()?;
        parser.finish()?;

        let tree = Self {
            graph: parser.graph,
            root,
        };
        tree.check_unique_names()?;
        Ok(tree)
    }

    /// Name of the root genome
    pub fn root(&self) -> &str {
        &self.graph[self.root]
    }

    /// All genome names in pre-order
    pub fn genomes(&self) -> Vec<&str> {
        self.preorder(self.root)
            .into_iter()
            .map(|node| self.graph[node].as_str())
            .collect()
    }

    /// Children of a node in the order they were written
    fn children(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self.graph.edges(node).collect();
        edges.sort_by_key(|edge| edge.id());
        edges.into_iter().map(|edge| edge.target()).collect()
    }

    fn preorder(&self, start: NodeIndex) -> Vec<NodeIndex> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            order.push(node);
            for child in self.children(node).into_iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    fn check_unique_names(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in self.graph.node_weights() {
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::Tree(format!(
                    "genome '{}' appears more than once",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl CladeEnumerator for GenomeTree {
    fn clades(&self) -> Result<Vec<Clade>> {
        self.preorder(self.root)
            .into_iter()
            .map(|node| {
                Clade::new(
                    self.preorder(node)
                        .into_iter()
                        .map(|member| self.graph[member].clone()),
                )
            })
            .collect()
    }
}

/// Recursive-descent Newick reader
struct NewickParser {
    chars: Vec<char>,
    pos: usize,
    graph: DiGraph<String, f64>,
}

impl NewickParser {
    fn new(newick: &str) -> Self {
        Self {
            chars: newick.trim().chars().collect(),
            pos: 0,
            graph: DiGraph::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, message: &str) -> PipelineError {
        PipelineError::Tree(format!("{} at position {}", message, self.pos))
    }

    /// Parse `[(subtree,...)]name[:length]`, returning the node and its
    /// branch length
    fn parse_subtree(&mut self) -> Result<(NodeIndex, f64)> {
        self.skip_whitespace();

        let mut children = Vec::new();
        if self.peek() == Some('(') {
            self.pos += 1;
            loop {
                children.push(self.parse_subtree()?);
                self.skip_whitespace();
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some(')') => {
                        self.pos += 1;
                        break;
                    }
                    Some(other) => return Err(self.error(&format!("unexpected '{}'", other))),
                    None => return Err(self.error("unterminated '('")),
                }
            }
        }

        self.skip_whitespace();
        let name = self.read_token();
        if name.is_empty() {
            return Err(self.error("unnamed node"));
        }

        self.skip_whitespace();
        let length = if self.peek() == Some(':') {
            self.pos += 1;
            self.skip_whitespace();
            let token = self.read_token();
            token
                .parse::<f64>()
                .map_err(|_| self.error(&format!("invalid branch length '{}'", token)))?
        } else {
            0.0
        };

        let node = self.graph.add_node(name);
        for (child, child_length) in children {
            self.graph.add_edge(node, child, child_length);
        }
        Ok((node, length))
    }

    fn read_token(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !matches!(c, '(' | ')' | ',' | ':' | ';') && !c.is_whitespace())
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn finish(&mut self) -> Result<()> {
        self.skip_whitespace();
        if self.peek() == Some(';') {
            self.pos += 1;
        }
        self.skip_whitespace();
        if self.pos != self.chars.len() {
            return Err(self.error("trailing characters after tree"));
        }
        Ok(())
    }
}
