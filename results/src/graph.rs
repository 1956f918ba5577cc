//! Network graph accessor (§4.7): parses both the newer graph-description
//! language format (`.gv`) and the older two-block `.vna` format into a
//! common [`Graph`] value.
//!

use simrun_common::{ClientError, Result};
use std::path::Path;

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub attrs: Vec<(String, String)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub attrs: Vec<(String, String)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    pub directed: bool,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Parse the older `.vna` layout: a node-data block, then a `*tie data`
/// marker, then an edge-data block. The line following each block marker
/// is a header row naming the attribute columns.
pub fn parse_vna(path: &Path, directed: bool) -> Result<Graph> {
    let content = std::fs::read_to_string(path)?;
    let lines: Vec<&str> = content.lines().collect();

    let tie_idx = lines
        .iter()
        .position(|l| l.trim() == "*tie data")
        .ok_or_else(|| ClientError::MalformedArtifact {
            path: path.to_path_buf(),
            reason: "missing *tie data marker".to_string(),
        })?;

    let node_lines = &lines[..tie_idx];
    let tie_lines = &lines[tie_idx..];

    if node_lines.len() < 2 || tie_lines.len() < 2 {
        return Err(ClientError::MalformedArtifact {
            path: path.to_path_buf(),
            reason: "truncated node/tie data block".to_string(),
        });
    }

    let node_attr_keys: Vec<&str> = node_lines[1].trim().split(' ').skip(1).collect();
    let mut nodes = Vec::new();
    for line in &node_lines[2..] {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.trim().split(' ').collect();
        let id = fields[0].to_string();
        let attrs = node_attr_keys
            .iter()
            .zip(fields[1..].iter())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        nodes.push(GraphNode { id, attrs });
    }

    let tie_attr_keys: Vec<&str> = tie_lines[1].trim().split(' ').skip(2).collect();
    let mut edges = Vec::new();
    for line in &tie_lines[2..] {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.trim().split(' ').collect();
        let from = fields[0].to_string();
        let to = fields[1].to_string();
        let attrs = tie_attr_keys
            .iter()
            .zip(fields[2..].iter())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        edges.push(GraphEdge { from, to, attrs });
    }

    Ok(Graph {
        directed,
        nodes,
        edges,
    })
}

/// Parse the newer layout: a minimal dialect of the standard graph
/// description language (`digraph`/`graph` blocks with `id [k=v, ...];`
/// node statements and `a -> b [k=v, ...];`/`a -- b [...]` edge
/// statements).
pub fn parse_dot(path: &Path, directed: bool) -> Result<Graph> {
    let content = std::fs::read_to_string(path)?;
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for raw_line in content.lines() {
        let line = raw_line.trim().trim_end_matches(';').trim();
        if line.is_empty()
            || line.starts_with("//")
            || line.starts_with("digraph")
            || line.starts_with("graph")
            || line == "{"
            || line == "}"
        {
            continue;
        }

        let (head, attrs) = split_attrs(line);

        if let Some((from, to)) = split_edge(&head) {
            edges.push(GraphEdge {
                from,
                to,
                attrs: parse_attrs(attrs),
            });
        } else if !head.is_empty() {
            nodes.push(GraphNode {
                id: unquote(&head),
                attrs: parse_attrs(attrs),
            });
        }
    }

    Ok(Graph {
        directed,
        nodes,
        edges,
    })
}

fn split_attrs(line: &str) -> (String, Option<String>) {
    match line.find('[') {
        Some(start) => {
            let head = line[..start].trim().to_string();
            let end = line.rfind(']').unwrap_or(line.len());
            let attrs = line[start + 1..end].to_string();
            (head, Some(attrs))
        }
        None => (line.to_string(), None),
    }
}

fn split_edge(head: &str) -> Option<(String, String)> {
    for sep in ["->", "--"] {
        if let Some(idx) = head.find(sep) {
            let from = head[..idx].trim();
            let to = head[idx + sep.len()..].trim();
            if !from.is_empty() && !to.is_empty() {
                return Some((unquote(from), unquote(to)));
            }
        }
    }
    None
}

fn parse_attrs(attrs: Option<String>) -> Vec<(String, String)> {
    let Some(attrs) = attrs else {
        return Vec::new();
    };
    attrs
        .split(',')
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            Some((unquote(k.trim()), unquote(v.trim())))
        })
        .collect()
}

fn unquote(s: &str) -> String {
    s.trim().trim_matches('"').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vna_nodes_and_ties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts-2.vna");
        std::fs::write(
            &path,
            "*node data\nID race income\nA white 1\nB black 2\n*tie data\nfrom to weight\nA B 3\n",
        )
        .unwrap();

        let g = parse_vna(&path, true).unwrap();
        assert_eq!(g.nodes.len(), 2);
        assert_eq!(g.nodes[0].id, "A");
        assert_eq!(
            g.nodes[0].attrs,
            vec![
                ("race".to_string(), "white".to_string()),
                ("income".to_string(), "1".to_string())
            ]
        );
        assert_eq!(g.edges.len(), 1);
        assert_eq!(g.edges[0].from, "A");
        assert_eq!(g.edges[0].to, "B");
        assert_eq!(g.edges[0].attrs, vec![("weight".to_string(), "3".to_string())]);
    }

    #[test]
    fn missing_tie_marker_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.vna");
        std::fs::write(&path, "*node data\nID a\nX 1\n").unwrap();
        let err = parse_vna(&path, true).unwrap_err();
        assert!(matches!(err, ClientError::MalformedArtifact { .. }));
    }

    #[test]
    fn parses_dot_nodes_and_edges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts-2.gv");
        std::fs::write(
            &path,
            "digraph contacts {\n  A [race=\"white\"];\n  B [race=\"black\"];\n  A -> B [weight=3];\n}\n",
        )
        .unwrap();

        let g = parse_dot(&path, true).unwrap();
        assert_eq!(g.nodes.len(), 2);
        assert_eq!(g.edges.len(), 1);
        assert_eq!(g.edges[0], GraphEdge {
            from: "A".to_string(),
            to: "B".to_string(),
            attrs: vec![("weight".to_string(), "3".to_string())],
        });
    }
}
