// ABOUTME: Rebuilds the notebook hierarchy from flat parent pointers
// ABOUTME: Produces notebook id -> directory segments, rejecting cycles

use crate::model::Notebook;
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// Arena node. `parent == None` means the node hangs off the export root.
struct Node<'a> {
    id: &'a str,
    title: &'a str,
    parent: Option<usize>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Notebook id -> ancestor titles, root first, each trimmed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathTable {
    paths: HashMap<String, Vec<String>>,
}

impl PathTable {
    pub fn get(&self, id: &str) -> Option<&[String]> {
        self.paths.get(id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.paths.contains_key(id)
    }

    /// Segments joined with the platform separator.
    pub fn relative_path(&self, id: &str) -> Option<PathBuf> {
        self.get(id).map(|segments| segments.iter().collect())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Entries sorted by notebook id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        let mut entries: Vec<_> = self
            .paths
            .iter()
            .map(|(id, segments)| (id.as_str(), segments.as_slice()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}

/// Computes the output directory of every live notebook.
///
/// Deleted notebooks are dropped before anything else, so they never act as
/// parents. A parent id that does not name a live notebook places the child
/// directly under the root. A parent chain that loops back on itself fails
/// the whole resolution.
pub fn resolve_paths(notebooks: &[Notebook]) -> Result<PathTable> {
    let live: Vec<&Notebook> = notebooks.iter().filter(|nb| !nb.is_deleted).collect();

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(live.len());
    for (i, nb) in live.iter().enumerate() {
        if index.insert(nb.id.as_str(), i).is_some() {
            return Err(Error::DuplicateNotebook { id: nb.id.clone() });
        }
    }

    let nodes: Vec<Node> = live
        .iter()
        .map(|nb| Node {
            id: &nb.id,
            title: &nb.title,
            parent: nb
                .parent_id
                .as_deref()
                .and_then(|pid| index.get(pid).copied()),
        })
        .collect();

    let mut marks = vec![Mark::Unvisited; nodes.len()];
    let mut segments: Vec<Vec<String>> = vec![Vec::new(); nodes.len()];
    let mut chain = Vec::new();

    for start in 0..nodes.len() {
        // Climb until the root or an already-resolved ancestor.
        let mut cursor = Some(start);
        while let Some(i) = cursor {
            match marks[i] {
                Mark::Done => break,
                Mark::InProgress => {
                    return Err(Error::NotebookCycle {
                        id: nodes[i].id.to_string(),
                    })
                }
                Mark::Unvisited => {
                    marks[i] = Mark::InProgress;
                    chain.push(i);
                    cursor = nodes[i].parent;
                }
            }
        }

        // Unwind root-first so each parent is finished before its child.
        while let Some(i) = chain.pop() {
            let mut path = match nodes[i].parent {
                Some(p) => segments[p].clone(),
                None => Vec::new(),
            };
            path.push(nodes[i].title.trim().to_string());
            segments[i] = path;
            marks[i] = Mark::Done;
        }
    }

    let paths = nodes
        .iter()
        .zip(segments)
        .map(|(node, path)| (node.id.to_string(), path))
        .collect();

    Ok(PathTable { paths })
}
