use super::models::{EdgeLabel, NodeLabel, NodeRef, Properties};
use super::trait_def::{GraphResult, GraphStore};
use crate::theory::TheoryCatalog;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateSummary {
    pub created_nodes: usize,
    pub linked_edges: usize,
}

fn to_properties<T: Serialize>(value: &T) -> GraphResult<Properties> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => {
            let mut map = Properties::new();
            map.insert("value".to_string(), other);
            Ok(map)
        }
    }
}

fn upsert_all<T: Serialize>(
    store: &dyn GraphStore,
    label: NodeLabel,
    items: &[T],
    key_of: impl Fn(&T) -> &str,
) -> GraphResult<usize> {
    let nodes = items
        .iter()
        .map(|item| Ok((key_of(item).to_string(), to_properties(item)?)))
        .collect::<GraphResult<Vec<_>>>()?;
    store.upsert_nodes(label, nodes)
}

/// Loads the catalog into the store. Safe to run on every startup: nodes
/// merge by key and edges are never duplicated.
pub fn populate(store: &dyn GraphStore, catalog: &TheoryCatalog) -> GraphResult<PopulateSummary> {
    let mut summary = PopulateSummary::default();

    summary.created_nodes += upsert_all(store, NodeLabel::Scale, &catalog.scales, |s| &s.name)?;
    summary.created_nodes += upsert_all(store, NodeLabel::Chord, &catalog.chords, |c| &c.name)?;
    summary.created_nodes += upsert_all(store, NodeLabel::Genre, &catalog.genres, |g| &g.name)?;
    summary.created_nodes += upsert_all(store, NodeLabel::Motif, &catalog.motifs, |m| &m.pattern)?;

    for link in &catalog.genre_motif_links {
        let linked = store.upsert_edge(
            EdgeLabel::Embraces,
            NodeRef::new(NodeLabel::Genre, &link.genre),
            NodeRef::new(NodeLabel::Motif, &link.motif),
        )?;
        if linked {
            summary.linked_edges += 1;
        } else {
            warn!("Could not link genre {} to motif {}", link.genre, link.motif);
        }
    }

    info!(
        "Theory graph populated: {} new nodes, {} links ensured",
        summary.created_nodes, summary.linked_edges
    );
    Ok(summary)
}
