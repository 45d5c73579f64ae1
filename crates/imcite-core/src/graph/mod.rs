//! Citation graph construction
//!
//! Builds an undirected edge set over the saved library in up to three
//! incremental waves: shared-authorship edges (local, instant), direct
//! citation edges, then second-degree edges through one intermediate
//! (non-library) paper. Each wave that adds edges pushes a snapshot to the
//! consumer, so the view can paint before the network work finishes.

use crate::domain::Paper;
use crate::sources::ReferenceProvider;
use serde::Serialize;
use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedSender;

/// An undirected relationship between two library papers. Degree 1 is a
/// shared author or a direct citation; degree 2 is a citation path through
/// one intermediate paper.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub degree: u8,
}

/// One incremental delivery. Edge sets grow monotonically within a build.
#[derive(Clone, Debug, Serialize)]
pub struct GraphSnapshot {
    pub papers: Vec<Paper>,
    pub edges: Vec<GraphEdge>,
}

/// Tuning knobs. The intermediate cap bounds API usage in the second-degree
/// pass; it is not a quality-ranked selection.
#[derive(Clone, Debug)]
pub struct GraphConfig {
    pub intermediate_cap: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            intermediate_cap: 20,
        }
    }
}

pub struct GraphBuilder<'a> {
    provider: &'a dyn ReferenceProvider,
    config: GraphConfig,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(provider: &'a dyn ReferenceProvider) -> Self {
        Self {
            provider,
            config: GraphConfig::default(),
        }
    }

    pub fn with_config(provider: &'a dyn ReferenceProvider, config: GraphConfig) -> Self {
        Self { provider, config }
    }

    /// Build the graph for `papers`, delivering snapshots on `sender`.
    ///
    /// Reference fetches are sequential, not fanned out, to respect public
    /// rate limits; a failed fetch for one paper just contributes no edges.
    /// A dropped receiver cancels the remaining passes.
    pub async fn build(&self, papers: Vec<Paper>, sender: &UnboundedSender<GraphSnapshot>) {
        let mut edges = authorship_edges(&papers);
        tracing::debug!(count = edges.len(), "authorship pass complete");
        deliver(sender, &papers, &edges);
        if sender.is_closed() {
            return;
        }

        let saved_ids: HashSet<&str> = papers.iter().map(|p| p.id.as_str()).collect();

        // Direct citation pass. Intermediates remember the first saved paper
        // observed to cite them; later re-discovery is ignored.
        let mut intermediates: Vec<(String, String)> = Vec::new();
        let mut seen_intermediates: HashSet<String> = HashSet::new();
        let mut found_direct = false;

        for paper in &papers {
            let refs = self.provider.references(&paper.id).await;
            for ref_id in refs {
                if ref_id == paper.id {
                    continue;
                }
                if saved_ids.contains(ref_id.as_str()) {
                    if !has_edge(&edges, &paper.id, &ref_id) {
                        edges.push(GraphEdge {
                            source: paper.id.clone(),
                            target: ref_id,
                            degree: 1,
                        });
                        found_direct = true;
                    }
                } else if seen_intermediates.insert(ref_id.clone()) {
                    intermediates.push((ref_id, paper.id.clone()));
                }
            }
        }
        tracing::debug!(
            edges = edges.len(),
            intermediates = intermediates.len(),
            "citation pass complete"
        );
        if found_direct {
            deliver(sender, &papers, &edges);
        }
        if sender.is_closed() {
            return;
        }

        // Second-degree pass over the first N intermediates, in discovery
        // order.
        let mut found_second = false;
        for (intermediate, origin) in intermediates.iter().take(self.config.intermediate_cap) {
            let refs = self.provider.references(intermediate).await;
            for ref_id in refs {
                // A path back to the originating paper would be a self-loop
                if ref_id == *origin {
                    continue;
                }
                if saved_ids.contains(ref_id.as_str()) && !has_edge(&edges, origin, &ref_id) {
                    edges.push(GraphEdge {
                        source: origin.clone(),
                        target: ref_id,
                        degree: 2,
                    });
                    found_second = true;
                }
            }
        }
        tracing::debug!(edges = edges.len(), "second-degree pass complete");
        if found_second {
            deliver(sender, &papers, &edges);
        }
    }
}

/// Degree-1 edges between every pair of saved papers with a case-insensitive
/// author-name intersection. O(n² · a²), fine for library-scale inputs.
fn authorship_edges(papers: &[Paper]) -> Vec<GraphEdge> {
    let author_sets: Vec<HashSet<String>> = papers
        .iter()
        .map(|p| p.authors.iter().map(|a| a.to_lowercase()).collect())
        .collect();

    let mut edges = Vec::new();
    for i in 0..papers.len() {
        for j in (i + 1)..papers.len() {
            if !author_sets[i].is_disjoint(&author_sets[j]) {
                edges.push(GraphEdge {
                    source: papers[i].id.clone(),
                    target: papers[j].id.clone(),
                    degree: 1,
                });
            }
        }
    }
    edges
}

/// Unordered-pair containment scan over the accumulated edge list
fn has_edge(edges: &[GraphEdge], a: &str, b: &str) -> bool {
    edges
        .iter()
        .any(|e| (e.source == a && e.target == b) || (e.source == b && e.target == a))
}

fn deliver(sender: &UnboundedSender<GraphSnapshot>, papers: &[Paper], edges: &[GraphEdge]) {
    // A send error means the consumer went away; the is_closed checks
    // between passes stop further work.
    let _ = sender.send(GraphSnapshot {
        papers: papers.to_vec(),
        edges: edges.to_vec(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockReferences {
        refs: HashMap<String, Vec<String>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockReferences {
        fn new(entries: &[(&str, &[&str])]) -> Self {
            let refs = entries
                .iter()
                .map(|(id, targets)| {
                    (
                        id.to_string(),
                        targets.iter().map(|t| t.to_string()).collect(),
                    )
                })
                .collect();
            Self {
                refs,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ReferenceProvider for MockReferences {
        async fn references(&self, paper_id: &str) -> Vec<String> {
            self.calls.lock().unwrap().push(paper_id.to_string());
            self.refs.get(paper_id).cloned().unwrap_or_default()
        }
    }

    fn paper(id: &str, authors: &[&str]) -> Paper {
        Paper::new(
            id.to_string(),
            format!("Paper {}", id),
            authors.iter().map(|a| a.to_string()).collect(),
        )
    }

    async fn collect_snapshots(
        provider: &MockReferences,
        config: GraphConfig,
        papers: Vec<Paper>,
    ) -> Vec<GraphSnapshot> {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        GraphBuilder::with_config(provider, config)
            .build(papers, &tx)
            .await;
        drop(tx);
        let mut snapshots = Vec::new();
        while let Some(snapshot) = rx.recv().await {
            snapshots.push(snapshot);
        }
        snapshots
    }

    #[tokio::test]
    async fn test_authorship_edges_case_insensitive() {
        let provider = MockReferences::new(&[]);
        let papers = vec![
            paper("a", &["Jane Doe"]),
            paper("b", &["JANE DOE", "Someone Else"]),
            paper("c", &["Unrelated Author"]),
        ];
        let snapshots = collect_snapshots(&provider, GraphConfig::default(), papers).await;

        assert_eq!(snapshots[0].edges.len(), 1);
        assert_eq!(snapshots[0].edges[0].source, "a");
        assert_eq!(snapshots[0].edges[0].target, "b");
        assert_eq!(snapshots[0].edges[0].degree, 1);
    }

    #[tokio::test]
    async fn test_citation_edge_not_duplicated_over_authorship() {
        // A and B share an author AND A cites B: exactly one edge.
        let provider = MockReferences::new(&[("a", &["b"])]);
        let papers = vec![paper("a", &["Jane Doe"]), paper("b", &["Jane Doe"])];
        let snapshots = collect_snapshots(&provider, GraphConfig::default(), papers).await;

        let last = snapshots.last().unwrap();
        assert_eq!(last.edges.len(), 1);
    }

    #[tokio::test]
    async fn test_direct_citation_edge() {
        let provider = MockReferences::new(&[("a", &["b"])]);
        let papers = vec![paper("a", &["X"]), paper("b", &["Y"])];
        let snapshots = collect_snapshots(&provider, GraphConfig::default(), papers).await;

        // Empty authorship snapshot, then the citation snapshot
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[0].edges.is_empty());
        assert_eq!(
            snapshots[1].edges,
            vec![GraphEdge {
                source: "a".to_string(),
                target: "b".to_string(),
                degree: 1,
            }]
        );
    }

    #[tokio::test]
    async fn test_second_degree_through_intermediate() {
        // A cites X (not saved); X cites C (saved): degree-2 edge A-C.
        let provider = MockReferences::new(&[("a", &["x"]), ("x", &["c"])]);
        let papers = vec![paper("a", &["P"]), paper("b", &["Q"]), paper("c", &["R"])];
        let snapshots = collect_snapshots(&provider, GraphConfig::default(), papers).await;

        let last = snapshots.last().unwrap();
        assert_eq!(
            last.edges,
            vec![GraphEdge {
                source: "a".to_string(),
                target: "c".to_string(),
                degree: 2,
            }]
        );
    }

    #[tokio::test]
    async fn test_second_degree_self_loop_excluded() {
        // X's references point back at its originating paper only.
        let provider = MockReferences::new(&[("a", &["x"]), ("x", &["a"])]);
        let papers = vec![paper("a", &["P"]), paper("b", &["Q"])];
        let snapshots = collect_snapshots(&provider, GraphConfig::default(), papers).await;

        // Only the (empty) authorship snapshot: no edges ever found
        assert_eq!(snapshots.len(), 1);
        assert!(snapshots[0].edges.is_empty());
    }

    #[tokio::test]
    async fn test_intermediate_cap_limits_fetches() {
        let provider = MockReferences::new(&[("a", &["x", "y", "z"])]);
        let papers = vec![paper("a", &["P"]), paper("b", &["Q"])];
        let config = GraphConfig {
            intermediate_cap: 1,
        };
        collect_snapshots(&provider, config, papers).await;

        // a, b fetched in pass 2; only the first intermediate in pass 3
        let calls = provider.calls.lock().unwrap();
        assert_eq!(*calls, vec!["a", "b", "x"]);
    }

    #[tokio::test]
    async fn test_intermediate_attribution_first_writer_wins() {
        // Both a and b cite x; x cites back to b. The intermediate belongs
        // to a (first observer), so x->b yields an a-b edge, not a skip.
        let provider = MockReferences::new(&[("a", &["x"]), ("b", &["x"]), ("x", &["b"])]);
        let papers = vec![paper("a", &["P"]), paper("b", &["Q"])];
        let snapshots = collect_snapshots(&provider, GraphConfig::default(), papers).await;

        let last = snapshots.last().unwrap();
        assert_eq!(
            last.edges,
            vec![GraphEdge {
                source: "a".to_string(),
                target: "b".to_string(),
                degree: 2,
            }]
        );
    }

    #[tokio::test]
    async fn test_edge_sets_grow_monotonically() {
        let provider =
            MockReferences::new(&[("a", &["b", "x"]), ("x", &["c"])]);
        let papers = vec![
            paper("a", &["Shared"]),
            paper("b", &["Shared"]),
            paper("c", &["Other"]),
        ];
        let snapshots = collect_snapshots(&provider, GraphConfig::default(), papers).await;

        let mut prev = 0;
        for snapshot in &snapshots {
            assert!(snapshot.edges.len() >= prev);
            prev = snapshot.edges.len();
        }
        assert!(snapshots.len() <= 3);
    }

    #[tokio::test]
    async fn test_dropped_receiver_stops_fetching() {
        let provider = MockReferences::new(&[("a", &["x"]), ("x", &["b"])]);
        let papers = vec![paper("a", &["P"]), paper("b", &["Q"])];

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        GraphBuilder::new(&provider).build(papers, &tx).await;

        // Authorship pass runs, but no reference fetches happen
        assert!(provider.calls.lock().unwrap().is_empty());
    }
}
