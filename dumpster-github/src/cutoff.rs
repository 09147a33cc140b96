//! Per-kind cutoff policies for incremental fetches
//!
//! Every listing is ordered newest-updated first. Given a watermark `since`,
//! each kind decides which nodes of a page to keep and whether to request
//! the next page. The three strategies have different termination
//! conditions and must not be merged into one.

use chrono::{DateTime, Utc};

/// Anything with a last-update timestamp
pub trait Updated {
    fn updated_at(&self) -> DateTime<Utc>;
}

/// How a kind applies `since` to a page of nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cutoff {
    /// The query itself filters by update time (issues). Every node is kept
    /// and paging continues until the server reports no more pages.
    ServerFiltered,

    /// Nodes older than `since` are dropped but the page is finished
    /// (pull requests). Paging stops once the last node of a page is older
    /// than `since`.
    TrailingNodeStop,

    /// Nodes are kept until the first one older than `since` (discussions).
    /// That node, the rest of its page and all later pages are skipped.
    FirstStaleStop,
}

/// Result of applying a cutoff to one page
#[derive(Debug)]
pub struct Filtered<N> {
    pub kept: Vec<N>,
    /// No further page may be requested
    pub stop: bool,
}

impl Cutoff {
    pub fn apply<N: Updated>(self, nodes: Vec<N>, since: Option<DateTime<Utc>>) -> Filtered<N> {
        let Some(since) = since else {
            return Filtered {
                kept: nodes,
                stop: false,
            };
        };

        match self {
            Cutoff::ServerFiltered => Filtered {
                kept: nodes,
                stop: false,
            },
            Cutoff::TrailingNodeStop => {
                let stop = nodes.last().is_some_and(|n| n.updated_at() < since);
                let kept = nodes
                    .into_iter()
                    .filter(|n| n.updated_at() >= since)
                    .collect();
                Filtered { kept, stop }
            }
            Cutoff::FirstStaleStop => {
                let mut kept = Vec::with_capacity(nodes.len());
                let mut stop = false;
                for node in nodes {
                    if node.updated_at() < since {
                        stop = true;
                        break;
                    }
                    kept.push(node);
                }
                Filtered { kept, stop }
            }
        }
    }
}
