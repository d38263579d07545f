//! Directed acyclic word graph over the unique substrings of a query
//! (§4.7), built from the query's lightweight BWT intervals.
//!
//! Construction is two-pass, matching the reference encoder's approach:
//! first discover every reachable `(lo, hi)` interval and the edges between
//! them (arbitrary discovery order), then run a Kahn topological sort so
//! that every predecessor's final id is smaller than its successors' —
//! discovery order alone does not guarantee this when two different parents
//! converge on the same child interval.

use super::lightbwt::LightBwt;
use crate::alphabet::{A, C, G, N, T};
use std::collections::{HashMap, VecDeque};

pub const NO_SYMBOL: u8 = 255;

#[derive(Debug, Clone)]
pub struct DawgNode {
    pub lo: usize,
    pub hi: usize,
    /// The trailing symbol extending into this node; `NO_SYMBOL` for the
    /// root (the empty string).
    pub symbol: u8,
    pub preds: Vec<u32>,
}

pub struct Dawg {
    pub nodes: Vec<DawgNode>,
}

const BASES: [u8; 5] = [A, C, G, T, N];

impl Dawg {
    /// Build the full DAWG by BFS over backward extensions of the query's
    /// lightweight BWT, followed by a topological re-sort.
    pub fn build(light: &LightBwt) -> Self {
        let (root_lo, root_hi) = light.full_interval();

        // Phase 1: discovery. `tmp` holds nodes in arbitrary discovery
        // order; `tmp_preds[i]` lists discovery-order parent indices.
        let mut tmp: Vec<(usize, usize, u8)> = vec![(root_lo, root_hi, NO_SYMBOL)];
        let mut tmp_preds: Vec<Vec<u32>> = vec![Vec::new()];
        let mut index_of: HashMap<(usize, usize), u32> = HashMap::new();
        index_of.insert((root_lo, root_hi), 0);

        let mut queue: VecDeque<u32> = VecDeque::new();
        queue.push_back(0);
        while let Some(pid) = queue.pop_front() {
            let (plo, phi, _) = tmp[pid as usize];
            for &c in &BASES {
                let (lo, hi) = light.extend(plo, phi, c);
                if hi <= lo {
                    continue;
                }
                let key = (lo, hi);
                if let Some(&cid) = index_of.get(&key) {
                    tmp_preds[cid as usize].push(pid);
                } else {
                    let cid = tmp.len() as u32;
                    tmp.push((lo, hi, c));
                    tmp_preds.push(vec![pid]);
                    index_of.insert(key, cid);
                    queue.push_back(cid);
                }
            }
        }

        // Phase 2: Kahn's topological sort on the discovery-order graph.
        let n = tmp.len();
        let mut in_degree: Vec<usize> = tmp_preds.iter().map(|p| p.len()).collect();
        // Build forward adjacency (parent -> children) from tmp_preds.
        let mut children: Vec<Vec<u32>> = vec![Vec::new(); n];
        for (child, preds) in tmp_preds.iter().enumerate() {
            for &p in preds {
                children[p as usize].push(child as u32);
            }
        }

        let mut order: Vec<u32> = Vec::with_capacity(n);
        let mut ready: VecDeque<u32> = VecDeque::new();
        ready.push_back(0);
        let mut in_deg_work = in_degree.clone();
        in_deg_work[0] = 0;
        let mut visited = vec![false; n];
        visited[0] = true;
        while let Some(pid) = ready.pop_front() {
            order.push(pid);
            for &c in &children[pid as usize] {
                in_deg_work[c as usize] = in_deg_work[c as usize].saturating_sub(1);
                if in_deg_work[c as usize] == 0 && !visited[c as usize] {
                    visited[c as usize] = true;
                    ready.push_back(c);
                }
            }
        }
        // Every node here is reachable from root by construction, so
        // `order` already covers all n nodes (DAG, no cycles reachable from
        // root by extension semantics).
        let _ = &mut in_degree;

        let mut final_id = vec![0u32; n];
        for (new_id, &old_id) in order.iter().enumerate() {
            final_id[old_id as usize] = new_id as u32;
        }

        let mut nodes = vec![
            DawgNode { lo: 0, hi: 0, symbol: NO_SYMBOL, preds: Vec::new() };
            n
        ];
        for &old_id in &order {
            let new_id = final_id[old_id as usize] as usize;
            let (lo, hi, symbol) = tmp[old_id as usize];
            let mut preds: Vec<u32> = tmp_preds[old_id as usize]
                .iter()
                .map(|&p| final_id[p as usize])
                .collect();
            preds.sort_unstable();
            preds.dedup();
            nodes[new_id] = DawgNode { lo, hi, symbol, preds };
        }

        Dawg { nodes }
    }

    /// A straight backward chain of length `len + 1`: node `i` represents
    /// the query's last `i` symbols. Used when the caller guarantees
    /// end-to-end semantics and does not need substring sharing.
    pub fn build_linear(light: &LightBwt, query: &[u8]) -> Self {
        let encoded = crate::alphabet::encode(query);
        let (mut lo, mut hi) = light.full_interval();
        let mut nodes = vec![DawgNode { lo, hi, symbol: NO_SYMBOL, preds: Vec::new() }];
        for (i, &c) in encoded.iter().rev().enumerate() {
            let (nlo, nhi) = light.extend(lo, hi, c);
            nodes.push(DawgNode {
                lo: nlo,
                hi: nhi,
                symbol: c,
                preds: vec![i as u32],
            });
            lo = nlo;
            hi = nhi;
        }
        Dawg { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predecessors_always_precede_successors() {
        let light = LightBwt::build(b"ACGTACGTACGT");
        let dawg = Dawg::build(&light);
        for (id, node) in dawg.nodes.iter().enumerate() {
            for &p in &node.preds {
                assert!((p as usize) < id, "pred {} >= node {}", p, id);
            }
        }
    }

    #[test]
    fn root_has_no_predecessors_and_no_symbol() {
        let light = LightBwt::build(b"ACGT");
        let dawg = Dawg::build(&light);
        assert!(dawg.nodes[0].preds.is_empty());
        assert_eq!(dawg.nodes[0].symbol, NO_SYMBOL);
    }

    #[test]
    fn linear_dawg_has_len_plus_one_nodes() {
        let query = b"ACGTN";
        let light = LightBwt::build(query);
        let dawg = Dawg::build_linear(&light, query);
        assert_eq!(dawg.len(), query.len() + 1);
    }
}
