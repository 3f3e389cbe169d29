use std::collections::VecDeque;

use super::Link;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns true if `vm_count` VMs joined by `edges` form a single connected graph.
///
/// A single VM needs no links and counts as connected. Zero VMs never do.
pub fn is_connected(vm_count: usize, edges: &[Link]) -> bool {
    vm_count > 0 && reachable_count(vm_count, edges) == vm_count
}

/// Counts the VMs reachable from VM `0` with a breadth-first traversal over `edges`.
///
/// Links that reference an index at or beyond `vm_count` are ignored.
pub fn reachable_count(vm_count: usize, edges: &[Link]) -> usize {
    if vm_count == 0 {
        return 0;
    }

    let mut adjacency = vec![Vec::new(); vm_count];
    for link in edges {
        if link.b() < vm_count {
            adjacency[link.a()].push(link.b());
            adjacency[link.b()].push(link.a());
        }
    }

    let mut visited = vec![false; vm_count];
    let mut queue = VecDeque::from([0]);
    visited[0] = true;
    let mut count = 0;

    while let Some(current) = queue.pop_front() {
        count += 1;
        for &next in &adjacency[current] {
            if !visited[next] {
                visited[next] = true;
                queue.push_back(next);
            }
        }
    }

    count
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{generate_edges, TopologyKind};

    #[test]
    fn test_is_connected_single_vm_without_links() {
        assert!(is_connected(1, &[]));
    }

    #[test]
    fn test_is_connected_empty_graph() {
        assert!(!is_connected(0, &[]));
        assert!(!is_connected(2, &[]));
        assert_eq!(reachable_count(0, &[]), 0);
    }

    #[test]
    fn test_is_connected_detects_isolated_vm() {
        let edges = [Link::new(0, 1), Link::new(1, 2)];
        assert!(is_connected(3, &edges));
        assert!(!is_connected(4, &edges));
        assert_eq!(reachable_count(4, &edges), 3);
    }

    #[test]
    fn test_is_connected_two_disjoint_segments() {
        // A ring over 0..3 and a chain over 3..5 with nothing in between.
        let mut edges = generate_edges(TopologyKind::Ring, 3);
        edges.extend(generate_edges(TopologyKind::Linear, 2).iter().map(|l| l.map(|i| i + 3)));
        assert!(!is_connected(5, &edges));
        assert_eq!(reachable_count(5, &edges), 3);

        // One link between the segments joins them.
        edges.push(Link::new(2, 3));
        assert!(is_connected(5, &edges));
    }

    #[test]
    fn test_is_connected_ignores_out_of_range_links() {
        let edges = [Link::new(0, 1), Link::new(1, 7)];
        assert!(is_connected(2, &edges));
        assert!(!is_connected(3, &edges));
    }

    #[test]
    fn test_is_connected_traversal_not_rooted_at_link_order() {
        // Links listed away from VM 0 still reach everything.
        let edges = [Link::new(2, 3), Link::new(1, 2), Link::new(0, 1)];
        assert!(is_connected(4, &edges));
    }
}
