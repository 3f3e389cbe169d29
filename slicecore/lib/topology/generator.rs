use super::{Link, TopologyKind};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Generates the links of a topology over `member_count` VMs.
///
/// The links use zero-based positions within the segment; callers map them onto slice-wide VM
/// indices with [`Link::map`]. The output is deterministic, both in content and order.
///
/// - `Linear`: `k <-> k+1` for every consecutive pair.
/// - `Ring`: the linear links plus `0 <-> n-1` once there are at least 3 members.
/// - `Tree`: every position `i > 0` is linked to its binary-heap parent `(i - 1) / 2`.
///
/// ## Examples
///
/// ```
/// use slicecore::topology::{generate_edges, Link, TopologyKind};
///
/// let edges = generate_edges(TopologyKind::Ring, 3);
/// assert_eq!(edges, vec![Link::new(0, 1), Link::new(1, 2), Link::new(0, 2)]);
/// ```
pub fn generate_edges(kind: TopologyKind, member_count: usize) -> Vec<Link> {
    match kind {
        TopologyKind::Linear => linear(member_count),
        TopologyKind::Ring => {
            let mut edges = linear(member_count);
            // With two members the closing link would repeat the only linear one.
            if member_count >= 3 {
                edges.push(Link::new(member_count - 1, 0));
            }
            edges
        }
        TopologyKind::Tree => (1..member_count)
            .map(|i| Link::new((i - 1) / 2, i))
            .collect(),
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn linear(member_count: usize) -> Vec<Link> {
    (1..member_count).map(|k| Link::new(k - 1, k)).collect()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::topology::is_connected;

    fn degrees(n: usize, edges: &[Link]) -> Vec<usize> {
        let mut degrees = vec![0; n];
        for link in edges {
            degrees[link.a()] += 1;
            degrees[link.b()] += 1;
        }
        degrees
    }

    #[test]
    fn test_generate_edges_linear_is_a_path() {
        for n in 2..=10 {
            let edges = generate_edges(TopologyKind::Linear, n);
            assert_eq!(edges.len(), n - 1);
            assert!(is_connected(n, &edges));

            let degrees = degrees(n, &edges);
            assert_eq!(degrees.iter().filter(|d| **d == 1).count(), 2);
            assert!(degrees.iter().all(|d| *d <= 2));
        }

        assert_eq!(
            generate_edges(TopologyKind::Linear, 3),
            vec![Link::new(0, 1), Link::new(1, 2)]
        );
    }

    #[test]
    fn test_generate_edges_ring_is_a_cycle() {
        for n in 3..=10 {
            let edges = generate_edges(TopologyKind::Ring, n);
            assert_eq!(edges.len(), n);
            assert!(is_connected(n, &edges));
            assert!(degrees(n, &edges).iter().all(|d| *d == 2));
        }
    }

    #[test]
    fn test_generate_edges_short_ring_has_no_duplicates() {
        assert_eq!(generate_edges(TopologyKind::Ring, 2), vec![Link::new(0, 1)]);
        assert!(generate_edges(TopologyKind::Ring, 1).is_empty());
        assert!(generate_edges(TopologyKind::Ring, 0).is_empty());
    }

    #[test]
    fn test_generate_edges_tree_is_connected_and_acyclic() {
        for n in 5..=10 {
            let edges = generate_edges(TopologyKind::Tree, n);
            // A connected graph with n - 1 edges over n vertices is a tree.
            assert_eq!(edges.len(), n - 1);
            assert!(is_connected(n, &edges));
        }

        assert_eq!(
            generate_edges(TopologyKind::Tree, 5),
            vec![
                Link::new(0, 1),
                Link::new(0, 2),
                Link::new(1, 3),
                Link::new(1, 4)
            ]
        );
    }

    #[test]
    fn test_generate_edges_is_deterministic_and_unique() {
        for kind in [TopologyKind::Linear, TopologyKind::Ring, TopologyKind::Tree] {
            for n in 0..=10 {
                let first = generate_edges(kind, n);
                assert_eq!(first, generate_edges(kind, n));

                let unique: HashSet<_> = first.iter().collect();
                assert_eq!(unique.len(), first.len());
                assert!(first.iter().all(|link| !link.is_loop()));
            }
        }
    }
}
