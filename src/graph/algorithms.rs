/// Graph algorithms shared by the enrichment passes
///
/// - Brandes betweenness centrality (unweighted, directed) for ring
///   leadership ranking
/// - Undirected connected components via BFS for community detection and
///   shell-chain collapsing
///
/// Both operate on caller-prepared node lists and adjacency maps so each pass
/// can scope them to its own subgraph. Node and neighbor order is the caller's
/// insertion order, which keeps every traversal deterministic.
use indexmap::IndexMap;
use std::collections::VecDeque;

/// Brandes' algorithm over an unweighted directed graph.
/// Returns raw (unnormalized) betweenness per node, keyed in `nodes` order.
pub fn brandes_betweenness(
    nodes: &[String],
    adjacency: &IndexMap<String, Vec<String>>,
) -> IndexMap<String, f64> {
    let n = nodes.len();
    let index_of: IndexMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    // Dense neighbor lists in node-index space.
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (from, targets) in adjacency {
        if let Some(&fi) = index_of.get(from.as_str()) {
            for to in targets {
                if let Some(&ti) = index_of.get(to.as_str()) {
                    neighbors[fi].push(ti);
                }
            }
        }
    }

    let mut centrality = vec![0.0f64; n];

    for s in 0..n {
        let mut stack: Vec<usize> = Vec::new();
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist = vec![-1i64; n];
        sigma[s] = 1.0;
        dist[s] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &neighbors[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }

    nodes
        .iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), centrality[i]))
        .collect()
}

/// Connected components over an undirected adjacency map, BFS from each
/// unvisited node in `nodes` order. The adjacency map must already be
/// symmetric.
pub fn connected_components(
    nodes: &[String],
    adjacency: &IndexMap<String, Vec<String>>,
) -> Vec<Vec<String>> {
    let mut visited: IndexMap<&str, bool> = nodes.iter().map(|id| (id.as_str(), false)).collect();
    let mut components = Vec::new();

    for start in nodes {
        if visited.get(start.as_str()).copied().unwrap_or(true) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start.clone());
        visited.insert(start.as_str(), true);

        while let Some(current) = queue.pop_front() {
            component.push(current.clone());
            if let Some(nbrs) = adjacency.get(&current) {
                for nbr in nbrs {
                    if let Some(seen) = visited.get_mut(nbr.as_str()) {
                        if !*seen {
                            *seen = true;
                            queue.push_back(nbr.clone());
                        }
                    }
                }
            }
        }

        components.push(component);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adj(edges: &[(&str, &str)]) -> IndexMap<String, Vec<String>> {
        let mut map: IndexMap<String, Vec<String>> = IndexMap::new();
        for (from, to) in edges {
            map.entry(from.to_string()).or_default().push(to.to_string());
        }
        map
    }

    #[test]
    fn test_brandes_path_midpoint() {
        // A -> B -> C: all shortest paths between A and C pass through B.
        let nodes: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let adjacency = adj(&[("A", "B"), ("B", "C")]);
        let centrality = brandes_betweenness(&nodes, &adjacency);
        assert_eq!(centrality["A"], 0.0);
        assert_eq!(centrality["B"], 1.0);
        assert_eq!(centrality["C"], 0.0);
    }

    #[test]
    fn test_brandes_cycle_is_symmetric() {
        let nodes: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let adjacency = adj(&[("A", "B"), ("B", "C"), ("C", "A")]);
        let centrality = brandes_betweenness(&nodes, &adjacency);
        assert_eq!(centrality["A"], centrality["B"]);
        assert_eq!(centrality["B"], centrality["C"]);
    }

    #[test]
    fn test_components_partition_nodes() {
        let nodes: Vec<String> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let adjacency = adj(&[("A", "B"), ("B", "A"), ("C", "D"), ("D", "C")]);
        let components = connected_components(&nodes, &adjacency);
        assert_eq!(components.len(), 3);
        assert_eq!(components[0], vec!["A", "B"]);
        assert_eq!(components[1], vec!["C", "D"]);
        assert_eq!(components[2], vec!["E"]);
    }
}
