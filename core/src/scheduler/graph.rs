use std::collections::{HashMap, HashSet};

/// DFS over the follows edges starting at `start`. Returns the cycle path
/// formatted `a -> b -> a` when one exists.
pub fn find_cycle(edges: &HashMap<String, Vec<String>>, start: &str) -> Option<String> {
    let mut visited = HashSet::new();
    let mut stack = Vec::new();
    if dfs(edges, start, &mut visited, &mut stack) {
        Some(stack.join(" -> "))
    } else {
        None
    }
}

fn dfs(
    edges: &HashMap<String, Vec<String>>,
    node: &str,
    visited: &mut HashSet<String>,
    stack: &mut Vec<String>,
) -> bool {
    visited.insert(node.to_string());
    stack.push(node.to_string());

    if let Some(deps) = edges.get(node) {
        for dep in deps {
            if let Some(pos) = stack.iter().position(|x| x == dep) {
                stack.push(dep.clone());
                *stack = stack[pos..].to_vec();
                return true;
            }
            if !visited.contains(dep) && dfs(edges, dep, visited, stack) {
                return true;
            }
        }
    }

    stack.pop();
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, v)| {
                (
                    k.to_string(),
                    v.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                )
            })
            .collect()
    }

    #[test]
    fn linear_chain_has_no_cycle() {
        let e = edges(&[("c", &["b"]), ("b", &["a"]), ("a", &[])]);
        assert_eq!(find_cycle(&e, "c"), None);
    }

    #[test]
    fn two_node_cycle_reports_path() {
        let e = edges(&[("a", &["b"]), ("b", &["a"])]);
        let path = find_cycle(&e, "a").expect("cycle");
        assert!(path.contains(" -> "));
        assert_eq!(path.matches('a').count() + path.matches('b').count(), 3);
    }

    #[test]
    fn self_cycle_detected() {
        let e = edges(&[("a", &["a"])]);
        assert_eq!(find_cycle(&e, "a"), Some("a -> a".to_string()));
    }
}
