//! Exact maximum clique search.
//!
//! Branch and bound with greedy colouring bounds (Tomita and Seki's MCQ).
//! The colour classes of the candidate set give an upper bound on the
//! clique size reachable from the current branch.

/// Returns the indices of one maximum clique of the undirected graph given
/// by `adjacency`, sorted ascending.
///
/// An edge is assumed when either endpoint lists the other. Self loops and
/// out-of-range indices are ignored. The empty graph yields the empty clique.
pub fn maximum_clique<A: AsRef<[usize]>>(adjacency: &[A]) -> Vec<usize> {
    let n = adjacency.len();
    if n == 0 {
        return Vec::new();
    }

    let mut matrix = vec![vec![false; n]; n];
    for (v, list) in adjacency.iter().enumerate() {
        for &u in list.as_ref() {
            if u < n && u != v {
                matrix[v][u] = true;
                matrix[u][v] = true;
            }
        }
    }

    let degree: Vec<usize> = matrix.iter().map(|row| row.iter().filter(|&&e| e).count()).collect();
    let mut initial: Vec<usize> = (0..n).collect();
    initial.sort_by(|&a, &b| degree[b].cmp(&degree[a]).then(a.cmp(&b)));

    let mut search = CliqueSearch {
        matrix: &matrix,
        current: Vec::new(),
        best: vec![initial[0]],
    };
    search.expand(initial);

    let mut best = search.best;
    best.sort_unstable();
    best
}

struct CliqueSearch<'a> {
    matrix: &'a [Vec<bool>],
    current: Vec<usize>,
    best: Vec<usize>,
}

impl CliqueSearch<'_> {
    fn expand(&mut self, candidates: Vec<usize>) {
        let (order, colors) = self.color_sort(&candidates);
        for i in (0..order.len()).rev() {
            if self.current.len() + colors[i] <= self.best.len() {
                return;
            }
            let v = order[i];
            self.current.push(v);
            let next: Vec<usize> = order[..i]
                .iter()
                .copied()
                .filter(|&u| self.matrix[v][u])
                .collect();
            if next.is_empty() {
                if self.current.len() > self.best.len() {
                    self.best = self.current.clone();
                }
            } else {
                self.expand(next);
            }
            self.current.pop();
        }
    }

    /// Greedy sequential colouring. Returns the vertices ordered by colour
    /// class together with the (1-based) colour of each position.
    fn color_sort(&self, candidates: &[usize]) -> (Vec<usize>, Vec<usize>) {
        let mut classes: Vec<Vec<usize>> = Vec::new();
        for &v in candidates {
            let slot = classes
                .iter()
                .position(|class| class.iter().all(|&u| !self.matrix[v][u]));
            match slot {
                Some(k) => classes[k].push(v),
                None => classes.push(vec![v]),
            }
        }
        let mut order = Vec::with_capacity(candidates.len());
        let mut colors = Vec::with_capacity(candidates.len());
        for (k, class) in classes.into_iter().enumerate() {
            for v in class {
                order.push(v);
                colors.push(k + 1);
            }
        }
        (order, colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_vertices_give_a_single_vertex() {
        let adjacency: Vec<Vec<usize>> = vec![vec![], vec![], vec![]];
        assert_eq!(maximum_clique(&adjacency).len(), 1);
    }

    #[test]
    fn finds_the_triangle() {
        // 0-1-2 triangle plus a pendant 3 on 2
        let adjacency = vec![vec![1, 2], vec![0, 2], vec![0, 1, 3], vec![2]];
        assert_eq!(maximum_clique(&adjacency), vec![0, 1, 2]);
    }

    #[test]
    fn one_sided_edges_count() {
        let adjacency = vec![vec![1], vec![]];
        assert_eq!(maximum_clique(&adjacency), vec![0, 1]);
    }
}
