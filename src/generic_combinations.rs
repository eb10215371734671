//! Small combinatorial helpers used by the naive transition scheme,
//! standing in for Python's `itertools.combinations`.

use crate::literal::Lit;

/// Every `k`-subset of `0..n`, as sorted index lists, in lexicographic
/// order.
pub fn index_combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k > n {
        return Vec::new();
    }
    if k == 0 {
        return vec![Vec::new()];
    }
    let mut result = Vec::new();
    build_combinations(0, n, k, &mut Vec::new(), &mut result);
    result
}

fn build_combinations(
    start: usize,
    n: usize,
    k: usize,
    current: &mut Vec<usize>,
    result: &mut Vec<Vec<usize>>,
) {
    if current.len() == k {
        result.push(current.clone());
        return;
    }
    let remaining_needed = k - current.len();
    for i in start..=(n - remaining_needed) {
        current.push(i);
        build_combinations(i + 1, n, k, current, result);
        current.pop();
    }
}

/// Every `k`-subset of `items`, preserving relative order.
pub fn combinations(items: &[Lit; 8], k: usize) -> Vec<Vec<Lit>> {
    index_combinations(items.len(), k)
        .into_iter()
        .map(|idx| idx.iter().map(|i| items[*i]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_match_binomial_coefficients() {
        assert_eq!(index_combinations(8, 4).len(), 70);
        assert_eq!(index_combinations(8, 7).len(), 8);
        assert_eq!(index_combinations(8, 2).len(), 28);
        assert_eq!(index_combinations(8, 3).len(), 56);
    }
}
