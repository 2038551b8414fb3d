//! Exact maximum-weight bipartite assignment.
//!
//! Union members carry no ordering semantics, so comparing two unions means
//! pairing their members in whatever order aligns them best. A greedy pairing
//! is not enough: reordered but otherwise identical unions must reach a
//! perfect total, and greedy choices can lock in a locally-best pair that
//! ruins the global optimum. This module carries an exact O(n³) Hungarian
//! solver (shortest augmenting paths with potentials) over a rectangular
//! weight matrix.

/// Solve the maximum-weight assignment over a rectangular weight matrix.
///
/// `weights[i][j]` is the value of pairing row `i` with column `j`. Every row
/// of the shorter side is matched to a distinct member of the longer side;
/// the returned `(row, column)` pairs are sorted by row index. Unmatched
/// members of the longer side simply do not appear. Deterministic for a given
/// matrix.
///
/// An empty matrix (no rows, or rows with no columns) yields no pairs.
///
/// ```
/// use tysim::matching::max_assignment;
///
/// // The greedy pick (0.9 first) would strand the second row with 0.1;
/// // the optimal pairing crosses over for 0.8 + 0.85.
/// let weights = vec![vec![0.9, 0.8], vec![0.85, 0.1]];
/// assert_eq!(max_assignment(&weights), vec![(0, 1), (1, 0)]);
/// ```
#[must_use]
pub fn max_assignment(weights: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let rows = weights.len();
    if rows == 0 {
        return Vec::new();
    }
    let cols = weights[0].len();
    if cols == 0 {
        return Vec::new();
    }
    if rows > cols {
        // The solver wants rows <= cols; the assignment is symmetric, so
        // solve the transpose and flip the pairs back.
        let transposed: Vec<Vec<f64>> = (0..cols)
            .map(|j| (0..rows).map(|i| weights[i][j]).collect())
            .collect();
        let mut pairs: Vec<(usize, usize)> = max_assignment(&transposed)
            .into_iter()
            .map(|(r, c)| (c, r))
            .collect();
        pairs.sort_unstable();
        return pairs;
    }

    // Hungarian algorithm, shortest-augmenting-path formulation with row and
    // column potentials, minimizing the negated weights. Arrays are 1-indexed
    // with a virtual column 0; `matched_row[j]` is the row assigned to column
    // j, 0 meaning unassigned.
    let n = rows;
    let m = cols;
    let cost = |i: usize, j: usize| -weights[i - 1][j - 1];

    let mut row_potential = vec![0.0_f64; n + 1];
    let mut col_potential = vec![0.0_f64; m + 1];
    let mut matched_row = vec![0_usize; m + 1];
    let mut previous_col = vec![0_usize; m + 1];

    for i in 1..=n {
        matched_row[0] = i;
        let mut j0 = 0_usize;
        let mut min_slack = vec![f64::INFINITY; m + 1];
        let mut visited = vec![false; m + 1];

        loop {
            visited[j0] = true;
            let i0 = matched_row[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0_usize;
            for j in 1..=m {
                if visited[j] {
                    continue;
                }
                let slack = cost(i0, j) - row_potential[i0] - col_potential[j];
                if slack < min_slack[j] {
                    min_slack[j] = slack;
                    previous_col[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }
            for j in 0..=m {
                if visited[j] {
                    row_potential[matched_row[j]] += delta;
                    col_potential[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }
            j0 = j1;
            if matched_row[j0] == 0 {
                break;
            }
        }

        // Walk the augmenting path backwards, shifting assignments.
        loop {
            let j1 = previous_col[j0];
            matched_row[j0] = matched_row[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairs: Vec<(usize, usize)> = (1..=m)
        .filter(|&j| matched_row[j] != 0)
        .map(|j| (matched_row[j] - 1, j - 1))
        .collect();
    pairs.sort_unstable();
    pairs
}

/// Total weight of the optimal assignment over `weights`.
#[must_use]
pub fn max_assignment_total(weights: &[Vec<f64>]) -> f64 {
    max_assignment(weights)
        .into_iter()
        .map(|(i, j)| weights[i][j])
        .sum()
}
