//! Longest increasing subsequence
//!
//! Used by keyed reconciliation to find the largest set of matched children
//! that are already in relative order. Every matched child outside that set
//! needs exactly one host move.

/// Indices of one longest strictly increasing subsequence of `seq`
///
/// Entries equal to `0` mean "no old counterpart" and are never part of the
/// result. Runs in O(n log n).
///
/// ```rust
/// use ripple_core::longest_increasing_subsequence;
///
/// // old positions (1-based) of new children C, A, B
/// assert_eq!(longest_increasing_subsequence(&[3, 1, 2]), vec![1, 2]);
/// ```
pub fn longest_increasing_subsequence(seq: &[usize]) -> Vec<usize> {
    // tails[k] = index of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::with_capacity(seq.len());
    let mut predecessors = vec![usize::MAX; seq.len()];

    for (i, &value) in seq.iter().enumerate() {
        if value == 0 {
            continue;
        }

        if let Some(&last) = tails.last() {
            if seq[last] < value {
                predecessors[i] = last;
                tails.push(i);
                continue;
            }
        } else {
            tails.push(i);
            continue;
        }

        // First tail whose value is >= `value`
        let pos = tails.partition_point(|&t| seq[t] < value);
        if value < seq[tails[pos]] {
            if pos > 0 {
                predecessors[i] = tails[pos - 1];
            }
            tails[pos] = i;
        }
    }

    let mut result = vec![0; tails.len()];
    let mut cursor = tails.last().copied();
    for slot in result.iter_mut().rev() {
        let Some(index) = cursor else { break };
        *slot = index;
        cursor = match predecessors[index] {
            usize::MAX => None,
            prev => Some(prev),
        };
    }
    result
}
