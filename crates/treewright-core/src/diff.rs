//! Unified diff generation for before/after source text.
//!
//! Recipe runs report their changes as unified diffs of the printed trees.
//! Lines are compared with a longest-common-subsequence table, changes are
//! grouped into hunks with [`CONTEXT_LINES`] lines of context, and hunks whose
//! context would overlap are coalesced.

/// Number of unchanged lines shown around each change.
pub const CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal(usize, usize),
    Delete(usize),
    Insert(usize),
}

impl Op {
    fn is_change(&self) -> bool {
        !matches!(self, Op::Equal(..))
    }
}

/// Produce a unified diff of `before` and `after` for `path`.
///
/// Returns an empty string when the texts are identical.
pub fn unified_diff(path: &str, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }

    let old: Vec<&str> = before.split_inclusive('\n').collect();
    let new: Vec<&str> = after.split_inclusive('\n').collect();
    let ops = diff_ops(&old, &new);

    let mut out = String::new();
    out.push_str(&format!("--- a/{}\n", path));
    out.push_str(&format!("+++ b/{}\n", path));

    // Line positions (old, new) before each op.
    let mut positions = Vec::with_capacity(ops.len() + 1);
    let (mut o, mut n) = (0usize, 0usize);
    for op in &ops {
        positions.push((o, n));
        match op {
            Op::Equal(..) => {
                o += 1;
                n += 1;
            }
            Op::Delete(_) => o += 1,
            Op::Insert(_) => n += 1,
        }
    }
    positions.push((o, n));

    for (start, end) in hunk_ranges(&ops) {
        let (old_start, new_start) = positions[start];
        let (old_end, new_end) = positions[end];
        let old_count = old_end - old_start;
        let new_count = new_end - new_start;
        out.push_str(&format!(
            "@@ -{} +{} @@\n",
            hunk_range(old_start, old_count),
            hunk_range(new_start, new_count)
        ));
        for op in &ops[start..end] {
            let (sigil, line) = match *op {
                Op::Equal(i, _) => (' ', old[i]),
                Op::Delete(i) => ('-', old[i]),
                Op::Insert(j) => ('+', new[j]),
            };
            out.push(sigil);
            match line.strip_suffix('\n') {
                Some(text) => {
                    out.push_str(text);
                    out.push('\n');
                }
                None => {
                    out.push_str(line);
                    out.push('\n');
                    out.push_str("\\ No newline at end of file\n");
                }
            }
        }
    }

    out
}

fn hunk_range(start: usize, count: usize) -> String {
    if count == 0 {
        format!("{},0", start)
    } else {
        format!("{},{}", start + 1, count)
    }
}

fn diff_ops(old: &[&str], new: &[&str]) -> Vec<Op> {
    let n = old.len();
    let m = new.len();
    let mut lcs = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(Op::Equal(i, j));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            ops.push(Op::Delete(i));
            i += 1;
        } else {
            ops.push(Op::Insert(j));
            j += 1;
        }
    }
    ops.extend((i..n).map(Op::Delete));
    ops.extend((j..m).map(Op::Insert));
    ops
}

/// Op index ranges `[start, end)` for each hunk.
fn hunk_ranges(ops: &[Op]) -> Vec<(usize, usize)> {
    let changes: Vec<usize> = ops
        .iter()
        .enumerate()
        .filter(|(_, op)| op.is_change())
        .map(|(i, _)| i)
        .collect();

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for idx in changes {
        let start = idx.saturating_sub(CONTEXT_LINES);
        let end = (idx + CONTEXT_LINES + 1).min(ops.len());
        match ranges.last_mut() {
            Some(last) if start <= last.1 => last.1 = end,
            _ => ranges.push((start, end)),
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_produce_no_diff() {
        assert_eq!(unified_diff("A.java", "class A {}\n", "class A {}\n"), "");
    }

    #[test]
    fn test_single_line_change() {
        let diff = unified_diff("A.java", "a\nb\nc\n", "a\nB\nc\n");
        assert_eq!(
            diff,
            "--- a/A.java\n+++ b/A.java\n@@ -1,3 +1,3 @@\n a\n-b\n+B\n c\n"
        );
    }

    #[test]
    fn test_distant_changes_make_separate_hunks() {
        let before: String = (1..=20).map(|i| format!("line{}\n", i)).collect();
        let after = before
            .replace("line2\n", "LINE2\n")
            .replace("line18\n", "LINE18\n");
        let diff = unified_diff("A.java", &before, &after);
        assert_eq!(diff.matches("@@ -").count(), 2);
        assert!(diff.contains("@@ -1,5 +1,5 @@"));
        assert!(diff.contains("@@ -15,6 +15,6 @@"));
    }

    #[test]
    fn test_missing_trailing_newline() {
        let diff = unified_diff("A.java", "a", "b");
        assert!(diff.contains("-a\n\\ No newline at end of file\n"));
        assert!(diff.contains("+b\n\\ No newline at end of file\n"));
    }

    #[test]
    fn test_pure_insertion_into_empty() {
        let diff = unified_diff("A.java", "", "x\n");
        assert!(diff.contains("@@ -0,0 +1,1 @@\n+x\n"));
    }
}
