//! Three-way merge of concurrent section edits.
//!
//! Text merges line by line against the last acknowledged text. Each side is
//! diffed against that base with a longest-common-subsequence walk; hunks that
//! neither overlap nor touch are applied together, identical hunks once. Any
//! other collision makes the merge report [`TextMerge::Conflicted`] so the
//! caller can fall back to the local text.
//!
//! Lines shared at the start and end are skipped before the walk. When what
//! is left would need a table over [`MAX_DIFF_CELLS`], the merge is reported
//! as conflicted instead.

use folio_babel::ir::nodes::Metadata;

/// Upper bound on the longest-common-subsequence table, in cells.
pub const MAX_DIFF_CELLS: usize = 4_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMerge {
    Clean(String),
    Conflicted,
}

impl TextMerge {
    /// The merged text, or `local` when the edits collided.
    pub fn or_local(self, local: &str) -> String {
        match self {
            TextMerge::Clean(text) => text,
            TextMerge::Conflicted => local.to_string(),
        }
    }
}

/// `base[start..end]` replaced by `lines`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Hunk<'a> {
    start: usize,
    end: usize,
    lines: Vec<&'a str>,
}

impl Hunk<'_> {
    fn collides(&self, other: &Hunk<'_>) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

pub fn merge_text(base: &str, local: &str, remote: &str) -> TextMerge {
    if local == remote || remote == base {
        return TextMerge::Clean(local.to_string());
    }
    if local == base {
        return TextMerge::Clean(remote.to_string());
    }

    let base_lines: Vec<&str> = base.split('\n').collect();
    let local_lines: Vec<&str> = local.split('\n').collect();
    let remote_lines: Vec<&str> = remote.split('\n').collect();
    let (Some(local_hunks), Some(remote_hunks)) = (
        diff(&base_lines, &local_lines),
        diff(&base_lines, &remote_lines),
    ) else {
        tracing::debug!(lines = base_lines.len(), "text too large to diff");
        return TextMerge::Conflicted;
    };

    let mut merged: Vec<&str> = Vec::new();
    let mut position = 0;
    let mut local_iter = local_hunks.iter().peekable();
    let mut remote_iter = remote_hunks.iter().peekable();

    loop {
        let next = (local_iter.peek().copied(), remote_iter.peek().copied());
        let hunk = match next {
            (None, None) => break,
            (Some(l), Some(r)) if l.collides(r) => {
                if l != r {
                    tracing::debug!(local = ?(l.start, l.end), remote = ?(r.start, r.end), "overlapping edits");
                    return TextMerge::Conflicted;
                }
                local_iter.next();
                remote_iter.next();
                l
            }
            (Some(l), Some(r)) => {
                if l.start < r.start {
                    local_iter.next();
                    l
                } else {
                    remote_iter.next();
                    r
                }
            }
            (Some(l), None) => {
                local_iter.next();
                l
            }
            (None, Some(r)) => {
                remote_iter.next();
                r
            }
        };
        merged.extend_from_slice(&base_lines[position..hunk.start]);
        merged.extend_from_slice(&hunk.lines);
        position = hunk.end;
    }
    merged.extend_from_slice(&base_lines[position..]);

    TextMerge::Clean(merged.join("\n"))
}

/// Union of both sides; keys present on both keep the local value.
pub fn merge_metadata(local: &Metadata, remote: &Metadata) -> Metadata {
    let mut merged = remote.clone();
    merged.extend(local.iter().map(|(key, value)| (key.clone(), value.clone())));
    merged
}

fn diff<'a>(base: &[&'a str], other: &[&'a str]) -> Option<Vec<Hunk<'a>>> {
    let prefix = base.iter().zip(other).take_while(|(a, b)| a == b).count();
    let suffix = base[prefix..]
        .iter()
        .rev()
        .zip(other[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let base = &base[prefix..base.len() - suffix];
    let other = &other[prefix..other.len() - suffix];

    let (n, m) = (base.len(), other.len());
    if (n + 1).saturating_mul(m + 1) > MAX_DIFF_CELLS {
        return None;
    }
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if base[i] == other[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut hunks = Vec::new();
    let mut open: Option<Hunk<'a>> = None;
    let (mut i, mut j) = (0, 0);
    while i < n || j < m {
        if i < n && j < m && base[i] == other[j] {
            if let Some(hunk) = open.take() {
                hunks.push(Hunk { end: prefix + i, ..hunk });
            }
            i += 1;
            j += 1;
        } else if j < m && (i == n || lcs[i][j + 1] >= lcs[i + 1][j]) {
            open.get_or_insert(Hunk { start: prefix + i, end: prefix + i, lines: Vec::new() })
                .lines
                .push(other[j]);
            j += 1;
        } else {
            open.get_or_insert(Hunk { start: prefix + i, end: prefix + i, lines: Vec::new() });
            i += 1;
        }
    }
    if let Some(hunk) = open {
        hunks.push(Hunk { end: prefix + i, ..hunk });
    }
    Some(hunks)
}
