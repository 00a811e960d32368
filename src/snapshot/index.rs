use std::collections::HashMap;

use crate::snapshot::model::PublishSnapshot;

/// Article title → read count, looked up by exact title.
///
/// Built once before the row loop. When a title appears more than once in
/// the snapshot the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadCountIndex {
    counts: HashMap<String, u64>,
}

impl ReadCountIndex {
    /// Entries without a title or without a read count are skipped.
    pub fn build(snapshot: &PublishSnapshot) -> Self {
        snapshot
            .articles()
            .filter_map(|article| Some((article.title.clone()?, article.read_num?)))
            .collect()
    }

    pub fn get(&self, title: &str) -> Option<u64> {
        self.counts.get(title).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(String, u64)> for ReadCountIndex {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut counts = HashMap::new();
        for (title, read_num) in iter {
            counts.insert(title, read_num);
        }
        Self { counts }
    }
}
