use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::null_as_empty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    #[serde(rename = "tag", alias = "name")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "order")]
    pub display_order: i64,
    /// Parent tag ids. A tag may sit under several parents.
    #[serde(default, alias = "parent", deserialize_with = "null_as_empty")]
    pub parents: Vec<u64>,
}

/// Membership of raw items in a tag, in upstream relevance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagArticles {
    pub tag_id: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub articles: Vec<u64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// The tag forest, indexed for parent/child navigation.
#[derive(Debug, Clone, Default)]
pub struct TagTree {
    tags: HashMap<u64, Tag>,
    children: HashMap<u64, Vec<u64>>,
    roots: Vec<u64>,
}

impl TagTree {
    pub fn new(tags: Vec<Tag>) -> Self {
        let tags: HashMap<u64, Tag> = tags.into_iter().map(|t| (t.id, t)).collect();
        let mut children: HashMap<u64, Vec<u64>> = HashMap::new();
        let mut roots = Vec::new();

        for tag in tags.values() {
            // Parents that are not in the list do not make a tag a child.
            let known: Vec<u64> = tag
                .parents
                .iter()
                .copied()
                .filter(|p| *p != tag.id && tags.contains_key(p))
                .collect();
            if known.is_empty() {
                roots.push(tag.id);
            }
            for parent in known {
                let siblings = children.entry(parent).or_default();
                if !siblings.contains(&tag.id) {
                    siblings.push(tag.id);
                }
            }
        }

        let order = |id: &u64| tags.get(id).map(|t| (t.display_order, t.id));
        roots.sort_by_key(order);
        for list in children.values_mut() {
            list.sort_by_key(order);
        }

        Self {
            tags,
            children,
            roots,
        }
    }

    pub fn get(&self, id: u64) -> Option<&Tag> {
        self.tags.get(&id)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn roots(&self) -> Vec<&Tag> {
        self.roots.iter().filter_map(|id| self.tags.get(id)).collect()
    }

    pub fn children(&self, id: u64) -> Vec<&Tag> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|c| self.tags.get(c)).collect())
            .unwrap_or_default()
    }

    /// Every tag reachable upwards from `id`, nearest first. Cycles in the
    /// upstream data are tolerated.
    pub fn ancestors(&self, id: u64) -> Vec<&Tag> {
        let mut seen = HashSet::from([id]);
        let mut queue: VecDeque<u64> = self
            .tags
            .get(&id)
            .map(|t| t.parents.iter().copied().collect())
            .unwrap_or_default();
        let mut out = Vec::new();

        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            if let Some(tag) = self.tags.get(&next) {
                out.push(tag);
                queue.extend(tag.parents.iter().copied());
            }
        }
        out
    }
}
