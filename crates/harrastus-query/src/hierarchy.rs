//! Category and audience forests.
//!
//! Nodes live in an arena keyed by id. Children are tracked in a separate
//! index so the tree never holds references into itself; every traversal
//! is iterative.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use harrastus_core::error::{HarrastusError, HarrastusResult};
use harrastus_core::models::category::{CategoryNode, TaxonomyKind};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CategoryTree {
    kind: TaxonomyKind,
    nodes: HashMap<Uuid, CategoryNode>,
    children: HashMap<Uuid, Vec<Uuid>>,
    roots: Vec<Uuid>,
}

impl CategoryTree {
    pub fn new(kind: TaxonomyKind) -> Self {
        Self {
            kind,
            nodes: HashMap::new(),
            children: HashMap::new(),
            roots: Vec::new(),
        }
    }

    /// Build a tree from an unordered list of nodes. Every parent must be
    /// present in the list.
    pub fn from_nodes(kind: TaxonomyKind, nodes: Vec<CategoryNode>) -> HarrastusResult<Self> {
        let mut tree = Self::new(kind);
        let known: HashSet<Uuid> = nodes.iter().map(|n| n.id).collect();
        for node in &nodes {
            if let Some(parent) = node.parent_id {
                if !known.contains(&parent) {
                    return Err(HarrastusError::not_found(kind.as_str(), parent));
                }
            }
        }

        // Parents first so that `insert` never sees a dangling link.
        let mut pending: HashMap<Option<Uuid>, Vec<CategoryNode>> = HashMap::new();
        for node in nodes {
            pending.entry(node.parent_id).or_default().push(node);
        }
        let mut queue: VecDeque<Option<Uuid>> = VecDeque::from([None]);
        while let Some(parent) = queue.pop_front() {
            for node in pending.remove(&parent).unwrap_or_default() {
                queue.push_back(Some(node.id));
                tree.insert(node)?;
            }
        }
        if !pending.is_empty() {
            // Remaining nodes only reference each other: a cycle.
            return Err(HarrastusError::Internal(format!(
                "{} hierarchy contains a cycle",
                kind.as_str()
            )));
        }
        Ok(tree)
    }

    pub fn kind(&self) -> TaxonomyKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Add a node under its parent, keeping siblings ordered by name.
    pub fn insert(&mut self, node: CategoryNode) -> HarrastusResult<()> {
        let (id, parent_id) = (node.id, node.parent_id);
        if let Some(parent) = parent_id {
            if !self.nodes.contains_key(&parent) {
                return Err(HarrastusError::not_found(self.kind.as_str(), parent));
            }
        }
        self.nodes.insert(id, node);

        let nodes = &self.nodes;
        let siblings = match parent_id {
            Some(parent) => self.children.entry(parent).or_default(),
            None => &mut self.roots,
        };
        siblings.push(id);
        siblings.sort_by(|a, b| {
            let (na, nb) = (&nodes[a], &nodes[b]);
            na.name.default.cmp(&nb.name.default).then(a.cmp(b))
        });
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<&CategoryNode> {
        self.nodes.get(&id)
    }

    /// Top-level nodes, ordered by name.
    pub fn roots(&self) -> impl Iterator<Item = &CategoryNode> {
        self.roots.iter().map(|id| &self.nodes[id])
    }

    pub fn children(&self, id: Uuid) -> impl Iterator<Item = &CategoryNode> {
        self.children
            .get(&id)
            .into_iter()
            .flatten()
            .map(|child| &self.nodes[child])
    }

    /// Each requested id together with all of its transitive descendants.
    pub fn expand_to_descendants(&self, ids: &BTreeSet<Uuid>) -> HarrastusResult<BTreeSet<Uuid>> {
        let mut expanded = BTreeSet::new();
        let mut queue = VecDeque::new();
        for id in ids {
            if !self.nodes.contains_key(id) {
                return Err(HarrastusError::not_found(self.kind.as_str(), id));
            }
            queue.push_back(*id);
        }
        while let Some(id) = queue.pop_front() {
            if !expanded.insert(id) {
                continue;
            }
            if let Some(children) = self.children.get(&id) {
                queue.extend(children.iter().copied());
            }
        }
        Ok(expanded)
    }

    /// Strict descendants of a single node, breadth first.
    pub fn descendants(&self, id: Uuid) -> Vec<Uuid> {
        let mut out = Vec::new();
        let mut queue: VecDeque<Uuid> =
            self.children.get(&id).into_iter().flatten().copied().collect();
        while let Some(next) = queue.pop_front() {
            out.push(next);
            if let Some(children) = self.children.get(&next) {
                queue.extend(children.iter().copied());
            }
        }
        out
    }

    /// Ancestors of a node, immediate parent first.
    pub fn ancestors(&self, id: Uuid) -> Vec<&CategoryNode> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(&id).and_then(|n| n.parent_id);
        while let Some(parent_id) = current {
            let Some(parent) = self.nodes.get(&parent_id) else {
                break;
            };
            out.push(parent);
            current = parent.parent_id;
        }
        out
    }

    /// Remove a node and its whole subtree. Returns the removed nodes,
    /// the requested node first.
    pub fn remove(&mut self, id: Uuid) -> HarrastusResult<Vec<CategoryNode>> {
        let Some(parent_id) = self.nodes.get(&id).map(|n| n.parent_id) else {
            return Err(HarrastusError::not_found(self.kind.as_str(), id));
        };
        let siblings = match parent_id {
            Some(parent) => self.children.entry(parent).or_default(),
            None => &mut self.roots,
        };
        siblings.retain(|sibling| *sibling != id);

        let mut order = vec![id];
        order.extend(self.descendants(id));
        let mut removed = Vec::with_capacity(order.len());
        for node_id in order {
            self.children.remove(&node_id);
            if let Some(node) = self.nodes.remove(&node_id) {
                removed.push(node);
            }
        }
        Ok(removed)
    }

    /// Nodes whose name matches `term` in any language.
    pub fn search(&self, term: &str) -> BTreeSet<Uuid> {
        self.nodes
            .values()
            .filter(|node| node.name.matches(term))
            .map(|node| node.id)
            .collect()
    }

    /// The first cover image found walking each category up to its root.
    pub fn inherited_cover_image(&self, categories: &[Uuid]) -> Option<&str> {
        categories.iter().find_map(|id| {
            let node = self.nodes.get(id)?;
            std::iter::once(node)
                .chain(self.ancestors(*id))
                .find_map(|n| n.cover_image.as_deref())
        })
    }
}

#[cfg(test)]
mod tests {
    use harrastus_core::models::localized::{Language, LocalizedText};

    use super::*;

    fn node(name: &str, parent: Option<Uuid>) -> CategoryNode {
        CategoryNode {
            id: Uuid::new_v4(),
            kind: TaxonomyKind::Category,
            name: LocalizedText::new(name),
            parent_id: parent,
            cover_image: None,
            data_source: String::new(),
            origin_id: None,
        }
    }

    /// sports -> {ballgames -> {football, tennis}, swimming}; music
    struct Fixture {
        tree: CategoryTree,
        sports: Uuid,
        ballgames: Uuid,
        football: Uuid,
        tennis: Uuid,
        swimming: Uuid,
        music: Uuid,
    }

    fn fixture() -> Fixture {
        let sports = node("Urheilu", None);
        let music = node("Musiikki", None);
        let mut ballgames = node("Pallopelit", Some(sports.id));
        ballgames.name = ballgames.name.with(Language::En, "Ballgames");
        let football = node("Jalkapallo", Some(ballgames.id));
        let tennis = node("Tennis", Some(ballgames.id));
        let swimming = node("Uinti", Some(sports.id));

        let ids = (sports.id, ballgames.id, football.id, tennis.id, swimming.id, music.id);
        // Deliberately children before parents.
        let tree = CategoryTree::from_nodes(
            TaxonomyKind::Category,
            vec![tennis, football, swimming, ballgames, music, sports],
        )
        .unwrap();
        Fixture {
            tree,
            sports: ids.0,
            ballgames: ids.1,
            football: ids.2,
            tennis: ids.3,
            swimming: ids.4,
            music: ids.5,
        }
    }

    #[test]
    fn expand_root_covers_subtree() {
        let f = fixture();
        let expanded = f.tree.expand_to_descendants(&BTreeSet::from([f.sports])).unwrap();
        assert_eq!(
            expanded,
            BTreeSet::from([f.sports, f.ballgames, f.football, f.tennis, f.swimming])
        );
    }

    #[test]
    fn expand_leaf_is_itself() {
        let f = fixture();
        let expanded = f.tree.expand_to_descendants(&BTreeSet::from([f.tennis])).unwrap();
        assert_eq!(expanded, BTreeSet::from([f.tennis]));
    }

    #[test]
    fn expand_overlapping_inputs_has_no_duplicates() {
        let f = fixture();
        let expanded = f
            .tree
            .expand_to_descendants(&BTreeSet::from([f.sports, f.ballgames, f.music]))
            .unwrap();
        assert_eq!(expanded.len(), 6);
    }

    #[test]
    fn expand_unknown_id_is_not_found() {
        let f = fixture();
        let err = f
            .tree
            .expand_to_descendants(&BTreeSet::from([Uuid::new_v4()]))
            .unwrap_err();
        assert!(matches!(err, HarrastusError::NotFound { .. }));
    }

    #[test]
    fn roots_and_siblings_are_sorted_by_name() {
        let f = fixture();
        let roots: Vec<_> = f.tree.roots().map(|n| n.name.default.as_str()).collect();
        assert_eq!(roots, vec!["Musiikki", "Urheilu"]);
        let children: Vec<_> = f
            .tree
            .children(f.ballgames)
            .map(|n| n.name.default.as_str())
            .collect();
        assert_eq!(children, vec!["Jalkapallo", "Tennis"]);
    }

    #[test]
    fn remove_cascades_to_descendants() {
        let mut f = fixture();
        let removed = f.tree.remove(f.ballgames).unwrap();
        let ids: BTreeSet<_> = removed.iter().map(|n| n.id).collect();
        assert_eq!(ids, BTreeSet::from([f.ballgames, f.football, f.tennis]));
        assert_eq!(f.tree.len(), 3);
        assert_eq!(f.tree.children(f.sports).count(), 1);
        assert!(!f.tree.contains(f.football));
    }

    #[test]
    fn ancestors_walk_to_root() {
        let f = fixture();
        let ancestors: Vec<_> = f.tree.ancestors(f.football).iter().map(|n| n.id).collect();
        assert_eq!(ancestors, vec![f.ballgames, f.sports]);
        assert!(f.tree.ancestors(f.sports).is_empty());
    }

    #[test]
    fn search_matches_translations() {
        let f = fixture();
        assert_eq!(f.tree.search("ball"), BTreeSet::from([f.ballgames]));
        assert_eq!(f.tree.search("PALLO"), BTreeSet::from([f.ballgames, f.football]));
    }

    #[test]
    fn cover_image_is_inherited_from_ancestor() {
        let sports = CategoryNode {
            cover_image: Some("sports.jpg".into()),
            ..node("Urheilu", None)
        };
        let swimming = node("Uinti", Some(sports.id));
        let swimming_id = swimming.id;
        let tree = CategoryTree::from_nodes(TaxonomyKind::Category, vec![sports, swimming]).unwrap();
        assert_eq!(tree.inherited_cover_image(&[swimming_id]), Some("sports.jpg"));
        assert_eq!(tree.inherited_cover_image(&[]), None);
    }

    #[test]
    fn missing_parent_is_rejected() {
        let orphan = node("Orpo", Some(Uuid::new_v4()));
        let err = CategoryTree::from_nodes(TaxonomyKind::Category, vec![orphan]).unwrap_err();
        assert!(matches!(err, HarrastusError::NotFound { .. }));
    }
}
