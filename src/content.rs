use std::collections::HashMap;

/// Node ids index into the tree's arena. A stale or foreign id simply
/// resolves to `None` on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRole {
    Generic,
    Navigation,
    Header,
    Sidebar,
    Menu,
    Footer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub source: String,
    pub alt_text: String,
    /// Intrinsic pixel dimensions when the producing renderer knew them.
    /// Zero means "not yet known", same as unset.
    pub natural_width: Option<u32>,
    pub natural_height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Container { role: ContainerRole },
    Heading { level: u8, text: String },
    Paragraph { text: String },
    Image(ImageData),
}

#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub classes: Vec<String>,
    pub attrs: HashMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn image(&self) -> Option<&ImageData> {
        match &self.kind {
            NodeKind::Image(img) => Some(img),
            _ => None,
        }
    }
}

/// A batch of nodes inserted since the previous commit, delivered to
/// subscribers in insertion order.
pub type MutationBatch = Vec<NodeId>;

/// Arena-backed content tree. Structural insertions are queued and published
/// to subscribers as one batch per `commit()`, which models the
/// batched-and-asynchronous change notifications the trigger registry
/// consumes. Attribute and class edits do not notify.
pub struct ContentTree {
    nodes: Vec<Node>,
    root: NodeId,
    pending: Vec<NodeId>,
    subscribers: Vec<flume::Sender<MutationBatch>>,
}

impl ContentTree {
    pub fn new() -> Self {
        let root = Node {
            kind: NodeKind::Container {
                role: ContainerRole::Generic,
            },
            classes: Vec::new(),
            attrs: HashMap::new(),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            pending: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Append a new node under `parent` and queue it for the next mutation
    /// batch. Returns the id of the new node.
    pub fn append_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            classes: Vec::new(),
            attrs: HashMap::new(),
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.push(id);
        }
        self.pending.push(id);
        id
    }

    /// Publish all queued insertions as one batch. No-op when nothing is
    /// queued. Subscribers that went away are dropped here.
    pub fn commit(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.pending);
        self.subscribers
            .retain(|tx| tx.send(batch.clone()).is_ok());
    }

    /// Register for mutation batches. Only insertions committed after the
    /// call are delivered.
    pub fn subscribe(&mut self) -> flume::Receiver<MutationBatch> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get(id)
            .map(|n| n.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|n| n.attrs.get(name)).map(|s| s.as_str())
    }

    /// First node carrying `attr_name = value`, in document order.
    pub fn find_by_attr(&self, attr_name: &str, value: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .find(|id| self.attr(*id, attr_name) == Some(value))
    }

    /// Preorder walk starting at (and including) `from`. Preorder is the
    /// document order used for viewer snapshots.
    pub fn descendants(&self, from: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: if self.get(from).is_some() {
                vec![from]
            } else {
                Vec::new()
            },
        }
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).and_then(|n| n.parent),
        }
    }

    /// True when `id` is `root` or lies underneath it.
    pub fn is_within(&self, id: NodeId, root: NodeId) -> bool {
        id == root || self.ancestors(id).any(|a| a == root)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Descendants<'a> {
    tree: &'a ContentTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(node) = self.tree.get(id) {
            // Reverse so the leftmost child is visited first.
            for child in node.children.iter().rev() {
                self.stack.push(*child);
            }
        }
        Some(id)
    }
}

pub struct Ancestors<'a> {
    tree: &'a ContentTree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.get(id).and_then(|n| n.parent);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(source: &str) -> NodeKind {
        NodeKind::Image(ImageData {
            source: source.to_string(),
            alt_text: String::new(),
            natural_width: None,
            natural_height: None,
        })
    }

    fn container(role: ContainerRole) -> NodeKind {
        NodeKind::Container { role }
    }

    #[test]
    fn descendants_follow_document_order() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let section = tree.append_child(root, container(ContainerRole::Generic));
        let a = tree.append_child(section, image("a.png"));
        let b = tree.append_child(section, image("b.png"));
        let tail = tree.append_child(root, image("c.png"));

        let order: Vec<NodeId> = tree.descendants(root).collect();
        assert_eq!(order, vec![root, section, a, b, tail]);
    }

    #[test]
    fn subscribe_only_sees_later_commits() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        tree.append_child(root, image("early.png"));
        tree.commit();

        let rx = tree.subscribe();
        assert!(rx.try_recv().is_err());

        let late = tree.append_child(root, image("late.png"));
        tree.commit();
        assert_eq!(rx.try_recv().unwrap(), vec![late]);
    }

    #[test]
    fn commit_batches_all_pending_insertions() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let rx = tree.subscribe();

        let section = tree.append_child(root, container(ContainerRole::Generic));
        let img = tree.append_child(section, image("x.png"));
        tree.commit();
        tree.commit(); // empty, should not produce a second batch

        assert_eq!(rx.try_recv().unwrap(), vec![section, img]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn ancestors_walk_to_root() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let nav = tree.append_child(root, container(ContainerRole::Navigation));
        let img = tree.append_child(nav, image("logo.png"));

        let ancestry: Vec<NodeId> = tree.ancestors(img).collect();
        assert_eq!(ancestry, vec![nav, root]);
        assert!(tree.is_within(img, root));
        assert!(tree.is_within(img, nav));
        assert!(!tree.is_within(nav, img));
    }
}
