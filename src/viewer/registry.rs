use log::debug;

use crate::content::{ContentTree, MutationBatch, NodeId};
use crate::viewer::classifier::{is_trigger_image, TRIGGER_CLASS};
use crate::viewer::session::ImageDescriptor;

/// Keeps trigger awareness in sync with a mutating content tree.
///
/// Discovery is incremental: on attach the whole subtree is classified once,
/// after that only freshly inserted nodes are looked at, delivered in
/// batches through the tree's mutation channel. Eligible images get the
/// trigger marker class, which is what click hit-testing checks.
///
/// `snapshot()` does not trust the markers. It re-runs the classifier over
/// the live tree so a session opened from a click is never built from stale
/// eligibility, no matter how far the batched notifications lag behind.
pub struct TriggerRegistry {
    root: Option<NodeId>,
    mutations: Option<flume::Receiver<MutationBatch>>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self {
            root: None,
            mutations: None,
        }
    }

    /// Begin observing `root`. Existing descendants are classified
    /// immediately; insertions committed after this call arrive through
    /// `process_pending`. Attaching twice moves the registry to the new
    /// root.
    pub fn attach(&mut self, tree: &mut ContentTree, root: NodeId) {
        self.detach();
        let marked = self.mark_subtree(tree, root);
        self.mutations = Some(tree.subscribe());
        self.root = Some(root);
        debug!("trigger registry attached, {marked} images marked on initial scan");
    }

    /// Stop observing. Safe to call any number of times.
    pub fn detach(&mut self) {
        self.root = None;
        self.mutations = None;
    }

    pub fn is_attached(&self) -> bool {
        self.root.is_some()
    }

    /// Drain queued mutation batches and classify the added subtrees. Only
    /// nodes under the attached root are considered; the rest of the tree
    /// is never rescanned.
    pub fn process_pending(&mut self, tree: &mut ContentTree) {
        let Some(root) = self.root else {
            return;
        };
        let Some(rx) = &self.mutations else {
            return;
        };

        let batches: Vec<MutationBatch> = rx.try_iter().collect();
        for batch in batches {
            let mut marked = 0;
            for added in batch {
                if tree.is_within(added, root) {
                    marked += self.mark_subtree(tree, added);
                }
            }
            if marked > 0 {
                debug!("marked {marked} new trigger images from mutation batch");
            }
        }
    }

    /// Ordered view of every image that qualifies right now, in document
    /// order. Eligibility is re-evaluated per node at call time.
    pub fn snapshot(&self, tree: &ContentTree) -> Vec<ImageDescriptor> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        tree.descendants(root)
            .filter(|id| is_trigger_image(tree, *id))
            .filter_map(|id| ImageDescriptor::from_node(tree, id))
            .collect()
    }

    /// Classify `from` and everything beneath it, stamping the marker class
    /// on eligible images. Returns how many were marked.
    fn mark_subtree(&self, tree: &mut ContentTree, from: NodeId) -> usize {
        let candidates: Vec<NodeId> = tree.descendants(from).collect();
        let mut marked = 0;
        for id in candidates {
            if is_trigger_image(tree, id) {
                tree.add_class(id, TRIGGER_CLASS);
                marked += 1;
            }
        }
        marked
    }
}

impl Default for TriggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContainerRole, ImageData, NodeKind};

    fn image(source: &str) -> NodeKind {
        NodeKind::Image(ImageData {
            source: source.to_string(),
            alt_text: format!("alt for {source}"),
            natural_width: None,
            natural_height: None,
        })
    }

    fn container(role: ContainerRole) -> NodeKind {
        NodeKind::Container { role }
    }

    #[test]
    fn attach_marks_existing_images() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let a = tree.append_child(root, image("a.png"));
        let nav = tree.append_child(root, container(ContainerRole::Navigation));
        let logo = tree.append_child(nav, image("logo.png"));

        let mut registry = TriggerRegistry::new();
        registry.attach(&mut tree, root);

        assert!(tree.has_class(a, TRIGGER_CLASS));
        assert!(!tree.has_class(logo, TRIGGER_CLASS));
    }

    #[test]
    fn late_insertions_are_discovered_incrementally() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        tree.append_child(root, image("a.png"));
        tree.commit();

        let mut registry = TriggerRegistry::new();
        registry.attach(&mut tree, root);

        // Content injected after attach, as a projects section would be.
        let section = tree.append_child(root, container(ContainerRole::Generic));
        let late = tree.append_child(section, image("late.png"));
        tree.commit();

        assert!(!tree.has_class(late, TRIGGER_CLASS));
        registry.process_pending(&mut tree);
        assert!(tree.has_class(late, TRIGGER_CLASS));

        let snapshot = registry.snapshot(&tree);
        assert_eq!(
            snapshot.iter().map(|i| i.source.as_str()).collect::<Vec<_>>(),
            vec!["a.png", "late.png"]
        );
    }

    #[test]
    fn snapshot_is_live_even_before_processing() {
        let mut tree = ContentTree::new();
        let root = tree.root();

        let mut registry = TriggerRegistry::new();
        registry.attach(&mut tree, root);

        tree.append_child(root, image("fresh.png"));
        tree.commit();

        // The mutation batch has not been drained yet, but a snapshot taken
        // now must already see the fresh image.
        let snapshot = registry.snapshot(&tree);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].source, "fresh.png");
    }

    #[test]
    fn snapshot_keeps_document_order() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let intro = tree.append_child(root, container(ContainerRole::Generic));
        tree.append_child(intro, image("first.png"));
        tree.append_child(intro, image("second.png"));
        tree.append_child(root, image("third.png"));

        let mut registry = TriggerRegistry::new();
        registry.attach(&mut tree, root);

        let order: Vec<String> = registry
            .snapshot(&tree)
            .into_iter()
            .map(|i| i.source)
            .collect();
        assert_eq!(order, vec!["first.png", "second.png", "third.png"]);
    }

    #[test]
    fn detach_is_idempotent_and_stops_discovery() {
        let mut tree = ContentTree::new();
        let root = tree.root();

        let mut registry = TriggerRegistry::new();
        registry.attach(&mut tree, root);
        registry.detach();
        registry.detach();

        assert!(!registry.is_attached());
        assert!(registry.snapshot(&tree).is_empty());

        let img = tree.append_child(root, image("after-detach.png"));
        tree.commit();
        registry.process_pending(&mut tree);
        assert!(!tree.has_class(img, TRIGGER_CLASS));
    }

    #[test]
    fn descriptor_metadata_follows_the_renderer_contract() {
        let mut tree = ContentTree::new();
        let root = tree.root();

        let captioned = tree.append_child(root, image("captioned.png"));
        tree.set_attr(captioned, "data-caption", "A proper caption");
        tree.set_attr(captioned, "data-title", "The Title");

        let bare = tree.append_child(root, image("bare.png"));
        tree.set_attr(bare, "title", "plain title attr");

        let mut registry = TriggerRegistry::new();
        registry.attach(&mut tree, root);
        let snapshot = registry.snapshot(&tree);

        assert_eq!(snapshot[0].caption.as_deref(), Some("A proper caption"));
        assert_eq!(snapshot[0].title.as_deref(), Some("The Title"));

        // Caption falls back to alt text, title to the bare title attribute.
        assert_eq!(snapshot[1].caption.as_deref(), Some("alt for bare.png"));
        assert_eq!(snapshot[1].title.as_deref(), Some("plain title attr"));
    }
}
