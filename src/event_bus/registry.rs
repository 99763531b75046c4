use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Topic -> ordered list of shared references
///
/// Used for both handlers and subscribers. Insertion order is execution order,
/// duplicates are kept, and removal compares `Arc` addresses.
pub struct Registry<T: ?Sized> {
    entries: RwLock<HashMap<String, Vec<Arc<T>>>>,
}

impl<T: ?Sized> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Append an entry to the topic's list
    pub async fn register(&self, topic: &str, entry: Arc<T>) {
        let mut entries = self.entries.write().await;
        entries.entry(topic.to_string()).or_default().push(entry);
    }

    /// Remove every entry identical to `entry`, keeping the order of the rest
    ///
    /// Returns the number of removed entries (0 when absent).
    pub async fn unregister(&self, topic: &str, entry: &Arc<T>) -> usize {
        let mut entries = self.entries.write().await;

        let Some(list) = entries.get_mut(topic) else {
            return 0;
        };

        let before = list.len();
        list.retain(|existing| !std::ptr::addr_eq(Arc::as_ptr(existing), Arc::as_ptr(entry)));
        let removed = before - list.len();

        if list.is_empty() {
            entries.remove(topic);
        }

        removed
    }

    /// Snapshot of the topic's list (empty when nothing is registered)
    ///
    /// The snapshot is detached from the registry: later changes do not affect it.
    pub async fn lookup(&self, topic: &str) -> Vec<Arc<T>> {
        let entries = self.entries.read().await;
        entries.get(topic).cloned().unwrap_or_default()
    }

    /// Number of entries registered for a topic
    pub async fn count(&self, topic: &str) -> usize {
        let entries = self.entries.read().await;
        entries.get(topic).map(Vec::len).unwrap_or(0)
    }

    /// Topics with at least one entry
    pub async fn topics(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut topics: Vec<String> = entries.keys().cloned().collect();
        topics.sort();
        topics
    }
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn label(&self) -> &str;
    }

    struct Entry(&'static str);

    impl Named for Entry {
        fn label(&self) -> &str {
            self.0
        }
    }

    fn labels(list: &[Arc<dyn Named>]) -> Vec<&str> {
        list.iter().map(|e| e.label()).collect()
    }

    #[tokio::test]
    async fn test_register_keeps_insertion_order() {
        let registry: Registry<dyn Named> = Registry::new();
        registry.register("todos", Arc::new(Entry("a"))).await;
        registry.register("todos", Arc::new(Entry("b"))).await;
        registry.register("todos", Arc::new(Entry("c"))).await;

        let list = registry.lookup("todos").await;
        assert_eq!(labels(&list), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_lookup_unknown_topic_is_empty() {
        let registry: Registry<dyn Named> = Registry::new();
        assert!(registry.lookup("nothing").await.is_empty());
        assert_eq!(registry.count("nothing").await, 0);
    }

    #[tokio::test]
    async fn test_unregister_removes_all_duplicates_by_identity() {
        let registry: Registry<dyn Named> = Registry::new();
        let a: Arc<dyn Named> = Arc::new(Entry("a"));
        let b: Arc<dyn Named> = Arc::new(Entry("b"));
        // Same label, different allocation: must survive
        let a_twin: Arc<dyn Named> = Arc::new(Entry("a"));

        registry.register("todos", a.clone()).await;
        registry.register("todos", b.clone()).await;
        registry.register("todos", a.clone()).await;
        registry.register("todos", a_twin.clone()).await;

        let removed = registry.unregister("todos", &a).await;
        assert_eq!(removed, 2);

        let list = registry.lookup("todos").await;
        assert_eq!(list.len(), 2);
        assert!(Arc::ptr_eq(&list[0], &b));
        assert!(Arc::ptr_eq(&list[1], &a_twin));
    }

    #[tokio::test]
    async fn test_unregister_absent_is_noop() {
        let registry: Registry<dyn Named> = Registry::new();
        let a: Arc<dyn Named> = Arc::new(Entry("a"));
        let b: Arc<dyn Named> = Arc::new(Entry("b"));
        registry.register("todos", a.clone()).await;

        assert_eq!(registry.unregister("todos", &b).await, 0);
        assert_eq!(registry.unregister("users", &a).await, 0);
        assert_eq!(registry.count("todos").await, 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_detached_from_later_changes() {
        let registry: Registry<dyn Named> = Registry::new();
        let a: Arc<dyn Named> = Arc::new(Entry("a"));
        registry.register("todos", a.clone()).await;

        let snapshot = registry.lookup("todos").await;
        registry.unregister("todos", &a).await;

        assert_eq!(labels(&snapshot), vec!["a"]);
        assert!(registry.lookup("todos").await.is_empty());
        assert!(registry.topics().await.is_empty());
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let registry: Registry<dyn Named> = Registry::new();
        registry.register("users", Arc::new(Entry("u"))).await;
        registry.register("todos", Arc::new(Entry("t"))).await;

        assert_eq!(registry.topics().await, vec!["todos", "users"]);
        assert_eq!(labels(&registry.lookup("users").await), vec!["u"]);
    }
}
