//! Root-to-leaf path resolution over a flat message collection

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::models::Message;

/// Read-only arena over a conversation's messages, indexed by message id
#[derive(Debug)]
pub struct ConversationTree<'a> {
    messages: &'a [Message],
    index: HashMap<&'a str, usize>,
}

impl<'a> ConversationTree<'a> {
    /// Index `messages`; order does not matter. On duplicate ids the first
    /// occurrence wins.
    pub fn new(messages: &'a [Message]) -> Self {
        let mut index = HashMap::with_capacity(messages.len());
        for (position, message) in messages.iter().enumerate() {
            index.entry(message.id.as_str()).or_insert(position);
        }
        Self { messages, index }
    }

    pub fn get(&self, id: &str) -> Option<&'a Message> {
        self.index.get(id).map(|&position| &self.messages[position])
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Chronological path from the root down to `leaf_id`.
    ///
    /// The walk ends at a root, at a parent id missing from the collection, or
    /// when an id repeats. An unknown leaf yields an empty path.
    pub fn path_to(&self, leaf_id: &str) -> Vec<&'a Message> {
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = self.get(leaf_id);

        while let Some(message) = cursor {
            if !visited.insert(message.id.as_str()) {
                warn!(message_id = %message.id, "Cycle in parent links, truncating path");
                break;
            }
            path.push(message);
            cursor = message.parent().and_then(|parent_id| self.get(parent_id));
        }

        path.reverse();
        debug!(leaf_id, path_len = path.len(), "Resolved conversation path");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Author;

    fn chain() -> Vec<Message> {
        vec![
            Message::user("first").with_id("a"),
            Message::model("second").with_id("b").with_parent("a"),
            Message::user("third").with_id("c").with_parent("b"),
            // sibling branch created by regenerating "b"
            Message::model("second, regenerated").with_id("b2").with_parent("a"),
            Message::user("third, on the other branch").with_id("c2").with_parent("b2"),
        ]
    }

    fn ids(path: &[&Message]) -> Vec<String> {
        path.iter().map(|m| m.id.clone()).collect()
    }

    #[test]
    fn test_path_is_chronological() {
        let messages = chain();
        let tree = ConversationTree::new(&messages);
        assert_eq!(ids(&tree.path_to("c")), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_path_follows_only_the_requested_branch() {
        let messages = chain();
        let tree = ConversationTree::new(&messages);
        let path = tree.path_to("c2");
        assert_eq!(ids(&path), vec!["a", "b2", "c2"]);
        assert_eq!(path[1].author, Author::Model);
    }

    #[test]
    fn test_unordered_input() {
        let mut messages = chain();
        messages.reverse();
        let tree = ConversationTree::new(&messages);
        assert_eq!(ids(&tree.path_to("c")), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unknown_leaf_yields_empty_path() {
        let messages = chain();
        let tree = ConversationTree::new(&messages);
        assert!(tree.path_to("missing").is_empty());
    }

    #[test]
    fn test_missing_parent_ends_walk() {
        let messages = vec![
            Message::model("orphan").with_id("x").with_parent("gone"),
            Message::user("child").with_id("y").with_parent("x"),
        ];
        let tree = ConversationTree::new(&messages);
        assert_eq!(ids(&tree.path_to("y")), vec!["x", "y"]);
    }

    #[test]
    fn test_cycle_is_cut() {
        let messages = vec![
            Message::user("one").with_id("p").with_parent("q"),
            Message::model("two").with_id("q").with_parent("p"),
        ];
        let tree = ConversationTree::new(&messages);
        assert_eq!(ids(&tree.path_to("q")), vec!["p", "q"]);
    }

    #[test]
    fn test_deep_history_does_not_recurse() {
        let mut messages = vec![Message::user("0").with_id("0")];
        for i in 1..50_000 {
            messages.push(
                Message::user(i.to_string())
                    .with_id(i.to_string())
                    .with_parent((i - 1).to_string()),
            );
        }
        let tree = ConversationTree::new(&messages);
        let path = tree.path_to("49999");
        assert_eq!(path.len(), 50_000);
        assert_eq!(path[0].id, "0");
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let messages = vec![
            Message::user("kept").with_id("d"),
            Message::user("shadowed").with_id("d"),
        ];
        let tree = ConversationTree::new(&messages);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get("d").map(|m| m.text.as_str()), Some("kept"));
    }
}
