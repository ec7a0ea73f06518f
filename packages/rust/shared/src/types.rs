//! Core reply-tree types shared by the crawler and the reply sinks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ReplyPath
// ---------------------------------------------------------------------------

/// Location of a node in the reply tree: chapter, question and item ids
/// interleaved from the root.
///
/// A path only ever grows; [`ReplyPath::child`] returns an extended copy and
/// leaves the parent untouched, so sibling branches never share segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ReplyPath(Vec<Uuid>);

impl ReplyPath {
    /// A path rooted at a chapter.
    pub fn chapter(chapter_uuid: Uuid) -> Self {
        Self(vec![chapter_uuid])
    }

    /// A copy of this path with one more segment appended.
    pub fn child(&self, segment: Uuid) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment);
        Self(segments)
    }

    /// Path segments from the root.
    pub fn segments(&self) -> &[Uuid] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Uuid>> for ReplyPath {
    fn from(segments: Vec<Uuid>) -> Self {
        Self(segments)
    }
}

/// Dot-joined ids, the key format of the replies document.
impl std::fmt::Display for ReplyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ReplyPath {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        s.split('.')
            .map(Uuid::parse_str)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Self)
    }
}

// ---------------------------------------------------------------------------
// ReplyValue
// ---------------------------------------------------------------------------

/// A value recorded against a [`ReplyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ReplyValue {
    /// Raw literal or resource text (value and integration questions).
    #[serde(rename = "StringReply")]
    String(String),
    /// Selected answer (options questions).
    #[serde(rename = "AnswerReply")]
    Answer(Uuid),
    /// Selected choices in match order, duplicates kept (multi-choice questions).
    #[serde(rename = "MultiChoiceReply")]
    MultiChoice(Vec<Uuid>),
    /// Items of a list question, in creation order.
    #[serde(rename = "ItemListReply")]
    ItemList(Vec<Uuid>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_display_is_dot_joined() {
        let chapter = Uuid::from_u128(1);
        let question = Uuid::from_u128(2);
        let path = ReplyPath::chapter(chapter).child(question);
        assert_eq!(
            path.to_string(),
            "00000000-0000-0000-0000-000000000001.00000000-0000-0000-0000-000000000002"
        );

        let parsed: ReplyPath = path.to_string().parse().expect("parse path");
        assert_eq!(parsed, path);
    }

    #[test]
    fn child_does_not_touch_parent() {
        let parent = ReplyPath::chapter(Uuid::from_u128(1));
        let left = parent.child(Uuid::from_u128(2));
        let right = parent.child(Uuid::from_u128(3));

        assert_eq!(parent.len(), 1);
        assert_eq!(left.segments()[1], Uuid::from_u128(2));
        assert_eq!(right.segments()[1], Uuid::from_u128(3));
    }

    #[test]
    fn reply_value_serialization() {
        let json = serde_json::to_value(ReplyValue::String("Alice".into())).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "type": "StringReply", "value": "Alice" })
        );

        let choices = ReplyValue::MultiChoice(vec![Uuid::from_u128(5), Uuid::from_u128(5)]);
        let json = serde_json::to_string(&choices).expect("serialize");
        let parsed: ReplyValue = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, choices);
    }
}
