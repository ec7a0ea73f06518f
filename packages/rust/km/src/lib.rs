//! Knowledge model: the read-only question tree the importer fills in.
//!
//! A knowledge model is a JSON document of chapters → questions → answers /
//! choices / item-template questions. Entities are stored in flat maps keyed by
//! UUID and reference each other by id; a reference that does not resolve is
//! tolerated and simply reads as "not found".

use std::collections::{HashMap, HashSet};
use std::path::Path;

use kmimport_shared::{ImportError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A key/value tag on a question, answer or choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub key: String,
    pub value: String,
}

impl Annotation {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub uuid: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub question_uuids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub uuid: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Question variants, tagged by `questionType` in the JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "questionType")]
pub enum QuestionKind {
    /// A repeating group; each item answers the template questions.
    #[serde(rename = "ListQuestion")]
    List {
        #[serde(rename = "itemTemplateQuestionUuids", default)]
        item_template_question_uuids: Vec<Uuid>,
    },
    /// Single select.
    #[serde(rename = "OptionsQuestion")]
    Options {
        #[serde(rename = "answerUuids", default)]
        answer_uuids: Vec<Uuid>,
    },
    /// Multi select.
    #[serde(rename = "MultiChoiceQuestion")]
    MultiChoice {
        #[serde(rename = "choiceUuids", default)]
        choice_uuids: Vec<Uuid>,
    },
    /// Free value.
    #[serde(rename = "ValueQuestion")]
    Value {
        #[serde(rename = "valueType", default, skip_serializing_if = "Option::is_none")]
        value_type: Option<String>,
    },
    /// Value backed by an external integration.
    #[serde(rename = "IntegrationQuestion")]
    Integration {
        #[serde(rename = "integrationUuid", default, skip_serializing_if = "Option::is_none")]
        integration_uuid: Option<Uuid>,
    },
    /// Any other question type (file upload, item select, ...).
    #[serde(other)]
    Unsupported,
}

impl QuestionKind {
    /// The `questionType` tag, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "ListQuestion",
            Self::Options { .. } => "OptionsQuestion",
            Self::MultiChoice { .. } => "MultiChoiceQuestion",
            Self::Value { .. } => "ValueQuestion",
            Self::Integration { .. } => "IntegrationQuestion",
            Self::Unsupported => "Unsupported",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub uuid: Uuid,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub uuid: Uuid,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// Flat entity maps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub chapters: HashMap<Uuid, Chapter>,
    #[serde(default)]
    pub questions: HashMap<Uuid, Question>,
    #[serde(default)]
    pub answers: HashMap<Uuid, Answer>,
    #[serde(default)]
    pub choices: HashMap<Uuid, Choice>,
}

// ---------------------------------------------------------------------------
// KnowledgeModel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeModel {
    pub uuid: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub chapter_uuids: Vec<Uuid>,
    #[serde(default)]
    pub entities: Entities,
}

impl KnowledgeModel {
    /// An empty model.
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            name: String::new(),
            chapter_uuids: Vec::new(),
            entities: Entities::default(),
        }
    }

    /// Decode a knowledge model JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ImportError::KnowledgeModel(e.to_string()))
    }

    /// Read and decode a knowledge model file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ImportError::io(path, e))?;
        let km = Self::from_json(&content).map_err(|e| {
            ImportError::KnowledgeModel(format!("failed to decode {}: {e}", path.display()))
        })?;
        debug!(
            uuid = %km.uuid,
            chapters = km.chapter_uuids.len(),
            questions = km.entities.questions.len(),
            "loaded knowledge model"
        );
        Ok(km)
    }

    // --- Read accessors -----------------------------------------------------

    pub fn chapter(&self, uuid: &Uuid) -> Option<&Chapter> {
        self.entities.chapters.get(uuid)
    }

    pub fn question(&self, uuid: &Uuid) -> Option<&Question> {
        self.entities.questions.get(uuid)
    }

    pub fn answer(&self, uuid: &Uuid) -> Option<&Answer> {
        self.entities.answers.get(uuid)
    }

    pub fn choice(&self, uuid: &Uuid) -> Option<&Choice> {
        self.entities.choices.get(uuid)
    }

    /// Chapters in document order. Ids that do not resolve are skipped.
    pub fn chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.chapter_uuids.iter().filter_map(|uuid| self.chapter(uuid))
    }

    /// Every referenced id that has no entity behind it, in document order.
    pub fn missing_references(&self) -> Vec<Uuid> {
        let mut missing = Vec::new();
        for uuid in &self.chapter_uuids {
            if self.chapter(uuid).is_none() {
                missing.push(*uuid);
            }
        }
        let mut visited = HashSet::new();
        for chapter in self.chapters() {
            for uuid in &chapter.question_uuids {
                self.collect_missing(uuid, &mut visited, &mut missing);
            }
        }
        missing
    }

    /// Each question is walked once, so templates that refer back to an
    /// enclosing list terminate.
    fn collect_missing(&self, uuid: &Uuid, visited: &mut HashSet<Uuid>, missing: &mut Vec<Uuid>) {
        if !visited.insert(*uuid) {
            return;
        }
        let Some(question) = self.question(uuid) else {
            missing.push(*uuid);
            return;
        };
        match &question.kind {
            QuestionKind::List {
                item_template_question_uuids,
            } => {
                for child in item_template_question_uuids {
                    self.collect_missing(child, visited, missing);
                }
            }
            QuestionKind::Options { answer_uuids } => missing.extend(
                answer_uuids
                    .iter()
                    .filter(|id| self.answer(id).is_none())
                    .copied(),
            ),
            QuestionKind::MultiChoice { choice_uuids } => missing.extend(
                choice_uuids
                    .iter()
                    .filter(|id| self.choice(id).is_none())
                    .copied(),
            ),
            QuestionKind::Value { .. }
            | QuestionKind::Integration { .. }
            | QuestionKind::Unsupported => {}
        }
    }

    // --- Construction -------------------------------------------------------

    /// Append a chapter to the document order.
    pub fn push_chapter(&mut self, chapter: Chapter) {
        self.chapter_uuids.push(chapter.uuid);
        self.entities.chapters.insert(chapter.uuid, chapter);
    }

    pub fn insert_question(&mut self, question: Question) {
        self.entities.questions.insert(question.uuid, question);
    }

    pub fn insert_answer(&mut self, answer: Answer) {
        self.entities.answers.insert(answer.uuid, answer);
    }

    pub fn insert_choice(&mut self, choice: Choice) {
        self.entities.choices.insert(choice.uuid, choice);
    }
}
