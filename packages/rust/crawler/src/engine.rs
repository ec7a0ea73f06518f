//! Knowledge-model crawler.
//!
//! The crawler walks chapters and questions in document order, queries the
//! triple store according to each question's annotations, and emits list items
//! and replies to a [`ReplySink`]. The current path and subject travel down
//! the recursion as arguments; nothing is shared between sibling branches.
//!
//! Missing references, missing annotations and empty matches end a branch
//! quietly. Only errors from the store or the sink abort the crawl.

use tracing::{debug, info, instrument, trace};
use uuid::Uuid;

use kmimport_graph::{Pattern, RDF_TYPE, Term, TripleStore};
use kmimport_km::{KnowledgeModel, Question, QuestionKind};
use kmimport_replies::ReplySink;
use kmimport_shared::{CrawlConfig, ReplyPath, ReplyValue, Result};

use crate::annotations::RdfAnnotations;

// ---------------------------------------------------------------------------
// CrawlSummary
// ---------------------------------------------------------------------------

/// Counters for a completed crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Chapters walked.
    pub chapters: usize,
    /// Question references that resolved, including item-template questions
    /// once per item.
    pub questions_visited: usize,
    /// `create_item` calls issued.
    pub items_created: usize,
    /// `set_reply` calls issued.
    pub replies_set: usize,
}

/// Sink wrapper that keeps the summary counters.
struct Session<'s> {
    sink: &'s mut dyn ReplySink,
    summary: CrawlSummary,
}

impl Session<'_> {
    fn create_item(&mut self, path: &ReplyPath) -> Result<Uuid> {
        let item = self.sink.create_item(path)?;
        self.summary.items_created += 1;
        Ok(item)
    }

    fn set_reply(&mut self, path: &ReplyPath, value: ReplyValue) -> Result<()> {
        self.sink.set_reply(path, value)?;
        self.summary.replies_set += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Maps a triple store onto a knowledge model.
pub struct Crawler<'a, G: ?Sized> {
    km: &'a KnowledgeModel,
    graph: &'a G,
    annotations: RdfAnnotations,
    rdf_type: Term,
}

impl<'a, G: TripleStore + ?Sized> Crawler<'a, G> {
    pub fn new(km: &'a KnowledgeModel, graph: &'a G, config: CrawlConfig) -> Self {
        Self {
            km,
            graph,
            annotations: RdfAnnotations::new(config),
            rdf_type: Term::iri(RDF_TYPE),
        }
    }

    /// Walk every chapter and emit items and replies into `sink`.
    ///
    /// Runs to completion unless the store or the sink fails, in which case
    /// the error is returned and the rest of the crawl is abandoned.
    #[instrument(skip_all, fields(km = %self.km.uuid))]
    pub fn crawl(&self, sink: &mut dyn ReplySink) -> Result<CrawlSummary> {
        let mut session = Session {
            sink,
            summary: CrawlSummary::default(),
        };

        info!(chapters = self.km.chapter_uuids.len(), "starting crawl");

        for chapter in self.km.chapters() {
            session.summary.chapters += 1;
            let path = ReplyPath::chapter(chapter.uuid);
            for question_uuid in &chapter.question_uuids {
                self.process_question(&mut session, &path, question_uuid, None)?;
            }
        }

        let summary = session.summary;
        info!(
            chapters = summary.chapters,
            questions = summary.questions_visited,
            items = summary.items_created,
            replies = summary.replies_set,
            "crawl completed"
        );
        Ok(summary)
    }

    fn process_question(
        &self,
        session: &mut Session<'_>,
        path: &ReplyPath,
        question_uuid: &Uuid,
        subject: Option<&Term>,
    ) -> Result<()> {
        let Some(question) = self.km.question(question_uuid) else {
            debug!(question = %question_uuid, "question not found, skipping");
            return Ok(());
        };
        session.summary.questions_visited += 1;
        trace!(question = %question.uuid, kind = question.kind.name(), %path, "visiting question");

        match &question.kind {
            QuestionKind::List {
                item_template_question_uuids,
            } => self.process_list(session, path, question, item_template_question_uuids, subject),
            QuestionKind::Options { answer_uuids } => {
                self.process_options(session, path, question, answer_uuids, subject)
            }
            QuestionKind::MultiChoice { choice_uuids } => {
                self.process_multi_choice(session, path, question, choice_uuids, subject)
            }
            QuestionKind::Value { .. } | QuestionKind::Integration { .. } => {
                self.process_value(session, path, question, subject)
            }
            QuestionKind::Unsupported => {
                debug!(question = %question.uuid, "unsupported question type, skipping");
                Ok(())
            }
        }
    }

    /// One item per matched statement; template questions are crawled with
    /// the statement's subject bound.
    fn process_list(
        &self,
        session: &mut Session<'_>,
        path: &ReplyPath,
        question: &Question,
        templates: &[Uuid],
        subject: Option<&Term>,
    ) -> Result<()> {
        let Some(rdf_type) = self.annotations.rdf_type(&question.annotations) else {
            debug!(question = %question.uuid, "list question has no type annotation");
            return Ok(());
        };
        let property = self.annotations.rdf_property(&question.annotations);

        let statements = match (&property, subject) {
            // Nested collection: objects reachable from the current subject.
            (Some(property), Some(subject)) => self
                .graph
                .statements_matching(&Pattern::any().subject(Some(subject)).predicate(property))?,
            // Top-level collection: every instance of the type.
            _ => self
                .graph
                .statements_matching(&Pattern::any().predicate(&self.rdf_type).object(&rdf_type))?,
        };

        let list_path = path.child(question.uuid);
        for stmt in &statements {
            let item = session.create_item(&list_path)?;
            trace!(question = %question.uuid, %item, subject = %stmt.subject, "list item");

            // Binds the statement's subject even in the nested case, where
            // that is the parent resource rather than the matched object.
            // TODO: confirm with product owners whether nested items should
            // descend into `stmt.object` instead.
            let item_path = list_path.child(item);
            for template in templates {
                self.process_question(session, &item_path, template, Some(&stmt.subject))?;
            }
        }
        Ok(())
    }

    /// Single select: the first statement decides, the first matching answer wins.
    fn process_options(
        &self,
        session: &mut Session<'_>,
        path: &ReplyPath,
        question: &Question,
        answer_uuids: &[Uuid],
        subject: Option<&Term>,
    ) -> Result<()> {
        let Some(subject) = subject else {
            return Ok(());
        };
        let Some(property) = self.annotations.rdf_property(&question.annotations) else {
            debug!(question = %question.uuid, "options question has no property annotation");
            return Ok(());
        };

        let statements = self
            .graph
            .statements_matching(&Pattern::any().subject(Some(subject)).predicate(&property))?;
        let Some(stmt) = statements.first() else {
            return Ok(());
        };

        let answer = answer_uuids.iter().find(|uuid| {
            self.km
                .answer(uuid)
                .and_then(|answer| self.annotations.rdf_value(&answer.annotations))
                .is_some_and(|value| value.value() == stmt.object.value())
        });

        match answer {
            Some(answer) => session.set_reply(&path.child(question.uuid), ReplyValue::Answer(*answer)),
            None => {
                debug!(question = %question.uuid, value = stmt.object.value(), "no answer matches");
                Ok(())
            }
        }
    }

    /// Multi select: every (statement, matching choice) pair contributes, in
    /// statement order then choice order, duplicates kept.
    fn process_multi_choice(
        &self,
        session: &mut Session<'_>,
        path: &ReplyPath,
        question: &Question,
        choice_uuids: &[Uuid],
        subject: Option<&Term>,
    ) -> Result<()> {
        let Some(subject) = subject else {
            return Ok(());
        };
        let Some(property) = self.annotations.rdf_property(&question.annotations) else {
            debug!(question = %question.uuid, "multi-choice question has no property annotation");
            return Ok(());
        };

        let statements = self
            .graph
            .statements_matching(&Pattern::any().subject(Some(subject)).predicate(&property))?;
        if statements.is_empty() {
            return Ok(());
        }

        let choice_values: Vec<(Uuid, Term)> = choice_uuids
            .iter()
            .filter_map(|uuid| {
                let choice = self.km.choice(uuid)?;
                let value = self.annotations.rdf_value(&choice.annotations)?;
                Some((choice.uuid, value))
            })
            .collect();

        let mut selected = Vec::new();
        for stmt in &statements {
            selected.extend(
                choice_values
                    .iter()
                    .filter(|(_, value)| value.value() == stmt.object.value())
                    .map(|(uuid, _)| *uuid),
            );
        }

        if selected.is_empty() {
            debug!(question = %question.uuid, "no choice matches");
            return Ok(());
        }
        session.set_reply(&path.child(question.uuid), ReplyValue::MultiChoice(selected))
    }

    /// Value and integration questions: the first object, verbatim. Without a
    /// bound subject the subject is a wildcard.
    fn process_value(
        &self,
        session: &mut Session<'_>,
        path: &ReplyPath,
        question: &Question,
        subject: Option<&Term>,
    ) -> Result<()> {
        let Some(property) = self.annotations.rdf_property(&question.annotations) else {
            debug!(question = %question.uuid, "value question has no property annotation");
            return Ok(());
        };

        let statements = self
            .graph
            .statements_matching(&Pattern::any().subject(subject).predicate(&property))?;
        let Some(stmt) = statements.into_iter().next() else {
            return Ok(());
        };

        let value = match stmt.object {
            Term::Iri { value } | Term::BlankNode { value } | Term::Literal { value, .. } => value,
        };
        session.set_reply(&path.child(question.uuid), ReplyValue::String(value))
    }
}
