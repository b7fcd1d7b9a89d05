use tracing::{debug, trace};

use crate::config::Config;
use crate::extract::html::{normalize_html, ImageResolver, NormalizedContent};
use crate::extract::models::{Answers, ParsedAnswer, ParsedFollowup, ParsedPost};
use crate::extract::ExtractError;
use crate::piazza::models::{ChildKind, RawChild, RawPost};

/// Turns [`RawPost`] records into [`ParsedPost`]s.
#[derive(Debug, Clone, Default)]
pub struct PostExtractor {
    resolver: ImageResolver,
}

impl PostExtractor {
    #[must_use]
    pub fn new(resolver: ImageResolver) -> Self {
        Self { resolver }
    }

    /// Build an extractor from the configured site and CDN hosts.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is not absolute.
    pub fn from_config(config: &Config) -> Result<Self, url::ParseError> {
        Ok(Self::new(ImageResolver::new(&config.base_url, &config.cdn_host)?))
    }

    /// Parse a whole post.
    ///
    /// Answer children are stored by type with the last one winning; other
    /// child types are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::MissingContent`] if the post has no history and
    /// [`ExtractError::MalformedReference`] if any image in the post or its
    /// answers is unusable.
    pub fn parse_post(&self, raw: &RawPost) -> Result<ParsedPost, ExtractError> {
        let latest = raw.latest().ok_or_else(|| ExtractError::MissingContent {
            post: raw.label(),
        })?;

        let NormalizedContent { text, images } = normalize_html(&latest.content, &self.resolver)?;

        let mut answers = Answers::default();
        for child in &raw.children {
            match child.classify() {
                ChildKind::InstructorAnswer => answers.instructor = self.parse_answer(child)?,
                ChildKind::StudentAnswer => answers.student = self.parse_answer(child)?,
                ChildKind::Followup => answers.followups.push(parse_followup(child)),
                ChildKind::OtherAnswer => {
                    debug!(post = %raw.label(), kind = %child.kind, "Skipping unknown answer type");
                }
                ChildKind::Other => {
                    trace!(post = %raw.label(), kind = %child.kind, "Ignoring child");
                }
            }
        }

        Ok(ParsedPost {
            post_id: raw.nr,
            uid: raw.id.clone(),
            title: latest.subject.trim().to_string(),
            content_text: text,
            image_urls: images,
            answers,
        })
    }

    /// Parse an answer child. A stub without history yields an empty answer.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::MalformedReference`] for unusable images.
    pub fn parse_answer(&self, child: &RawChild) -> Result<ParsedAnswer, ExtractError> {
        let Some(latest) = child.history.first() else {
            return Ok(ParsedAnswer::default());
        };

        let content = normalize_html(&latest.content, &self.resolver)?;
        Ok(ParsedAnswer {
            text: Some(content.text),
            images: content.images,
        })
    }
}

/// Parse a follow-up child.
///
/// Feedback is the subject of each direct child, taken as-is. Anything nested
/// below that level is not represented. The id is the follow-up author's uid.
#[must_use]
pub fn parse_followup(child: &RawChild) -> ParsedFollowup {
    ParsedFollowup {
        subject: child.subject.clone().unwrap_or_default(),
        feedback: child
            .children
            .iter()
            .map(|reply| reply.subject.clone().unwrap_or_default())
            .collect(),
        id: child.uid.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piazza::models::Revision;

    fn revision(subject: &str, content: &str) -> Revision {
        Revision {
            subject: subject.to_string(),
            content: content.to_string(),
            created: None,
        }
    }

    fn answer(kind: &str, content: &str) -> RawChild {
        RawChild {
            kind: kind.to_string(),
            history: vec![revision("", content)],
            ..RawChild::default()
        }
    }

    fn post(children: Vec<RawChild>) -> RawPost {
        RawPost {
            nr: Some(7),
            id: Some("k1".to_string()),
            history: vec![revision("  Q1 ", "<p>What is X?</p>")],
            children,
            folders: vec!["hw1".to_string()],
        }
    }

    #[test]
    fn test_title_is_trimmed() {
        let parsed = PostExtractor::default().parse_post(&post(vec![])).unwrap();
        assert_eq!(parsed.title, "Q1");
        assert_eq!(parsed.post_id, Some(7));
        assert_eq!(parsed.uid.as_deref(), Some("k1"));
    }

    #[test]
    fn test_latest_revision_is_used() {
        let mut raw = post(vec![]);
        raw.history.push(revision("old", "<p>old body</p>"));
        let parsed = PostExtractor::default().parse_post(&raw).unwrap();
        assert_eq!(parsed.content_text, "What is X?");
    }

    #[test]
    fn test_last_answer_of_same_type_wins() {
        let raw = post(vec![
            answer("i_answer", "first"),
            answer("s_answer", "student"),
            answer("i_answer", "second"),
        ]);
        let parsed = PostExtractor::default().parse_post(&raw).unwrap();
        assert_eq!(parsed.answers.instructor.text.as_deref(), Some("second"));
        assert_eq!(parsed.answers.student.text.as_deref(), Some("student"));
    }

    #[test]
    fn test_stub_answer_without_history() {
        let stub = RawChild {
            kind: "s_answer".to_string(),
            ..RawChild::default()
        };
        let parsed = PostExtractor::default().parse_answer(&stub).unwrap();
        assert_eq!(parsed, ParsedAnswer::default());
    }

    #[test]
    fn test_answer_with_empty_history() {
        let stub: RawChild =
            serde_json::from_str(r#"{"type": "s_answer", "history": []}"#).unwrap();
        let parsed = PostExtractor::default().parse_answer(&stub).unwrap();
        assert_eq!(parsed, ParsedAnswer::default());

        let raw = post(vec![stub]);
        let parsed = PostExtractor::default().parse_post(&raw).unwrap();
        assert_eq!(parsed.answers.student, ParsedAnswer::default());
    }

    #[test]
    fn test_unknown_children_are_ignored() {
        let raw = post(vec![answer("x_answer", "odd"), answer("note", "ignored")]);
        let parsed = PostExtractor::default().parse_post(&raw).unwrap();
        assert_eq!(parsed.answers, Answers::default());
    }

    #[test]
    fn test_followup_feedback_is_one_level() {
        let followup = RawChild {
            kind: "followup".to_string(),
            id: Some("node1".to_string()),
            uid: Some("f1".to_string()),
            subject: Some("clarify?".to_string()),
            children: vec![
                RawChild {
                    subject: Some("thanks".to_string()),
                    children: vec![RawChild {
                        subject: Some("deeper".to_string()),
                        ..RawChild::default()
                    }],
                    ..RawChild::default()
                },
                RawChild::default(),
            ],
            ..RawChild::default()
        };
        let parsed = parse_followup(&followup);
        assert_eq!(parsed.subject, "clarify?");
        assert_eq!(parsed.feedback, vec!["thanks".to_string(), String::new()]);
        assert_eq!(parsed.id.as_deref(), Some("f1"));
    }

    #[test]
    fn test_followup_subject_is_not_normalized() {
        let followup = RawChild {
            kind: "followup".to_string(),
            subject: Some("<p>why?</p>".to_string()),
            ..RawChild::default()
        };
        assert_eq!(parse_followup(&followup).subject, "<p>why?</p>");
    }

    #[test]
    fn test_missing_history_is_error() {
        let raw = RawPost {
            nr: Some(3),
            ..RawPost::default()
        };
        let err = PostExtractor::default().parse_post(&raw).unwrap_err();
        assert_eq!(
            err,
            ExtractError::MissingContent {
                post: "@3".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_answer_image_rejects_post() {
        let raw = post(vec![answer("i_answer", "<img alt=\"no src\">")]);
        let err = PostExtractor::default().parse_post(&raw).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedReference { .. }));
    }
}
