//! Transcript assembly.
//!
//! Downstream prompts are tuned against this layout, so headers, prefixes and
//! blank lines must stay byte-for-byte stable.

use std::fmt::Write;

use crate::extract::models::{ConversationThread, ParsedPost};

/// Render a parsed post as a conversation transcript.
#[must_use]
pub fn build_conversation(post: &ParsedPost, include_followups: bool) -> ConversationThread {
    let mut text = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(text, "Title: {}", post.title);
    let _ = writeln!(text, "Content: {}", post.content_text);
    text.push('\n');

    text.push_str("Initial Answers:\n");
    if let Some(answer) = post.answers.instructor.display_text() {
        let _ = writeln!(text, "Instructor Answer: {answer}");
    }
    if let Some(answer) = post.answers.student.display_text() {
        let _ = writeln!(text, "Student Answer: {answer}");
    }
    text.push('\n');

    if include_followups {
        text.push_str("Follow-ups and Feedback:\n");
        for followup in &post.answers.followups {
            let _ = writeln!(text, "Follow-up: {}", followup.subject);
            if !followup.feedback.is_empty() {
                text.push_str("Feedback:\n");
                for feedback in &followup.feedback {
                    let _ = writeln!(text, "- {feedback}");
                }
            }
        }
    }

    ConversationThread {
        uid: post.uid.clone(),
        conversation_text: text,
    }
}
