//! Integration tests for post extraction and transcript assembly.

use piazza_conversation_extractor::extract::{
    build_conversation, Answers, ExtractError, ParsedAnswer, ParsedFollowup, ParsedPost,
    PostExtractor,
};
use piazza_conversation_extractor::piazza::RawPost;
use serde_json::json;

fn raw_post(value: serde_json::Value) -> RawPost {
    serde_json::from_value(value).expect("Fixture should deserialize")
}

#[test]
fn test_instructor_answer_scenario() {
    let raw = raw_post(json!({
        "nr": 42,
        "id": "lx1abc",
        "history": [{"subject": "Q1", "content": "<p>What is X?</p>", "created": "2024-01-01"}],
        "children": [{"type": "i_answer", "history": [{"content": "<b>X is Y</b>"}]}]
    }));

    let parsed = PostExtractor::default().parse_post(&raw).unwrap();
    assert_eq!(parsed.content_text, "What is X?");
    assert_eq!(parsed.answers.instructor.text.as_deref(), Some("X is Y"));

    let thread = build_conversation(&parsed, true);
    assert!(thread
        .conversation_text
        .lines()
        .any(|line| line == "Instructor Answer: X is Y"));
}

#[test]
fn test_followup_scenario() {
    let raw = raw_post(json!({
        "nr": 1,
        "history": [{"subject": "Q", "content": "body"}],
        "children": [{
            "type": "followup",
            "id": "node9",
            "uid": "f9",
            "subject": "clarify?",
            "children": [{"subject": "thanks"}]
        }]
    }));

    let parsed = PostExtractor::default().parse_post(&raw).unwrap();
    assert_eq!(
        parsed.answers.followups,
        vec![ParsedFollowup {
            subject: "clarify?".to_string(),
            feedback: vec!["thanks".to_string()],
            id: Some("f9".to_string()),
        }]
    );
}

#[test]
fn test_null_fields_do_not_reject_post() {
    let raw: RawPost = serde_json::from_str(
        r#"{"nr": 1, "history": [{"subject": null, "content": "<p>x</p>"}], "children": null}"#,
    )
    .unwrap();

    let parsed = PostExtractor::default().parse_post(&raw).unwrap();
    assert_eq!(parsed.title, "");
    assert_eq!(parsed.content_text, "x");
    assert!(parsed.answers.followups.is_empty());
}

#[test]
fn test_post_without_children() {
    let raw = raw_post(json!({
        "nr": 2,
        "history": [{"subject": "Lonely", "content": "<p>hello?</p>"}]
    }));

    let parsed = PostExtractor::default().parse_post(&raw).unwrap();
    assert!(parsed.answers.followups.is_empty());
    assert_eq!(parsed.answers.instructor, ParsedAnswer::default());
    assert_eq!(parsed.answers.student, ParsedAnswer::default());
}

#[test]
fn test_extraction_is_idempotent() {
    let raw = raw_post(json!({
        "nr": 3,
        "id": "abc",
        "history": [{"subject": "Q", "content": "<p>see <img src=\"/redirect/s3?prefix=a.png\"></p>"}],
        "children": [
            {"type": "s_answer", "history": [{"content": "<p>maybe</p>"}]},
            {"type": "followup", "subject": "hm", "children": [{"subject": "ok"}]}
        ]
    }));

    let extractor = PostExtractor::default();
    let first = extractor.parse_post(&raw).unwrap();
    let second = extractor.parse_post(&raw).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(
        build_conversation(&first, true),
        build_conversation(&second, true)
    );
}

#[test]
fn test_image_urls_follow_tag_order() {
    let raw = raw_post(json!({
        "nr": 4,
        "history": [{
            "subject": "Pics",
            "content": "<p><img src=\"https://example.com/b.png\"></p><p>text</p><img src=\"/redirect/s3?bucket=uploads&amp;prefix=paste%2Fa.png\"><img src=\"https://example.com/c.png\">"
        }]
    }));

    let parsed = PostExtractor::default().parse_post(&raw).unwrap();
    assert_eq!(
        parsed.image_urls,
        vec![
            "https://example.com/b.png",
            "https://cdn-uploads.piazza.com/paste/a.png",
            "https://example.com/c.png",
        ]
    );
    assert_eq!(parsed.content_text, "text");
}

#[test]
fn test_image_without_src_rejects_post() {
    let raw = raw_post(json!({
        "nr": 5,
        "history": [{"subject": "Broken", "content": "<p>look</p><img alt=\"graph\">"}]
    }));

    let result = PostExtractor::default().parse_post(&raw);
    assert!(matches!(
        result,
        Err(ExtractError::MalformedReference { .. })
    ));
}

#[test]
fn test_missing_history_rejects_post() {
    let raw = raw_post(json!({"nr": 6, "history": []}));
    let result = PostExtractor::default().parse_post(&raw);
    assert!(matches!(result, Err(ExtractError::MissingContent { .. })));
}

#[test]
fn test_golden_transcript() {
    let post = ParsedPost {
        post_id: Some(17),
        uid: Some("kz0q1".to_string()),
        title: "HW2 deadline".to_string(),
        content_text: "Is HW2 due Friday?".to_string(),
        image_urls: vec![],
        answers: Answers {
            instructor: ParsedAnswer {
                text: Some("Yes, 11:59pm.".to_string()),
                images: vec![],
            },
            student: ParsedAnswer {
                text: Some("I think so.".to_string()),
                images: vec![],
            },
            followups: vec![
                ParsedFollowup {
                    subject: "Late days allowed?".to_string(),
                    feedback: vec!["Two per term.".to_string(), "Thanks!".to_string()],
                    id: Some("f1".to_string()),
                },
                ParsedFollowup {
                    subject: "Where do we submit?".to_string(),
                    feedback: vec![],
                    id: Some("f2".to_string()),
                },
            ],
        },
    };

    let expected = "Title: HW2 deadline\n\
Content: Is HW2 due Friday?\n\
\n\
Initial Answers:\n\
Instructor Answer: Yes, 11:59pm.\n\
Student Answer: I think so.\n\
\n\
Follow-ups and Feedback:\n\
Follow-up: Late days allowed?\n\
Feedback:\n\
- Two per term.\n\
- Thanks!\n\
Follow-up: Where do we submit?\n";

    let thread = build_conversation(&post, true);
    assert_eq!(thread.conversation_text, expected);
    assert_eq!(thread.uid.as_deref(), Some("kz0q1"));

    let without_followups = build_conversation(&post, false);
    assert_eq!(
        without_followups.conversation_text,
        "Title: HW2 deadline\n\
Content: Is HW2 due Friday?\n\
\n\
Initial Answers:\n\
Instructor Answer: Yes, 11:59pm.\n\
Student Answer: I think so.\n\
\n"
    );
}
