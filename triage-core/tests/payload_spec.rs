use serde_json::json;
use speculate2::speculate;
use triage_core::models::*;
use triage_core::payload::{self, Payload, UNKNOWN_USER};

fn parse(value: serde_json::Value) -> Payload {
    serde_json::from_value(value).expect("payload")
}

fn subject_json() -> serde_json::Value {
    json!({
        "html_url": "https://github.com/acme/widgets/pull/9",
        "title": "Teach widgets to spin",
        "body": "They only wobble today",
        "created_at": "2016-09-30T08:15:00Z",
        "user": { "login": "author" }
    })
}

speculate! {
    describe "subject shapes" {
        it "reads the same record from pull request and issue payloads" {
            let pr = payload::normalize(&parse(json!({
                "sender": { "login": "someone" },
                "pull_request": subject_json()
            })));
            let issue = payload::normalize(&parse(json!({
                "sender": { "login": "someone" },
                "issue": subject_json()
            })));

            assert_eq!(pr, issue);
            assert_eq!(issue.url, "https://github.com/acme/widgets/pull/9");
            assert_eq!(issue.title, "Teach widgets to spin");
            assert_eq!(issue.body, "They only wobble today");
            assert_eq!(issue.created_at, "2016-09-30T08:15:00Z");
        }

        it "prefers the pull request object when both are present" {
            let record = payload::normalize(&parse(json!({
                "pull_request": subject_json(),
                "issue": { "html_url": "https://github.com/acme/widgets/issues/3", "title": "Issue" }
            })));

            assert_eq!(record.url, "https://github.com/acme/widgets/pull/9");
            assert_eq!(record.title, "Teach widgets to spin");
        }

        it "tags the subject variant" {
            let event = WebhookEvent::from_payload(parse(json!({
                "action": "created",
                "issue": subject_json()
            }))).expect("event");

            assert!(!event.subject.is_pull_request());
            assert_eq!(event.kind, EventKind::Created);
        }
    }

    describe "author" {
        it "uses the pull request author when nobody else is named" {
            let record = payload::normalize(&parse(json!({ "pull_request": subject_json() })));
            assert_eq!(record.author, "author");
        }

        it "falls back to a placeholder for issue payloads without a sender" {
            let record = payload::normalize(&parse(json!({ "issue": subject_json() })));
            assert_eq!(record.author, UNKNOWN_USER);
        }
    }

    describe "event fields" {
        it "extracts the comment url and label name" {
            let event = WebhookEvent::from_payload(parse(json!({
                "action": "labeled",
                "label": { "name": "Blocked" },
                "comment": { "html_url": "https://github.com/acme/widgets/pull/9#c1" },
                "pull_request": subject_json()
            }))).expect("event");

            assert_eq!(event.label.as_deref(), Some("Blocked"));
            assert_eq!(event.comment_url.as_deref(), Some("https://github.com/acme/widgets/pull/9#c1"));
        }

        it "keeps unknown actions" {
            let event = WebhookEvent::from_payload(parse(json!({
                "action": "review_requested",
                "pull_request": subject_json()
            }))).expect("event");

            assert_eq!(event.kind, EventKind::Other("review_requested".to_string()));
        }
    }
}
