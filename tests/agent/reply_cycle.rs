use persona_mailer::mail::{AUTO_SUBMITTED_VALUE, InboundMessage};

use crate::mailer_harness::{Harness, letter, simple};

#[tokio::test]
async fn letter_to_alias_gets_one_reply_from_that_persona() {
    let h = Harness::new();
    let uid = h
        .mailbox
        .deliver(simple("friend@example.com", "henry@askian.net", "orig-1@example.com"));

    let report = h.agent().run_cycle().await.unwrap();

    assert_eq!(report.unseen, 1);
    assert_eq!(report.replied, 1);
    assert!(report.state_saved);

    let sent = h.mailbox.sent();
    assert_eq!(sent.len(), 1);
    let reply = &sent[0];
    assert_eq!(reply.from_address, "henry@askian.net");
    assert_eq!(reply.from_name, "Henry VIII");
    assert_eq!(reply.to, "friend@example.com");
    assert_eq!(reply.subject, "Re: A question");
    assert_eq!(reply.in_reply_to.as_deref(), Some("orig-1@example.com"));
    assert_eq!(reply.body, "Generated reply.");

    let raw = String::from_utf8(reply.to_message().unwrap().formatted()).unwrap();
    assert!(raw.contains(&format!("Auto-Submitted: {AUTO_SUBMITTED_VALUE}\r\n")));

    let snapshot = h.store.snapshot();
    assert_eq!(snapshot.replied_ids, vec!["orig-1@example.com"]);
    assert_eq!(snapshot.reply_log.len(), 1);
    assert_eq!(snapshot.reply_log[0].sender, "friend@example.com");
    assert!(h.mailbox.is_seen(&uid));
    assert_eq!(h.mailbox.closes(), 1);
}

#[tokio::test]
async fn persona_instructions_and_letter_reach_completion() {
    let h = Harness::new();
    h.mailbox
        .deliver(simple("friend@example.com", "ada@askian.net", "orig-2@example.com"));

    h.agent().run_cycle().await.unwrap();

    let requests = h.completion.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].instructions.contains("Ada Lovelace"));
    assert!(requests[0].content.contains("Do you still play real tennis?"));
    assert!(requests[0].content.ends_with("Sign off as: A.A. Lovelace"));
}

#[tokio::test]
async fn same_message_id_across_cycles_is_answered_once() {
    let h = Harness::new();
    let mut agent = h.agent();

    h.mailbox
        .deliver(simple("friend@example.com", "henry@askian.net", "dup@example.com"));
    agent.run_cycle().await.unwrap();

    let redelivered = h
        .mailbox
        .deliver(simple("friend@example.com", "henry@askian.net", "dup@example.com"));
    let report = agent.run_cycle().await.unwrap();

    assert_eq!(report.replied, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(h.mailbox.sent().len(), 1);
    assert!(h.mailbox.is_seen(&redelivered));
    assert_eq!(h.store.snapshot().replied_ids.len(), 1);
}

#[tokio::test]
async fn unmatched_alias_falls_back_to_delivery_headers_then_default() {
    let h = Harness::new();
    h.mailbox.deliver(letter(
        "friend@example.com",
        "inbox@askian.net",
        "a@example.com",
        "Hello",
        &[("Delivered-To", "Tesla@AskIan.net")],
    ));
    h.mailbox
        .deliver(simple("other@example.com", "whoever@askian.net", "b@example.com"));

    h.agent().run_cycle().await.unwrap();

    let senders: Vec<String> = h.mailbox.sent().into_iter().map(|r| r.from_address).collect();
    assert_eq!(senders, vec!["tesla@askian.net", "askian@askian.net"]);
}

#[tokio::test]
async fn message_without_id_is_answered_but_not_ledgered() {
    let h = Harness::new();
    h.mailbox.deliver(
        "From: friend@example.com\r\nTo: dave@askian.net\r\nSubject: hi\r\n\r\nAlright?\r\n",
    );

    let report = h.agent().run_cycle().await.unwrap();

    assert_eq!(report.replied, 1);
    let reply = &h.mailbox.sent()[0];
    assert!(reply.in_reply_to.is_none());
    let snapshot = h.store.snapshot();
    assert!(snapshot.replied_ids.is_empty());
    assert_eq!(snapshot.reply_log.len(), 1);
}

#[tokio::test]
async fn empty_body_is_skipped_and_flagged_seen() {
    let h = Harness::new();
    let uid = h.mailbox.deliver(letter(
        "friend@example.com",
        "henry@askian.net",
        "blank@example.com",
        "   ",
        &[],
    ));

    let report = h.agent().run_cycle().await.unwrap();

    assert_eq!(report.skipped, 1);
    assert!(h.mailbox.sent().is_empty());
    assert!(h.mailbox.is_seen(&uid));
    assert!(h.completion.requests().is_empty());
}

#[tokio::test]
async fn long_letters_are_truncated_before_generation() {
    let h = Harness::new();
    let body = "é".repeat(2500);
    h.mailbox.deliver(letter(
        "friend@example.com",
        "henry@askian.net",
        "long@example.com",
        &body,
        &[],
    ));

    h.agent().run_cycle().await.unwrap();

    let content = &h.completion.requests()[0].content;
    assert!(content.contains(&"é".repeat(2000)));
    assert!(!content.contains(&"é".repeat(2001)));
}

#[tokio::test]
async fn sent_replies_parse_back_as_auto_replies() {
    let h = Harness::new();
    h.mailbox
        .deliver(simple("friend@example.com", "churchill@askian.net", "c@example.com"));

    h.agent().run_cycle().await.unwrap();

    let raw = h.mailbox.sent()[0].to_message().unwrap().formatted();
    let parsed = InboundMessage::parse(&raw).unwrap();
    assert_eq!(parsed.sender, "churchill@askian.net");
    assert_eq!(parsed.recipients, vec!["friend@example.com"]);
    assert_eq!(parsed.markers.auto_submitted.as_deref(), Some("auto-replied"));
}
