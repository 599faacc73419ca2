use crate::mailer_harness::{ACCOUNT, Harness, letter, simple};

#[tokio::test]
async fn agent_never_answers_its_own_mail() {
    let h = Harness::new();
    let own_account = h.mailbox.deliver(simple(ACCOUNT, "henry@askian.net", "self-1@askian.net"));
    let own_persona = h
        .mailbox
        .deliver(simple("Henry@AskIan.net", "tesla@askian.net", "self-2@askian.net"));

    let report = h.agent().run_cycle().await.unwrap();

    assert_eq!(report.skipped, 2);
    assert!(h.mailbox.sent().is_empty());
    assert!(h.mailbox.is_seen(&own_account));
    assert!(h.mailbox.is_seen(&own_persona));
}

#[tokio::test]
async fn a_sent_reply_delivered_back_is_ignored() {
    let h = Harness::new();
    let mut agent = h.agent();
    h.mailbox
        .deliver(simple("friend@example.com", "tesla@askian.net", "orig@example.com"));
    agent.run_cycle().await.unwrap();

    let echoed = h.mailbox.sent()[0].to_message().unwrap().formatted();
    h.mailbox.deliver(echoed);
    let report = agent.run_cycle().await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(h.mailbox.sent().len(), 1);
}

#[tokio::test]
async fn automated_senders_and_bulk_mail_are_skipped() {
    let h = Harness::new();
    h.mailbox
        .deliver(simple("MAILER-DAEMON@mx.example.com", "henry@askian.net", "bounce@mx"));
    h.mailbox
        .deliver(simple("no-reply@shop.example.com", "henry@askian.net", "shop@x"));
    h.mailbox.deliver(letter(
        "list@example.com",
        "henry@askian.net",
        "list@x",
        "Digest",
        &[("Precedence", "list")],
    ));
    h.mailbox.deliver(letter(
        "ooo@example.com",
        "henry@askian.net",
        "ooo@x",
        "I am away",
        &[("Auto-Submitted", "auto-replied")],
    ));
    h.mailbox.deliver(letter(
        "exchange@example.com",
        "henry@askian.net",
        "ex@x",
        "Out of office",
        &[("X-Auto-Response-Suppress", "OOF")],
    ));

    let report = h.agent().run_cycle().await.unwrap();

    assert_eq!(report.unseen, 5);
    assert_eq!(report.skipped, 5);
    assert!(h.mailbox.sent().is_empty());
    assert!(h.mailbox.unseen().is_empty());
    assert!(h.completion.requests().is_empty());
}

#[tokio::test]
async fn auto_submitted_no_is_an_ordinary_letter() {
    let h = Harness::new();
    h.mailbox.deliver(letter(
        "friend@example.com",
        "henry@askian.net",
        "human@x",
        "Hello",
        &[("Auto-Submitted", "no")],
    ));

    let report = h.agent().run_cycle().await.unwrap();

    assert_eq!(report.replied, 1);
}
