use chrono::Duration;
use persona_mailer::agent::AgentSettings;

use crate::mailer_harness::{Harness, simple};

#[tokio::test]
async fn global_cap_defers_the_eleventh_until_the_window_moves() {
    let h = Harness::new();
    let mut agent = h.agent_with(AgentSettings {
        global_per_hour: 10,
        ..Harness::settings()
    });

    let uids: Vec<String> = (0..11)
        .map(|n| {
            h.mailbox.deliver(simple(
                &format!("writer{n}@example.com"),
                "henry@askian.net",
                &format!("m{n}@example.com"),
            ))
        })
        .collect();

    let report = agent.run_cycle().await.unwrap();
    assert_eq!(report.replied, 10);
    assert_eq!(report.deferred, 1);
    assert_eq!(h.mailbox.unseen(), vec![uids[10].clone()]);

    h.clock.advance(Duration::minutes(30));
    let report = agent.run_cycle().await.unwrap();
    assert_eq!(report.replied, 0);
    assert_eq!(report.deferred, 1);

    h.clock.advance(Duration::minutes(31));
    let report = agent.run_cycle().await.unwrap();
    assert_eq!(report.replied, 1);
    assert!(h.mailbox.unseen().is_empty());

    let sent = h.mailbox.sent();
    assert_eq!(sent.len(), 11);
    assert_eq!(sent[10].to, "writer10@example.com");
}

#[tokio::test]
async fn per_sender_cap_defers_only_that_sender() {
    let h = Harness::new();
    let mut agent = h.agent_with(AgentSettings {
        per_sender_per_hour: 1,
        ..Harness::settings()
    });

    h.mailbox
        .deliver(simple("busy@example.com", "henry@askian.net", "b1@example.com"));
    let second = h
        .mailbox
        .deliver(simple("BUSY@example.com", "henry@askian.net", "b2@example.com"));
    h.mailbox
        .deliver(simple("calm@example.com", "henry@askian.net", "c1@example.com"));

    let report = agent.run_cycle().await.unwrap();

    assert_eq!(report.replied, 2);
    assert_eq!(report.deferred, 1);
    assert_eq!(h.mailbox.unseen(), vec![second]);
    let ledger = h.store.snapshot().replied_ids;
    assert!(!ledger.contains(&"b2@example.com".to_string()));
}

#[tokio::test]
async fn fallback_replies_count_toward_the_cap() {
    let h = Harness::new();
    h.completion.set(crate::mailer_harness::Script::Fail);
    let mut agent = h.agent_with(AgentSettings {
        global_per_hour: 1,
        ..Harness::settings()
    });

    h.mailbox
        .deliver(simple("a@example.com", "henry@askian.net", "f1@example.com"));
    h.mailbox
        .deliver(simple("b@example.com", "henry@askian.net", "f2@example.com"));

    let report = agent.run_cycle().await.unwrap();

    assert_eq!(report.replied, 1);
    assert_eq!(report.deferred, 1);
}
