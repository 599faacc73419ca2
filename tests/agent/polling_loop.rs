use std::time::Duration;

use persona_mailer::agent::AgentSettings;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::mailer_harness::{Harness, simple};

fn polling_settings() -> AgentSettings {
    AgentSettings {
        poll_interval: Duration::from_secs(30),
        ..Harness::settings()
    }
}

#[tokio::test(start_paused = true)]
async fn loop_keeps_polling_through_mailbox_outages_until_cancelled() {
    let h = Harness::new();
    let mut agent = h.agent_with(polling_settings());
    let shutdown = CancellationToken::new();

    let driver = async {
        h.mailbox
            .deliver(simple("friend@example.com", "henry@askian.net", "p1@example.com"));

        // Cycles at t=0 and t=30.
        tokio::time::sleep(Duration::from_secs(45)).await;
        assert_eq!(h.mailbox.searches(), 2);
        assert_eq!(h.mailbox.sent().len(), 1);

        // Cycles at t=60 and t=90 fail to reach the mailbox.
        h.mailbox.fail_search(true);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(h.mailbox.searches(), 4);

        // Recovered by t=120.
        h.mailbox.fail_search(false);
        h.mailbox
            .deliver(simple("other@example.com", "tesla@askian.net", "p2@example.com"));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(h.mailbox.searches(), 5);
        assert_eq!(h.mailbox.sent().len(), 2);

        // Cancelled mid-sleep; the t=150 cycle never starts.
        shutdown.cancel();
    };

    tokio::time::timeout(Duration::from_secs(600), async {
        tokio::join!(agent.run_forever(shutdown.clone()), driver)
    })
    .await
    .expect("run_forever should return once cancelled");

    assert_eq!(h.mailbox.searches(), 5);
    assert_eq!(h.store.saves(), 5);
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_start_runs_no_cycle() {
    let h = Harness::new();
    let mut agent = h.agent_with(polling_settings());
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    agent.run_forever(shutdown).await;

    assert_eq!(h.mailbox.searches(), 0);
}

#[tokio::test(start_paused = true)]
async fn successive_sends_are_spaced_by_the_pause() {
    let h = Harness::new();
    let mut agent = h.agent_with(AgentSettings {
        send_pause: Duration::from_secs(2),
        ..Harness::settings()
    });
    h.mailbox
        .deliver(simple("a@example.com", "henry@askian.net", "s1@example.com"));
    h.mailbox
        .deliver(simple("b@example.com", "henry@askian.net", "s2@example.com"));

    let start = Instant::now();
    let report = agent.run_cycle().await.unwrap();

    assert_eq!(report.replied, 2);
    assert!(start.elapsed() >= Duration::from_secs(2));
    assert!(start.elapsed() < Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn a_single_send_does_not_wait() {
    let h = Harness::new();
    let mut agent = h.agent_with(AgentSettings {
        send_pause: Duration::from_secs(2),
        ..Harness::settings()
    });
    h.mailbox
        .deliver(simple("a@example.com", "henry@askian.net", "s1@example.com"));

    let start = Instant::now();
    agent.run_cycle().await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(2));
}
