//! Shipped module tests: notes and heartbeat
//! Run with: cargo test --test modules_test

mod common;

use std::sync::Arc;

use common::*;
use computer_bot::application::messaging::Dispatch;
use computer_bot::domain::entities::IncomingMessage;
use computer_bot::Catalog;

const NOTES: &str = "  - { name: notes, source: modules/notes, type: Notes }";

fn master(text: &str) -> IncomingMessage {
    IncomingMessage::new(MASTER, text).with_master(true)
}

#[tokio::test]
async fn notes_remember_and_recall() {
    ensure_init();
    let protocol = Arc::new(RecordingProtocol::default());
    let bot = start(&config_with(NOTES, false), &Catalog::builtin(), &protocol).unwrap();

    bot.handle(master("recall colour")).await;
    bot.handle(master("remember colour teal")).await;
    bot.handle(master("recall colour")).await;

    let texts: Vec<_> = protocol.delivered().into_iter().map(|(_, text)| text).collect();
    assert_eq!(texts, vec!["I don't know colour", "Got it, colour is teal", "colour is teal"]);
    assert_eq!(bot.persistence().read("notes", "colour").unwrap().as_deref(), Some("teal"));
}

#[tokio::test]
async fn two_notes_instances_keep_separate_namespaces() {
    ensure_init();
    let modules = format!("{}\n  - {{ name: scratch, source: modules/notes, type: Notes }}", NOTES);
    let protocol = Arc::new(RecordingProtocol::default());
    let bot = start(&config_with(&modules, false), &Catalog::builtin(), &protocol).unwrap();

    // First registered `remember` wins, so only `notes` sees the write
    bot.handle(master("remember key one")).await;
    bot.persistence().write("scratch", "key", "two").unwrap();

    assert_eq!(bot.persistence().read("notes", "key").unwrap().as_deref(), Some("one"));
    assert_eq!(bot.persistence().read("scratch", "key").unwrap().as_deref(), Some("two"));
}

#[tokio::test]
async fn unnamed_module_uses_its_type_as_namespace() {
    ensure_init();
    let protocol = Arc::new(RecordingProtocol::default());
    let config = config_with("  - { source: modules/notes, type: Notes }", false);
    let bot = start(&config, &Catalog::builtin(), &protocol).unwrap();

    assert_eq!(bot.module_names(), vec!["notes".to_string()]);
    bot.handle(master("remember colour teal")).await;
    assert_eq!(bot.persistence().read("notes", "colour").unwrap().as_deref(), Some("teal"));
}

#[tokio::test]
async fn notes_stay_private_unless_configured() {
    ensure_init();
    let protocol = Arc::new(RecordingProtocol::default());
    let bot = start(&config_with(NOTES, true), &Catalog::builtin(), &protocol).unwrap();
    let guest = IncomingMessage::new(GUEST, "recall x");
    assert_eq!(bot.handle(guest).await, Some(Dispatch::Unmatched));

    let public = "  - { name: notes, source: modules/notes, type: Notes, config: { public: true } }";
    let protocol = Arc::new(RecordingProtocol::default());
    let bot = start(&config_with(public, true), &Catalog::builtin(), &protocol).unwrap();
    let guest = IncomingMessage::new(GUEST, "recall x");
    assert!(matches!(bot.handle(guest).await, Some(Dispatch::Handled { .. })));
    assert_eq!(protocol.delivered(), vec![(GUEST.to_string(), "I don't know x".to_string())]);
}

#[tokio::test]
async fn heartbeat_counts_beats_until_stopped() {
    ensure_init();
    let modules = "  - { name: pulse, source: modules/heartbeat, type: Heartbeat, config: { interval-ms: 10 } }";
    let protocol = Arc::new(RecordingProtocol::default());
    let bot = start(&config_with(modules, false), &Catalog::builtin(), &protocol).unwrap();
    let store = bot.persistence().clone();

    let beats = || {
        store
            .read("pulse", "beats")
            .unwrap()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
    };
    eventually("two beats", || beats() >= 2).await;
    assert!(store.read("pulse", "last-beat").unwrap().is_some());

    bot.handle(master("heartbeat stop")).await;
    // One beat may still be in flight when the stop lands
    tokio::time::sleep(std::time::Duration::from_millis(30)).await;
    let stopped_at = beats();
    tokio::time::sleep(std::time::Duration::from_millis(60)).await;
    assert_eq!(beats(), stopped_at);

    let result = bot.handle(master("heartbeat")).await;
    assert_eq!(result, Some(Dispatch::Handled { syntax: "heartbeat".to_string(), delivered: 3 }));
    let texts: Vec<_> = protocol.delivered().into_iter().map(|(_, text)| text).collect();
    assert_eq!(texts[0], "Heartbeat stopped");
    assert_eq!(texts[1], format!("Beats: {}", stopped_at));
    assert!(texts[2].starts_with("Last beat: "));
    assert_eq!(texts[3], "Status: stopped");
}

#[tokio::test]
async fn bad_module_config_fails_startup() {
    ensure_init();
    let modules = "  - { name: pulse, source: modules/heartbeat, type: Heartbeat, config: { interval-ms: soon } }";
    let protocol = Arc::new(RecordingProtocol::default());
    assert!(start(&config_with(modules, false), &Catalog::builtin(), &protocol).is_err());
}
