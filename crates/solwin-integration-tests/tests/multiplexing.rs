//! Several embeds sharing one host page.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use solwin_core::{EngineMessageType, EngineWindow, HostDocument};
use solwin_embed::{EmbedError, EmbedOptions, SolarWindowEmbed, embed};
use solwin_engine::{EngineChannel, EngineConfig, Readiness};
use solwin_loopback::{Browser, LoopbackWindow};
use solwin_test::init_test_logging;

const HOST: &str = "https://host.example";

fn engine_for(browser: &Browser, handle: &SolarWindowEmbed) -> (EngineChannel, Readiness) {
    let content = handle.frame().content_window().unwrap();
    let window: Arc<dyn EngineWindow> = browser.window(content).unwrap();
    let engine = EngineChannel::new(window, EngineConfig::default());
    let readiness = engine.initialize().unwrap();
    (engine, readiness)
}

async fn ready(readiness: Readiness) {
    match readiness {
        Readiness::Scheduled(task) => task.await.unwrap(),
        Readiness::Inert => panic!("engine should be embedded"),
    }
}

fn two_embeds(browser: &Browser) -> (Arc<LoopbackWindow>, SolarWindowEmbed, SolarWindowEmbed) {
    let host = browser.open_document(HOST);
    host.add_element("a");
    host.add_element("b");
    let a = embed(host.clone(), &EmbedOptions::new("a")).unwrap();
    let b = embed(host.clone(), &EmbedOptions::new("b").with_height("300px")).unwrap();
    (host, a, b)
}

#[tokio::test(start_paused = true)]
async fn messages_reach_only_the_embed_of_their_frame() {
    init_test_logging();
    let browser = Browser::new();
    let (_host, a, b) = two_embeds(&browser);

    let b_handler_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&b_handler_calls);
    let _b_all = b.on_message(solwin_embed::MessageFilter::All, move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
    });

    let (engine_a, readiness_a) = engine_for(&browser, &a);
    ready(readiness_a).await;
    browser.flush();

    engine_a.report_interaction("panel_selected", None);
    browser.flush();

    assert_eq!(a.message_count(), 2);
    assert_eq!(
        a.messages()
            .iter()
            .map(solwin_core::EngineEnvelope::message_type)
            .collect::<Vec<_>>(),
        vec![EngineMessageType::EngineReady, EngineMessageType::Interaction]
    );
    assert_eq!(b.message_count(), 0);
    assert_eq!(b_handler_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn commands_reach_only_the_addressed_engine() {
    init_test_logging();
    let browser = Browser::new();
    let (_host, a, b) = two_embeds(&browser);

    let (_engine_a, readiness_a) = engine_for(&browser, &a);
    let (_engine_b, readiness_b) = engine_for(&browser, &b);
    ready(readiness_a).await;
    ready(readiness_b).await;
    browser.flush();
    assert_eq!(a.message_count(), 1);
    assert_eq!(b.message_count(), 1);

    b.send_command(solwin_core::Command::Refresh);
    browser.flush();

    let window_a = browser.window(a.frame().content_window().unwrap()).unwrap();
    let window_b = browser.window(b.frame().content_window().unwrap()).unwrap();
    assert_eq!(window_a.reload_count(), 0);
    assert_eq!(window_b.reload_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn destroying_one_embed_leaves_the_other_working() {
    init_test_logging();
    let browser = Browser::new();
    let (host, a, b) = two_embeds(&browser);

    let (_engine_a, readiness_a) = engine_for(&browser, &a);
    let (engine_b, readiness_b) = engine_for(&browser, &b);
    ready(readiness_a).await;
    ready(readiness_b).await;
    browser.flush();

    a.destroy();
    assert_eq!(host.mounted_frames().len(), 1);
    assert_eq!(host.listener_count(), 1);

    b.request_state();
    browser.flush();
    assert_eq!(b.message_count(), 2);
    assert!(engine_b.is_embedded());
}

#[test]
fn missing_container_leaves_the_page_untouched() {
    let browser = Browser::new();
    let host = browser.open_document(HOST);
    host.add_element("present");

    let missing = embed(host.clone(), &EmbedOptions::new("absent"));
    assert!(matches!(missing, Err(EmbedError::ContainerNotFound(id)) if id == "absent"));

    let empty = embed(host.clone(), &EmbedOptions::new(""));
    assert!(matches!(empty, Err(EmbedError::MissingContainerId)));

    assert!(host.mounted_frames().is_empty());
    assert_eq!(host.listener_count(), 0);
    assert!(host.has_element("present"));
    assert_eq!(browser.context_count(), 1);
}
