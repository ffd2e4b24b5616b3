use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use widgetlab::app::App;
use widgetlab::async_task::{run_worker, Task, TaskResult, WorkerContext};
use widgetlab::demo::demo_forest;
use widgetlab::i18n::MemoryTranslationSource;
use widgetlab::icons::{Glyph, IconLoader};
use widgetlab::main_lib::handle_task_result;

fn spawn_worker() -> (mpsc::Sender<Task>, mpsc::Receiver<TaskResult>) {
    let (task_sender, task_receiver) = mpsc::channel(16);
    let (result_sender, result_receiver) = mpsc::channel(16);
    let context = WorkerContext::new(
        IconLoader::builtin(),
        Arc::new(MemoryTranslationSource::builtin()),
        "en",
    );
    tokio::spawn(run_worker(task_receiver, result_sender, context));
    (task_sender, result_receiver)
}

async fn next_result(receiver: &mut mpsc::Receiver<TaskResult>) -> TaskResult {
    timeout(Duration::from_secs(5), receiver.recv())
        .await
        .expect("worker answered in time")
        .expect("worker still running")
}

fn icon_task(node_id: &str, icon_name: &str, cancel: CancellationToken) -> Task {
    Task::ResolveIcon {
        node_id: node_id.to_string(),
        icon_name: icon_name.to_string(),
        light_mode: false,
        cancel,
    }
}

#[tokio::test]
async fn test_worker_resolves_icon() {
    let (sender, mut results) = spawn_worker();
    sender
        .send(icon_task("13", "typescript", CancellationToken::new()))
        .await
        .unwrap();

    let result = next_result(&mut results).await;
    assert_eq!(
        result,
        TaskResult::IconResolved {
            node_id: "13".to_string(),
            icon_name: "typescript".to_string(),
            light_mode: false,
            glyph: Some(Glyph::new("T", Some("#3178c6"))),
        }
    );
}

#[tokio::test]
async fn test_worker_reports_missing_icon() {
    let (sender, mut results) = spawn_worker();
    sender
        .send(icon_task("1", "no-such-icon", CancellationToken::new()))
        .await
        .unwrap();

    assert_matches!(
        next_result(&mut results).await,
        TaskResult::IconResolved { glyph: None, .. }
    );
}

#[tokio::test]
async fn test_cancelled_request_produces_no_result() {
    let (sender, mut results) = spawn_worker();
    let cancel = CancellationToken::new();
    cancel.cancel();
    sender.send(icon_task("1", "folder-src", cancel)).await.unwrap();
    sender
        .send(icon_task("2", "folder-components", CancellationToken::new()))
        .await
        .unwrap();

    // The worker handles tasks in order, so the first answer is for node 2
    assert_matches!(
        next_result(&mut results).await,
        TaskResult::IconResolved { node_id, .. } if node_id == "2"
    );
}

#[tokio::test]
async fn test_worker_loads_language() {
    let (sender, mut results) = spawn_worker();
    sender
        .send(Task::LoadLanguage {
            language: "es".to_string(),
            namespaces: vec!["explorer".to_string(), "index".to_string()],
        })
        .await
        .unwrap();

    match next_result(&mut results).await {
        TaskResult::LanguageLoaded { language, bundles } => {
            assert_eq!(language, "es");
            assert_eq!(bundles["explorer"]["title"], "Explorador");
            assert_eq!(bundles["index"]["pages.grid"], "Cuadrícula");
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn test_worker_exits_when_senders_drop() {
    let (task_sender, task_receiver) = mpsc::channel(4);
    let (result_sender, _result_receiver) = mpsc::channel(4);
    let context = WorkerContext::new(
        IconLoader::builtin(),
        Arc::new(MemoryTranslationSource::new()),
        "en",
    );
    let handle = tokio::spawn(run_worker(task_receiver, result_sender, context));
    drop(task_sender);
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("worker exited")
        .unwrap();
}

#[tokio::test]
async fn test_app_round_trip_through_worker() {
    let mut app = App::headless(demo_forest());
    let (sender, mut results) = spawn_worker();

    let requests = app.icon_requests();
    let count = requests.len();
    assert!(count > 0);
    for task in requests {
        sender.send(task).await.unwrap();
    }
    for _ in 0..count {
        let result = next_result(&mut results).await;
        handle_task_result(&mut app, result);
    }

    assert_eq!(app.pending_icon_count(), 0);
    assert!(app.icon_requests().is_empty());
}

#[tokio::test]
async fn test_theme_change_cancels_pending_requests() {
    let mut app = App::headless(demo_forest());
    let first = app.icon_requests();
    let tokens: Vec<CancellationToken> = first
        .iter()
        .map(|task| match task {
            Task::ResolveIcon { cancel, .. } => cancel.clone(),
            Task::LoadLanguage { .. } => unreachable!(),
        })
        .collect();

    app.set_theme("light");
    let second = app.icon_requests();
    assert_eq!(second.len(), first.len());
    assert!(tokens.iter().all(|token| token.is_cancelled()));
}
