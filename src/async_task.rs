use crate::i18n::{Bundle, I18n, TranslationSource};
use crate::icons::{Glyph, IconLoader};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub enum Task {
    ResolveIcon {
        node_id: String,
        icon_name: String,
        light_mode: bool,
        cancel: CancellationToken,
    },
    LoadLanguage {
        language: String,
        namespaces: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult {
    IconResolved {
        node_id: String,
        icon_name: String,
        light_mode: bool,
        /// `None` when no glyph exists under that name
        glyph: Option<Glyph>,
    },
    LanguageLoaded {
        language: String,
        bundles: HashMap<String, Bundle>,
    },
    Error {
        message: String,
    },
}

/// Everything the worker needs to serve tasks
#[derive(Clone)]
pub struct WorkerContext {
    pub icons: IconLoader,
    pub translations: Arc<dyn TranslationSource>,
    pub fallback: String,
}

impl WorkerContext {
    pub fn new(icons: IconLoader, translations: Arc<dyn TranslationSource>, fallback: &str) -> Self {
        Self {
            icons,
            translations,
            fallback: fallback.to_string(),
        }
    }
}

pub async fn run_worker(
    mut task_receiver: mpsc::Receiver<Task>,
    result_sender: mpsc::Sender<TaskResult>,
    context: WorkerContext,
) {
    while let Some(task) = task_receiver.recv().await {
        let result = match task {
            Task::ResolveIcon {
                node_id,
                icon_name,
                light_mode,
                cancel,
            } => match resolve_icon(&context.icons, &icon_name, light_mode, &cancel).await {
                Some(glyph) => TaskResult::IconResolved {
                    node_id,
                    icon_name,
                    light_mode,
                    glyph,
                },
                None => {
                    log::debug!("worker: icon request for '{}' cancelled", node_id);
                    continue;
                }
            },
            Task::LoadLanguage {
                language,
                namespaces,
            } => match load_language(&context, &language, namespaces).await {
                Ok(bundles) => TaskResult::LanguageLoaded { language, bundles },
                Err(message) => TaskResult::Error { message },
            },
        };

        if result_sender.send(result).await.is_err() {
            // UI loop is gone
            break;
        }
    }
    log::debug!("worker: task channel closed, exiting");
}

/// Outer `None` means the request was cancelled before it finished
pub async fn resolve_icon(
    icons: &IconLoader,
    icon_name: &str,
    light_mode: bool,
    cancel: &CancellationToken,
) -> Option<Option<Glyph>> {
    if cancel.is_cancelled() {
        return None;
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        glyph = icons.load(icon_name, light_mode) => Some(glyph),
    }
}

async fn load_language(
    context: &WorkerContext,
    language: &str,
    namespaces: Vec<String>,
) -> Result<HashMap<String, Bundle>, String> {
    let source = Arc::clone(&context.translations);
    let language = language.to_string();
    let fallback = context.fallback.clone();
    tokio::task::spawn_blocking(move || {
        I18n::load_bundles(source.as_ref(), &language, &namespaces, &fallback)
    })
    .await
    .map_err(|e| format!("language loader failed: {}", e))
}
