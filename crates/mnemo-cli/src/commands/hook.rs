use std::io::Read as _;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use mnemo_capture::{extract_from_file, worth_classifying, NormalizedExchange};
use mnemo_classify::{Classification, Classifier, PromptVariant};
use mnemo_core::model::{HookEventKind, HookPayload};
use mnemo_core::{merge, CursorStore, MemoryStore, Settings};

use super::{status, sync_engine};

#[derive(Args)]
pub struct HookArgs {}

/// Top-level hook entry point. The hosting agent must never see this
/// pipeline as a failure: every error is converted into a silent
/// successful exit here, and only advisory warnings reach stdout.
pub fn run(_args: &HookArgs) -> Result<()> {
    if let Err(e) = dispatch() {
        tracing::debug!("Hook invocation aborted: {e}");
    }
    Ok(())
}

fn dispatch() -> Result<()> {
    let mut input = Vec::new();
    std::io::stdin().read_to_end(&mut input)?;
    let payload = HookPayload::from_slice(&input)?;
    let settings = Settings::load()?;
    let store = MemoryStore::for_project(&settings, &payload.cwd);

    match payload.hook_event_name {
        HookEventKind::SessionStart => session_start(&settings, &store),
        HookEventKind::UserPromptSubmit => capture(&store, &payload),
        HookEventKind::Stop | HookEventKind::PreCompact | HookEventKind::SessionEnd => {
            capture(&store, &payload)?;
            push_best_effort(&settings, &store);
            Ok(())
        }
    }
}

/// Pull the shared state before the session reads it, then surface any
/// advisory warnings on stdout for the host to display.
fn session_start(settings: &Settings, store: &MemoryStore) -> Result<()> {
    if let Some(engine) = sync_engine(settings, store) {
        match engine.pull() {
            Ok(report) => {
                for warning in &report.warnings {
                    println!("mnemo: {warning}");
                }
            }
            Err(e) => tracing::debug!("Session-start pull failed: {e}"),
        }
    }
    if let Some(warning) = status::staleness_warning(store, Utc::now()) {
        println!("mnemo: {warning}");
    }
    Ok(())
}

/// One pipeline run: extract everything new past the cursor, classify it
/// when worthwhile, merge the results, and advance the cursor. The cursor
/// advances whenever new content was seen, even when nothing was recorded,
/// so the same region is never sent to the classifier twice.
fn capture(store: &MemoryStore, payload: &HookPayload) -> Result<()> {
    let Some(transcript_path) = &payload.transcript_path else {
        return Ok(());
    };
    let offset = CursorStore::new(store).offset(&payload.session_id);
    let exchange = extract_from_file(transcript_path, offset)?;
    if exchange.new_offset <= offset {
        return Ok(());
    }

    let (context, completed) = if !exchange.is_empty() && worth_classifying(&exchange) {
        classify_exchange(&exchange.text)
    } else {
        (Classification::Empty, Classification::Empty)
    };
    record(store, &payload.session_id, &exchange, &context, &completed, Utc::now())
}

/// Run both classifier prompts over the exchange text. A missing
/// classifier or a runtime failure yields empty classifications.
fn classify_exchange(text: &str) -> (Classification, Classification) {
    let Some(classifier) = Classifier::from_env() else {
        return (Classification::Empty, Classification::Empty);
    };
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::debug!("Classifier runtime failed to start: {e}");
            return (Classification::Empty, Classification::Empty);
        }
    };
    runtime.block_on(async {
        let context = classifier.classify(PromptVariant::SessionContext, text).await;
        let completed = classifier
            .classify(PromptVariant::DevelopmentCompleted, text)
            .await;
        (context, completed)
    })
}

/// Merge the classified entries into their documents and advance the
/// cursor past the consumed region. A failed merge is logged but never
/// blocks the cursor advance.
fn record(
    store: &MemoryStore,
    session_id: &str,
    exchange: &NormalizedExchange,
    context: &Classification,
    completed: &Classification,
    now: DateTime<Utc>,
) -> Result<()> {
    if let Err(e) = merge::merge_handoff(store, context.entries(), now) {
        tracing::debug!("Handoff merge failed: {e}");
    }
    if let Err(e) = merge::merge_daily_log(store, completed.entries(), now) {
        tracing::debug!("Daily log merge failed: {e}");
    }
    // The region is consumed even when nothing was recorded.
    CursorStore::new(store).set_offset(session_id, exchange.new_offset)?;
    Ok(())
}

fn push_best_effort(settings: &Settings, store: &MemoryStore) {
    if let Some(engine) = sync_engine(settings, store) {
        if let Err(e) = engine.push() {
            tracing::debug!("Checkpoint push failed: {e}");
        }
    }
}
