use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use folio_cli::dialogs::PresetDialogs;
use folio_cli::engine::HelperEngine;
use folio_cli::plan::{InsertSpec, MoveSpec, inserted, moved};
use folio_cli::render::{MergeProgress, entry_table};
use folio_cli::settings::{Settings, SettingsError, render_settings, save_settings};
use folio_core::{EnrichmentOutcome, FileDialogs, MergeOutcome, Session};
use folio_model::EntryId;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::cli::{ConfigArgs, InfoArgs, MergeArgs};

type HelperSession = Session<HelperEngine>;

pub fn run_info(args: &InfoArgs, settings: &Settings) -> Result<()> {
    let span = info_span!("info", files = args.files.len());
    runtime()?.block_on(
        async {
            let mut session = open_session(settings, None);
            session.set_sort(args.sort.into());
            admit_files(&mut session, &args.files).await?;
            println!("{}", entry_table(&session.view()));
            Ok::<(), anyhow::Error>(())
        }
        .instrument(span),
    )
}

/// Arrange and merge. `None` means a dry run.
pub fn run_merge(args: &MergeArgs, settings: &Settings) -> Result<Option<MergeOutcome>> {
    let span = info_span!("merge", files = args.files.len());
    runtime()?.block_on(merge(args, settings).instrument(span))
}

async fn merge(args: &MergeArgs, settings: &Settings) -> Result<Option<MergeOutcome>> {
    let mut session = open_session(settings, args.helper.as_deref());
    session.set_sort(args.sort.into());
    admit_files(&mut session, &args.files).await?;

    for spec in &args.moves {
        apply_move(&mut session, *spec)?;
    }
    for spec in &args.inserts {
        apply_insert(&mut session, spec)?;
    }
    if !args.inserts.is_empty() {
        report_lookups(&session.settle().await);
    }

    println!("{}", entry_table(&session.view()));
    if args.dry_run {
        println!("Dry run: nothing merged.");
        return Ok(None);
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.merge.default_output_name));
    let dialogs = PresetDialogs::with_output(output);
    let progress = MergeProgress::new();
    let outcome = session
        .merge(&dialogs, interrupted(), |event| progress.handle(event))
        .await
        .context("merge documents")?;

    if let MergeOutcome::Succeeded { output } = &outcome
        && (args.reveal || settings.merge.reveal_on_success)
    {
        dialogs.reveal_in_file_system(output);
    }
    Ok(Some(outcome))
}

pub fn run_config(args: &ConfigArgs, path: Option<&Path>, settings: &Settings) -> Result<()> {
    if args.write_default {
        let Some(path) = path else {
            return Err(SettingsError::NoConfigDir).context("pass --config to choose a file");
        };
        save_settings(&Settings::default(), path).context("write default settings")?;
        println!("Wrote default settings to {}", path.display());
        return Ok(());
    }
    match path {
        Some(path) => println!("# {}", path.display()),
        None => println!("# (no settings path)"),
    }
    print!("{}", render_settings(settings).context("render settings")?);
    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")
}

fn open_session(settings: &Settings, helper: Option<&str>) -> HelperSession {
    let mut engine = settings.engine.clone();
    if let Some(program) = helper {
        engine.program = program.to_string();
    }
    debug!(program = %engine.program, args = ?engine.args, "using helper");
    Session::new(Arc::new(HelperEngine::new(&engine))).with_schedule(settings.progress.schedule())
}

async fn admit_files(session: &mut HelperSession, files: &[PathBuf]) -> Result<()> {
    let dialogs = PresetDialogs::new(files.to_vec(), None);
    let ids = session
        .add_from_picker(&dialogs, None)
        .await
        .context("admit documents")?;
    let skipped = files.len() - ids.len();
    if skipped > 0 {
        warn!(skipped, "skipped files that are not PDF documents");
    }
    if ids.is_empty() {
        bail!("no PDF documents given");
    }
    report_lookups(&session.settle().await);
    Ok(())
}

fn report_lookups(outcomes: &[EnrichmentOutcome]) {
    let failed = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, EnrichmentOutcome::Failed(_)))
        .count();
    if failed > 0 {
        warn!(failed, "metadata unavailable for some documents");
    }
}

fn apply_move(session: &mut HelperSession, spec: MoveSpec) -> Result<()> {
    let len = session.store().len();
    if spec.from > len {
        bail!("--move {spec}: there is no document at position {}", spec.from);
    }
    let source = session
        .begin_reorder(spec.from - 1)
        .with_context(|| format!("--move {spec}"))?;
    let target = spec.to.target(len);
    session.hover(target);
    let outcome = session
        .drop_at(target)
        .with_context(|| format!("--move {spec}"))?;
    match moved(outcome).with_context(|| format!("--move {spec}"))? {
        Some(plan) => {
            info!(entry = %source.short(), from = plan.from, to = plan.to, "applied move");
        }
        None => debug!(entry = %source.short(), "move left the order unchanged"),
    }
    Ok(())
}

fn apply_insert(session: &mut HelperSession, spec: &InsertSpec) -> Result<()> {
    let context = || format!("--insert {}:{}", spec.at, spec.source.display());
    session
        .begin_external(vec![spec.source.clone()])
        .with_context(context)?;
    let target = spec.at.target(session.store().len());
    session.hover(target);
    let ids = inserted(session.drop_at(target).with_context(context)?).with_context(context)?;
    if ids.is_empty() {
        warn!(source = %spec.source.display(), "not a PDF document, skipped");
    } else {
        let entries: Vec<String> = ids.iter().map(EntryId::short).collect();
        info!(?entries, "inserted documents");
    }
    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the signal cannot be watched.
async fn interrupted() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
