use std::sync::Arc;

use {
    chatlog_blob::BlobStore,
    chatlog_config::{ChatlogConfig, StorageBackend},
    chatlog_gateway::storage::open_store,
    chatlog_sessions::{
        BufferRequest, BufferWriter, Cleanup, FlushMerger, FlushOutcome, StorageLayout,
    },
    clap::Args,
    serde_json::{Value, json},
    tracing::warn,
};

#[derive(Args)]
pub struct BufferArgs {
    /// Session to append to (defaults to "anon").
    #[arg(long)]
    pub session: Option<String>,
    #[arg(long)]
    pub role: String,
    #[arg(long)]
    pub content: String,
    /// Event timestamp; defaults to now.
    #[arg(long)]
    pub ts: Option<String>,
}

#[derive(Args)]
pub struct FlushArgs {
    /// Session to flush (defaults to "anon").
    #[arg(long, conflicts_with = "all")]
    pub session: Option<String>,
    /// Flush every session that has buffered messages.
    #[arg(long)]
    pub all: bool,
}

fn open(config: &ChatlogConfig) -> anyhow::Result<(Arc<dyn BlobStore>, StorageLayout)> {
    if config.storage.backend == StorageBackend::Memory {
        warn!("memory backend does not persist between CLI runs");
    }
    Ok((
        open_store(&config.storage)?,
        StorageLayout::new(&config.storage.root),
    ))
}

pub async fn handle_buffer(config: &ChatlogConfig, args: BufferArgs) -> anyhow::Result<()> {
    let out = buffer(config, args).await?;
    print_json(&out)
}

pub async fn handle_flush(config: &ChatlogConfig, args: FlushArgs) -> anyhow::Result<()> {
    let out = flush(config, args).await?;
    print_json(&out)
}

async fn buffer(config: &ChatlogConfig, args: BufferArgs) -> anyhow::Result<Value> {
    let (store, layout) = open(config)?;
    let mut req = BufferRequest::new(args.role, args.content);
    req.session_id = args.session;
    req.ts = args.ts;

    let meta = BufferWriter::new(store, layout).append(req).await?;
    Ok(json!({ "ok": true, "path": meta.path }))
}

async fn flush(config: &ChatlogConfig, args: FlushArgs) -> anyhow::Result<Value> {
    let (store, layout) = open(config)?;
    let merger = FlushMerger::new(store, layout);

    if args.all {
        let report = merger.sweep().await?;
        let exported: Vec<Value> = report
            .exported
            .iter()
            .map(|(session, r)| json!({ "session": session.as_str(), "path": r.export.path }))
            .collect();
        let failed: Vec<Value> = report
            .failed
            .iter()
            .map(|(session, error)| json!({ "session": session.as_str(), "error": error }))
            .collect();
        return Ok(json!({
            "ok": failed.is_empty(),
            "exported": exported,
            "failed": failed,
        }));
    }

    Ok(match merger.flush(args.session.as_deref()).await? {
        FlushOutcome::NothingToFlush => json!({ "ok": true, "message": "no buffer to flush" }),
        FlushOutcome::Exported(report) => {
            let mut out = json!({
                "ok": true,
                "path": report.export.path,
                "merged": report.merged,
                "skipped": report.skipped,
            });
            if let Cleanup::Failed { error, orphaned } = &report.cleanup {
                warn!(error = %error, orphaned = orphaned.len(), "buffer cleanup failed");
                out["cleanupError"] = json!(error);
                out["orphaned"] = json!(orphaned);
            }
            out
        },
    })
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
