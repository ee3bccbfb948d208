//! Continuous reconciliation until Ctrl-C.

use std::time::Duration;

use clap::Args;
use tasksync_core::{Session, TaskFilter};

use super::print_tasks;

#[derive(Args)]
pub struct WatchArgs {
    /// Poll interval in milliseconds (defaults to sync.poll_interval_ms)
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

pub async fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    if !session.store.remote().is_configured() {
        return Err("no remote configured; set remote.url first".into());
    }

    let mut reconciler = session.reconciler();
    if let Some(ms) = args.interval_ms {
        reconciler = reconciler.with_interval(Duration::from_millis(ms));
    }

    let mut revisions = session.store.subscribe();
    print_tasks(&session.store.snapshot(), TaskFilter::All);
    let handle = reconciler.start();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                println!();
                print_tasks(&session.store.snapshot(), TaskFilter::All);
            }
        }
    }

    handle.stop().await;
    Ok(())
}
