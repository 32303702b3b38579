use crate::config::DispatchConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{DispatchError, Result};
use crate::process::{stdio_endpoint, ChildWorld, WorkerCommand};
use crate::stats::RunReport;
use crate::transport::local_world;
use crate::worker::{run_worker, WorkerStats};
use tokio::task::JoinSet;
use wordfreq_chunker::{ChunkProducer, FileSet, SkippedFile};
use wordfreq_lexicon::LexicalCounter;

fn producer(files: FileSet, config: &DispatchConfig) -> Result<ChunkProducer> {
    config.validate().map_err(DispatchError::invalid_config)?;
    Ok(ChunkProducer::new(files, config.chunker)?)
}

/// Run with every worker as a task of this process.
///
/// Workers still only see the frames sent to them; nothing else is shared.
pub async fn run_local(
    files: FileSet,
    skipped: Vec<SkippedFile>,
    config: &DispatchConfig,
) -> Result<RunReport> {
    let producer = producer(files, config)?;
    let (endpoint, worker_endpoints) = local_world(config.processes, config.channel_capacity);

    let mut workers = JoinSet::new();
    for worker in worker_endpoints {
        workers.spawn(run_worker(worker, LexicalCounter::new()));
    }

    let dispatcher = Dispatcher::new(endpoint, producer, config.reply_timeout)?;
    match dispatcher.run().await {
        Ok((files, stats)) => {
            while let Some(joined) = workers.join_next().await {
                joined.map_err(|err| DispatchError::WorkerTask(err.to_string()))??;
            }
            Ok(RunReport {
                files,
                skipped,
                stats,
            })
        }
        Err(err) => Err(root_cause(err, &mut workers).await),
    }
}

/// A worker failing usually shows up at the dispatcher as a hang-up; report
/// the worker's own error when there is one.
async fn root_cause(err: DispatchError, workers: &mut JoinSet<Result<WorkerStats>>) -> DispatchError {
    workers.abort_all();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Err(DispatchError::Transport(_))) | Ok(Ok(_)) => {}
            Ok(Err(worker_err)) => {
                log::warn!("Dispatcher failed: {err}");
                return worker_err;
            }
            Err(join_err) if join_err.is_cancelled() => {}
            Err(join_err) => return DispatchError::WorkerTask(join_err.to_string()),
        }
    }
    err
}

/// Run with every worker as a child process started from `command`
pub async fn run_spawned(
    files: FileSet,
    skipped: Vec<SkippedFile>,
    config: &DispatchConfig,
    command: &WorkerCommand,
) -> Result<RunReport> {
    let producer = producer(files, config)?;
    let (endpoint, world) = ChildWorld::spawn(command, config.processes, config.channel_capacity)?;
    log::info!("Started {} worker processes", world.len());

    // Dropping the dispatcher (and its endpoint) closes the children's stdin.
    let dispatcher = Dispatcher::new(endpoint, producer, config.reply_timeout)?;
    let (files, stats) = dispatcher.run().await?;
    world.wait().await?;

    Ok(RunReport {
        files,
        skipped,
        stats,
    })
}

/// Worker role of a child process started by [`run_spawned`]
pub async fn serve_stdio_worker() -> Result<WorkerStats> {
    let endpoint = stdio_endpoint()?;
    log::debug!(
        "Worker {} of {} serving on stdio",
        endpoint.rank(),
        endpoint.world_size()
    );
    run_worker(endpoint, LexicalCounter::new()).await
}
