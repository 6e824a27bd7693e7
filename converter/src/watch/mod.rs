//! Directory watching and job dispatch.
//!
//! Every file that shows up in the input directory, either present at
//! startup or created later, gets its own [`ConversionJob`] on a blocking
//! worker thread. Jobs are fire-and-forget: the watcher never waits for
//! them and learns nothing from them. Their results live on the filesystem
//! and in the log.
//!
//! The watch loop ends on SIGINT, SIGHUP, SIGTERM or SIGQUIT (Ctrl-C
//! elsewhere). In-flight jobs are not drained.

use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::Directories;
use crate::error::{WatchError, WatchResult};
use crate::transform::pipeline::{ConversionJob, JobOutcome};

/// Build and run one job for `path`, logging setup failures.
pub fn run_job(path: &Path, dirs: &Directories) -> JobOutcome {
    match ConversionJob::new(path, dirs) {
        Ok(job) => job.process(),
        Err(err) => {
            error!(error = %err, "cannot start conversion");
            JobOutcome::Failed(err)
        }
    }
}

/// Spawns one blocking task per submitted file.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    dirs: Arc<Directories>,
}

impl Dispatcher {
    pub fn new(dirs: Directories) -> Self {
        Self {
            dirs: Arc::new(dirs),
        }
    }

    pub fn dirs(&self) -> &Directories {
        &self.dirs
    }

    /// Start converting `path` in the background.
    ///
    /// The handle may be dropped; the job keeps running.
    pub fn submit(&self, path: PathBuf) -> JoinHandle<JobOutcome> {
        let dirs = Arc::clone(&self.dirs);
        tokio::task::spawn_blocking(move || run_job(&path, &dirs))
    }
}

/// Names starting with a dot are ignored.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// List the non-hidden entries of the input directory, sorted by name.
pub fn scan_existing(dir: &Path) -> WatchResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| WatchError::Scan {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| !is_hidden(path))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Paths a watcher event announces as new files in the directory.
///
/// Covers plain creation and files moved in from elsewhere.
pub fn arrived_paths(event: &Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(CreateKind::File | CreateKind::Any)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event
            .paths
            .iter()
            .filter(|p| !is_hidden(p))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Process existing files, then watch for new ones until a termination
/// signal arrives.
pub async fn run(dirs: Directories) -> WatchResult<()> {
    let dispatcher = Dispatcher::new(dirs);
    watch_until(&dispatcher, shutdown_signal()).await
}

/// Watch loop with an injectable shutdown future.
///
/// The watch subscription is set up before the startup scan so that no
/// file falls between the two; a file seen by both is skipped the second
/// time because its output already exists.
pub async fn watch_until<F>(dispatcher: &Dispatcher, shutdown: F) -> WatchResult<()>
where
    F: Future<Output = WatchResult<&'static str>>,
{
    let input = dispatcher.dirs().input.clone();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = tx.send(res);
    })?;
    watcher.watch(&input, RecursiveMode::NonRecursive)?;
    info!("using input directory: {}", input.display());

    for path in scan_existing(&input)? {
        info!("processing existing file: {}", path.display());
        dispatcher.submit(path);
    }

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            signal = &mut shutdown => {
                info!("exiting: {}", signal?);
                return Ok(());
            }
            event = rx.recv() => match event {
                Some(Ok(event)) => {
                    for path in arrived_paths(&event) {
                        info!("processing new file: {}", path.display());
                        dispatcher.submit(path);
                    }
                }
                Some(Err(err)) => return Err(WatchError::Notify(err)),
                None => return Err(WatchError::Closed),
            }
        }
    }
}

/// Resolve with the name of the first termination signal received.
#[cfg(unix)]
pub async fn shutdown_signal() -> WatchResult<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt()).map_err(WatchError::Signal)?;
    let mut hangup = signal(SignalKind::hangup()).map_err(WatchError::Signal)?;
    let mut terminate = signal(SignalKind::terminate()).map_err(WatchError::Signal)?;
    let mut quit = signal(SignalKind::quit()).map_err(WatchError::Signal)?;

    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = hangup.recv() => "SIGHUP",
        _ = terminate.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Resolve on Ctrl-C.
#[cfg(not(unix))]
pub async fn shutdown_signal() -> WatchResult<&'static str> {
    tokio::signal::ctrl_c().await.map_err(WatchError::Signal)?;
    Ok("ctrl-c")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::oneshot;

    const VALID_FILE: &str =
        "INTERNAL_ID,FIRST_NAME,MIDDLE_NAME,LAST_NAME,PHONE_NUM\n12345678,Bobby,,Tables,555-555-5555\n";

    fn make_dirs(tmp: &TempDir) -> Directories {
        let dirs = Directories {
            input: tmp.path().join("in"),
            output: tmp.path().join("out"),
            errors: tmp.path().join("err"),
            completed: tmp.path().join("compl"),
        };
        for dir in [&dirs.input, &dirs.output, &dirs.errors, &dirs.completed] {
            fs::create_dir_all(dir).unwrap();
        }
        dirs
    }

    async fn wait_for(path: &Path) -> bool {
        for _ in 0..100 {
            if path.exists() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        false
    }

    #[test]
    fn test_scan_skips_hidden_entries() {
        let tmp = TempDir::new().unwrap();
        let dirs = make_dirs(&tmp);
        fs::write(dirs.input.join("b.csv"), "").unwrap();
        fs::write(dirs.input.join("a.csv"), "").unwrap();
        fs::write(dirs.input.join(".partial.csv"), "").unwrap();

        let found = scan_existing(&dirs.input).unwrap();
        assert_eq!(found, vec![dirs.input.join("a.csv"), dirs.input.join("b.csv")]);
    }

    #[test]
    fn test_scan_missing_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            scan_existing(&tmp.path().join("nope")),
            Err(WatchError::Scan { .. })
        ));
    }

    #[test]
    fn test_arrived_paths_filters_event_kinds() {
        let path = PathBuf::from("/in/people.csv");

        let created = Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone());
        assert_eq!(arrived_paths(&created), vec![path.clone()]);

        let moved_in =
            Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To))).add_path(path.clone());
        assert_eq!(arrived_paths(&moved_in), vec![path.clone()]);

        let folder = Event::new(EventKind::Create(CreateKind::Folder)).add_path(path.clone());
        assert!(arrived_paths(&folder).is_empty());

        let removed = Event::new(EventKind::Remove(notify::event::RemoveKind::File)).add_path(path);
        assert!(arrived_paths(&removed).is_empty());

        let hidden = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/in/.people.csv.swp"));
        assert!(arrived_paths(&hidden).is_empty());
    }

    #[test]
    fn test_run_job_rejects_directories() {
        let tmp = TempDir::new().unwrap();
        let dirs = make_dirs(&tmp);
        assert!(run_job(&dirs.output, &dirs).is_failure());
    }

    #[tokio::test]
    async fn test_dispatcher_runs_job_in_background() {
        let tmp = TempDir::new().unwrap();
        let dirs = make_dirs(&tmp);
        let input = dirs.input.join("people.csv");
        fs::write(&input, VALID_FILE).unwrap();

        let dispatcher = Dispatcher::new(dirs.clone());
        let outcome = dispatcher.submit(input).await.unwrap();
        assert!(matches!(outcome, JobOutcome::Converted(_)));
        assert!(dirs.output.join("people.csv.json").exists());
        assert!(dirs.completed.join("people.csv").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_watch_converts_existing_and_new_files() {
        init_test_logging();
        let tmp = TempDir::new().unwrap();
        let dirs = make_dirs(&tmp);
        fs::write(dirs.input.join("existing.csv"), VALID_FILE).unwrap();

        let dispatcher = Dispatcher::new(dirs.clone());
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let watch = tokio::spawn(async move {
            watch_until(&dispatcher, async move {
                let _ = stop_rx.await;
                Ok("test")
            })
            .await
        });

        assert!(wait_for(&dirs.output.join("existing.csv.json")).await);

        // Write elsewhere and move in so the watcher never sees a partial file.
        let staged = tmp.path().join("arriving.csv");
        fs::write(&staged, VALID_FILE).unwrap();
        fs::rename(&staged, dirs.input.join("arriving.csv")).unwrap();
        assert!(wait_for(&dirs.completed.join("arriving.csv")).await);
        assert!(dirs.output.join("arriving.csv.json").exists());

        stop_tx.send(()).unwrap();
        watch.await.unwrap().unwrap();
    }
}
