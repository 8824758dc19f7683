//! File-backed history logs.
//!
//! Records are handed to a dedicated writer thread over a bounded channel so
//! that the table actor never waits on disk. Each record is appended as one
//! JSON line; the files are never rewritten.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use goldpot_execution::HistorySink;
use goldpot_types::{ConfigChangeRecord, HistoryRecord, RoundRecord};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, warn};

pub const ROUNDS_FILE: &str = "pot.jsonl";
pub const ADMIN_FILE: &str = "admin.jsonl";

enum PersistRequest {
    Record(HistoryRecord),
    Flush(oneshot::Sender<()>),
}

#[derive(Clone, Debug)]
pub struct HistoryPaths {
    pub rounds: PathBuf,
    pub admin: PathBuf,
}

impl HistoryPaths {
    pub fn new(dir: &Path) -> Self {
        Self {
            rounds: dir.join(ROUNDS_FILE),
            admin: dir.join(ADMIN_FILE),
        }
    }

    fn for_record(&self, record: &HistoryRecord) -> &Path {
        match record {
            HistoryRecord::Round(_) => &self.rounds,
            HistoryRecord::AdminConfigChange(_) => &self.admin,
        }
    }
}

pub struct HistoryLogger {
    sender: mpsc::Sender<PersistRequest>,
}

impl HistoryLogger {
    /// Create `dir` and both log files if missing, then start the writer thread.
    pub fn start(dir: &Path, buffer_size: usize) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("create history directory {}", dir.display()))?;
        let paths = HistoryPaths::new(dir);
        for path in [&paths.rounds, &paths.admin] {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("create history log {}", path.display()))?;
        }

        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        std::thread::Builder::new()
            .name("history-writer".to_string())
            .spawn(move || persistence_worker(paths, receiver))
            .context("spawn history writer")?;

        Ok(Self { sender })
    }

    fn submit(&self, record: HistoryRecord) {
        match self.sender.try_send(PersistRequest::Record(record)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("history channel full; dropping record");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("history writer stopped; dropping record");
            }
        }
    }

    /// Wait until every record submitted so far has been written.
    pub async fn flush(&self) {
        let (response, done) = oneshot::channel();
        if self.sender.send(PersistRequest::Flush(response)).await.is_err() {
            warn!("history writer stopped; flush skipped");
            return;
        }
        let _ = done.await;
    }
}

impl HistorySink for HistoryLogger {
    fn record_round(&self, record: RoundRecord) {
        self.submit(HistoryRecord::Round(record));
    }

    fn record_config_change(&self, record: ConfigChangeRecord) {
        self.submit(HistoryRecord::AdminConfigChange(record));
    }
}

fn append_line(path: &Path, record: &HistoryRecord) -> anyhow::Result<()> {
    let line = record.to_line().context("encode history record")?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("open history log")?;
    file.write_all(line.as_bytes())
        .context("append history record")?;
    Ok(())
}

fn persistence_worker(paths: HistoryPaths, mut receiver: mpsc::Receiver<PersistRequest>) {
    while let Some(request) = receiver.blocking_recv() {
        match request {
            PersistRequest::Record(record) => {
                let path = paths.for_record(&record);
                if let Err(err) = append_line(path, &record) {
                    error!(path = %path.display(), "history write failed: {err:#}");
                }
            }
            PersistRequest::Flush(response) => {
                let _ = response.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldpot_types::{Config, PlayerView, Winner};

    fn round_record(total_gold: u64) -> RoundRecord {
        RoundRecord {
            finished_at: 100,
            config: Config::default(),
            start_time: Some(40),
            end_time: Some(100),
            actual_wait_sec: Some(60),
            total_gold,
            players: vec![PlayerView {
                name: "alice".to_string(),
                stake: total_gold,
            }],
            winner: Some(Winner {
                name: "alice".to_string(),
                pot: total_gold,
                stake: total_gold,
            }),
        }
    }

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_start_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let _logger = HistoryLogger::start(&data, 8).unwrap();

        let paths = HistoryPaths::new(&data);
        assert_eq!(fs::read_to_string(&paths.rounds).unwrap(), "");
        assert_eq!(fs::read_to_string(&paths.admin).unwrap(), "");
    }

    #[tokio::test]
    async fn test_records_go_to_their_own_log() {
        let dir = tempfile::tempdir().unwrap();
        let logger = HistoryLogger::start(dir.path(), 8).unwrap();

        logger.record_round(round_record(40));
        logger.record_config_change(ConfigChangeRecord {
            at: 7,
            admin: "admin".to_string(),
            old_config: Config::default(),
            new_config: Config {
                duration_seconds: 30,
                minimum_stake: 2,
            },
        });
        logger.record_round(round_record(12));
        logger.flush().await;

        let paths = HistoryPaths::new(dir.path());
        let rounds = read_lines(&paths.rounds);
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0]["type"], "round");
        assert_eq!(rounds[0]["totalGold"], 40);
        assert_eq!(rounds[1]["totalGold"], 12);

        let admin = read_lines(&paths.admin);
        assert_eq!(admin.len(), 1);
        assert_eq!(admin[0]["type"], "adminConfigChange");
        assert_eq!(admin[0]["newConfig"]["durationSeconds"], 30);
    }

    #[tokio::test]
    async fn test_existing_history_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        {
            let logger = HistoryLogger::start(dir.path(), 8).unwrap();
            logger.record_round(round_record(5));
            logger.flush().await;
        }
        let logger = HistoryLogger::start(dir.path(), 8).unwrap();
        logger.record_round(round_record(6));
        logger.flush().await;

        let rounds = read_lines(&HistoryPaths::new(dir.path()).rounds);
        let totals: Vec<u64> = rounds
            .iter()
            .map(|r| r["totalGold"].as_u64().unwrap())
            .collect();
        assert_eq!(totals, vec![5, 6]);
    }

    #[tokio::test]
    async fn test_write_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let logger = HistoryLogger::start(dir.path(), 8).unwrap();
        let paths = HistoryPaths::new(dir.path());

        // Replace the rounds log with a directory so appends fail.
        fs::remove_file(&paths.rounds).unwrap();
        fs::create_dir(&paths.rounds).unwrap();
        logger.record_round(round_record(1));
        logger.record_config_change(ConfigChangeRecord {
            at: 1,
            admin: "admin".to_string(),
            old_config: Config::default(),
            new_config: Config::default(),
        });
        logger.flush().await;

        assert_eq!(read_lines(&paths.admin).len(), 1);
    }

    #[test]
    fn test_start_fails_on_unusable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        fs::write(&file, b"").unwrap();
        assert!(HistoryLogger::start(&file, 8).is_err());
    }
}
