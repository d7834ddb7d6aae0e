//! Session recording.
//!
//! A cooperative task captures periodic screenshots of the page surface
//! into a per-session directory, then writes a manifest describing the run
//! when it stops.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use page_driver::ScreenshotSource;
use page_model::SessionId;

/// Destination for captured frames and the closing manifest.
#[async_trait]
pub trait RecordingSink: Send + Sync {
    async fn write_frame(&self, index: u32, image: &[u8]) -> io::Result<()>;
    async fn write_manifest(&self, manifest: &RecordingManifest) -> io::Result<()>;
}

/// Written once when the recorder stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingManifest {
    pub session_id: SessionId,
    pub goal: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub frame_count: u32,
}

/// Filesystem sink: `<root>/<session-id>/frame-NNNN.png` plus
/// `metadata.json`.
pub struct FsRecordingSink {
    dir: PathBuf,
}

impl FsRecordingSink {
    /// Create the session directory eagerly so permission problems show
    /// up before the first frame.
    pub async fn create(root: &Path, session: &SessionId) -> io::Result<Self> {
        let dir = root.join(session.to_string());
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl RecordingSink for FsRecordingSink {
    async fn write_frame(&self, index: u32, image: &[u8]) -> io::Result<()> {
        let path = self.dir.join(format!("frame-{index:04}.png"));
        tokio::fs::write(path, image).await
    }

    async fn write_manifest(&self, manifest: &RecordingManifest) -> io::Result<()> {
        let raw = serde_json::to_vec_pretty(manifest)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        tokio::fs::write(self.dir.join("metadata.json"), raw).await
    }
}

/// Captures one frame per interval until cancelled.
pub struct SessionRecorder {
    handle: JoinHandle<u32>,
    token: CancellationToken,
}

impl SessionRecorder {
    pub fn start(
        source: Arc<dyn ScreenshotSource>,
        sink: Arc<dyn RecordingSink>,
        session_id: SessionId,
        goal: String,
        interval: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let stop = token.clone();
        let handle = tokio::spawn(async move {
            let started_at = Utc::now();
            let mut frames: u32 = 0;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => match source.capture().await {
                        Some(image) => {
                            if let Err(err) = sink.write_frame(frames, &image).await {
                                warn!(error = %err, "failed to write recording frame");
                            } else {
                                frames += 1;
                            }
                        }
                        None => debug!("screenshot source produced no frame"),
                    },
                }
            }
            let manifest = RecordingManifest {
                session_id,
                goal,
                started_at,
                finished_at: Utc::now(),
                frame_count: frames,
            };
            if let Err(err) = sink.write_manifest(&manifest).await {
                warn!(error = %err, "failed to write recording manifest");
            }
            frames
        });
        Self { handle, token }
    }

    /// Stop capturing, flush the manifest, and return the frame count.
    pub async fn stop(self) -> u32 {
        self.token.cancel();
        self.handle.await.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_driver::testing::FixedScreenshot;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySink {
        frames: Mutex<Vec<u32>>,
        manifest: Mutex<Option<RecordingManifest>>,
    }

    #[async_trait]
    impl RecordingSink for MemorySink {
        async fn write_frame(&self, index: u32, _image: &[u8]) -> io::Result<()> {
            self.frames.lock().unwrap().push(index);
            Ok(())
        }

        async fn write_manifest(&self, manifest: &RecordingManifest) -> io::Result<()> {
            *self.manifest.lock().unwrap() = Some(manifest.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_recorder_captures_until_stopped() {
        let sink = Arc::new(MemorySink::default());
        let recorder = SessionRecorder::start(
            Arc::new(FixedScreenshot(Some(vec![0x89, 0x50]))),
            sink.clone(),
            SessionId::new(),
            "find the docs".to_string(),
            Duration::from_millis(10),
        );
        tokio::time::sleep(Duration::from_millis(55)).await;
        let frames = recorder.stop().await;

        assert!(frames >= 1);
        let manifest = sink.manifest.lock().unwrap().clone().unwrap();
        assert_eq!(manifest.frame_count, frames);
        assert_eq!(manifest.goal, "find the docs");
        assert!(manifest.finished_at >= manifest.started_at);
        // Frame indices are the write order.
        assert_eq!(sink.frames.lock().unwrap()[0], 0);
    }

    #[tokio::test]
    async fn test_blank_source_still_writes_manifest() {
        let sink = Arc::new(MemorySink::default());
        let recorder = SessionRecorder::start(
            Arc::new(FixedScreenshot(None)),
            sink.clone(),
            SessionId::new(),
            "goal".to_string(),
            Duration::from_millis(5),
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(recorder.stop().await, 0);
        assert_eq!(sink.manifest.lock().unwrap().clone().unwrap().frame_count, 0);
    }

    #[tokio::test]
    async fn test_fs_sink_layout() {
        let root = tempfile::tempdir().unwrap();
        let session = SessionId::new();
        let sink = FsRecordingSink::create(root.path(), &session).await.unwrap();

        sink.write_frame(0, &[1, 2, 3]).await.unwrap();
        sink.write_manifest(&RecordingManifest {
            session_id: session.clone(),
            goal: "g".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            frame_count: 1,
        })
        .await
        .unwrap();

        let dir = root.path().join(session.to_string());
        assert!(dir.join("frame-0000.png").exists());
        let manifest = std::fs::read_to_string(dir.join("metadata.json")).unwrap();
        assert!(manifest.contains("\"frame_count\": 1"));
    }
}
