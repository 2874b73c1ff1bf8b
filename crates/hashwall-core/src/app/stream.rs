//! StreamDriver - push されたアイテムを取り込む
//!
//! pull と同じ IngestionPolicy を通す（重複排除・退避ロジックは共通）。
//! ストリーム終了・エラー・shutdown のいずれかで止まる。再接続はしない。

use tokio::sync::watch;
use tracing::{info, warn};

use super::policy::IngestionPolicy;
use crate::domain::{IngestError, IngestSummary};
use crate::ports::{ItemSource, RecordStore};

pub struct StreamDriver<'a, S> {
    policy: &'a IngestionPolicy<S>,
}

impl<'a, S: RecordStore> StreamDriver<'a, S> {
    pub fn new(policy: &'a IngestionPolicy<S>) -> Self {
        Self { policy }
    }

    /// Subscribe to `track` and ingest until the stream closes or
    /// `shutdown` becomes `true`.
    ///
    /// If the shutdown sender is dropped the driver keeps running until the
    /// stream itself ends.
    pub async fn run(
        &self,
        source: &dyn ItemSource,
        track: &str,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<IngestSummary, IngestError> {
        let mut stream = source.subscribe(track).await?;
        info!(%track, "listening for pushed items");

        let mut summary = IngestSummary::default();
        let mut watching = true;
        loop {
            if *shutdown.borrow() {
                info!("shutdown requested");
                break;
            }

            // 受信待ちは shutdown と競合させる
            let item = tokio::select! {
                changed = shutdown.changed(), if watching => {
                    if changed.is_err() {
                        watching = false;
                    }
                    continue;
                }
                item = stream.next_item() => item?,
            };

            let Some(item) = item else {
                warn!("stream closed by remote");
                break;
            };
            let outcome = self.policy.ingest_item(&item).await?;
            summary.record(&outcome);
        }

        info!(%summary, "stream finished");
        Ok(summary)
    }
}
