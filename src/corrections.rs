use serde::{Deserialize, Serialize};

use crate::formats::RawRecord;

/// One hand-written fix for a mistake in the source chapter titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    /// Give every record matching `record` a different player.
    Relabel { record: RawRecord, player: String },
    /// Drop every record matching `record`.
    Filter { record: RawRecord },
    /// Make sure `record` is in the batch exactly once.
    Append { record: RawRecord },
}

/// The post-parse step of a season: relabels, then filters, then appends.
#[derive(Debug, Clone, Default)]
pub struct CorrectionHook {
    corrections: Vec<Correction>,
}

impl CorrectionHook {
    pub fn new(corrections: Vec<Correction>) -> Self {
        Self { corrections }
    }

    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }

    pub fn apply(&self, batch: Vec<RawRecord>) -> Vec<RawRecord> {
        let mut batch = batch
            .into_iter()
            .map(|mut record| {
                for correction in &self.corrections {
                    if let Correction::Relabel {
                        record: fingerprint,
                        player,
                    } = correction
                        && record.same_fingerprint(fingerprint)
                    {
                        tracing::debug!(
                            season = record.season,
                            title = %record.title,
                            from = %record.player,
                            to = %player,
                            "relabel record"
                        );
                        record.player = player.clone();
                        break;
                    }
                }
                record
            })
            .collect::<Vec<_>>();

        batch.retain(|record| {
            let dropped = self.corrections.iter().any(|correction| {
                matches!(correction, Correction::Filter { record: fingerprint }
                    if record.same_fingerprint(fingerprint))
            });
            if dropped {
                tracing::debug!(season = record.season, title = %record.title, "filter record");
            }
            !dropped
        });

        for correction in &self.corrections {
            let Correction::Append { record } = correction else {
                continue;
            };
            batch.retain(|existing| !existing.same_fingerprint(record));
            batch.push(record.clone());
        }

        batch
    }
}
