use anyhow::{Context, Result};
use log::info;

use crate::{data::Record, normalize::normalize_record, sink::RecordSink};

/// Tracks how many records have been handled and when to report it.
///
/// A percentage is reported only when its integer value grows, so a run
/// logs at most 100 progress lines.
#[derive(Debug, Clone)]
pub struct Progress {
    total: usize,
    processed: usize,
    reported: u8,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            reported: 0,
        }
    }

    /// Counts one record, returning the new percentage if it should be reported.
    pub fn advance(&mut self) -> Option<u8> {
        self.processed += 1;
        if self.total == 0 {
            return None;
        }
        let percentage = ((self.processed.min(self.total) * 100) / self.total) as u8;
        if percentage > self.reported {
            self.reported = percentage;
            Some(percentage)
        } else {
            None
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }
}

/// Normalizes each record and hands it to `sink`, one at a time.
///
/// The first normalization or sink failure aborts the run. Returns the number
/// of records stored.
pub fn process_records<S>(records: Vec<Record>, sink: &mut S) -> Result<usize>
where
    S: RecordSink + ?Sized,
{
    let mut progress = Progress::new(records.len());
    for (idx, mut record) in records.into_iter().enumerate() {
        normalize_record(&mut record)
            .with_context(|| format!("Normalizing record {}", idx + 1))?;
        sink.store(&record)
            .with_context(|| format!("Storing record {}", idx + 1))?;
        if let Some(percentage) = progress.advance() {
            info!("Processed = {percentage}%");
        }
    }
    sink.finish().context("Finishing output")?;
    Ok(progress.processed())
}
