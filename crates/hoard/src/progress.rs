//! Terminal progress bars, one per transfer in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hoard_fetch::{FetchPhase, FileTask, Progress, ProgressFn};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{prefix:.bold} [{elapsed_precise}] {wide_bar} {bytes}/{total_bytes} {bytes_per_sec} {eta} {msg}";

pub struct Bars {
    multi:  MultiProgress,
    style:  ProgressStyle,
    labels: Vec<String>,
    active: Mutex<HashMap<usize, ProgressBar>>,
}

impl Bars {
    /// Bars are drawn on `multi`, labelled by destination file name.
    pub fn new(multi: MultiProgress, tasks: &[FileTask]) -> Self {
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        let labels = tasks
            .iter()
            .map(|task| {
                task.destination
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| task.destination.display().to_string())
            })
            .collect();

        Self {
            multi,
            style,
            labels,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// The sink handed to the download engine.
    pub fn sink(self: &Arc<Self>) -> ProgressFn {
        let bars = Arc::clone(self);
        Arc::new(move |progress: &Progress| bars.update(progress))
    }

    fn update(&self, progress: &Progress) {
        let Ok(mut active) = self.active.lock() else {
            return;
        };

        match progress.phase {
            FetchPhase::Checking => {}
            FetchPhase::Completed => {
                if let Some(bar) = active.remove(&progress.index) {
                    bar.finish_and_clear();
                }
            }
            phase => {
                let bar = active.entry(progress.index).or_insert_with(|| self.add(progress.index));
                if let Some(total) = progress.total_bytes {
                    bar.set_length(total);
                }
                bar.set_position(progress.bytes_downloaded);
                if progress.attempt > 1 {
                    bar.set_message(format!("{phase} (attempt {})", progress.attempt));
                } else {
                    bar.set_message(phase.to_string());
                }
            }
        }
    }

    fn add(&self, index: usize) -> ProgressBar {
        let bar = self.multi.add(ProgressBar::new(0));
        bar.set_style(self.style.clone());
        bar.set_prefix(self.labels.get(index).cloned().unwrap_or_default());
        bar
    }

    /// Remove bars left behind by tasks that failed or were cancelled.
    pub fn clear(&self) {
        if let Ok(mut active) = self.active.lock() {
            for (_, bar) in active.drain() {
                bar.finish_and_clear();
            }
        }
    }
}
