use colored::*;
use hwrev_common::device::DeviceRecord;
use hwrev_common::success;
use hwrev_core::discovery::DiscoveryObserver;
use hwrev_core::status::BatchOutcome;
use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

const BAR_TEMPLATE: &str = "{spinner:.blue} {msg} [{bar:30.green/bright_black}] {pos}/{len} {elapsed:.dim}";

/// Drives the progress bar attached to the discovery span.
pub struct TerminalProgress {
    span: Span,
}

impl TerminalProgress {
    pub fn new(span: Span) -> Self {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸ ");
        span.pb_set_style(&style);
        span.pb_set_message("Loading directory");
        Self { span }
    }

    fn stage(&self, message: &str, length: usize) {
        self.span.pb_set_message(message);
        self.span.pb_set_length(length as u64);
        self.span.pb_set_position(0);
    }
}

impl DiscoveryObserver for TerminalProgress {
    fn catalog_loaded(&self, devices: usize) {
        success!(
            "{} restricted devices found in the directory",
            devices.to_string().green().bold()
        );
    }

    fn batch_started(&self, index: usize, total: usize, _size: usize) {
        if index == 0 {
            self.stage("Resolving status", total);
        }
    }

    fn batch_finished(&self, _outcome: &BatchOutcome) {
        self.span.pb_inc(1);
    }

    fn enrichment_started(&self, candidates: usize) {
        self.stage("Querying devices", candidates);
    }

    fn device_enriched(&self, done: usize, _total: usize, _record: &DeviceRecord) {
        self.span.pb_set_position(done as u64);
    }
}
