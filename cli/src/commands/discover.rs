use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use colored::*;
use tracing::{Instrument, info_span};

use crate::commands::DiscoverArgs;
use crate::hprint;
use crate::terminal::progress::TerminalProgress;
use crate::terminal::{colors, format, print};
use hwrev_common::device::{Enrichment, Inventory};
use hwrev_common::{info, success, warn};
use hwrev_core::cucm::{Cluster, Credentials, uds};
use hwrev_core::discovery::{Discovery, DiscoveryService};
use hwrev_core::enricher::device_info::HttpDeviceInfo;
use hwrev_core::export::{self, Summary};

const MAX_LISTED_PROBLEMS: usize = 20;

pub async fn discover(args: DiscoverArgs) -> anyhow::Result<()> {
    let cfg = args.to_config();
    cfg.validate()?;

    // The output path is claimed before any network traffic.
    let output = create_output(&args.output)?;

    let result = run(&args, cfg, output).await;
    if result.is_err() {
        discard_output(&args.output);
    }
    result
}

/// Removes the report left over from an aborted run. Returns whether the file is gone.
fn discard_output(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(err) if err.kind() == io::ErrorKind::NotFound => true,
        Err(err) => {
            warn!("Could not remove partial report {}: {}", path.display(), err);
            false
        }
    }
}

async fn run(
    args: &DiscoverArgs,
    cfg: hwrev_common::config::Config,
    output: File,
) -> anyhow::Result<()> {
    let cluster = Cluster::new(args.server.host.clone(), args.server.insecure)?
        .with_credentials(Credentials::new(&args.username, &args.password));

    let axl_version = match &args.axl_version {
        Some(version) => version.clone(),
        None => detect_axl_version(&cluster).await?,
    };

    print::set_key_width(["Cluster", "AXL schema", "Models", "Batch size", "Workers"]);
    print::aligned_line("Cluster", cluster.host().color(colors::ACCENT));
    print::aligned_line("AXL schema", axl_version.clone());
    print::aligned_line("Models", cfg.restricted_models.join(", "));
    print::aligned_line("Batch size", cfg.chunk_size.to_string());
    print::aligned_line("Workers", cfg.workers.to_string());

    let device_info = HttpDeviceInfo::from_config(&cfg)?;
    let service = DiscoveryService::new(
        Box::new(cluster.directory(&axl_version)),
        Box::new(cluster.status()),
        Arc::new(device_info),
        cfg,
    )?;

    let span = info_span!("discovery", indicatif.pb_show = true);
    let observer = TerminalProgress::new(span.clone());

    let start_time: Instant = Instant::now();
    let discovery: Discovery = service
        .perform_discovery(&observer)
        .instrument(span)
        .await?;

    let rows = export::write_csv(BufWriter::new(output), &discovery.inventory)
        .with_context(|| format!("writing {}", args.output.display()))?;
    success!("{} rows written to {}", rows, args.output.display());

    let summary = Summary::new(&discovery.inventory, &service.config().restricted_models);
    discovery_ends(&discovery, &summary, start_time.elapsed());
    Ok(())
}

fn create_output(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| match err.kind() {
            io::ErrorKind::AlreadyExists => {
                anyhow::anyhow!("{} already exists, refusing to overwrite it", path.display())
            }
            _ => anyhow::Error::new(err).context(format!("cannot create {}", path.display())),
        })
}

async fn detect_axl_version(cluster: &Cluster) -> anyhow::Result<String> {
    let full = cluster
        .version()
        .await
        .context("cannot detect the cluster version, pass --axl-version")?;
    info!("Cluster reports version {}", full);

    match uds::major_version(&full) {
        Some(version) => Ok(version),
        None => bail!("unrecognized cluster version {full:?}, pass --axl-version"),
    }
}

fn discovery_ends(discovery: &Discovery, summary: &Summary, total_time: Duration) {
    if summary.total == 0 {
        print::header("zero restricted phones");
        print::no_results();
        return;
    }

    print::header("Problem devices");
    print_problems(&discovery.inventory);

    print::header("Summary");
    print_summary(discovery, summary, total_time);
}

fn print_problems(inventory: &Inventory) {
    let problems: Vec<_> = inventory
        .iter()
        .filter(|record| matches!(record.enrichment, Enrichment::Failed(_) | Enrichment::Unrecognized))
        .collect();

    if problems.is_empty() {
        print::print_status("Every queried device answered".color(colors::GOOD).to_string());
        return;
    }

    for (idx, record) in problems.iter().take(MAX_LISTED_PROBLEMS).enumerate() {
        print::tree_head(idx, record.name());
        print::as_tree_one_level(format::record_to_details(record));
        hprint!();
    }

    if problems.len() > MAX_LISTED_PROBLEMS {
        warn!(
            "{} more devices with problems, see the Error column of the report",
            problems.len() - MAX_LISTED_PROBLEMS
        );
    }
}

fn print_summary(discovery: &Discovery, summary: &Summary, total_time: Duration) {
    let keys = summary
        .per_model
        .iter()
        .map(|(model, _)| model.as_str())
        .chain([
            "Total",
            "Identified",
            "Unrecognized",
            "Errors",
            "Status unknown",
            "Not reported",
        ]);
    print::set_key_width(keys);

    for (model, count) in &summary.per_model {
        print::aligned_line(model, count.to_string().color(colors::MODEL));
    }
    print::aligned_line("Total", summary.total.to_string().bold());
    print::aligned_line("Identified", summary.discovered.to_string().color(colors::GOOD));
    print::aligned_line("Unrecognized", format::count(summary.unrecognized, colors::CAUTION));
    print::aligned_line("Errors", format::count(summary.errors, colors::BAD));
    print::aligned_line("Status unknown", format::count(summary.status_unknown, colors::BAD));
    print::aligned_line("Not reported", format::count(summary.not_reported, colors::CAUTION));

    if !discovery.status.failed.is_empty() {
        warn!(
            "{} of {} status batches failed",
            discovery.status.failed.len(),
            discovery.status.batches
        );
    }

    let identified: ColoredString = format!("{} hardware revisions", summary.discovered)
        .bold()
        .green();
    let output: String = format!(
        "Discovery Complete: {} identified in {}",
        identified,
        format::seconds(total_time)
    );
    print::fat_separator();
    print::centerln(&output);
}
