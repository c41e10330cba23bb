use colored::*;

use crate::commands::ServerArgs;
use crate::terminal::{colors, print};
use hwrev_core::cucm::{Cluster, uds};

pub async fn version(args: ServerArgs) -> anyhow::Result<()> {
    let cluster = Cluster::new(args.host, args.insecure)?;
    let full = cluster.version().await?;

    print::set_key_width(["Cluster", "Version", "AXL schema"]);
    print::aligned_line("Cluster", cluster.host().color(colors::ACCENT));
    print::aligned_line("Version", full.clone());
    match uds::major_version(&full) {
        Some(axl) => print::aligned_line("AXL schema", axl.color(colors::PRIMARY)),
        None => print::aligned_line("AXL schema", "unknown".color(colors::CAUTION)),
    }
    Ok(())
}
