use std::env;

use anyhow::{Context, bail};
use tracing_subscriber::EnvFilter;
use workcrawl::{AcceptAll, ContestTarget, Crawler, MemoryStore, ResultStore, WorkcrawlConfig};

const USAGE: &str = "usage: workcrawl [--json] [--config <file.yaml>] <contest path>";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut json = false;
    let mut config_path = None;
    let mut contest = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--config" => config_path = Some(args.next().context(USAGE)?),
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ => {
                if contest.is_some() {
                    bail!("unexpected argument '{arg}'\n{USAGE}");
                }
                contest = Some(arg);
            }
        }
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = match &config_path {
        Some(path) => WorkcrawlConfig::from_file(path)
            .with_context(|| format!("loading config from {path}"))?,
        None => WorkcrawlConfig::default(),
    };
    let contest = contest.context(USAGE)?;
    let target = ContestTarget::from_path(&contest)
        .with_context(|| format!("'{contest}' is not a contest path"))?;

    let crawler = Crawler::from_config(&config)?;
    let source = crawler.page_source(config.http_transport()?);
    let mut store = MemoryStore::new();
    let report = crawler
        .discover_contest(source, AcceptAll, &target, &mut store)
        .await?;

    println!(
        "{} ({}): {} pages, {} ids, {} duplicates, stopped by {:?}",
        target.name,
        target.kind,
        report.pages_processed,
        report.accepted,
        report.duplicates,
        report.termination
    );
    for entry in store.id_list() {
        println!("{}\t{}", entry.list_type(), entry.id);
    }

    Ok(())
}
