use anyhow::Result;
use nodewatcher::babel_repo::BabelClient;
use nodewatcher::crawler::Crawler;
use nodewatcher::host_repo::ProcHostRepo;
use nodewatcher::link_repo::IpRouteLinkSource;
use nodewatcher::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout is reserved for debug dumps of the report
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::debug!(name = version::NAME, version = version::VERSION, "starting crawl");

    let crawler = Crawler::new(
        ProcHostRepo::default(),
        IpRouteLinkSource::default(),
        BabelClient::new(app_config.babel.endpoint.clone(), app_config.babel_timeout()),
    );
    let mut snapshot = crawler
        .crawl()
        .await
        .map_err(|e| anyhow::anyhow!("crawl failed: {}", e))?;
    snapshot.apply_identity(&app_config.identity());

    let debug = app_config.report.debug;
    if debug {
        println!("XML Output:");
        println!("{}", report::to_xml_pretty(&snapshot)?);
        println!();
    }

    let payload = report::to_xml(&snapshot)?;
    if debug {
        println!();
        println!("XML Payload:");
        println!();
        println!("{payload}");
    }

    let body = report::envelope(&snapshot, &payload)?;
    if debug {
        println!();
        println!("JSON Output:");
        println!();
        println!("{body}");
    }

    if app_config.report.dry_run {
        tracing::info!("dry run, report not delivered");
        return Ok(());
    }

    let collector =
        report::Collector::new(app_config.report.collector_url.clone(), app_config.report_timeout())?;
    let response = collector.deliver(body).await?;
    if debug {
        println!();
        println!("HTTP Response:");
        println!();
        println!("{response}");
    }

    Ok(())
}
