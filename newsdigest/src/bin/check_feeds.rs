use chrono::Local;
use common::Config;
use newsdigest::filter::EntryFilter;
use newsdigest::ingestion;

/// Fetches every configured feed and shows what the filter would keep for yesterday.
/// No completion or mail calls are made.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::load().await?;
    let client = ingestion::build_client(
        config.feeds.fetch_timeout_seconds.unwrap_or(20),
        config.feeds.user_agent.as_deref().unwrap_or("newsdigest/0.1.0"),
    )?;

    let now = Local::now().fixed_offset();
    let mut filter = EntryFilter::for_previous_day(&config.filter.personnel_keywords, &now);
    let mut kept = 0;

    println!("Target date: {}", filter.target_date());

    for url in &config.feeds.urls {
        println!("\n{}", "=".repeat(60));
        println!("Feed: {}", url);
        println!("{}", "=".repeat(60));

        match ingestion::fetch_entries(&client, url).await {
            Ok(entries) => {
                println!("✓ {} entries", entries.len());
                for entry in &entries {
                    let published = entry
                        .published
                        .map(|p| p.with_timezone(now.offset()).to_rfc3339())
                        .unwrap_or_else(|| "-".to_string());
                    match filter.admit(entry) {
                        Ok(()) => {
                            kept += 1;
                            println!("  KEEP  {}  {}", published, entry.title);
                        }
                        Err(reason) => {
                            println!("  {:?}  {}  {}", reason, published, entry.title);
                        }
                    }
                }
            }
            Err(e) => {
                println!("✗ Failed: {:#}", e);
            }
        }
    }

    println!("\n{} entries would be summarized", kept);
    Ok(())
}
