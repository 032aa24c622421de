use super::Context;
use colored::Colorize;
use lofleet_cloud::model::{DEPLOY_GROUP_TAG, NAME_TAG};

pub async fn handle(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let snapshot = ctx.inventory().list_instances().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(snapshot.summaries())?);
        return Ok(());
    }

    if snapshot.is_empty() {
        println!("{}", "No instances".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!("{:<22} {:<20} {:<16} {}", "INSTANCE ID", "NAME", "ADDRESS", "TAGS").bold()
    );
    for summary in snapshot {
        let other_tags = summary
            .tags
            .iter()
            .filter(|(k, _)| k.as_str() != NAME_TAG && k.as_str() != DEPLOY_GROUP_TAG)
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",");
        let address = if summary.is_addressable() {
            summary.public_address.cyan()
        } else {
            summary.public_address.dimmed()
        };

        println!(
            "{:<22} {:<20} {:<16} {}",
            summary.instance_id,
            summary.name().unwrap_or("-"),
            address,
            other_tags.dimmed()
        );
    }

    Ok(())
}
