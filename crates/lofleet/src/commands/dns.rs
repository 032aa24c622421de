use super::Context;
use colored::Colorize;

pub async fn handle(
    ctx: &Context,
    subdomain: &str,
    address: &str,
    domain: Option<&str>,
    remove: bool,
) -> anyhow::Result<()> {
    let domain = domain.unwrap_or(&ctx.settings.domain);

    ctx.dns_sync()
        .register_dns(subdomain, domain, address, remove, &ctx.wait)
        .await?;

    if remove {
        println!("  ✓ Removed {}.{} ({})", subdomain, domain, address);
    } else {
        println!("  ✓ {}.{} → {}", subdomain, domain, address.cyan());
    }
    Ok(())
}
