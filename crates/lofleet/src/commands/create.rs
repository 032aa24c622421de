use super::Context;
use colored::Colorize;

pub async fn handle(ctx: &Context, name: &str, register_dns: bool) -> anyhow::Result<()> {
    println!("{}", format!("Launching {}...", name).yellow());

    let instance = ctx.provisioner().create_instance(name, &ctx.wait).await?;
    let address = instance
        .public_address
        .map(|ip| ip.to_string())
        .unwrap_or_default();

    println!("  ✓ Launched {}", instance.id.cyan());
    println!("  ✓ IP: {}", address.cyan());

    if register_dns {
        let domain = &ctx.settings.domain;
        println!();
        println!("{}", format!("Registering {}.{}...", name, domain).yellow());
        ctx.dns_sync()
            .upsert_record(name, domain, &address, &ctx.wait)
            .await?;
        println!("  ✓ {}.{} → {}", name, domain, address.cyan());
    }

    Ok(())
}
