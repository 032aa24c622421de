use super::Context;
use colored::Colorize;
use lofleet_cloud::DuplicateNamePolicy;

pub async fn handle(ctx: &Context, name: &str, reject_duplicates: bool) -> anyhow::Result<()> {
    let policy = if reject_duplicates {
        DuplicateNamePolicy::RejectAmbiguous
    } else {
        ctx.settings.duplicate_policy
    };

    println!(
        "{}",
        format!(
            "Terminating instances named '{}' after a {}s countdown (Ctrl-C aborts)",
            name, ctx.settings.termination_grace_secs
        )
        .red()
        .bold()
    );

    let count = ctx
        .decommissioner(policy)
        .terminate_instances(name, &ctx.wait)
        .await?;

    if count == 0 {
        println!("{}", format!("No instance named '{}'", name).dimmed());
    } else {
        println!("  ✓ Terminating {} instance(s)", count.to_string().cyan());
    }
    Ok(())
}
