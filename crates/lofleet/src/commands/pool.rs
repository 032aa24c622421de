use super::Context;

/// Plain output so the pool can be fed straight into remote-execution tooling
pub async fn handle(ctx: &Context, name: &str) -> anyhow::Result<()> {
    let pool = ctx.inventory().address_pool(name).await?;
    println!("{}", pool);
    Ok(())
}
