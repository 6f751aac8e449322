use anyhow::Result;
use rehearse_core::identity::IdentityId;

use super::CommandContext;

/// Loads the stored session, which writes it back in the current schema
/// when it was older. Expired and corrupt records are removed on the way.
pub async fn run(ctx: &CommandContext, identity: Option<String>) -> Result<()> {
    let identity = identity.map(IdentityId::from);
    let store = ctx.store(identity.as_ref());

    match store.load().await {
        Some(session) => {
            // `load` only writes back when an upgrade happened; saving
            // again makes the backup current either way.
            let written = store.save(&session).await?;
            println!(
                "Stored session is at schema {} ({} questions)",
                written.schema_version.as_deref().unwrap_or("unknown"),
                written.questions.len()
            );
        }
        None => println!("No resumable session stored"),
    }
    Ok(())
}
