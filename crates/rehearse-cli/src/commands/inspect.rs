use anyhow::Result;
use rehearse_core::clock::SystemClock;
use rehearse_core::identity::IdentityId;
use rehearse_core::storage::StorageScope;
use rehearse_infrastructure::{SessionCodec, SessionKeys, SessionMigrator};
use serde_json::json;
use std::sync::Arc;

use super::CommandContext;

/// Prints the durable backup and the stats without modifying storage.
pub async fn run(ctx: &CommandContext, identity: Option<String>) -> Result<()> {
    let identity = identity.map(IdentityId::from);
    let keys = SessionKeys::for_scope(identity.as_ref());

    let session = match ctx
        .adapter()
        .read(StorageScope::Durable, &keys.backup)
        .await?
    {
        Some(payload) => {
            let stored = SessionCodec::new(Arc::new(SystemClock)).decode(&payload)?;
            let stored_version = stored.schema_version.clone();
            let upgraded = SessionMigrator::new().upgrade(stored)?;
            Some(json!({
                "storedSchemaVersion": stored_version,
                "session": upgraded,
            }))
        }
        None => None,
    };

    let stats = ctx.store(identity.as_ref()).stats().await;
    let output = json!({
        "key": keys.backup,
        "record": session,
        "stats": stats,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
