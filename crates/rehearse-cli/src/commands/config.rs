use anyhow::Result;
use serde_json::json;

use super::CommandContext;

pub fn run(ctx: &CommandContext) -> Result<()> {
    let output = json!({
        "configFile": ctx.config_path,
        "storageDir": ctx.storage_dir,
        "config": ctx.config,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
