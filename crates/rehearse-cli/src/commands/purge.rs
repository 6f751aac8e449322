use rehearse_application::IdentityScopedCleaner;
use rehearse_core::identity::IdentityId;

use super::CommandContext;

/// Runs the sign-out purge for `identity`. Storage errors are only logged.
pub async fn run(ctx: &CommandContext, identity: String) {
    let identity = IdentityId::from(identity);
    IdentityScopedCleaner::new(ctx.adapter())
        .on_signed_out(&identity)
        .await;
    println!("Purged stored sessions for {}", identity);
}
