use super::Host;
use crate::Result;
use crate::facts::EntityKind;
use crate::keys::{KeyInfo, registry};
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct KeysArgs {
    /// Only list the keys emitted for this kind of entity
    #[arg(long, value_name = "ENTITY")]
    pub entity: Option<EntityKind>,
}

/// Registry namespace holding the keys of `entity`.
const fn namespace(entity: EntityKind) -> &'static str {
    match entity {
        EntityKind::Repository => "REPOSITORY",
        EntityKind::Issue => "ISSUE",
        EntityKind::PullRequest => "PULL_REQUEST",
        EntityKind::Commit => "COMMIT",
        EntityKind::Project => "PROJECT",
        EntityKind::ProjectItem => "PROJECT_ITEM",
        EntityKind::ActivityMetrics => "ACTIVITY",
        EntityKind::ProjectSummary => "PROJECT_SUMMARY",
    }
}

/// List the key registry as `KEY=description` lines.
pub fn list_keys<H: Host>(host: &mut H, args: &KeysArgs) -> Result<()> {
    let selected = |info: &KeyInfo| args.entity.is_none_or(|entity| info.namespace == namespace(entity));

    let mut out = host.output();
    for info in registry().filter(selected) {
        let _ = writeln!(out, "{}={}", info.name, info.description);
    }

    drop(out);
    host.exit(0);
    Ok(())
}
