use super::Host;
use super::common::{begin, finish, normalize_into, normalize_occurrence_into, parse_payload, read_payload};
use super::manifest::{DEFAULT_MANIFEST, Manifest, PayloadEntry};
use crate::Result;
use crate::aggregator::ResultAggregator;
use crate::facts::EntityKind;
use crate::keys::{FactKey, GenericKey};
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use clap::Parser;
use std::collections::HashMap;
use std::io::Write;

const LOG_TARGET: &str = "   collect";

#[derive(Parser, Debug)]
pub struct CollectArgs {
    /// Path to the run manifest listing the payloads to normalize
    #[arg(long, value_name = "PATH", default_value = DEFAULT_MANIFEST)]
    pub manifest: Utf8PathBuf,

    /// Reference instant (RFC 3339) for derived computations, overriding the manifest's `now`
    #[arg(long, value_name = "TIMESTAMP")]
    pub now: Option<DateTime<Utc>>,
}

/// Normalize every payload of a manifest into one fact record.
///
/// Each payload is normalized into its own aggregator, which is then merged into the run's
/// aggregator, so the first failing payload supplies the terminal error. When the manifest
/// lists an entity more than once, each of those payloads suffixes its keys with its
/// 1-based occurrence among them.
pub fn collect_payloads<H: Host>(host: &mut H, args: &CollectArgs) -> Result<()> {
    let manifest = match Manifest::load(&args.manifest) {
        Ok(manifest) => manifest,
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Could not load manifest: {e}");
            host.exit(1);
            return Err(e);
        }
    };

    let now = args.now.or(manifest.now).unwrap_or_else(Utc::now);

    let mut aggregator = ResultAggregator::new();
    begin(&mut aggregator, now);

    let mut totals: HashMap<EntityKind, usize> = HashMap::new();
    for entry in &manifest.payloads {
        *totals.entry(entry.entity).or_default() += 1;
    }

    let mut seen: HashMap<EntityKind, usize> = HashMap::new();
    let mut count = 0;
    for entry in &manifest.payloads {
        let occurrence = seen.entry(entry.entity).or_default();
        *occurrence += 1;
        let occurrence = (totals[&entry.entity] > 1).then_some(*occurrence);

        let (entry_aggregator, normalized) = collect_entry(entry, now, occurrence);
        count += normalized;
        aggregator.merge(entry_aggregator);
    }

    let _ = aggregator.add_pair(GenericKey::Count.name(), count);

    finish(host, &mut aggregator);
    Ok(())
}

fn collect_entry(entry: &PayloadEntry, now: DateTime<Utc>, occurrence: Option<usize>) -> (ResultAggregator, usize) {
    log::info!(target: LOG_TARGET, "Collecting {} payload from '{}'", entry.entity, entry.path);

    let mut aggregator = ResultAggregator::new();
    let normalized = match read_payload(&entry.path).and_then(|text| parse_payload(&text, &entry.path)) {
        Ok(payload) => match occurrence {
            Some(occurrence) => normalize_occurrence_into(&mut aggregator, entry.entity, entry.source, &payload, &entry.context(), now, occurrence),
            None => normalize_into(&mut aggregator, entry.entity, entry.source, &payload, &entry.context(), now),
        },
        Err(e) => {
            let _ = aggregator.set_error(e.with_context("entity", entry.entity.to_string()));
            0
        }
    };

    (aggregator, normalized)
}
