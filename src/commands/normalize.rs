use super::Host;
use super::common::{STDIN_PATH, begin, finish, normalize_into, parse_payload, read_payload};
use crate::Result;
use crate::adapters::{SourceContext, SourceKind};
use crate::aggregator::ResultAggregator;
use crate::facts::EntityKind;
use crate::keys::{FactKey, GenericKey};
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use clap::Parser;

#[derive(Parser, Debug)]
pub struct NormalizeArgs {
    /// Kind of entity the payload describes
    #[arg(long, value_name = "ENTITY")]
    pub entity: EntityKind,

    /// Wire shape of the payload
    #[arg(long, value_name = "SOURCE")]
    pub source: SourceKind,

    /// Payload file, or `-` for standard input; a JSON array is normalized element by element
    #[arg(long, value_name = "FILE", default_value = STDIN_PATH)]
    pub input: Utf8PathBuf,

    /// Repository (`owner/name`) the payload belongs to, for payloads that do not name it
    #[arg(long, value_name = "OWNER/NAME")]
    pub repository: Option<String>,

    /// Length in days of the period an activity payload covers
    #[arg(long, value_name = "DAYS", value_parser = clap::value_parser!(u32).range(1..))]
    pub period_days: Option<u32>,

    /// Reference instant (RFC 3339) for derived computations (default is the current time)
    #[arg(long, value_name = "TIMESTAMP")]
    pub now: Option<DateTime<Utc>>,
}

impl NormalizeArgs {
    fn context(&self) -> SourceContext {
        let mut context = SourceContext::new();
        if let Some(repository) = &self.repository {
            context = context.with_repository(repository.clone());
        }
        if let Some(period_days) = self.period_days {
            context = context.with_period_days(period_days);
        }
        context
    }
}

/// Normalize one payload (or one array of payloads) and write its fact record.
pub fn normalize_payload<H: Host>(host: &mut H, args: &NormalizeArgs) -> Result<()> {
    let now = args.now.unwrap_or_else(Utc::now);

    let mut aggregator = ResultAggregator::new();
    begin(&mut aggregator, now);
    let _ = aggregator.add_pair(GenericKey::EntityType.name(), args.entity);
    let _ = aggregator.add_pair(GenericKey::SourceFormat.name(), args.source.to_string());

    match read_payload(&args.input).and_then(|text| parse_payload(&text, &args.input)) {
        Ok(payload) => {
            let count = normalize_into(&mut aggregator, args.entity, args.source, &payload, &args.context(), now);
            if payload.is_array() {
                let _ = aggregator.add_pair(GenericKey::Count.name(), count);
            }
        }
        Err(e) => {
            let _ = aggregator.set_error(e);
        }
    }

    finish(host, &mut aggregator);
    Ok(())
}
