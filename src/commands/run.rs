//! Command dispatch logic for gh-facts

use super::common::{LogLevel, init_logging};
use super::{CollectArgs, KeysArgs, NormalizeArgs, collect_payloads, list_keys, normalize_payload};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "gh-facts", version, author, long_about = None)]
#[command(about = "Normalize source-control hosting payloads into a flat KEY=value fact record")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    /// Diagnostic output written to stderr
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: FactsSubcommand,
}

#[derive(Subcommand, Debug)]
enum FactsSubcommand {
    /// Normalize one payload, or an array of payloads of one entity
    Normalize(NormalizeArgs),
    /// Normalize every payload listed in a run manifest
    Collect(CollectArgs),
    /// List the permitted fact keys
    Keys(KeysArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if the executed command fails outside the fact protocol, such as an
/// unreadable manifest. Normalization failures are reported in the fact record instead.
pub fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = Cli::parse_from(args);
    init_logging(cli.log_level);

    match &cli.command {
        FactsSubcommand::Normalize(normalize_args) => normalize_payload(host, normalize_args),
        FactsSubcommand::Collect(collect_args) => collect_payloads(host, collect_args),
        FactsSubcommand::Keys(keys_args) => list_keys(host, keys_args),
    }
}
