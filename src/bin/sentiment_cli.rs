//! Interactive terminal analyzer: one line per turn, `quit` to exit.

use std::io;

use sentiment_ledger::config::AppConfig;
use sentiment_ledger::logging::init_tracing;
use sentiment_ledger::repl::Repl;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cfg = AppConfig::load_default()?;
    init_tracing(&cfg.log_filter);

    let scorer = sentiment_ledger::build_scorer(&cfg)?;
    let mut repl = Repl::new(&scorer, cfg.preview_chars);

    let stdin = io::stdin();
    repl.run(stdin.lock(), io::stdout().lock())
}
