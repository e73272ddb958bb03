use std::io::IsTerminal;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SOL_AGENT_LOG";

/// Directives used when neither `SOL_AGENT_LOG` nor `RUST_LOG` is set.
///
/// The chat client shares the terminal with the transcript, so it stays at
/// `warn` unless asked otherwise.
fn default_directives(component: &str, interactive: bool) -> String {
    if interactive {
        format!("warn,{component}=info")
    } else {
        format!("info,sol_agent=debug,{component}=debug")
    }
}

fn resolve_filter<F>(component: &str, interactive: bool, lookup: F) -> EnvFilter
where
    F: Fn(&str) -> Option<String>,
{
    [LOG_ENV, "RUST_LOG"]
        .into_iter()
        .filter_map(|key| lookup(key))
        .find_map(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directives(component, interactive)))
}

/// Installs the global subscriber. Output goes to stderr so stdout carries
/// only the conversation.
pub fn init_tracing(component: &str, interactive: bool) {
    let filter = resolve_filter(component, interactive, |key| std::env::var(key).ok());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(!interactive)
        .with_file(!interactive)
        .with_line_number(!interactive)
        .with_span_events(FmtSpan::CLOSE)
        .compact()
        .try_init();
}
