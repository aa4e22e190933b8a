use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

use crate::Result;
use crate::error::Error;

const FALLBACK_FILTER: &str = "info,tower_http=debug";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    #[must_use]
    pub const fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Premier filtre valide : explicite, puis `RUST_LOG`, puis le filtre par défaut.
fn resolve_filter(explicit_filter: Option<&str>) -> Result<EnvFilter> {
    let mut candidates = Vec::new();
    if let Some(f) = explicit_filter {
        candidates.push(f.to_string());
    }
    if let Ok(env) = std::env::var("RUST_LOG") {
        candidates.push(env);
    }
    candidates.push(FALLBACK_FILTER.to_string());

    candidates
        .into_iter()
        .find_map(|candidate| EnvFilter::try_new(candidate).ok())
        .ok_or_else(|| Error::Telemetry("invalid log filter".to_string()))
}

/// Initialise tracing avec un filtre optionnel et un mode JSON conditionnel.
///
/// # Errors
///
/// Retourne une erreur si aucun filtre n'est valide, si la couche JSON est
/// demandée alors que la fonctionnalité `json-logs` n'est pas compilée, ou si
/// un subscriber global est déjà installé.
pub fn init_tracing(explicit_filter: Option<&str>, format: LogFormat) -> Result<()> {
    let filter = resolve_filter(explicit_filter)?;

    #[cfg(feature = "json-logs")]
    if format == LogFormat::Json {
        let subscriber = Registry::default().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true),
        );
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|err| Error::Telemetry(err.to_string()))?;
        return Ok(());
    }

    #[cfg(not(feature = "json-logs"))]
    if format == LogFormat::Json {
        return Err(Error::Telemetry(
            "binary was built without the `json-logs` feature".to_string(),
        ));
    }

    let subscriber = Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| Error::Telemetry(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{LogFormat, resolve_filter};

    #[test]
    fn explicit_filter_wins() {
        assert!(resolve_filter(Some("genie_datasource=debug")).is_ok());
    }

    #[test]
    fn log_format_follows_flag() {
        assert_eq!(LogFormat::from_flag(true), LogFormat::Json);
        assert_eq!(LogFormat::from_flag(false), LogFormat::Text);
    }
}
