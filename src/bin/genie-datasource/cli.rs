use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(author, version, about = "SimpleJSON datasource for OpsGenie", long_about = None)]
pub struct Cli {
    /// Chemin du fichier de configuration TOML.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Adresse d'écoute, prioritaire sur la configuration.
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<SocketAddr>,

    /// Autorise une URL OpsGenie en HTTP non chiffré.
    #[arg(long, action = ArgAction::SetTrue)]
    pub insecure: bool,

    /// Utilise un layer JSON pour les logs (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Filtre de logs explicite (ex. "genie_datasource=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
