use std::path::PathBuf;

use axum::http::{header::InvalidHeaderValue, header::CONTENT_TYPE, HeaderValue, Method};
use clap::Parser;
use tower_http::cors::CorsLayer;

#[derive(Debug, Clone, Parser)]
#[clap(name = "exercise tracker server")]
pub struct Cli {
    /// Directory holding index.html, the stylesheet and the compiled client
    #[clap(long, env, default_value = "assets")]
    pub assets_dir: PathBuf,
    #[clap(long, env, default_value = "exercise.sqlite")]
    pub sqlite_connection_string: String,
    #[clap(long, env, default_value = "3000")]
    pub port: u16,
    #[clap(long, env, default_value = "127.0.0.1")]
    pub bind_addr: String,
    /// Only allow cross origin requests from this origin. Any origin is
    /// allowed when it isn't set
    #[arg(long, env)]
    pub cors_origin: Option<String>,
}

impl Cli {
    pub fn cors_layer(&self) -> Result<CorsLayer, InvalidHeaderValue> {
        match &self.cors_origin {
            None => Ok(CorsLayer::permissive()),
            Some(origin) => Ok(CorsLayer::new()
                .allow_origin(HeaderValue::from_str(origin)?)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([CONTENT_TYPE])),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["server"]).unwrap();
        assert_eq!(cli.assets_dir, PathBuf::from("assets"));
        assert_eq!(cli.bind_addr, "127.0.0.1");
        assert!(cli.cors_origin.is_none());
        assert!(cli.cors_layer().is_ok());
    }

    #[test]
    fn test_bad_cors_origin() {
        let cli = Cli::try_parse_from(["server", "--cors-origin", "bad\norigin"]).unwrap();
        assert!(cli.cors_layer().is_err());
    }
}
