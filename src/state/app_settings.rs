use log::LevelFilter;
use official_api::client::DEFAULT_SERVER;
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_SERVER: &str = "OFFICIAL_SERVER";
pub const ENV_USER: &str = "OFFICIAL_USER";
pub const ENV_SNAPSHOT: &str = "OFFICIAL_SNAPSHOT_JSON";
pub const ENV_LOG: &str = "OFFICIAL_LOG";

#[derive(Debug, Default, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// HTTP base URL of the tournament server, without a trailing slash.
    pub server: String,
    pub tournament_id: String,
    pub user_id: Option<String>,
    /// Read snapshots from this file instead of the server.
    pub snapshot_file: Option<PathBuf>,
}

impl AppSettings {
    pub fn load(tournament_id: &str) -> Self {
        Self::from_vars(tournament_id, |key| std::env::var(key).ok())
    }

    pub fn from_vars(tournament_id: &str, get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let log_level = get(ENV_LOG).and_then(|level| match LevelFilter::from_str(&level) {
            Ok(level) => Some(level),
            Err(_) => {
                eprintln!("ignoring {ENV_LOG}={level}: not a log level");
                None
            }
        });

        Self {
            full_screen: false,
            log_level,
            server: get(ENV_SERVER)
                .unwrap_or_else(|| DEFAULT_SERVER.to_string())
                .trim_end_matches('/')
                .to_string(),
            tournament_id: tournament_id.to_string(),
            user_id: get(ENV_USER),
            snapshot_file: get(ENV_SNAPSHOT).map(PathBuf::from),
        }
    }

    /// `ws(s)://<server>/official/<id>/socket`, following the server's scheme.
    pub fn socket_url(&self) -> String {
        let host = if let Some(rest) = self.server.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.server.strip_prefix("http://") {
            format!("ws://{rest}")
        } else if self.server.starts_with("ws://") || self.server.starts_with("wss://") {
            self.server.clone()
        } else {
            format!("ws://{}", self.server)
        };
        format!("{host}/official/{}/socket", self.tournament_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_vars("t1", |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_point_at_local_server() {
        let s = settings(&[]);
        assert_eq!(s.server, DEFAULT_SERVER);
        assert_eq!(s.socket_url(), "ws://127.0.0.1:8788/official/t1/socket");
        assert!(s.user_id.is_none());
        assert!(s.snapshot_file.is_none());
        assert!(s.log_level.is_none());
    }

    #[test]
    fn https_servers_get_secure_sockets() {
        let s = settings(&[(ENV_SERVER, "https://example.org/")]);
        assert_eq!(s.server, "https://example.org");
        assert_eq!(s.socket_url(), "wss://example.org/official/t1/socket");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let s = settings(&[(ENV_USER, "  "), (ENV_SNAPSHOT, "")]);
        assert!(s.user_id.is_none());
        assert!(s.snapshot_file.is_none());
    }

    #[test]
    fn user_snapshot_and_log_level_are_read() {
        let s = settings(&[
            (ENV_USER, "alice"),
            (ENV_SNAPSHOT, "/tmp/snap.json"),
            (ENV_LOG, "debug"),
        ]);
        assert_eq!(s.user_id.as_deref(), Some("alice"));
        assert_eq!(s.snapshot_file, Some(PathBuf::from("/tmp/snap.json")));
        assert_eq!(s.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn bad_log_level_is_ignored() {
        assert!(settings(&[(ENV_LOG, "chatty")]).log_level.is_none());
    }
}
