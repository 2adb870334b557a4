//! Replay command implementation.
//!
//! Feeds JSON-encoded messages, in order, through a server backed by
//! in-memory collaborators.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use syncml_protocol::{JsonMessageParser, MessageParser, Operation};
use syncml_server::{DriverConfig, SyncmlServer};
use tracing::debug;

/// Options of a replay run.
#[derive(Debug, Default)]
pub struct ReplayOptions {
    /// JSON file holding a `DriverConfig`.
    pub config: Option<PathBuf>,
    /// User the credential token is issued to.
    pub user: Option<String>,
    /// Credential token seeded into the cache.
    pub token: Option<String>,
    /// JSON file holding operations queued for every device.
    pub pending: Option<PathBuf>,
}

/// Outcome of one replayed message.
#[derive(Debug)]
pub struct ReplayOutcome {
    /// Message file.
    pub file: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

/// Runs the replay command.
pub fn run(files: &[PathBuf], options: &ReplayOptions) -> Result<(), Box<dyn std::error::Error>> {
    for outcome in replay(files, options)? {
        println!("[{}] {}", outcome.status, outcome.file);
        println!("{}", outcome.body);
        println!();
    }
    Ok(())
}

fn replay(
    files: &[PathBuf],
    options: &ReplayOptions,
) -> Result<Vec<ReplayOutcome>, Box<dyn std::error::Error>> {
    let config = match options.config {
        Some(ref path) => load_config(path)?,
        None => DriverConfig::default(),
    };
    let pending = match options.pending {
        Some(ref path) => load_operations(path)?,
        None => Vec::new(),
    };

    let (server, services) = SyncmlServer::in_memory(config);
    match (&options.user, &options.token) {
        (Some(user), Some(token)) => services.credentials.insert(token.as_str(), user.as_str()),
        (None, None) => {}
        _ => return Err("--user and --token must be given together".into()),
    }

    let mut seen = HashSet::new();
    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        let raw = std::fs::read(file)?;

        if let Ok(message) = JsonMessageParser.parse(&raw) {
            let device_id = message.device_uri().to_string();
            if seen.insert(device_id.clone()) {
                for op in &pending {
                    services.operations.enqueue(device_id.as_str(), op.clone());
                }
                debug!(device_id = %device_id, count = pending.len(), "queued pending operations");
            }
        }

        let response = server.submit_raw(&raw);
        outcomes.push(ReplayOutcome {
            file: file.display().to_string(),
            status: response.status.code(),
            body: response.body,
        });
    }

    Ok(outcomes)
}

fn load_config(path: &Path) -> Result<DriverConfig, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn load_operations(path: &Path) -> Result<Vec<Operation>, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncml_protocol::{Item, Source, SyncmlBody, SyncmlHeader, SyncmlMessage};
    use tempfile::TempDir;

    const DEVICE: &str = "urn:uuid:replay";

    fn write_message(dir: &TempDir, name: &str, message: &SyncmlMessage) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, serde_json::to_vec(message).unwrap()).unwrap();
        path
    }

    fn session(dir: &TempDir) -> Vec<PathBuf> {
        let first = SyncmlMessage::new(
            SyncmlHeader::new(1, 1, Source::new(DEVICE, "bob")).with_credential("tok"),
        )
        .with_body(SyncmlBody::default().with_replace(
            [DEVICE, "Contoso", "Lumia", "10.0", "en-US"]
                .iter()
                .map(|v| Item::new(*v))
                .collect(),
        ));
        let second = SyncmlMessage::new(SyncmlHeader::new(1, 2, Source::new(DEVICE, "bob")))
            .with_body(SyncmlBody::default().with_results(
                ["10.0", "imsi", "imei", "Contoso", "mac", "720x1280", "bob's"]
                    .iter()
                    .map(|v| Item::new(*v))
                    .collect(),
            ));
        let exchange = SyncmlMessage::new(SyncmlHeader::new(2, 1, Source::new(DEVICE, "bob")));

        vec![
            write_message(dir, "1.json", &first),
            write_message(dir, "2.json", &second),
            write_message(dir, "3.json", &exchange),
        ]
    }

    #[test]
    fn replays_enrollment_session() {
        let dir = TempDir::new().unwrap();
        let files = session(&dir);

        let pending = dir.path().join("pending.json");
        std::fs::write(&pending, r#"[{"code":"./Device/Vendor/MSFT/RemoteLock/Lock","kind":"command"}]"#)
            .unwrap();

        let options = ReplayOptions {
            user: Some("bob".into()),
            token: Some("tok".into()),
            pending: Some(pending),
            ..ReplayOptions::default()
        };
        let outcomes = replay(&files, &options).unwrap();

        let statuses: Vec<_> = outcomes.iter().map(|o| o.status).collect();
        assert_eq!(statuses, vec![200, 200, 200]);
        assert!(outcomes[2].body.contains("RemoteLock/Lock"));
    }

    #[test]
    fn without_credential_enrollment_is_unauthorized() {
        let dir = TempDir::new().unwrap();
        let files = session(&dir);

        let outcomes = replay(&files[..1], &ReplayOptions::default()).unwrap();
        assert_eq!(outcomes[0].status, 401);
    }

    #[test]
    fn unparseable_file_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "<SyncML/>").unwrap();

        let outcomes = replay(&[path], &ReplayOptions::default()).unwrap();
        assert_eq!(outcomes[0].status, 400);
    }

    #[test]
    fn config_file_is_applied() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(&config, r#"{"device_type":"windows-phone"}"#).unwrap();

        assert_eq!(load_config(&config).unwrap().device_type, "windows-phone");
    }

    #[test]
    fn user_without_token_is_rejected() {
        let options = ReplayOptions {
            user: Some("bob".into()),
            ..ReplayOptions::default()
        };
        assert!(replay(&[], &options).is_err());
    }
}
