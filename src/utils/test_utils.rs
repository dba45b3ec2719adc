use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

use crate::core::profile::{ProfileForm, UserProfile};
use crate::core::records::{ArtworkType, GenerationRecord, OutputType};
use chrono::{Local, TimeZone};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Variables every environment-sensitive test starts without.
const ISOLATED_VARS: &[&str] = &["GEMINI_API_KEY", "GEMINI_BASE_URL"];

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Restores every variable it touched when dropped.
///
/// Callers must hold the environment lock, which [`with_test_config_env`] takes.
pub struct TestEnvVarGuard {
    saved: HashMap<String, Option<OsString>>,
}

impl TestEnvVarGuard {
    pub fn new() -> Self {
        Self {
            saved: HashMap::new(),
        }
    }

    fn remember(&mut self, key: &str) {
        self.saved
            .entry(key.to_string())
            .or_insert_with(|| std::env::var_os(key));
    }

    pub fn set_var(&mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) {
        self.remember(key);
        std::env::set_var(key, value);
    }

    pub fn remove_var(&mut self, key: &str) {
        self.remember(key);
        std::env::remove_var(key);
    }
}

impl Default for TestEnvVarGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestEnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain() {
            match value {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}

/// Run `f` with config directories pointed at a fresh temp dir and the
/// credential environment variables cleared.
pub fn with_test_config_env<F, R>(f: F) -> R
where
    F: FnOnce(&Path) -> R,
{
    let _lock = env_lock();
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut guard = TestEnvVarGuard::new();
    guard.set_var("HOME", temp_dir.path());
    guard.set_var("XDG_CONFIG_HOME", temp_dir.path().join("config"));
    guard.set_var("APPDATA", temp_dir.path().join("appdata"));
    for var in ISOLATED_VARS {
        guard.remove_var(var);
    }
    f(temp_dir.path())
}

pub fn create_test_profile(name: &str, email: &str) -> UserProfile {
    ProfileForm {
        name: name.to_string(),
        email: email.to_string(),
        ..ProfileForm::default()
    }
    .into_profile()
    .expect("test profile should validate")
}

pub fn create_test_record(artwork: ArtworkType, response: &str) -> GenerationRecord {
    GenerationRecord {
        artwork_type: artwork,
        period: "Baroque".to_string(),
        artist: String::new(),
        region: "Flanders".to_string(),
        damage: "Flaking paint along the lower edge".to_string(),
        output_type: OutputType::ConservationAdvice,
        response: response.to_string(),
        created_at: Local
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 0)
            .single()
            .expect("valid test timestamp"),
    }
}

/// One request as seen by [`serve_responses`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

async fn read_http_request(
    stream: &mut tokio::net::TcpStream,
) -> Result<CapturedRequest, String> {
    use tokio::io::AsyncReadExt;

    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];
    let header_end = loop {
        if let Some(pos) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
        let read = stream.read(&mut chunk).await.map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let mut headers = Vec::new();
    let mut content_length = 0;
    for line in lines.filter(|line| !line.is_empty()) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().map_err(|err| err.to_string())?;
        }
        headers.push((name.to_string(), value));
    }

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let read = stream.read(&mut chunk).await.map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP body".to_string());
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok(CapturedRequest {
        request_line,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

/// Answer one connection per `(status, body)` pair, in order, then return
/// everything that was received. Yields the `http://127.0.0.1:<port>/v1beta`
/// base URL to point a client at.
pub async fn serve_responses(
    responses: Vec<(u16, String)>,
) -> (
    String,
    tokio::task::JoinHandle<Result<Vec<CapturedRequest>, String>>,
) {
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");

    let server = tokio::spawn(async move {
        let mut captured = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.map_err(|err| err.to_string())?;
            captured.push(read_http_request(&mut stream).await?);
            let reason = if status < 400 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .await
                .map_err(|err| err.to_string())?;
            stream.shutdown().await.map_err(|err| err.to_string())?;
        }
        Ok(captured)
    });

    (format!("http://{addr}/v1beta"), server)
}
