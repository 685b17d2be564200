use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::from_str;

pub(crate) fn post_json<T: DeserializeOwned, B: Serialize>(
    url: &str,
    body: &B,
    bearer: Option<&str>,
) -> Result<T, String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .map_err(|e| e.to_string())?;
    let mut request = client.post(url).header(CONTENT_TYPE, "application/json").json(body);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }
    let resp = request.send().map_err(|e| e.to_string())?;
    let status = resp.status();
    let text = resp.text().unwrap_or_default();
    if !status.is_success() {
        return Err(format!("POST {} failed: {} {}", url, status, text));
    }
    from_str::<T>(&text).map_err(|e| format!("POST {} decode failed: {} | {}", url, e, text))
}
