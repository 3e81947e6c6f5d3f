//! Endpoint configuration.

use reqwest::Url;
use turf_proto::RoomId;

use crate::ClientError;

/// Where the backend lives and how to authenticate.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_base: Url,
    ws_base: Url,
    token: String,
}

impl ClientConfig {
    /// Build a config.
    ///
    /// `ws_base` defaults to `api_base` with `http` replaced by `ws` and
    /// `https` by `wss`.
    pub fn new(
        api_base: &str,
        ws_base: Option<&str>,
        token: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let api = parse_base("api", api_base, &["http", "https"])?;

        let ws = match ws_base {
            Some(ws_base) => parse_base("ws", ws_base, &["ws", "wss"])?,
            None => {
                let scheme = if api.scheme() == "https" { "wss" } else { "ws" };
                let derived = format!("{scheme}{}", &api.as_str()[api.scheme().len()..]);
                parse_base("ws", &derived, &["ws", "wss"])?
            },
        };

        Ok(Self { api_base: api, ws_base: ws, token: token.into() })
    }

    /// `{api}/{path}`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base.as_str().trim_end_matches('/'))
    }

    /// `{ws}/ws/chat/{room_id}?token={token}` with the room and token
    /// percent-encoded.
    pub fn live_url(&self, room_id: &RoomId) -> Result<Url, ClientError> {
        let mut url = self.ws_base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                which: "ws",
                url: self.ws_base.to_string(),
                reason: "cannot be a base".into(),
            })?
            .pop_if_empty()
            .extend(["ws", "chat", room_id.as_str()]);
        url.query_pairs_mut().append_pair("token", &self.token);
        Ok(url)
    }

    /// Bearer credential.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// HTTP base.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// WebSocket base.
    pub fn ws_base(&self) -> &Url {
        &self.ws_base
    }
}

fn parse_base(which: &'static str, raw: &str, schemes: &[&str]) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidBaseUrl { which, url: raw.into(), reason };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !schemes.contains(&url.scheme()) {
        return Err(invalid(format!("scheme must be one of {schemes:?}")));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_base_derived_from_api() {
        let config = ClientConfig::new("https://chat.example.com", None, "t").unwrap();
        assert_eq!(config.ws_base().as_str(), "wss://chat.example.com/");

        let config = ClientConfig::new("http://localhost:8000", None, "t").unwrap();
        assert_eq!(config.ws_base().as_str(), "ws://localhost:8000/");
    }

    #[test]
    fn live_url_encodes_room_and_token() {
        let config = ClientConfig::new("http://localhost:8000", None, "a b&c").unwrap();
        let url = config.live_url(&RoomId::new("demo room").unwrap()).unwrap();

        assert_eq!(url.as_str(), "ws://localhost:8000/ws/chat/demo%20room?token=a+b%26c");
    }

    #[test]
    fn live_url_keeps_base_path() {
        let config =
            ClientConfig::new("http://localhost:8000", Some("wss://edge.example.com/turf/"), "t")
                .unwrap();
        let url = config.live_url(&RoomId::new("r1").unwrap()).unwrap();

        assert_eq!(url.as_str(), "wss://edge.example.com/turf/ws/chat/r1?token=t");
    }

    #[test]
    fn api_url_joins_without_double_slash() {
        let config = ClientConfig::new("http://localhost:8000/", None, "t").unwrap();
        assert_eq!(config.api_url("messages"), "http://localhost:8000/messages");
    }

    #[test]
    fn rejects_wrong_scheme() {
        assert!(matches!(
            ClientConfig::new("ftp://example.com", None, "t"),
            Err(ClientError::InvalidBaseUrl { which: "api", .. })
        ));
        assert!(ClientConfig::new("http://example.com", Some("http://example.com"), "t").is_err());
    }
}
