use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::formats::Chapter;

pub const DEFAULT_CHAPTERS_API: &str = "https://yt.lemnoslife.com";

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("invalid video reference: {0:?}")]
    InvalidVideoRef(String),
    #[error("GET {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("chapter service error ({status}) for video {video_id}")]
    Status {
        video_id: String,
        status: reqwest::StatusCode,
    },
    #[error("malformed chapter payload for video {video_id}: {message}")]
    Payload { video_id: String, message: String },
}

/// Anything that can list the chapters of a video, in order.
pub trait ChapterSource {
    fn chapters(&self, video_id: &str) -> Result<Vec<Chapter>, SourceError>;
}

#[derive(Debug, Clone)]
pub struct HttpChapterSource {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpChapterSource {
    pub fn new(api_base: &str) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|source| SourceError::Transport {
                url: api_base.to_owned(),
                source,
            })?;
        Ok(Self {
            client,
            endpoint: videos_endpoint(api_base),
        })
    }
}

impl ChapterSource for HttpChapterSource {
    fn chapters(&self, video_id: &str) -> Result<Vec<Chapter>, SourceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("part", "chapters"), ("id", video_id)])
            .header(USER_AGENT, "topgames/0.1")
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|source| SourceError::Transport {
                url: format!("{}?part=chapters&id={video_id}", self.endpoint),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                video_id: video_id.to_owned(),
                status,
            });
        }

        let raw = response.text().map_err(|source| SourceError::Transport {
            url: self.endpoint.clone(),
            source,
        })?;
        chapters_from_payload(video_id, &raw)
    }
}

pub fn videos_endpoint(api_base: &str) -> String {
    let api_base = api_base.trim_end_matches('/');
    format!("{api_base}/videos")
}

/// Pulls `items[0].chapters.chapters` out of a chapter service response.
pub fn chapters_from_payload(video_id: &str, raw_json: &str) -> Result<Vec<Chapter>, SourceError> {
    let payload_error = |message: String| SourceError::Payload {
        video_id: video_id.to_owned(),
        message,
    };

    let value: serde_json::Value =
        serde_json::from_str(raw_json).map_err(|err| payload_error(err.to_string()))?;
    let chapters = value
        .get("items")
        .and_then(|v| v.as_array())
        .and_then(|items| items.first())
        .and_then(|item| item.get("chapters"))
        .and_then(|v| v.get("chapters"))
        .ok_or_else(|| payload_error("missing `items[0].chapters.chapters`".to_owned()))?;

    serde_json::from_value(chapters.clone()).map_err(|err| payload_error(err.to_string()))
}

/// Accepts a watch URL (`...watch?v=<id>`) or a bare video id.
pub fn video_id(video_ref: &str) -> Result<String, SourceError> {
    let trimmed = video_ref.trim();
    if trimmed.is_empty() {
        return Err(SourceError::InvalidVideoRef(video_ref.to_owned()));
    }

    let Ok(url) = Url::parse(trimmed) else {
        if trimmed.contains(['/', '?', '&', ' ']) {
            return Err(SourceError::InvalidVideoRef(video_ref.to_owned()));
        }
        return Ok(trimmed.to_owned());
    };

    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| SourceError::InvalidVideoRef(video_ref.to_owned()))
}

pub fn chapter_link(video_id: &str, time: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}&t={time}")
}
