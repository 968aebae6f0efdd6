use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::{Map, Value};

use crate::extract::extract_json;
use crate::gemini::compose_prompt;
use crate::normalize::normalize;
use crate::{AnalysisError, ResultRecord, parse_link};

pub const LINK_FIELD: &str = "link";
pub const TRANSCRIPT_FIELD: &str = "transcript";

/// Caption retrieval keyed by video ID and language preference
#[async_trait]
pub trait CaptionSource {
    /// Return the caption text of the best track, segments joined by spaces
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<String, AnalysisError>;
}

/// Text completion service
#[async_trait]
pub trait ModelClient {
    async fn ask(&self, prompt: &str) -> Result<String, AnalysisError>;
}

/// How far a video got through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pending,
    LinkParsed,
    TranscriptFetched,
    ModelQueried,
    JsonExtracted,
    RecordBuilt,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Pending => "pending",
            Stage::LinkParsed => "link-parsed",
            Stage::TranscriptFetched => "transcript-fetched",
            Stage::ModelQueried => "model-queried",
            Stage::JsonExtracted => "json-extracted",
            Stage::RecordBuilt => "record-built",
        };
        write!(f, "{name}")
    }
}

/// A video that ended in the failed state
#[derive(Debug)]
pub struct VideoFailure {
    pub link: String,
    /// Last stage reached before the error
    pub stage: Stage,
    pub error: AnalysisError,
}

impl std::fmt::Display for VideoFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed after {}: {}", self.link, self.stage, self.error)
    }
}

/// Per-video knobs the pipeline needs
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub languages: Vec<String>,
    pub prompt_template: String,
    pub include_transcript: bool,
}

/// Drive one video from link to result record
pub async fn analyse_video<C, M>(
    link: &str,
    captions: &C,
    model: &M,
    opts: &PipelineOptions,
) -> Result<ResultRecord, VideoFailure>
where
    C: CaptionSource + ?Sized,
    M: ModelClient + ?Sized,
{
    let mut stage = Stage::Pending;
    let fail = |stage, error| VideoFailure {
        link: link.to_string(),
        stage,
        error,
    };

    let video_id = parse_link(link).map_err(|e| fail(stage, e))?;
    stage = Stage::LinkParsed;
    debug!("{link} -> video {video_id}");

    let raw = captions
        .fetch(&video_id, &opts.languages)
        .await
        .map_err(|e| fail(stage, e))?;
    let transcript = normalize(&raw);
    if transcript.is_empty() {
        return Err(fail(stage, AnalysisError::unavailable(&video_id, "transcript is empty after cleanup")));
    }
    stage = Stage::TranscriptFetched;
    info!("Transcript for {video_id}: {} chars", transcript.len());

    let prompt = compose_prompt(&opts.prompt_template, &transcript);
    let reply = model.ask(&prompt).await.map_err(|e| fail(stage, e))?;
    stage = Stage::ModelQueried;
    debug!("Model reply for {video_id}: {reply}");

    let fields = extract_json(&reply).map_err(|e| fail(stage, e))?;
    stage = Stage::JsonExtracted;
    debug!("{video_id}: {stage}, keys {:?}", fields.keys().collect::<Vec<_>>());

    let transcript = opts.include_transcript.then_some(transcript);
    let record = build_record(link, transcript, fields);
    stage = Stage::RecordBuilt;
    info!("{link}: {stage} with {} fields", record.len());
    Ok(record)
}

/// Merge the link, the transcript and the model's fields into one record.
///
/// `link` always keeps the input URL. A model `transcript` key replaces the
/// fetched transcript in place. String values are trimmed.
pub fn build_record(link: &str, transcript: Option<String>, fields: Map<String, Value>) -> ResultRecord {
    let mut record = ResultRecord::new();
    record.insert(LINK_FIELD.to_string(), Value::String(link.to_string()));
    if let Some(text) = transcript {
        record.insert(TRANSCRIPT_FIELD.to_string(), Value::String(text));
    }

    for (key, value) in fields {
        if key == LINK_FIELD {
            warn!("Ignoring model-supplied `{LINK_FIELD}` for {link}");
            continue;
        }
        let value = match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        };
        record.insert(key, value);
    }

    record
}
