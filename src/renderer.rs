//! Result view for a completed job.

use serde::{Deserialize, Serialize};

use crate::types::{JobId, JobResult, JobSnapshot};

/// Which by-product a text block holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    /// Speech recognized from the source video
    Transcript,
    /// Transcript translated to the target language
    Translated,
    /// Translation rewritten for narration
    Optimized,
}

impl TextKind {
    /// Heading shown above the block
    pub fn label(&self) -> &'static str {
        match self {
            TextKind::Transcript => "Original transcript",
            TextKind::Translated => "Translated text",
            TextKind::Optimized => "Optimized text",
        }
    }
}

/// A labeled text block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Which by-product this is
    pub kind: TextKind,
    /// Heading
    pub label: String,
    /// Body
    pub text: String,
}

/// What the result surface shows once a job completes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultView {
    /// The completed job
    pub job_id: JobId,
    /// Source for an embedded player
    pub video_src: String,
    /// Direct download link
    pub download_url: String,
    /// Text blocks in display order: transcript, translated, optimized
    pub text_blocks: Vec<TextBlock>,
    /// False when there are no text blocks; the whole panel is hidden then
    pub show_text_panel: bool,
}

impl ResultView {
    /// Block of the given kind, if it is shown
    pub fn block(&self, kind: TextKind) -> Option<&TextBlock> {
        self.text_blocks.iter().find(|b| b.kind == kind)
    }

    /// The by-products as a plain data record
    pub fn to_job_result(&self) -> JobResult {
        let text = |kind| self.block(kind).map(|b| b.text.clone());
        JobResult {
            download_url: self.download_url.clone(),
            transcript: text(TextKind::Transcript),
            translated: text(TextKind::Translated),
            optimized: text(TextKind::Optimized),
        }
    }
}

/// Locator of the processed video for a job
pub fn download_url(base_url: &str, job_id: &JobId) -> String {
    format!(
        "{}/api/download/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(job_id.as_str())
    )
}

/// Compose the result view from a terminal `completed` payload
///
/// The player and download link are always present; text blocks only for fields that
/// are present and non-empty.
pub fn render_result(base_url: &str, job_id: &JobId, snapshot: &JobSnapshot) -> ResultView {
    let url = download_url(base_url, job_id);

    let text_blocks: Vec<TextBlock> = [
        (TextKind::Transcript, &snapshot.transcript),
        (TextKind::Translated, &snapshot.translated),
        (TextKind::Optimized, &snapshot.optimized),
    ]
    .into_iter()
    .filter_map(|(kind, text)| match text {
        Some(text) if !text.trim().is_empty() => Some(TextBlock {
            kind,
            label: kind.label().to_string(),
            text: text.clone(),
        }),
        _ => None,
    })
    .collect();

    ResultView {
        job_id: job_id.clone(),
        video_src: url.clone(),
        download_url: url,
        show_text_panel: !text_blocks.is_empty(),
        text_blocks,
    }
}
