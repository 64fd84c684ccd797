//! Extraction strategy selection.
//!
//! Classifying a URL into a platform and building the tool's argument list
//! are pure functions of the URL string, so strategy selection is testable
//! with no I/O. TikTok gets a browser user-agent and referer to pass its
//! anti-bot checks; everything else uses the generic best-video+audio
//! profile merged into mp4.

use std::path::Path;

const TIKTOK_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const TIKTOK_REFERER: &str = "Referer: https://www.tiktok.com/";

/// Source platform of a submitted URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    TikTok,
    YouTubeShorts,
    InstagramReels,
    Generic,
}

impl Platform {
    /// Cheap string classification; independent of runtime state.
    pub fn classify(url: &str) -> Platform {
        let lower = url.to_ascii_lowercase();
        if lower.contains("tiktok.com") {
            Platform::TikTok
        } else if lower.contains("youtube.com/shorts") || lower.contains("youtu.be/") {
            Platform::YouTubeShorts
        } else if lower.contains("instagram.com/reel") {
            Platform::InstagramReels
        } else {
            Platform::Generic
        }
    }

    /// Strategy table entry for this platform.
    pub fn profile(self) -> ExtractionProfile {
        match self {
            Platform::TikTok => ExtractionProfile {
                platform: self,
                format: "mp4",
                container: "mp4",
                header_args: &["--user-agent", TIKTOK_USER_AGENT, "--add-header", TIKTOK_REFERER],
            },
            // Shorts/Reels/generic all want best video+audio in one mp4.
            Platform::YouTubeShorts | Platform::InstagramReels | Platform::Generic => {
                ExtractionProfile {
                    platform: self,
                    format: "bv*+ba/b",
                    container: "mp4",
                    header_args: &[],
                }
            }
        }
    }
}

/// Argument-building recipe for one platform.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionProfile {
    pub platform: Platform,
    /// Format selector passed to the extractor's `-f`.
    pub format: &'static str,
    /// Container extension the finished artifact must carry; the tool is
    /// told to merge/recode into it, and the output scan requires it.
    pub container: &'static str,
    /// Extra header/user-agent arguments, platform specific.
    pub header_args: &'static [&'static str],
}

impl ExtractionProfile {
    /// Full-download argument list for a combined (single invocation) fetch.
    pub fn download_args(&self, url: &str, output_template: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-f".into(),
            self.format.into(),
            "--merge-output-format".into(),
            self.container.into(),
            "--recode-video".into(),
            self.container.into(),
            "--postprocessor-args".into(),
            "ffmpeg:-c:v copy -c:a aac".into(),
            "--no-playlist".into(),
        ];
        args.extend(self.header_args.iter().map(|s| s.to_string()));
        args.push("-o".into());
        args.push(output_template.to_string_lossy().into_owned());
        args.push(url.into());
        args
    }

    /// Argument list for one leg of the split strategy: `"bv*"` for the video
    /// stream or `"ba"` for the audio stream, no merge directives.
    pub fn stream_args(&self, selector: &str, url: &str, output_template: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec!["-f".into(), selector.into(), "--no-playlist".into()];
        args.extend(self.header_args.iter().map(|s| s.to_string()));
        args.push("-o".into());
        args.push(output_template.to_string_lossy().into_owned());
        args.push(url.into());
        args
    }

    /// Metadata-only probe printing the media duration in seconds.
    pub fn probe_args(&self, url: &str) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--print".into(),
            "duration".into(),
            "--skip-download".into(),
            "--no-playlist".into(),
        ];
        args.extend(self.header_args.iter().map(|s| s.to_string()));
        args.push(url.into());
        args
    }
}

/// Argument list for the merge tool joining a video-only and audio-only file.
pub fn merge_args(video: &Path, audio: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-i".into(),
        video.to_string_lossy().into_owned(),
        "-i".into(),
        audio.to_string_lossy().into_owned(),
        "-c:v".into(),
        "copy".into(),
        "-c:a".into(),
        "aac".into(),
        output.to_string_lossy().into_owned(),
    ]
}
