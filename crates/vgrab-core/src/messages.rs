//! User-facing chat texts. Every terminal job state maps to exactly one of
//! these; diagnostic detail stays in the log.

pub const WELCOME: &str = "Welcome! I download videos from TikTok, YouTube Shorts and Reels.\n\
     Just send me a link.";

pub const HOW_TO: &str = "How to download:\n\
     1. Copy the video link\n\
     2. Paste it into this chat\n\
     3. Wait\n\
     4. Receive the file";

pub const ABOUT: &str = "I fetch short videos with sound.\n\
     TikTok / Shorts / Reels supported.";

pub const SEND_LINK: &str = "Send me a link:";

pub const CHECKING: &str = "Checking the video...";
pub const DOWNLOADING: &str = "Downloading...";
pub const SENDING: &str = "Sending the video...";

pub const DONE: &str = "Done! Video downloaded with sound.";
pub const CAPTION: &str = "Saved via vgrab";

pub const NOT_A_LINK: &str = "That does not look like a link.";
pub const STILL_PROCESSING: &str = "Your previous video is still processing. Wait for it to finish.";
pub const DOWNLOAD_FAILED: &str = "Download failed. Try another link.";
pub const TOOK_TOO_LONG: &str = "The download took too long and was stopped.";
pub const TOO_LARGE: &str = "The video is too large to send.";
pub const TOO_LONG: &str = "The video is longer than the allowed duration.";
pub const SEND_FAILED: &str = "The video was downloaded but could not be delivered.";
