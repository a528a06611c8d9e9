// Failure diagnostics - identifies the likely cause behind a yt-dlp error
//
// The generic troubleshooting tips are always printed; this adds one targeted line
// in front of them when the error text gives the cause away.

/// Reasons a site might refuse or fail a download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingReason {
    /// HTTP 403 Forbidden - general access denied
    Http403Forbidden,

    /// Age-restricted content requiring login
    AgeRestricted,

    /// Geographic restriction
    GeoBlocked,

    /// Network timeout or unreachable host
    NetworkTimeout,

    /// Rate limiting (429 or similar)
    RateLimited,

    /// Bot detection triggered
    BotDetection,

    /// Private video requiring authorization
    PrivateVideo,

    /// Video deleted or unavailable
    VideoUnavailable,

    /// DRM-protected or paid content
    DrmProtected,

    /// Member-only content
    MembersOnly,

    /// Requested format is not offered
    FormatUnavailable,

    /// ffmpeg is needed for merging or audio extraction
    FfmpegMissing,
}

impl BlockingReason {
    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::AgeRestricted => "Age-restricted content; try --cookies-from-browser",
            Self::GeoBlocked => "Geographic restriction; a proxy in another region may help",
            Self::NetworkTimeout => "Network timeout",
            Self::RateLimited => "Rate limited by the site; wait a while before retrying",
            Self::BotDetection => "Bot detection triggered; try --cookies-from-browser",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable (removed or never existed)",
            Self::DrmProtected => "DRM-protected content cannot be downloaded",
            Self::MembersOnly => "Members-only content; cookies of a member account are required",
            Self::FormatUnavailable => "The selected format is not available for this video",
            Self::FfmpegMissing => {
                "ffmpeg is not installed; it is required for merging and audio extraction"
            }
        }
    }

    /// Permanent restrictions have no workaround
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::DrmProtected | Self::VideoUnavailable)
    }
}

/// Analyze error message and return the likely cause
pub fn diagnose_error(error: &str) -> Option<BlockingReason> {
    let lower = error.to_lowercase();

    // Checked in order of specificity

    if lower.contains("ffmpeg")
        && (lower.contains("not found") || lower.contains("not installed"))
    {
        return Some(BlockingReason::FfmpegMissing);
    }

    if lower.contains("drm")
        || lower.contains("widevine")
        || lower.contains("requires purchase")
        || lower.contains("requires payment")
    {
        return Some(BlockingReason::DrmProtected);
    }

    if lower.contains("members only")
        || lower.contains("members-only")
        || lower.contains("join this channel")
        || lower.contains("available to members")
    {
        return Some(BlockingReason::MembersOnly);
    }

    if lower.contains("requested format is not available") {
        return Some(BlockingReason::FormatUnavailable);
    }

    if lower.contains("age-restricted")
        || lower.contains("sign in to confirm your age")
        || lower.contains("inappropriate for some users")
    {
        return Some(BlockingReason::AgeRestricted);
    }

    if lower.contains("private video") || lower.contains("video is private") {
        return Some(BlockingReason::PrivateVideo);
    }

    if lower.contains("video unavailable")
        || lower.contains("video has been removed")
        || lower.contains("no longer available")
    {
        return Some(BlockingReason::VideoUnavailable);
    }

    if lower.contains("not available in your country")
        || lower.contains("blocked it in your country")
        || lower.contains("geo restrict")
        || lower.contains("geo-restrict")
    {
        return Some(BlockingReason::GeoBlocked);
    }

    if lower.contains("429")
        || lower.contains("rate limit")
        || lower.contains("too many requests")
    {
        return Some(BlockingReason::RateLimited);
    }

    if lower.contains("not a bot")
        || lower.contains("captcha")
        || lower.contains("unusual traffic")
        || lower.contains("bot detection")
    {
        return Some(BlockingReason::BotDetection);
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return Some(BlockingReason::Http403Forbidden);
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network is unreachable")
        || lower.contains("name or service not known")
    {
        return Some(BlockingReason::NetworkTimeout);
    }

    None
}
