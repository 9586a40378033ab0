/// Supported TV output modes and size negotiation

use crate::console_display::{TvRenderMode, TvScanMode};

/// One supported TV output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TvMode {
    pub width: u32,
    pub height: u32,
    pub render_mode: TvRenderMode,
    /// Smallest request (width, height) that selects this mode
    pub min_request: (u32, u32),
}

/// Supported modes, largest first
pub const TV_MODES: [TvMode; 4] = [
    TvMode { width: 1920, height: 1080, render_mode: TvRenderMode::Wide1080p, min_request: (1920, 1080) },
    TvMode { width: 1280, height: 720, render_mode: TvRenderMode::Wide720p, min_request: (1280, 720) },
    TvMode { width: 854, height: 480, render_mode: TvRenderMode::Wide480p, min_request: (850, 480) },
    TvMode { width: 640, height: 480, render_mode: TvRenderMode::Standard480p, min_request: (640, 480) },
];

/// Fallback for requests smaller than every mode
pub const SMALLEST_MODE: TvMode = TV_MODES[3];

/// Pick the largest mode the request covers in both dimensions
///
/// 1080p is skipped when the system TV runs an interlaced SD scan mode.
/// Requests below every threshold get the smallest mode.
pub fn select_tv_mode(width: u32, height: u32, scan_mode: TvScanMode) -> TvMode {
    TV_MODES
        .iter()
        .filter(|mode| !(mode.render_mode == TvRenderMode::Wide1080p && scan_mode.is_interlaced_sd()))
        .find(|mode| width >= mode.min_request.0 && height >= mode.min_request.1)
        .copied()
        .unwrap_or(SMALLEST_MODE)
}

#[cfg(test)]
#[path = "console_mode_table_tests.rs"]
mod tests;
