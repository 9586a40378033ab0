/// Window configuration

/// Requested window shape and presentation settings
///
/// Width and height are signed requests: non-positive values are rejected
/// with `Error::InvalidDimensions` when the window is created. Backends may
/// snap the request to a supported mode; callers must read the actual size
/// back from the window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub width: i32,
    pub height: i32,
    /// Honour framebuffer resize notifications
    pub resizable: bool,
    /// Create the window hidden (desktop headless runs)
    pub invisible: bool,
    /// Vertical refreshes to wait per swap (0 = as fast as possible)
    pub swap_interval: u32,
    /// Requested (major, minor) API version (desktop only)
    pub api_version: (u32, u32),
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            resizable: false,
            invisible: false,
            swap_interval: 1,
            api_version: (3, 3),
            title: String::from("Twinscan"),
        }
    }
}

impl WindowConfig {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_invisible(mut self, invisible: bool) -> Self {
        self.invisible = invisible;
        self
    }

    pub fn with_swap_interval(mut self, interval: u32) -> Self {
        self.swap_interval = interval;
        self
    }

    pub fn with_api_version(mut self, major: u32, minor: u32) -> Self {
        self.api_version = (major, minor);
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Whether the requested size can be handed to an allocator
    pub fn has_valid_size(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WindowConfig::default();
        assert_eq!((config.width, config.height), (1280, 720));
        assert!(!config.resizable);
        assert!(!config.invisible);
        assert_eq!(config.swap_interval, 1);
        assert_eq!(config.api_version, (3, 3));
    }

    #[test]
    fn test_builders() {
        let config = WindowConfig::new(100, 100)
            .with_resizable(true)
            .with_invisible(true)
            .with_swap_interval(0)
            .with_api_version(4, 1)
            .with_title("demo");

        assert_eq!((config.width, config.height), (100, 100));
        assert!(config.resizable);
        assert!(config.invisible);
        assert_eq!(config.swap_interval, 0);
        assert_eq!(config.api_version, (4, 1));
        assert_eq!(config.title, "demo");
    }

    #[test]
    fn test_valid_size() {
        assert!(WindowConfig::new(1, 1).has_valid_size());
        assert!(!WindowConfig::new(0, 10).has_valid_size());
        assert!(!WindowConfig::new(10, -1).has_valid_size());
        assert!(!WindowConfig::default().with_size(-5, -5).has_valid_size());
    }
}
