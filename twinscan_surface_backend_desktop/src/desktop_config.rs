/// Desktop backend configuration

/// Default name of the presentation shader
pub const DEFAULT_SCREEN_SHADER: &str = "screen_quad";

#[derive(Debug, Clone, PartialEq)]
pub struct DesktopConfig {
    /// Monitor refresh rate driving the frame pacer (Hz)
    pub refresh_rate: u32,
    /// Shader program drawing the offscreen texture to the window
    pub screen_shader: String,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            refresh_rate: 60,
            screen_shader: DEFAULT_SCREEN_SHADER.to_string(),
        }
    }
}

impl DesktopConfig {
    pub fn with_refresh_rate(mut self, hz: u32) -> Self {
        self.refresh_rate = hz;
        self
    }

    pub fn with_screen_shader(mut self, name: &str) -> Self {
        self.screen_shader = name.to_string();
        self
    }
}
