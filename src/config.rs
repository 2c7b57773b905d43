use log::Level;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Id of the optional `<script type="application/json">` block holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "landing-fx-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Every selector, threshold and delay the controllers use.
///
/// All fields default, so a partial JSON document only overrides what it names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub navbar: NavbarConfig,
    pub faq: FaqConfig,
    pub particles: ParticleConfig,
    pub reveal: RevealConfig,
    pub pricing: PricingConfig,
    pub showcase: ShowcaseConfig,
    pub scroll_top: ScrollTopConfig,
    pub cursor: CursorConfig,
    pub analytics: AnalyticsConfig,
    pub optimizer: OptimizerConfig,
}

impl Config {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavbarConfig {
    pub selector: String,
    pub mobile_toggle: String,
    pub mobile_menu: String,
    pub mobile_links: String,
    pub anchors: String,
    /// Anchors left to the browser's default handling.
    pub skip_anchors: Vec<String>,
    pub compact_threshold: f64,
    pub hide_after: f64,
    pub header_offset: f64,
    pub throttle_ms: u32,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self {
            selector: "#navbar".to_string(),
            mobile_toggle: "#mobileMenuToggle".to_string(),
            mobile_menu: "#mobileMenu".to_string(),
            mobile_links: ".mobile-nav-link".to_string(),
            anchors: "a[href^=\"#\"]".to_string(),
            skip_anchors: vec!["#".to_string(), "#download".to_string()],
            compact_threshold: 100.0,
            hide_after: 200.0,
            header_offset: 80.0,
            throttle_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqConfig {
    pub item: String,
    pub question: String,
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            item: ".faq-item".to_string(),
            question: ".faq-question".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub container: String,
    pub count: usize,
    /// Full width of the velocity range, centred on zero.
    pub speed_spread: f64,
    pub min_size: f64,
    pub size_spread: f64,
    pub colors: Vec<String>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            container: ".floating-particles".to_string(),
            count: 30,
            speed_spread: 0.5,
            min_size: 2.0,
            size_spread: 4.0,
            colors: vec![
                "rgba(102, 126, 234, 0.3)".to_string(),
                "rgba(118, 75, 162, 0.3)".to_string(),
                "rgba(240, 147, 251, 0.3)".to_string(),
                "rgba(67, 233, 123, 0.3)".to_string(),
                "rgba(79, 172, 254, 0.3)".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub selector: String,
    pub delay_attribute: String,
    pub animate_class: String,
    pub threshold: f64,
    pub root_margin: String,
    /// Fallback check: an element counts once its top is above this share of the viewport.
    pub viewport_fraction: f64,
    pub throttle_ms: u32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selector: "[data-aos]".to_string(),
            delay_attribute: "data-aos-delay".to_string(),
            animate_class: "aos-animate".to_string(),
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
            viewport_fraction: 0.9,
            throttle_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub card: String,
    pub transition: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            card: ".pricing-card".to_string(),
            transition: "transform 0.3s ease, box-shadow 0.3s ease".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowcaseConfig {
    pub trigger: String,
    pub item: String,
    pub media: String,
    pub content: String,
    pub open_delay_ms: u32,
    /// Matches the CSS opacity transition of `.showcase-modal`.
    pub close_delay_ms: u32,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            trigger: ".play-button".to_string(),
            item: ".showcase-item".to_string(),
            media: ".showcase-gif".to_string(),
            content: ".showcase-content".to_string(),
            open_delay_ms: 10,
            close_delay_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollTopConfig {
    pub threshold: f64,
    pub throttle_ms: u32,
}

impl Default for ScrollTopConfig {
    fn default() -> Self {
        Self {
            threshold: 500.0,
            throttle_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub enabled: bool,
    pub min_viewport_width: f64,
    pub smoothing: f64,
    pub hover_targets: String,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_viewport_width: 1024.0,
            smoothing: 0.1,
            hover_targets: "a, button, .feature-card, .pricing-card".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub download_url: String,
    pub social_link: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            download_url: "https://testflight.apple.com/join/rCjyxU41".to_string(),
            social_link: ".social-link".to_string(),
        }
    }
}

impl AnalyticsConfig {
    pub fn download_selector(&self) -> String {
        format!("a[href=\"{}\"]", self.download_url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub lazy_image: String,
    pub source_attribute: String,
    pub link: String,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            lazy_image: "img[data-src]".to_string(),
            source_attribute: "data-src".to_string(),
            link: "a".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let config = Config::from_json(r#"{ "scroll_top": { "threshold": 800 }, "cursor": { "enabled": false } }"#)
            .unwrap();

        assert_eq!(config.scroll_top.threshold, 800.0);
        assert_eq!(config.scroll_top.throttle_ms, 100);
        assert!(!config.cursor.enabled);
        assert_eq!(config.navbar, NavbarConfig::default());
    }

    #[test]
    fn empty_object_is_the_default() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = Config::from_json("{ navbar: ").unwrap_err();
        assert!(matches!(err, crate::FxError::Config(_)));
    }

    #[test]
    fn download_selector_quotes_the_url() {
        let analytics = AnalyticsConfig::default();
        assert_eq!(
            analytics.download_selector(),
            "a[href=\"https://testflight.apple.com/join/rCjyxU41\"]"
        );
    }
}
