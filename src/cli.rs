use crate::config::Overrides;
use crate::models::ClickButton;
use camino::Utf8PathBuf;
use clap::Parser;

/// Watch the screen for a button image and click it whenever it appears.
///
/// Flags override `AUTOCLICK_*` environment variables, which override the
/// YAML config file.
#[derive(Debug, Clone, Default, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML config file (defaults to ./autoclick.yaml when present)
    #[arg(long, short = 'c')]
    pub config: Option<Utf8PathBuf>,

    /// Primary template image of the button to click
    #[arg(long, short = 'i')]
    pub image: Option<Utf8PathBuf>,

    /// Directory of additional template images
    #[arg(long)]
    pub images_dir: Option<Utf8PathBuf>,

    /// Ignore any images directory from the config file
    #[arg(long, conflicts_with = "images_dir")]
    pub no_images_dir: bool,

    /// Minimum match score in (0, 1]
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Seconds between detection ticks
    #[arg(long)]
    pub interval: Option<f64>,

    /// Seconds to wait between a detection and the click
    #[arg(long)]
    pub pre_click_delay: Option<f64>,

    /// Seconds to wait after clicking
    #[arg(long)]
    pub after_click: Option<f64>,

    /// Restrict capture to "left,top,width,height"
    #[arg(long, value_name = "L,T,W,H")]
    pub region: Option<String>,

    /// Only act while the focused window title contains this text
    #[arg(long)]
    pub window_title: Option<String>,

    /// Mouse button to click
    #[arg(long, value_enum)]
    pub button: Option<ClickButton>,

    /// Clicks per detection
    #[arg(long)]
    pub clicks: Option<u32>,

    #[arg(long, value_name = "CHORD")]
    pub toggle_hotkey: Option<String>,

    #[arg(long, value_name = "CHORD")]
    pub quit_hotkey: Option<String>,

    /// Stop after this many seconds without a detection (0 disables)
    #[arg(long, value_name = "SECONDS")]
    pub detect_timeout: Option<f64>,

    /// Disable the idle stop entirely
    #[arg(long, conflicts_with = "detect_timeout")]
    pub no_detect_timeout: bool,

    /// Leave the pointer where it clicked
    #[arg(long)]
    pub no_restore_pointer: bool,

    /// Seconds to animate the pointer back after clicking
    #[arg(long)]
    pub restore_duration: Option<f64>,

    /// Verbose logging, no error throttling
    #[arg(long, short = 'd')]
    pub debug: bool,

    #[arg(long)]
    pub log_dir: Option<Utf8PathBuf>,

    /// Emit file logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Write the resolved configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<Utf8PathBuf>,
}

impl Cli {
    /// Flags that were actually given, as config overrides.
    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides::new();
        overrides
            .set_opt("image_path", self.image.as_ref().map(|p| p.to_string()))
            .set_opt("images_dir", self.images_dir.as_ref().map(|p| p.to_string()))
            .set_opt("confidence", self.confidence)
            .set_opt("interval_seconds", self.interval)
            .set_opt("pre_click_delay_seconds", self.pre_click_delay)
            .set_opt("after_click_wait_seconds", self.after_click)
            .set_opt("region", self.region.clone())
            .set_opt("window_title_filter", self.window_title.clone())
            .set_opt("click_button", self.button.map(|b| b.as_str()))
            .set_opt("click_count", self.clicks.map(i64::from))
            .set_opt("toggle_hotkey", self.toggle_hotkey.clone())
            .set_opt("quit_hotkey", self.quit_hotkey.clone())
            .set_opt("idle_timeout_seconds", self.detect_timeout)
            .set_opt("restore_duration_seconds", self.restore_duration)
            .set_opt("log_dir", self.log_dir.as_ref().map(|p| p.to_string()));

        if self.no_images_dir {
            overrides.clear("images_dir");
        }
        if self.no_detect_timeout {
            overrides.set("idle_timeout_seconds", 0.0);
        }
        if self.no_restore_pointer {
            overrides.set("restore_pointer", false);
        }
        if self.debug {
            overrides.set("debug", true);
        }
        if self.log_json {
            overrides.set("log_json", true);
        }
        overrides
    }
}
