//! svat-replay: run a recorded interaction session through the widget.
//!
//! Usage: `svat-replay [session.json]` (reads stdin when no path is given).
//! The session names the spectrogram, image size, panel rectangle, optional
//! widget settings and a list of messages. The resulting snapshot, frame and
//! events are printed as JSON.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = replay::run() {
        eprintln!("svat-replay: {}", e);
        std::process::exit(1);
    }
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod replay {
    use std::io::Read;

    use serde::{Deserialize, Serialize};
    use svat::{
        Frame, ImageDetails, PanelRect, Result, SpectrogramConfig, SpectrogramWidget, WidgetConfig,
        WidgetEvent, WidgetMessage, WidgetSnapshot,
    };

    #[derive(Deserialize)]
    struct Session {
        config: SpectrogramConfig,
        image: ImageDetails,
        panel: PanelRect,
        /// Raw so the version check in `WidgetConfig::from_json` applies
        #[serde(default)]
        settings: Option<serde_json::Value>,
        #[serde(default)]
        messages: Vec<WidgetMessage>,
    }

    #[derive(Serialize)]
    struct Report {
        snapshot: WidgetSnapshot,
        frame: Frame,
        events: Vec<WidgetEvent>,
        /// Messages the widget rejected, as (index, error)
        rejected: Vec<(usize, String)>,
    }

    pub fn run() -> Result<()> {
        let input = match std::env::args().nth(1) {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };
        let session: Session = serde_json::from_str(&input)?;
        let settings = match &session.settings {
            Some(value) => WidgetConfig::from_json(&value.to_string())?,
            None => WidgetConfig::default(),
        };

        // Configured level unless RUST_LOG says otherwise
        env_logger::Builder::new()
            .filter_level(settings.preferences.log_level.to_level_filter())
            .parse_default_env()
            .format_timestamp_millis()
            .init();
        log::debug!("Log level {}", settings.preferences.log_level.name());

        let mut widget =
            SpectrogramWidget::new(session.config, session.image, settings, session.panel)?;
        log::info!("▶️ Replaying {} messages", session.messages.len());

        let mut events = Vec::new();
        let mut rejected = Vec::new();
        for (index, message) in session.messages.into_iter().enumerate() {
            if let Err(e) = widget.update(message) {
                log::warn!("⚠️ Message {} rejected: {}", index, e);
                rejected.push((index, e.to_string()));
            }
            events.extend(widget.take_events());
        }

        let report = Report {
            snapshot: widget.snapshot(),
            frame: widget.render(),
            events,
            rejected,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}
