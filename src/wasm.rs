//! Browser bindings.
//!
//! The page hands the widget JSON documents (configuration, messages) and
//! receives JSON back (frames, snapshots, events), so the JS side only needs
//! `JSON.parse` / `JSON.stringify`.

use wasm_bindgen::prelude::*;

use crate::config::{ImageDetails, LogLevel, SpectrogramConfig, WidgetConfig};
use crate::coords::PanelRect;
use crate::message::WidgetMessage;
use crate::widget::SpectrogramWidget;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Install the console logger at the configured level. Later widgets on the
/// same page only adjust the level.
fn init_logging(level: LogLevel) {
    if console_log::init_with_level(level.to_level()).is_err() {
        log::set_max_level(level.to_level_filter());
    }
    log::info!("🎛️ SVAT WASM loaded, log level {}", level.name());
}

#[wasm_bindgen]
pub struct WasmWidget {
    inner: SpectrogramWidget,
}

#[wasm_bindgen]
impl WasmWidget {
    /// `config_json` is a `SpectrogramConfig`; `settings_json` an optional
    /// `WidgetConfig` document (defaults are used when absent).
    #[wasm_bindgen(constructor)]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config_json: &str,
        image_width: u32,
        image_height: u32,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        settings_json: Option<String>,
    ) -> Result<WasmWidget, JsError> {
        let config: SpectrogramConfig = serde_json::from_str(config_json)?;
        let settings = match settings_json {
            Some(json) => WidgetConfig::from_json(&json)?,
            None => WidgetConfig::default(),
        };
        init_logging(settings.preferences.log_level);

        let inner = SpectrogramWidget::new(
            config,
            ImageDetails::new(image_width, image_height),
            settings,
            PanelRect::new(left, top, width, height),
        )?;
        Ok(Self { inner })
    }

    /// Apply one JSON-encoded `WidgetMessage`.
    pub fn update(&mut self, message_json: &str) -> Result<(), JsError> {
        let message: WidgetMessage = serde_json::from_str(message_json)?;
        self.inner.update(message)?;
        Ok(())
    }

    /// Current frame (draw items + read-out) as JSON.
    pub fn render(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.inner.render())?)
    }

    /// Mode, viewport and feature catalog as JSON.
    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.inner.snapshot())?)
    }

    /// Pending change events as a JSON array.
    #[wasm_bindgen(js_name = takeEvents)]
    pub fn take_events(&mut self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.inner.take_events())?)
    }

    #[wasm_bindgen(js_name = addHarmonicSet)]
    pub fn add_harmonic_set(&mut self, spacing: f64) -> Result<u32, JsError> {
        Ok(self.inner.add_harmonic_set(spacing)?)
    }

    #[wasm_bindgen(js_name = deleteMarker)]
    pub fn delete_marker(&mut self, id: u32) -> Result<(), JsError> {
        Ok(self.inner.delete_marker(id)?)
    }

    #[wasm_bindgen(js_name = deleteHarmonicSet)]
    pub fn delete_harmonic_set(&mut self, id: u32) -> Result<(), JsError> {
        Ok(self.inner.delete_harmonic_set(id)?)
    }

    pub fn resize(&mut self, left: f64, top: f64, width: f64, height: f64) -> Result<(), JsError> {
        Ok(self.inner.resize(PanelRect::new(left, top, width, height))?)
    }

    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    #[wasm_bindgen(js_name = isDirty)]
    pub fn is_dirty(&self) -> bool {
        self.inner.is_dirty()
    }

    #[wasm_bindgen(js_name = clearDirty)]
    pub fn clear_dirty(&mut self) {
        self.inner.clear_dirty();
    }
}
