pub mod workflow;

#[cfg(target_arch = "wasm32")]
mod api;
#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod page;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use tracing::info;
    use wasm_bindgen::prelude::*;

    use crate::{logging::configure_tracing, page};

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        configure_tracing();

        info!("Starting exercise tracker client");
        page::mount().map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
