//! Noverlap - WASM Module
//!
//! Anti-collision layout for 2-D graph drawings, compiled to WebAssembly
//! with a JavaScript-friendly API via wasm-bindgen. One call performs a
//! single relaxation iteration over a flat node matrix; the JS driver
//! (typically a web worker supervisor) loops on the returned convergence
//! flag and owns the iteration budget.
//!
//! # Architecture
//!
//! - `matrix`: typed view over the flat stride-5 node buffer
//! - `spatial`: layout extent and uniform grid for candidate queries
//! - `layout`: the noverlap iteration itself
//! - `error`: input validation errors

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod layout;
pub mod matrix;
pub mod spatial;

use error::NoverlapError;
use layout::NoverlapSettings;
use matrix::PPN;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_err(err: NoverlapError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Perform one layout iteration on a caller-owned node buffer.
///
/// This is the web-worker contract: `settings` is a plain JS object
/// (`margin`, `ratio`, `expansion`, `gridSize`, `speed`, all optional),
/// `nodes` is a Float32Array of stride-5 records `[x, y, size, fixed,
/// hidden]` mutated in place. Returns `{ converged }`.
#[wasm_bindgen(js_name = iterate)]
pub fn iterate_js(settings: JsValue, nodes: &mut [f32]) -> Result<JsValue, JsValue> {
    let settings: NoverlapSettings = serde_wasm_bindgen::from_value(settings)?;
    let result = layout::iterate(&settings, nodes).map_err(js_err)?;
    Ok(serde_wasm_bindgen::to_value(&result)?)
}

/// Main entry point for drivers that keep node data in wasm memory.
///
/// Owns the node matrix across iterations so the JS side can read
/// positions through zero-copy views instead of transferring the buffer
/// back and forth on every step.
#[wasm_bindgen]
pub struct NoverlapWasm {
    matrix: Vec<f32>,
    settings: NoverlapSettings,
}

#[wasm_bindgen]
impl NoverlapWasm {
    /// Create a new engine with default settings and no nodes.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            matrix: Vec::new(),
            settings: NoverlapSettings::default(),
        }
    }

    /// Create an engine with pre-allocated capacity.
    ///
    /// # Arguments
    ///
    /// * `node_capacity` - Expected number of nodes
    #[wasm_bindgen(js_name = withCapacity)]
    pub fn with_capacity(node_capacity: usize) -> Self {
        Self {
            matrix: Vec::with_capacity(node_capacity * PPN),
            settings: NoverlapSettings::default(),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the layout settings from a JS settings object.
    ///
    /// Missing fields fall back to the graphology noverlap defaults.
    pub fn configure(&mut self, settings: JsValue) -> Result<(), JsValue> {
        let settings: NoverlapSettings = serde_wasm_bindgen::from_value(settings)?;
        settings.validate().map_err(js_err)?;
        self.settings = settings;
        Ok(())
    }

    // =========================================================================
    // Node Matrix Access
    // =========================================================================

    /// Load the node matrix from a flat stride-5 array.
    ///
    /// Replaces any previously loaded nodes.
    #[wasm_bindgen(js_name = setNodes)]
    pub fn set_nodes(&mut self, nodes: &[f32]) -> Result<(), JsValue> {
        if nodes.len() % PPN != 0 {
            return Err(js_err(NoverlapError::BadStride {
                len: nodes.len(),
                stride: PPN,
            }));
        }
        self.matrix.clear();
        self.matrix.extend_from_slice(nodes);
        Ok(())
    }

    /// Get the number of nodes in the matrix.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        (self.matrix.len() / PPN) as u32
    }

    /// Get a node's X position.
    #[wasm_bindgen(js_name = getNodeX)]
    pub fn get_node_x(&self, index: usize) -> Option<f32> {
        self.matrix.get(index * PPN).copied()
    }

    /// Get a node's Y position.
    #[wasm_bindgen(js_name = getNodeY)]
    pub fn get_node_y(&self, index: usize) -> Option<f32> {
        self.matrix.get(index * PPN + 1).copied()
    }

    /// Set a node's position.
    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, index: usize, x: f32, y: f32) {
        if let Some(slot) = self.matrix.get_mut(index * PPN..index * PPN + 2) {
            slot[0] = x;
            slot[1] = y;
        }
    }

    /// Clear all nodes.
    pub fn clear(&mut self) {
        self.matrix.clear();
    }

    // =========================================================================
    // Matrix Buffer Access (Zero-Copy)
    // =========================================================================

    /// Get a zero-copy view of the node matrix.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Use immediately, do not store.
    #[wasm_bindgen(js_name = matrixView)]
    pub fn matrix_view(&self) -> Float32Array {
        unsafe { Float32Array::view(&self.matrix) }
    }

    /// Get a pointer to the node matrix buffer.
    ///
    /// Used for creating views after WASM memory growth.
    #[wasm_bindgen(js_name = matrixPtr)]
    pub fn matrix_ptr(&self) -> *const f32 {
        self.matrix.as_ptr()
    }

    /// Get the length of the node matrix buffer in floats.
    #[wasm_bindgen(js_name = matrixLen)]
    pub fn matrix_len(&self) -> usize {
        self.matrix.len()
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Perform one layout iteration in place.
    ///
    /// Returns true once no overlapping pair remains; the caller decides
    /// whether to keep iterating.
    pub fn iterate(&mut self) -> Result<bool, JsValue> {
        self.warn_if_all_hidden();
        let result = layout::iterate(&self.settings, &mut self.matrix).map_err(js_err)?;
        Ok(result.converged)
    }
}

impl NoverlapWasm {
    /// Log a console warning when every node is hidden, which makes the
    /// iteration a no-op.
    fn warn_if_all_hidden(&self) {
        #[cfg(target_arch = "wasm32")]
        {
            let all_hidden = !self.matrix.is_empty()
                && self.matrix.chunks_exact(PPN).all(|node| node[4] == 1.0);
            if all_hidden {
                web_sys::console::warn_1(
                    &"noverlap: every node is hidden, nothing to lay out".into(),
                );
            }
        }
    }
}

impl Default for NoverlapWasm {
    fn default() -> Self {
        Self::new()
    }
}
