//! WebAssembly bindings for Sort Replay.
//!
//! JavaScript sort functions are called as `sortFn(array, recorder)` with a
//! plain JS array and a [`WasmRecorder`]; playback paints through a JS
//! `draw(x, y, width, height, color)` callback and is paced by
//! `requestAnimationFrame`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Array, Function, Reflect};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::{
    animation::{Color, FrameClock, FrameHandle, PlaybackEngine, Surface},
    schema::{Distribution, PlaybackConfig},
    trace::{ArrayStore, Recorder, StepRecord, Trace, generate},
};

/// Delay used when `requestAnimationFrame` is unavailable.
const FALLBACK_INTERVAL_MS: f64 = 16.0;

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

/// JS array of numbers used as instrumented storage.
struct JsArray<'a>(&'a Array);

impl ArrayStore for JsArray<'_> {
    fn len(&self) -> usize {
        self.0.length() as usize
    }

    fn read(&self, index: usize) -> i64 {
        self.0.get(index as u32).as_f64().unwrap_or(0.0) as i64
    }

    fn write(&mut self, index: usize, value: i64) {
        self.0.set(index as u32, JsValue::from_f64(value as f64));
    }
}

fn check_index(array: &Array, index: usize) -> Result<(), JsValue> {
    let len = array.length() as usize;
    if index < len {
        Ok(())
    } else {
        Err(JsValue::from_str(&format!(
            "Index {index} out of range for array of length {len}"
        )))
    }
}

/// Instrumented operations handed to JavaScript sort functions.
///
/// Values are stored as `i64`; fractional JS numbers passed in are
/// truncated toward zero, so `cmp(array, i, 2.5)` against a stored `2`
/// yields `0`. Indices outside the array throw.
#[wasm_bindgen]
pub struct WasmRecorder {
    inner: Rc<RefCell<Recorder>>,
}

#[wasm_bindgen]
impl WasmRecorder {
    /// `array[index] - value`, recorded as one compare.
    #[wasm_bindgen]
    pub fn cmp(&self, array: &Array, index: usize, value: f64) -> Result<f64, JsValue> {
        check_index(array, index)?;
        Ok(self
            .inner
            .borrow_mut()
            .compare(&JsArray(array), index, value as i64) as f64)
    }

    #[wasm_bindgen]
    pub fn gt(&self, array: &Array, index: usize, value: f64) -> Result<bool, JsValue> {
        check_index(array, index)?;
        Ok(self.inner.borrow_mut().gt(&JsArray(array), index, value as i64))
    }

    #[wasm_bindgen]
    pub fn lt(&self, array: &Array, index: usize, value: f64) -> Result<bool, JsValue> {
        check_index(array, index)?;
        Ok(self.inner.borrow_mut().lt(&JsArray(array), index, value as i64))
    }

    #[wasm_bindgen]
    pub fn ge(&self, array: &Array, index: usize, value: f64) -> Result<bool, JsValue> {
        check_index(array, index)?;
        Ok(self.inner.borrow_mut().ge(&JsArray(array), index, value as i64))
    }

    #[wasm_bindgen]
    pub fn le(&self, array: &Array, index: usize, value: f64) -> Result<bool, JsValue> {
        check_index(array, index)?;
        Ok(self.inner.borrow_mut().le(&JsArray(array), index, value as i64))
    }

    #[wasm_bindgen]
    pub fn eq(&self, array: &Array, index: usize, value: f64) -> Result<bool, JsValue> {
        check_index(array, index)?;
        Ok(self.inner.borrow_mut().eq(&JsArray(array), index, value as i64))
    }

    #[wasm_bindgen]
    pub fn ne(&self, array: &Array, index: usize, value: f64) -> Result<bool, JsValue> {
        check_index(array, index)?;
        Ok(self.inner.borrow_mut().ne(&JsArray(array), index, value as i64))
    }

    #[wasm_bindgen]
    pub fn swap(&self, array: &Array, a: usize, b: usize) -> Result<(), JsValue> {
        check_index(array, a)?;
        check_index(array, b)?;
        self.inner.borrow_mut().swap(&mut JsArray(array), a, b);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn copy(&self, array: &Array, src: usize, dst: usize) -> Result<(), JsValue> {
        check_index(array, src)?;
        check_index(array, dst)?;
        self.inner.borrow_mut().copy(&mut JsArray(array), src, dst);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set(&self, array: &Array, index: usize, value: f64) -> Result<(), JsValue> {
        check_index(array, index)?;
        self.inner
            .borrow_mut()
            .set(&mut JsArray(array), index, value as i64);
        Ok(())
    }
}

/// Surface forwarding fills to a JS `draw(x, y, width, height, color)`.
struct JsSurface {
    draw: Function,
    width: f64,
    height: f64,
}

impl Surface for JsSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        let args = Array::new();
        args.push(&JsValue::from_f64(x));
        args.push(&JsValue::from_f64(y));
        args.push(&JsValue::from_f64(width));
        args.push(&JsValue::from_f64(height));
        args.push(&JsValue::from_str(color.css()));
        if let Err(e) = self.draw.apply(&JsValue::NULL, &args) {
            log::warn!("draw callback failed: {:?}", e);
        }
    }
}

enum RequestId {
    AnimationFrame(JsValue),
    Timeout(JsValue),
}

/// `requestAnimationFrame` clock, falling back to `setTimeout`.
struct AnimationFrameClock {
    next_id: u64,
    listener: Rc<dyn Fn(FrameHandle)>,
    pending: Option<(FrameHandle, RequestId)>,
}

impl AnimationFrameClock {
    fn new(listener: Rc<dyn Fn(FrameHandle)>) -> Self {
        Self {
            next_id: 0,
            listener,
            pending: None,
        }
    }
}

fn global_function(global: &js_sys::Object, name: &str) -> Option<Function> {
    Reflect::get(global, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

impl FrameClock for AnimationFrameClock {
    fn request(&mut self) -> FrameHandle {
        let handle = FrameHandle::new(self.next_id);
        self.next_id += 1;

        let listener = Rc::clone(&self.listener);
        let callback = Closure::once_into_js(move || listener(handle));

        let global = js_sys::global();
        let request = match global_function(&global, "requestAnimationFrame") {
            Some(raf) => raf.call1(&global, &callback).ok().map(RequestId::AnimationFrame),
            None => None,
        }
        .or_else(|| {
            let timeout = global_function(&global, "setTimeout")?;
            timeout
                .call2(&global, &callback, &JsValue::from_f64(FALLBACK_INTERVAL_MS))
                .ok()
                .map(RequestId::Timeout)
        });

        match request {
            Some(id) => self.pending = Some((handle, id)),
            None => log::error!("No frame timer available; playback stalled"),
        }
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        let Some((h, id)) = self.pending.take() else {
            return;
        };
        if h != handle {
            self.pending = Some((h, id));
            return;
        }

        let global = js_sys::global();
        let (name, id) = match id {
            RequestId::AnimationFrame(id) => ("cancelAnimationFrame", id),
            RequestId::Timeout(id) => ("clearTimeout", id),
        };
        if let Some(f) = global_function(&global, name) {
            if let Err(e) = f.call1(&global, &id) {
                log::warn!("{} failed: {:?}", name, e);
            }
        }
    }

    fn next_frame(&mut self) -> Option<FrameHandle> {
        // Frames are delivered by the browser through the listener.
        None
    }
}

type WasmEngine = PlaybackEngine<JsSurface, AnimationFrameClock>;
type EngineSlot = Rc<RefCell<Option<WasmEngine>>>;

/// Buffers frame notifications so `onFrame` runs after the engine is released.
struct FrameRelay {
    queued: RefCell<Vec<bool>>,
    on_frame: Function,
}

impl FrameRelay {
    fn flush(&self) {
        let queued = std::mem::take(&mut *self.queued.borrow_mut());
        for more in queued {
            if let Err(e) = self.on_frame.call1(&JsValue::NULL, &JsValue::from_bool(more)) {
                log::warn!("onFrame callback failed: {:?}", e);
            }
        }
    }
}

fn deliver_frame(slot: &Weak<RefCell<Option<WasmEngine>>>, relay: &FrameRelay, handle: FrameHandle) {
    let Some(slot) = slot.upgrade() else {
        return;
    };
    let result = match slot.try_borrow_mut() {
        Ok(mut guard) => match guard.as_mut() {
            Some(engine) => engine.on_frame(handle).map(|_| ()),
            None => Ok(()),
        },
        Err(_) => {
            log::warn!("Frame {} delivered while engine busy", handle.id());
            Ok(())
        }
    };
    relay.flush();
    if let Err(e) = result {
        wasm_bindgen::throw_str(&e.to_string());
    }
}

/// Records JavaScript sorts and replays them onto a canvas-like target.
#[wasm_bindgen]
pub struct WasmSortVisualizer {
    draw: Function,
    width: f64,
    height: f64,
    config: PlaybackConfig,
    trace: Option<Trace>,
    engine: EngineSlot,
}

#[wasm_bindgen]
impl WasmSortVisualizer {
    /// Create a visualizer drawing into a `width` x `height` region through
    /// `draw(x, y, w, h, cssColor)`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, draw: Function) -> WasmSortVisualizer {
        WasmSortVisualizer {
            draw,
            width,
            height,
            config: PlaybackConfig::default(),
            trace: None,
            engine: Rc::new(RefCell::new(None)),
        }
    }

    /// Override cycles per frame and the restore threshold.
    #[wasm_bindgen(js_name = setPacing)]
    pub fn set_pacing(&mut self, cycles_per_frame: u32, restore_threshold: u32) -> Result<(), JsValue> {
        let config = PlaybackConfig {
            cycles_per_frame: cycles_per_frame as u64,
            restore_threshold: restore_threshold as u64,
        };
        config
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.config = config;
        Ok(())
    }

    /// Generate an array and record `sortFn(array, recorder)` over it.
    ///
    /// `kind` is a distribution name (`random` when omitted).
    #[wasm_bindgen(js_name = runSort)]
    pub fn run_sort(&mut self, sort_fn: &Function, size: usize, kind: Option<String>) -> Result<(), JsValue> {
        let distribution = match kind.as_deref() {
            Some(name) => name
                .parse::<Distribution>()
                .map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Distribution::default(),
        };

        let mut rng = StdRng::from_entropy();
        let (values, _) = generate(size, distribution, &mut rng);
        let array: Array = values.iter().map(|&v| JsValue::from_f64(v as f64)).collect();

        let recorder = Rc::new(RefCell::new(Recorder::new()));
        recorder.borrow_mut().record_start(&JsArray(&array));

        let handle = WasmRecorder {
            inner: Rc::clone(&recorder),
        };
        sort_fn.call2(&JsValue::NULL, &array, &JsValue::from(handle))?;

        let recorder = std::mem::take(&mut *recorder.borrow_mut());
        log::debug!("Recorded {} steps for {} elements", recorder.len(), size);
        let trace = recorder.finish();
        // Drivers may grow the array directly; recorded steps must stay
        // within the generated cells.
        trace
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.trace = Some(trace);
        Ok(())
    }

    /// Load a trace recorded elsewhere, as an array of
    /// `{ index, value, type }` objects.
    #[wasm_bindgen(js_name = loadTrace)]
    pub fn load_trace(&mut self, steps: JsValue) -> Result<(), JsValue> {
        let records: Vec<StepRecord> = serde_wasm_bindgen::from_value(steps)
            .map_err(|e| JsValue::from_str(&format!("Invalid trace: {e}")))?;
        let trace = Trace::from_records(records).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.trace = Some(trace);
        Ok(())
    }

    /// Replay the recorded trace, calling `onFrame(morePending)` per frame.
    #[wasm_bindgen]
    pub fn playback(&mut self, on_frame: Function) -> Result<(), JsValue> {
        let trace = self
            .trace
            .clone()
            .ok_or_else(|| JsValue::from_str("No trace recorded"))?;

        // Tear down any previous run first; dropping cancels its frame.
        self.engine
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Cannot restart playback while a frame is being drawn"))?
            .take();

        let relay = Rc::new(FrameRelay {
            queued: RefCell::new(Vec::new()),
            on_frame,
        });
        let slot = Rc::downgrade(&self.engine);
        let listener: Rc<dyn Fn(FrameHandle)> = {
            let relay = Rc::clone(&relay);
            Rc::new(move |handle| deliver_frame(&slot, &relay, handle))
        };
        let surface = JsSurface {
            draw: self.draw.clone(),
            width: self.width,
            height: self.height,
        };
        let mut engine = PlaybackEngine::new(surface, AnimationFrameClock::new(listener), self.config);

        engine
            .play(trace, move |more| relay.queued.borrow_mut().push(more))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        *self.engine.borrow_mut() = Some(engine);
        Ok(())
    }

    /// Statistic by name: `start`, `cmp`, `swap`, `copy`, `set` or `cycles`.
    ///
    /// Returns 0 while a frame is being painted (e.g. from `draw`).
    #[wasm_bindgen]
    pub fn get(&self, kind: &str) -> f64 {
        self.engine
            .try_borrow()
            .ok()
            .and_then(|slot| slot.as_ref().map(|e| e.get_named(kind)))
            .unwrap_or(0) as f64
    }

    /// All statistics as an object.
    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> Result<JsValue, JsValue> {
        let snapshot = self
            .engine
            .try_borrow()
            .ok()
            .and_then(|slot| slot.as_ref().map(|e| e.counters().snapshot()))
            .unwrap_or_default();
        serde_wasm_bindgen::to_value(&snapshot)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Current playback state name; `Painting` while a frame is being drawn.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        match self.engine.try_borrow() {
            Ok(slot) => slot
                .as_ref()
                .map_or_else(|| "Idle".to_string(), |e| format!("{:?}", e.state())),
            Err(_) => "Painting".to_string(),
        }
    }

    /// Stop playback, leaving the drawing as it is.
    #[wasm_bindgen]
    pub fn destroy(&mut self) {
        match self.engine.try_borrow_mut() {
            Ok(mut slot) => drop(slot.take()),
            Err(_) => log::warn!("destroy ignored while a frame is being drawn"),
        }
    }
}
