use crate::core::{AcquireError, AcquireFuture, AudioBackend, AudioInput, DetectorConfig};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// `getUserMedia` + WebAudio analyser backend.
pub struct BrowserAudio {
    window: web::Window,
}

impl BrowserAudio {
    pub fn new(window: web::Window) -> Self {
        Self { window }
    }
}

impl AudioBackend for BrowserAudio {
    type Input = BrowserMicrophone;

    fn check_support(&self) -> Result<(), AcquireError> {
        // Browsers hide mediaDevices on insecure origins, so check that first
        if !self.window.is_secure_context() {
            return Err(AcquireError::InsecureContext);
        }
        let navigator = self.window.navigator();
        let devices = js_sys::Reflect::get(&navigator, &JsValue::from_str("mediaDevices"))
            .unwrap_or(JsValue::UNDEFINED);
        if devices.is_undefined() || devices.is_null() {
            return Err(AcquireError::Unsupported);
        }
        let gum = js_sys::Reflect::get(&devices, &JsValue::from_str("getUserMedia"))
            .unwrap_or(JsValue::UNDEFINED);
        if !gum.is_function() {
            return Err(AcquireError::Unsupported);
        }
        let has_ctx = js_sys::Reflect::has(&self.window, &JsValue::from_str("AudioContext"))
            .unwrap_or(false);
        if !has_ctx {
            return Err(AcquireError::Unsupported);
        }
        Ok(())
    }

    fn acquire(&mut self, config: &DetectorConfig) -> AcquireFuture<BrowserMicrophone> {
        let window = self.window.clone();
        let fft_size = config.fft_size;
        Box::pin(async move { open_microphone(&window, fft_size).await })
    }
}

fn acquire_error(err: JsValue) -> AcquireError {
    match err.dyn_ref::<web::DomException>() {
        Some(ex) => AcquireError::from_dom_name(&ex.name(), &ex.message()),
        None => AcquireError::Other(format!("{:?}", err)),
    }
}

async fn open_microphone(
    window: &web::Window,
    fft_size: u32,
) -> Result<BrowserMicrophone, AcquireError> {
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|_| AcquireError::Unsupported)?;
    let constraints = web::MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::TRUE);
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(acquire_error)?;
    let stream: web::MediaStream = JsFuture::from(promise)
        .await
        .map_err(acquire_error)?
        .dyn_into()
        .map_err(acquire_error)?;
    match build_graph(&stream, fft_size) {
        Ok((ctx, analyser, source)) => Ok(BrowserMicrophone {
            ctx,
            analyser,
            source,
            stream,
            released: false,
        }),
        Err(e) => {
            stop_tracks(&stream);
            Err(e)
        }
    }
}

fn build_graph(
    stream: &web::MediaStream,
    fft_size: u32,
) -> Result<(web::AudioContext, web::AnalyserNode, web::MediaStreamAudioSourceNode), AcquireError>
{
    let ctx = web::AudioContext::new().map_err(|e| {
        log::error!("[mic] AudioContext error: {:?}", e);
        AcquireError::Unsupported
    })?;
    let wired = (|| {
        let analyser = ctx.create_analyser()?;
        analyser.set_fft_size(fft_size);
        let source = ctx.create_media_stream_source(stream)?;
        source.connect_with_audio_node(&analyser)?;
        Ok::<_, JsValue>((analyser, source))
    })();
    match wired {
        Ok((analyser, source)) => {
            _ = ctx.resume();
            Ok((ctx, analyser, source))
        }
        Err(e) => {
            _ = ctx.close();
            Err(acquire_error(e))
        }
    }
}

fn stop_tracks(stream: &web::MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(t) = track.dyn_into::<web::MediaStreamTrack>() {
            t.stop();
        }
    }
}

/// A live microphone stream routed into an analyser.
pub struct BrowserMicrophone {
    ctx: web::AudioContext,
    analyser: web::AnalyserNode,
    source: web::MediaStreamAudioSourceNode,
    stream: web::MediaStream,
    released: bool,
}

impl AudioInput for BrowserMicrophone {
    fn bin_count(&self) -> usize {
        self.analyser.frequency_bin_count() as usize
    }

    fn read_frequency_data(&mut self, bins: &mut [u8]) {
        self.analyser.get_byte_frequency_data(bins);
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        _ = self.source.disconnect();
        _ = self.analyser.disconnect();
        stop_tracks(&self.stream);
        if self.ctx.state() != web::AudioContextState::Closed {
            if let Err(e) = self.ctx.close() {
                log::error!("[mic] error closing audio context: {:?}", e);
            }
        }
    }
}

impl Drop for BrowserMicrophone {
    fn drop(&mut self) {
        self.release();
    }
}

/// Fire-and-forget sound cue; autoplay refusals are only logged.
pub fn play_cue(url: &str) {
    match web::HtmlAudioElement::new_with_src(url) {
        Ok(el) => {
            if let Err(e) = el.play() {
                log::warn!("[audio] cue {} failed: {:?}", url, e);
            }
        }
        Err(e) => log::warn!("[audio] cue {} error: {:?}", url, e),
    }
}
