use wasm_bindgen::prelude::*;

fn to_js_err(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", e))
}

/// Encode an audio file (any format symphonia reads) to a WAM stream.
/// A `frequency_range` of 0 selects the default block size.
#[wasm_bindgen]
pub fn encode_audio_to_wam(
    audio_bytes: &[u8],
    frequency_range: u32,
    table_size: Option<u32>,
) -> Result<Vec<u8>, JsValue> {
    let mut options = crate::EncodeOptions::new();
    if frequency_range != 0 {
        options = options.with_frequency_range(frequency_range);
    }
    if let Some(t) = table_size {
        options = options.with_table_size(t);
    }

    crate::encode_from_audio(audio_bytes, options).map_err(to_js_err)
}

#[wasm_bindgen]
pub fn decode_wam_to_wav(wam_bytes: &[u8]) -> Result<Vec<u8>, JsValue> {
    crate::decode_to_wav(wam_bytes).map_err(to_js_err)
}

#[wasm_bindgen]
pub fn decode_wam_to_samples(wam_bytes: &[u8]) -> Result<JsValue, JsValue> {
    let (samples, sample_rate, channels) = crate::decode_to_samples(wam_bytes).map_err(to_js_err)?;

    let obj = js_sys::Object::new();
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("samples"),
        &js_sys::Float32Array::from(&samples[..]).into(),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("sampleRate"),
        &JsValue::from_f64(sample_rate as f64),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("channels"),
        &JsValue::from_f64(channels as f64),
    )?;
    Ok(obj.into())
}

/// Stream information as a plain JS object
#[wasm_bindgen]
pub fn get_wam_file_info(wam_bytes: &[u8]) -> Result<JsValue, JsValue> {
    let info = crate::get_wam_info(wam_bytes).map_err(to_js_err)?;
    serde_wasm_bindgen::to_value(&info).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn get_audio_file_info(audio_bytes: &[u8]) -> Result<JsValue, JsValue> {
    let info = crate::get_audio_info(audio_bytes).map_err(to_js_err)?;

    let obj = js_sys::Object::new();
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("sampleRate"),
        &JsValue::from_f64(info.sample_rate as f64),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("channels"),
        &JsValue::from_f64(info.channels as f64),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("durationSecs"),
        &JsValue::from_f64(info.duration_secs as f64),
    )?;
    Ok(obj.into())
}

#[wasm_bindgen]
pub fn inspect_wam_frame(wam_bytes: &[u8], frame: usize, channel: usize) -> Result<JsValue, JsValue> {
    let info = crate::inspect_frame(wam_bytes, frame, channel).map_err(to_js_err)?;
    serde_wasm_bindgen::to_value(&info).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn validate_wam_file(wam_bytes: &[u8]) -> Result<bool, JsValue> {
    crate::validate_wam(wam_bytes).map_err(to_js_err)
}

// panic messages go to the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}
