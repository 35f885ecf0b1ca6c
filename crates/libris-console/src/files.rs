//! Browser file helpers: reading picked files and saving generated ones

use libris_client::{file_part, ApiError, FilePart, Result};
use libris_core::form::FileRef;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

fn js_error(e: wasm_bindgen::JsValue) -> ApiError {
    ApiError::Network(format!("{:?}", e))
}

/// Metadata of a picked file as stored in form values
pub fn file_ref(file: &web_sys::File) -> FileRef {
    FileRef {
        name: file.name(),
        size: file.size() as u64,
        mime: file.type_(),
        path: None,
    }
}

/// Files currently picked in an `<input type="file">`
pub fn picked_files(input: &web_sys::HtmlInputElement) -> Vec<web_sys::File> {
    let Some(list) = input.files() else {
        return Vec::new();
    };
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}

/// Read a picked file into a multipart part for upload
pub async fn read_file(file: &web_sys::File) -> Result<FilePart> {
    let buffer = JsFuture::from(file.array_buffer()).await.map_err(js_error)?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok(file_part(file.name(), file.type_(), bytes))
}

/// Offer generated text as a download, e.g. a CSV export
pub fn download_text(file_name: &str, mime: &str, content: &str) -> Result<()> {
    let parts = js_sys::Array::of1(&wasm_bindgen::JsValue::from_str(content));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime);
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options).map_err(js_error)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_error)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ApiError::Config("no document".into()))?;
    let anchor = document
        .create_element("a")
        .map_err(js_error)?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| ApiError::Config("anchor element unavailable".into()))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    web_sys::Url::revoke_object_url(&url).map_err(js_error)?;
    Ok(())
}
