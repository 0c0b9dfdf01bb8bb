//! Asynchronous asset loading.
//!
//! Texture image data arrives whenever it arrives; the first rendered frames
//! of a textured world simply use the renderer's default white pixel. A load
//! failure is logged and the default texture stays, there is no retry.

use std::path::Path;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> reqwest::Url {
    let window = web_sys::window().unwrap();
    let location = window.location();
    let origin = location.origin().unwrap();
    let base = reqwest::Url::parse(&format!("{}/assets/", origin)).unwrap();
    base.join(file_name).unwrap()
}

/// Read an asset file relative to the bundled `assets/` directory.
pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name);
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = Path::new("./").join("assets").join(file_name);
        std::fs::read(path)?
    };

    Ok(data)
}

#[derive(Debug)]
enum TextureState {
    Loading,
    Ready(image::RgbaImage),
    /// Pixels handed to the renderer; the CPU copy is gone.
    Uploaded,
    Failed,
}

/// Shared handle to a texture that is (or will be) loaded in the background.
///
/// Cloning shares the underlying slot. The renderer polls [`take_pixels`]
/// each frame and uploads at most once per handle.
///
/// [`take_pixels`]: TextureHandle::take_pixels
#[derive(Clone, Debug)]
pub struct TextureHandle {
    id: u64,
    slot: Arc<Mutex<TextureState>>,
}

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(0);

impl TextureHandle {
    fn new(state: TextureState) -> Self {
        Self {
            id: NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed),
            slot: Arc::new(Mutex::new(state)),
        }
    }

    /// Stable identity of this texture, used as a renderer cache key.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Kick off a background load of `file_name` from the asset directory
    /// and return immediately.
    pub fn load(file_name: &str) -> Self {
        let handle = Self::new(TextureState::Loading);
        let slot = handle.slot.clone();
        let file_name = file_name.to_string();

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(move || {
            let decoded = std::fs::read(Path::new("./").join("assets").join(&file_name))
                .map_err(anyhow::Error::from)
                .and_then(|bytes| Ok(image::load_from_memory(&bytes)?));
            Self::finish(&slot, &file_name, decoded);
        });

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(async move {
            let decoded = match load_binary(&file_name).await {
                Ok(bytes) => image::load_from_memory(&bytes).map_err(anyhow::Error::from),
                Err(e) => Err(e),
            };
            Self::finish(&slot, &file_name, decoded);
        });

        handle
    }

    /// Wrap already-decoded pixels, mostly for tests.
    pub fn from_image(image: image::RgbaImage) -> Self {
        Self::new(TextureState::Ready(image))
    }

    fn finish(
        slot: &Mutex<TextureState>,
        file_name: &str,
        decoded: anyhow::Result<image::DynamicImage>,
    ) {
        let mut state = slot.lock().unwrap();
        match decoded {
            Ok(image) => {
                *state = TextureState::Ready(image.to_rgba8());
            }
            Err(e) => {
                log::error!("texture {} failed to load: {}", file_name, e);
                *state = TextureState::Failed;
            }
        }
    }

    /// Pixels, if the load has finished since the last call. Returns `None`
    /// while loading, after a failure, and on every call after the first
    /// successful one.
    pub fn take_pixels(&self) -> Option<image::RgbaImage> {
        let mut state = self.slot.lock().unwrap();
        match &*state {
            TextureState::Ready(_) => {
                let prev = std::mem::replace(&mut *state, TextureState::Uploaded);
                match prev {
                    TextureState::Ready(image) => Some(image),
                    _ => unreachable!(),
                }
            }
            _ => None,
        }
    }

    pub fn failed(&self) -> bool {
        matches!(*self.slot.lock().unwrap(), TextureState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_are_taken_once() {
        let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        let handle = TextureHandle::from_image(image);
        assert!(handle.take_pixels().is_some());
        assert!(handle.take_pixels().is_none());
    }

    #[test]
    fn missing_file_fails_quietly() {
        let handle = TextureHandle::load("definitely-not-here.jpg");
        // the loader thread logs and marks the slot failed; rendering keeps
        // using the default texture either way
        for _ in 0..200 {
            if handle.failed() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        panic!("loader never resolved");
    }

    #[test]
    fn handles_have_distinct_ids() {
        let a = TextureHandle::from_image(image::RgbaImage::new(1, 1));
        let b = TextureHandle::from_image(image::RgbaImage::new(1, 1));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }
}
