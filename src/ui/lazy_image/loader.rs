// SPDX-License-Identifier: MPL-2.0
//! Fetching and decoding.
//!
//! A load happens in two steps. [`Loader::probe`] fetches the bytes and
//! reads the intrinsic size from the encoded header, which is what the
//! component treats as the load event. The full decode then runs on a
//! blocking thread and reports through the returned [`Completeness`].
//!
//! Supported locations: `http://` / `https://` URLs, `file://` URLs and bare
//! filesystem paths. SVG documents are rasterised with `resvg`.

use std::fmt;
use std::io::Cursor;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use iced::widget::image::Handle;
use image_rs::ImageReader;
use lru::LruCache;
use resvg::usvg;

use super::options::CrossOrigin;
use super::poller::Completeness;
use crate::config::{Config, DEFAULT_MAX_IMAGE_MB, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::domain::CacheCapacity;
use crate::error::{LoadError, Result};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Loader settings, usually taken from the `[network]` and `[loading]`
/// sections of the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderSettings {
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub auth_token: Option<String>,
    pub cache_capacity: CacheCapacity,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_bytes: DEFAULT_MAX_IMAGE_MB * BYTES_PER_MB,
            auth_token: None,
            cache_capacity: CacheCapacity::default(),
        }
    }
}

impl LoaderSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            request_timeout: config
                .network
                .request_timeout_secs
                .map_or(defaults.request_timeout, Duration::from_secs),
            max_bytes: config
                .network
                .max_image_mb
                .map_or(defaults.max_bytes, |mb| mb.saturating_mul(BYTES_PER_MB)),
            auth_token: config.network.auth_token.clone(),
            cache_capacity: config
                .loading
                .cache_entries
                .map_or(defaults.cache_capacity, CacheCapacity::new),
        }
    }
}

/// One fetch issued for the waiting slot.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub url: String,
    pub crossorigin: Option<CrossOrigin>,
}

impl LoadRequest {
    fn sends_credentials(&self) -> bool {
        self.crossorigin == Some(CrossOrigin::UseCredentials)
    }
}

/// What the load event reports.
#[derive(Debug, Clone)]
pub struct Probe {
    pub natural_width: u32,
    pub natural_height: u32,
    /// URL that was actually fetched.
    pub current_src: String,
    pub completeness: Completeness,
}

#[derive(Debug, Clone)]
struct DecodedImage {
    handle: Handle,
    width: u32,
    height: u32,
}

enum Location<'a> {
    Http(&'a str),
    File(&'a Path),
}

fn locate(url: &str) -> std::result::Result<Location<'_>, LoadError> {
    match url.split_once("://") {
        Some(("http" | "https", _)) => Ok(Location::Http(url)),
        Some(("file", path)) => Ok(Location::File(Path::new(path))),
        Some((scheme, _)) => Err(LoadError::UnsupportedScheme(scheme.to_string())),
        None => match url.split_once(':') {
            Some((scheme @ ("data" | "blob"), _)) => {
                Err(LoadError::UnsupportedScheme(scheme.to_string()))
            }
            _ => Ok(Location::File(Path::new(url))),
        },
    }
}

fn looks_like_svg(url: &str, bytes: &[u8]) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if path.to_ascii_lowercase().ends_with(".svg") {
        return true;
    }
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

fn svg_tree(bytes: &[u8]) -> std::result::Result<usvg::Tree, LoadError> {
    usvg::Tree::from_data(bytes, &usvg::Options::default())
        .map_err(|e| LoadError::Decode(e.to_string()))
}

/// Intrinsic size from the encoded header, without decoding pixels.
fn probe_dimensions(bytes: &[u8], svg: bool) -> std::result::Result<(u32, u32), LoadError> {
    if svg {
        let size = svg_tree(bytes)?.size().to_int_size();
        return Ok((size.width(), size.height()));
    }

    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

fn decode(bytes: &[u8], svg: bool) -> std::result::Result<DecodedImage, LoadError> {
    if svg {
        return rasterize_svg(bytes);
    }

    let image = image_rs::load_from_memory(bytes)?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        handle: Handle::from_rgba(width, height, rgba.into_vec()),
        width,
        height,
    })
}

fn rasterize_svg(bytes: &[u8]) -> std::result::Result<DecodedImage, LoadError> {
    let tree = svg_tree(bytes)?;
    let size = tree.size().to_int_size();
    let (width, height) = (size.width(), size.height());
    if width == 0 || height == 0 {
        return Err(LoadError::Decode("SVG has empty dimensions".into()));
    }

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| LoadError::Decode("Failed to allocate SVG pixmap".into()))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha
    let pixels: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();

    Ok(DecodedImage {
        handle: Handle::from_rgba(width, height, pixels),
        width,
        height,
    })
}

/// Fetches, probes and decodes images. Cheap to clone; clones share the
/// HTTP client and the decoded cache.
#[derive(Clone)]
pub struct Loader {
    client: reqwest::Client,
    cache: Arc<Mutex<LruCache<String, DecodedImage>>>,
    max_bytes: u64,
    auth_token: Option<String>,
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("max_bytes", &self.max_bytes)
            .field("has_auth_token", &self.auth_token.is_some())
            .finish_non_exhaustive()
    }
}

impl Loader {
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Network`] when the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialise).
    pub fn new(settings: LoaderSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(concat!("iced_lazy_img/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.request_timeout)
            .build()?;

        let capacity =
            NonZeroUsize::new(settings.cache_capacity.value()).unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            client,
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            max_bytes: settings.max_bytes,
            auth_token: settings.auth_token,
        })
    }

    /// # Errors
    ///
    /// See [`Loader::new`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(LoaderSettings::from_config(config))
    }

    fn cached(&self, url: &str) -> Option<DecodedImage> {
        self.cache.lock().ok()?.get(url).cloned()
    }

    /// Number of decoded images currently held.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Drops every decoded image.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    /// Fetches `request` and reads its intrinsic size.
    ///
    /// Returns as soon as the size is known. Pixels are decoded on a
    /// blocking thread afterwards; watch [`Probe::completeness`]. A cache
    /// hit returns an already complete probe.
    ///
    /// # Errors
    ///
    /// Any [`LoadError`] from fetching or from reading the header.
    pub async fn probe(self, request: LoadRequest) -> std::result::Result<Probe, LoadError> {
        if let Some(image) = self.cached(&request.url) {
            return Ok(Probe {
                natural_width: image.width,
                natural_height: image.height,
                current_src: request.url,
                completeness: Completeness::decoded(image.handle),
            });
        }

        let bytes = self.fetch(&request).await?;
        let svg = looks_like_svg(&request.url, &bytes);
        let (natural_width, natural_height) = probe_dimensions(&bytes, svg)?;

        let completeness = Completeness::pending();
        let decoder_completeness = completeness.clone();
        let cache = Arc::clone(&self.cache);
        let key = request.url.clone();

        // Detached: the component only observes the completeness flag.
        drop(tokio::task::spawn_blocking(move || {
            match decode(&bytes, svg) {
                Ok(image) => {
                    let handle = image.handle.clone();
                    if let Ok(mut cache) = cache.lock() {
                        cache.put(key, image);
                    }
                    decoder_completeness.complete(handle);
                }
                Err(error) => decoder_completeness.fail(error),
            }
        }));

        Ok(Probe {
            natural_width,
            natural_height,
            current_src: request.url,
            completeness,
        })
    }

    /// Fetches and fully decodes a placeholder.
    ///
    /// # Errors
    ///
    /// Any [`LoadError`]; callers treat it as a warning only.
    pub async fn placeholder(self, url: String) -> std::result::Result<Handle, LoadError> {
        if let Some(image) = self.cached(&url) {
            return Ok(image.handle);
        }

        let request = LoadRequest {
            url,
            crossorigin: None,
        };
        let bytes = self.fetch(&request).await?;
        let svg = looks_like_svg(&request.url, &bytes);
        let cache = Arc::clone(&self.cache);

        tokio::task::spawn_blocking(move || {
            let image = decode(&bytes, svg)?;
            let handle = image.handle.clone();
            if let Ok(mut cache) = cache.lock() {
                cache.put(request.url, image);
            }
            Ok::<_, LoadError>(handle)
        })
        .await
        .map_err(|e| LoadError::Decode(e.to_string()))?
    }

    fn too_large(&self) -> LoadError {
        LoadError::TooLarge {
            limit_bytes: self.max_bytes,
        }
    }

    async fn fetch(&self, request: &LoadRequest) -> std::result::Result<Vec<u8>, LoadError> {
        match locate(&request.url)? {
            Location::Http(url) => self.fetch_http(url, request.sends_credentials()).await,
            Location::File(path) => self.fetch_file(path).await,
        }
    }

    async fn fetch_http(&self, url: &str, credentials: bool) -> std::result::Result<Vec<u8>, LoadError> {
        let mut builder = self.client.get(url);
        if credentials {
            if let Some(token) = &self.auth_token {
                builder = builder.bearer_auth(token);
            }
        }

        let response = builder.send().await?.error_for_status()?;
        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(self.too_large());
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(self.too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    async fn fetch_file(&self, path: &Path) -> std::result::Result<Vec<u8>, LoadError> {
        let metadata = tokio::fs::metadata(path).await?;
        if metadata.len() > self.max_bytes {
            return Err(self.too_large());
        }
        Ok(tokio::fs::read(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::poller::DecodeState;
    use image_rs::{Rgba, RgbaImage};
    use std::path::PathBuf;
    use tempfile::tempdir;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect width="40" height="20" fill="red"/></svg>"#;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]))
            .save(&path)
            .expect("failed to write png");
        path
    }

    fn loader() -> Loader {
        Loader::new(LoaderSettings::default()).expect("client should build")
    }

    async fn wait_decoded(completeness: &Completeness) -> DecodeState {
        for _ in 0..200 {
            let state = completeness.check();
            if !matches!(state, DecodeState::Pending) {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        completeness.check()
    }

    fn request(url: impl Into<String>) -> LoadRequest {
        LoadRequest {
            url: url.into(),
            crossorigin: None,
        }
    }

    #[test]
    fn locate_classifies_schemes() {
        assert!(matches!(locate("https://x.test/a.png"), Ok(Location::Http(_))));
        assert!(matches!(locate("file:///tmp/a.png"), Ok(Location::File(_))));
        assert!(matches!(locate("photos/a.png"), Ok(Location::File(_))));
        assert_eq!(
            locate("ftp://x.test/a.png").err(),
            Some(LoadError::UnsupportedScheme("ftp".into()))
        );
        assert_eq!(
            locate("data:image/png;base64,AAAA").err(),
            Some(LoadError::UnsupportedScheme("data".into()))
        );
    }

    #[test]
    fn svg_is_detected_by_extension_or_content() {
        assert!(looks_like_svg("icons/logo.SVG?v=2", b""));
        assert!(looks_like_svg("blob", SVG.as_bytes()));
        assert!(!looks_like_svg("a.png", &[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn settings_from_config_convert_units() {
        let mut config = Config::default();
        config.network.max_image_mb = Some(2);
        config.network.request_timeout_secs = Some(5);
        config.loading.cache_entries = Some(0);

        let settings = LoaderSettings::from_config(&config);
        assert_eq!(settings.max_bytes, 2 * 1024 * 1024);
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
        assert_eq!(settings.cache_capacity.value(), 1);
    }

    #[test]
    fn only_use_credentials_sends_credentials() {
        let mut req = request("https://x.test/a.png");
        assert!(!req.sends_credentials());
        req.crossorigin = Some(CrossOrigin::Anonymous);
        assert!(!req.sends_credentials());
        req.crossorigin = Some(CrossOrigin::UseCredentials);
        assert!(req.sends_credentials());
    }

    #[tokio::test]
    async fn probe_reports_size_then_decodes() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = write_png(dir.path(), "a.png", 200, 100);
        let url = path.to_string_lossy().to_string();
        let loader = loader();

        let probe = loader.clone().probe(request(url.clone())).await.expect("probe");
        assert_eq!((probe.natural_width, probe.natural_height), (200, 100));
        assert_eq!(probe.current_src, url);
        assert!(matches!(wait_decoded(&probe.completeness).await, DecodeState::Decoded(_)));
        assert_eq!(loader.cached_len(), 1);
    }

    #[tokio::test]
    async fn cache_hit_is_complete_immediately() {
        let dir = tempdir().expect("failed to create temp dir");
        let url = write_png(dir.path(), "b.png", 4, 4).to_string_lossy().to_string();
        let loader = loader();

        let first = loader.clone().probe(request(url.clone())).await.expect("probe");
        wait_decoded(&first.completeness).await;

        let second = loader.clone().probe(request(url)).await.expect("probe");
        assert!(second.completeness.is_complete());

        loader.clear_cache();
        assert_eq!(loader.cached_len(), 0);
    }

    #[tokio::test]
    async fn file_url_is_supported() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = write_png(dir.path(), "c.png", 3, 6);
        let url = format!("file://{}", path.display());

        let probe = loader().probe(request(url)).await.expect("probe");
        assert_eq!(probe.natural_height, 6);
    }

    #[tokio::test]
    async fn svg_is_probed_and_rasterized() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("logo.svg");
        std::fs::write(&path, SVG).expect("write svg");

        let probe = loader()
            .probe(request(path.to_string_lossy().to_string()))
            .await
            .expect("probe");
        assert_eq!((probe.natural_width, probe.natural_height), (40, 20));
        assert!(matches!(wait_decoded(&probe.completeness).await, DecodeState::Decoded(_)));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempdir().expect("failed to create temp dir");
        let url = dir.path().join("bad.jpg").to_string_lossy().to_string();

        let result = loader().probe(request(url)).await;
        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }

    #[tokio::test]
    async fn garbage_bytes_fail_to_probe() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not an image").expect("write");

        let result = loader().probe(request(path.to_string_lossy().to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let dir = tempdir().expect("failed to create temp dir");
        let url = write_png(dir.path(), "big.png", 64, 64).to_string_lossy().to_string();
        let loader = Loader::new(LoaderSettings {
            max_bytes: 16,
            ..LoaderSettings::default()
        })
        .expect("client should build");

        let result = loader.probe(request(url)).await;
        assert_eq!(result.err(), Some(LoadError::TooLarge { limit_bytes: 16 }));
    }

    #[tokio::test]
    async fn placeholder_decodes_fully() {
        let dir = tempdir().expect("failed to create temp dir");
        let url = write_png(dir.path(), "p.png", 2, 2).to_string_lossy().to_string();

        let handle = loader().placeholder(url).await;
        assert!(handle.is_ok());
    }
}
