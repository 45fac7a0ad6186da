//! End-to-end tests of the cover pipeline through the public API.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use parking_lot::Mutex;
use tempfile::TempDir;

use shelfcache::application::CoverService;
use shelfcache::domain::entities::{DiskKey, DisplaySizePolicy, FetchClass, ImageSource};
use shelfcache::domain::ports::FnListener;
use shelfcache::domain::{Bitmap, CacheResult, ImageError, TransportPort};
use shelfcache::infrastructure::AppConfig;

/// Serves a queue of canned responses, repeating the last one.
struct ScriptedTransport {
    responses: Mutex<Vec<Bytes>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new(responses: Vec<Bytes>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportPort for ScriptedTransport {
    async fn fetch(&self, uri: &str) -> CacheResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock();
        match responses.len() {
            0 => Err(ImageError::fetch(format!("no response for {uri}"))),
            1 => Ok(responses[0].clone()),
            _ => Ok(responses.remove(0)),
        }
    }
}

fn png(width: u32, height: u32) -> Bytes {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 40, 90])))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    Bytes::from(buf)
}

fn config_in(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.cache.directory = Some(dir.path().to_path_buf());
    config
}

#[tokio::test]
async fn test_fetch_once_then_serve_from_both_tiers() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![png(200, 300)]);
    let uri = "https://covers.example/moby.png";

    let service = CoverService::with_transport(&config_in(&dir), transport.clone())
        .await
        .unwrap();
    let first = service
        .loader()
        .load(uri, DisplaySizePolicy::height(150))
        .await
        .unwrap();
    assert_eq!(first.source, ImageSource::Network);
    assert_eq!((first.bitmap.width(), first.bitmap.height()), (100, 150));

    let again = service
        .loader()
        .load(uri, DisplaySizePolicy::height(150))
        .await
        .unwrap();
    assert_eq!(again.source, ImageSource::MemoryCache);

    let thumb = service
        .loader()
        .load(uri, DisplaySizePolicy::height(30))
        .await
        .unwrap();
    assert_eq!(thumb.source, ImageSource::DiskCache);
    assert_eq!(thumb.bitmap.height(), 30);
    assert_eq!(transport.calls(), 1);

    drop(service);
    let restarted = CoverService::with_transport(&config_in(&dir), transport.clone())
        .await
        .unwrap();
    let reloaded = restarted
        .loader()
        .load(uri, DisplaySizePolicy::height(150))
        .await
        .unwrap();
    assert_eq!(reloaded.source, ImageSource::DiskCache);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_corrupt_bytes_are_evicted_and_refetched() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![Bytes::from_static(b"not an image"), png(20, 40)]);
    let uri = "https://covers.example/broken.png";

    let service = CoverService::with_transport(&config_in(&dir), transport.clone())
        .await
        .unwrap();
    let disk = service.loader().cache().disk();

    let failed = service
        .loader()
        .load(uri, DisplaySizePolicy::height(20))
        .await;
    assert!(matches!(failed, Err(ImageError::Decode(_))));
    assert!(!disk.contains(&DiskKey::from_uri(uri)));

    let recovered = service
        .loader()
        .load(uri, DisplaySizePolicy::height(20))
        .await
        .unwrap();
    assert_eq!(recovered.source, ImageSource::Network);
    assert_eq!(transport.calls(), 2);
    assert!(disk.contains(&DiskKey::from_uri(uri)));
}

#[tokio::test]
async fn test_placeholder_key_is_stable_across_calls() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(Vec::new());
    let service = CoverService::with_transport(&config_in(&dir), transport.clone())
        .await
        .unwrap();

    let a = CoverService::cover_uri_or_placeholder(None, "Moby Dick", "Herman Melville");
    let b = CoverService::cover_uri_or_placeholder(None, "Moby Dick", "Herman Melville");
    assert_eq!(DiskKey::from_uri(&a), DiskKey::from_uri(&b));

    service
        .loader()
        .load(&a, DisplaySizePolicy::ScalePreserve)
        .await
        .unwrap();
    let cached = service
        .loader()
        .load(&b, DisplaySizePolicy::ScalePreserve)
        .await
        .unwrap();

    assert_eq!(cached.source, ImageSource::MemoryCache);
    assert_eq!(
        (cached.bitmap.width(), cached.bitmap.height()),
        (service.generator().width(), service.generator().height())
    );
    assert!(service.loader().cache().disk().contains(&DiskKey::from_uri(&a)));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_disk_budget_holds_under_load() {
    let dir = TempDir::new().unwrap();
    let body = png(64, 64);
    let mut config = config_in(&dir);
    config.cache.disk_max_bytes = body.len() as u64 * 3;
    let transport = ScriptedTransport::new(vec![body]);

    let service = CoverService::with_transport(&config, transport.clone())
        .await
        .unwrap();
    let policy = DisplaySizePolicy::height(16);
    let uris: Vec<String> = (0..6)
        .map(|i| format!("https://covers.example/{i}.png"))
        .collect();

    service.loader().prefetch_batch(
        uris.iter().map(|uri| (uri.clone(), policy)).collect(),
        FetchClass::Thumbnail,
    );
    while service.loader().pending_count() > 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let disk = service.loader().cache().disk();
    assert!(disk.current_size() <= disk.max_size());
    assert_eq!(disk.len(), 3);
    assert_eq!(transport.calls(), 6);
}

#[tokio::test]
async fn test_listener_receives_scaled_bitmap() {
    let dir = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![png(90, 120)]);
    let service = CoverService::with_transport(&config_in(&dir), transport)
        .await
        .unwrap();

    let delivered: Arc<Mutex<Vec<(u32, u32)>>> = Arc::default();
    let sink = delivered.clone();
    let request = service.loader().get(
        "https://covers.example/hint.png",
        DisplaySizePolicy::ScaleSizeHint {
            width: 30,
            height: 30,
        },
        FetchClass::Cover,
        Arc::new(FnListener::new(
            move |_uri: &str, bitmap: Arc<Bitmap>| {
                sink.lock().push((bitmap.width(), bitmap.height()));
            },
            |_uri: &str, _error: ImageError| {},
        )),
    );

    let bitmap = request.await.unwrap();
    assert!(bitmap.width() <= 30 && bitmap.height() <= 30);
    assert_eq!(*delivered.lock(), vec![(bitmap.width(), bitmap.height())]);
}
