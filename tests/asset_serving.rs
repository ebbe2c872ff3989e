use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use folio::{AppState, Config, create_app};
use serde_json::{Value, json};
use tempfile::TempDir;

const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0 full size";

fn create_test_server(temp_dir: &TempDir) -> TestServer {
    let mut config = Config::default();
    config.gallery.assets_directory = temp_dir.path().join("attached_assets");
    config.database.path = temp_dir.path().join("folio.db");

    let bat_mitsva = config.gallery.galleries_directory().join("Bat_Mitsva");
    std::fs::create_dir_all(&bat_mitsva).unwrap();
    std::fs::write(bat_mitsva.join("005.jpeg"), JPEG_BYTES).unwrap();
    std::fs::write(bat_mitsva.join("cover.png"), b"\x89PNG").unwrap();

    let before_after = config.gallery.before_after_directory();
    std::fs::create_dir_all(&before_after).unwrap();
    for name in ["Anna-1 Large.jpeg", "Anna-2 Large.jpeg", "Solo-1 Large.jpeg"] {
        std::fs::write(before_after.join(name), JPEG_BYTES).unwrap();
    }

    let state = AppState::open(config).unwrap();
    TestServer::new(create_app(state)).unwrap()
}

#[tokio::test]
async fn test_case_insensitive_resolution() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let response = server.get("/assets/Bat_Mitsva/005.JPEG").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), JPEG_BYTES);

    let lower_folder = server.get("/assets/bat_mitsva/005.jpeg").await;
    assert_eq!(lower_folder.status_code(), StatusCode::OK);

    let spaced = server.get("/assets/Bat%20Mitsva/005.jpeg").await;
    assert_eq!(spaced.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_image_headers() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let response = server.get("/assets/Bat_Mitsva/005.jpeg").await;
    assert_eq!(response.header("content-type"), "image/jpeg");
    assert_eq!(
        response.header("cache-control"),
        "public, max-age=31536000, immutable"
    );
    assert_eq!(response.header("access-control-allow-origin"), "*");
    assert_eq!(
        response.header("cross-origin-resource-policy"),
        "cross-origin"
    );
    assert_eq!(response.header("vary"), "Accept-Encoding");

    let png = server.get("/assets/Bat_Mitsva/cover.png").await;
    assert_eq!(png.header("content-type"), "image/png");
}

#[tokio::test]
async fn test_all_prefixes_serve_the_same_file() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    for path in [
        "/assets/Bat_Mitsva/005.jpeg",
        "/galleries/Bat_Mitsva/005.jpeg",
        "/photography/attached_assets/galleries/Bat_Mitsva/005.jpeg",
    ] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::OK, "{path}");
        assert_eq!(response.as_bytes().as_ref(), JPEG_BYTES, "{path}");
    }
}

#[tokio::test]
async fn test_missing_image_returns_json_404() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let response = server.get("/assets/Bat_Mitsva/999.jpeg").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Image not found", "path": "Bat_Mitsva/999.jpeg" })
    );

    let unknown_folder = server.get("/assets/Weddings/001.jpeg").await;
    assert_eq!(unknown_folder.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_conditional_request_returns_304() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let first = server.get("/assets/Bat_Mitsva/005.jpeg").await;
    let etag = first.header("etag");

    let second = server
        .get("/assets/Bat_Mitsva/005.jpeg")
        .add_header(HeaderName::from_static("if-none-match"), etag)
        .await;
    assert_eq!(second.status_code(), StatusCode::NOT_MODIFIED);

    let stale = server
        .get("/assets/Bat_Mitsva/005.jpeg")
        .add_header(
            HeaderName::from_static("if-none-match"),
            HeaderValue::from_static("\"0-0\""),
        )
        .await;
    assert_eq!(stale.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_download_sets_attachment() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let response = server.get("/download/Bat_Mitsva/005.jpeg").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"005.jpeg\""
    );
}

#[tokio::test]
async fn test_before_after_sets() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let sets: Vec<Value> = server.get("/api/before-after").await.json();
    assert_eq!(
        sets,
        vec![json!({
            "id": 1,
            "title": "Anna",
            "beforeImage": "/assets/before_and_after/Anna-1%20Large.jpeg",
            "afterImage": "/assets/before_and_after/Anna-2%20Large.jpeg",
        })]
    );

    let before = server
        .get("/assets/before_and_after/Anna-1%20Large.jpeg")
        .await;
    assert_eq!(before.status_code(), StatusCode::OK);
}
