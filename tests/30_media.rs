mod common;

use anyhow::Result;
use axum::http::StatusCode;

use common::{admin_cookie, body_bytes, delete, get, json_body, MultipartForm, TestApp};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-bytes";
const MP4: &[u8] = b"\x00\x00\x00\x18ftypmp42fake-video";

#[tokio::test]
async fn uploads_are_stored_and_linked() -> Result<()> {
    let app = TestApp::spawn().await?;

    let form = MultipartForm::new()
        .text("name", "Camera")
        .text("price", "199")
        .file("images", "Front View.PNG", "image/png", PNG)
        .file("images", "back.png", "image/png", PNG)
        .file("video", "demo.mp4", "video/mp4", MP4);
    let created = app.create(&form).await?;

    let images: Vec<String> = serde_json::from_value(created["images"].clone())?;
    assert_eq!(images.len(), 2);
    assert!(images[0].starts_with("/uploads/images/front-view-"), "{}", images[0]);
    assert!(images[0].ends_with(".PNG"));
    assert!(images[1].starts_with("/uploads/images/back-"));

    let video = created["video"].as_str().unwrap().to_string();
    assert!(video.starts_with("/uploads/videos/demo-"), "{video}");
    assert!(video.ends_with(".mp4"));

    for path in images.iter().chain(std::iter::once(&video)) {
        assert!(app.public_path(path).exists(), "{path} missing on disk");
    }
    assert_eq!(tokio::fs::read(app.public_path(&images[1])).await?, PNG);
    Ok(())
}

#[tokio::test]
async fn blank_file_inputs_are_skipped() -> Result<()> {
    let app = TestApp::spawn().await?;

    let form = MultipartForm::new()
        .text("name", "Plain")
        .text("price", "2")
        .file("images", "", "application/octet-stream", b"")
        .file("video", "", "application/octet-stream", b"");
    let created = app.create(&form).await?;

    assert_eq!(created["images"], serde_json::json!([]));
    assert!(created["video"].is_null());
    Ok(())
}

#[tokio::test]
async fn media_survives_product_deletion() -> Result<()> {
    let app = TestApp::spawn().await?;

    let form = MultipartForm::new()
        .text("name", "Vase")
        .text("price", "15")
        .file("images", "vase.png", "image/png", PNG);
    let created = app.create(&form).await?;
    let id = created["id"].as_str().unwrap();
    let image = created["images"][0].as_str().unwrap().to_string();

    let res = app.send(delete(&format!("/api/products/{id}"), Some(&admin_cookie()))).await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app.send(get(&image)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_bytes(res).await?, PNG);
    Ok(())
}

#[tokio::test]
async fn too_many_images_are_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;

    let mut form = MultipartForm::new().text("name", "Gallery").text("price", "1");
    for i in 0..9 {
        form = form.file("images", &format!("shot{i}.png"), "image/png", PNG);
    }
    let res = app.send(form.request("/api/products", Some(&admin_cookie()))).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(app.list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn second_video_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;

    let form = MultipartForm::new()
        .text("name", "Reel")
        .text("price", "1")
        .file("video", "a.mp4", "video/mp4", MP4)
        .file("video", "b.mp4", "video/mp4", MP4);
    let res = app.send(form.request("/api/products", Some(&admin_cookie()))).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn oversized_file_is_rejected_and_removed() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.uploads.max_file_size_bytes = 8).await?;

    let form = MultipartForm::new()
        .text("name", "Poster")
        .text("price", "3")
        .file("images", "poster.png", "image/png", PNG);
    let res = app.send(form.request("/api/products", Some(&admin_cookie()))).await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(res).await?["code"], "PAYLOAD_TOO_LARGE");

    let mut stored = tokio::fs::read_dir(app.config.images_dir()).await?;
    assert!(stored.next_entry().await?.is_none(), "partial upload left on disk");
    assert!(app.list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn oversized_text_field_is_rejected() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.uploads.max_field_size_bytes = 64).await?;

    let form = MultipartForm::new()
        .text("name", "Essay")
        .text("price", "1")
        .text("description", &"x".repeat(65));
    let res = app.send(form.request("/api/products", Some(&admin_cookie()))).await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(json_body(res).await?["error"].as_str().unwrap().contains("description"));
    assert!(app.list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn body_over_request_limit_is_payload_too_large() -> Result<()> {
    // Request limit: 9 file slots of 16 bytes plus 4 KiB for text.
    let app = TestApp::spawn_with(|config| {
        config.uploads.max_file_size_bytes = 16;
        config.uploads.max_field_size_bytes = 4096;
    })
    .await?;

    let mut form = MultipartForm::new().text("name", "Flood").text("price", "1");
    for i in 0..4 {
        form = form.text(&format!("note{i}"), &"y".repeat(3000));
    }
    let res = app.send(form.request("/api/products", Some(&admin_cookie()))).await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_file_field_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;

    let form = MultipartForm::new()
        .text("name", "Odd")
        .text("price", "1")
        .file("attachment", "notes.txt", "text/plain", b"hello");
    let res = app.send(form.request("/api/products", Some(&admin_cookie()))).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = json_body(res).await?;
    assert!(body["error"].as_str().unwrap().contains("attachment"));
    Ok(())
}

#[tokio::test]
async fn storefront_pages_are_served() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.send(get("/product?id=abc")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_bytes(res).await?, b"<h1>product</h1>");

    let res = app.send(get("/some/client/route")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_bytes(res).await?, b"<h1>storefront</h1>");
    Ok(())
}
