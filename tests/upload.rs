// ABOUTME: Integration tests for the upload client and its transports.
// ABOUTME: Validation properties, record construction, and the simulated transport.

mod support;

use imgdrop::upload::{
    MAX_FILE_SIZE, ReadFileError, SimulatedTransport, SubmitError, UploadClient, UploadError, UploadFile,
    UploadTransport, ValidationError, validate,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use support::*;

const ALLOWED: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];

mod validation {
    use super::*;

    proptest! {
        #[test]
        fn allowed_types_within_limit_pass(
            mime in prop::sample::select(ALLOWED.to_vec()),
            size in 0..=MAX_FILE_SIZE,
        ) {
            prop_assert!(validate(mime, size).is_ok());
        }

        #[test]
        fn oversized_files_fail(
            mime in prop::sample::select(ALLOWED.to_vec()),
            size in (MAX_FILE_SIZE + 1)..=u64::MAX,
        ) {
            let is_too_large = matches!(validate(mime, size), Err(ValidationError::TooLarge { .. }));
            prop_assert!(is_too_large);
        }

        #[test]
        fn other_types_fail_regardless_of_size(
            mime in "[a-z]{1,10}/[a-z0-9.+-]{1,12}",
            size in any::<u64>(),
        ) {
            prop_assume!(!ALLOWED.contains(&mime.as_str()));
            let is_unsupported = matches!(validate(&mime, size), Err(ValidationError::UnsupportedType(_)));
            prop_assert!(is_unsupported);
        }
    }

    #[test]
    fn limit_is_five_mebibytes() {
        assert_eq!(MAX_FILE_SIZE, 5 * 1024 * 1024);
        assert!(validate("image/png", MAX_FILE_SIZE).is_ok());
        assert!(validate("image/png", MAX_FILE_SIZE + 1).is_err());
    }

    #[test]
    fn type_is_checked_before_size() {
        let err = validate("image/webp", MAX_FILE_SIZE * 2).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType(t) if t == "image/webp"));
    }

    #[test]
    fn messages_are_user_facing() {
        let err = validate("text/plain", 1).unwrap_err();
        assert!(err.to_string().starts_with("Only .jpg, .png and .gif files are supported"));

        let err = validate("image/gif", MAX_FILE_SIZE + 1).unwrap_err();
        assert!(err.to_string().starts_with("Maximum file size is 5MB"));
    }

    #[tokio::test]
    async fn invalid_files_never_reach_the_transport() {
        let transport = Arc::new(RecordingTransport::succeeding(None, None));
        let client = UploadClient::new(transport.clone(), IMAGES_PREFIX);

        let pdf = UploadFile::new("doc.pdf", "application/pdf", vec![0u8; 10]);
        let err = client.upload(&pdf).await.unwrap_err();

        assert!(matches!(err, SubmitError::Validation(_)));
        assert_eq!(transport.attempts(), 0);
    }
}

mod records {
    use super::*;

    async fn upload_with(filename: Option<&str>, url: Option<&str>) -> imgdrop::types::ImageRecord {
        let transport = Arc::new(RecordingTransport::succeeding(filename, url));
        let client = UploadClient::new(transport, IMAGES_PREFIX);
        let file = UploadFile::new("cat.png", "image/png", &b"\x89PNG"[..]);
        client.upload(&file).await.unwrap()
    }

    #[tokio::test]
    async fn server_filename_and_url_take_precedence() {
        let record = upload_with(Some("abc.png"), Some("/images/abc.png")).await;
        assert_eq!(record.name, "abc.png");
        assert_eq!(record.url, "/images/abc.png");
    }

    #[tokio::test]
    async fn url_falls_back_to_prefix_and_server_filename() {
        let record = upload_with(Some("abc.png"), None).await;
        assert_eq!(record.name, "abc.png");
        assert_eq!(record.url, "/images/abc.png");
    }

    #[tokio::test]
    async fn empty_response_uses_local_name() {
        let record = upload_with(None, None).await;
        assert_eq!(record.name, "cat.png");
        assert_eq!(record.url, "/images/cat.png");
    }

    #[tokio::test]
    async fn blank_response_fields_fall_back_like_missing_ones() {
        let record = upload_with(Some(""), Some("")).await;
        assert_eq!(record.name, "cat.png");
        assert_eq!(record.url, "/images/cat.png");

        let record = upload_with(Some("abc.png"), Some("  ")).await;
        assert_eq!(record.name, "abc.png");
        assert_eq!(record.url, "/images/abc.png");
    }

    #[tokio::test]
    async fn record_carries_preview_and_metadata() {
        let record = upload_with(None, Some("https://cdn.example/x.png")).await;
        assert_eq!(record.url, "https://cdn.example/x.png");
        assert_eq!(record.preview.as_deref(), Some("data:image/png;base64,iVBORw=="));
        assert_eq!(record.size, Some(4));
        assert_eq!(record.mime_type.as_deref(), Some("image/png"));
        assert!(!record.id.is_server_file());
    }

    #[tokio::test]
    async fn each_upload_gets_a_fresh_id() {
        let a = upload_with(None, None).await;
        let b = upload_with(None, None).await;
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn from_path_infers_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holiday photo.JPG");
        std::fs::write(&path, b"jpegbytes").unwrap();

        let file = UploadFile::from_path(&path).await.unwrap();

        assert_eq!(file.name, "holiday photo.JPG");
        assert_eq!(file.mime_type, "image/jpeg");
        assert_eq!(file.size, 9);
    }

    #[tokio::test]
    async fn from_path_rejects_oversized_file_by_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        std::fs::File::create(&path)
            .unwrap()
            .set_len(6 * 1024 * 1024)
            .unwrap();

        let err = UploadFile::from_path(&path).await.unwrap_err();

        assert!(matches!(
            err,
            ReadFileError::Invalid(ValidationError::TooLarge { size, .. }) if size == 6 * 1024 * 1024
        ));
    }

    #[tokio::test]
    async fn from_path_rejects_unsupported_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = UploadFile::from_path(&path).await.unwrap_err();

        assert!(matches!(err, ReadFileError::Invalid(ValidationError::UnsupportedType(_))));
        assert!(err.to_string().starts_with("Only .jpg, .png and .gif files are supported"));
    }

    #[tokio::test]
    async fn from_path_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = UploadFile::from_path(&dir.path().join("nope.png")).await.unwrap_err();

        assert!(matches!(err, ReadFileError::Io { .. }));
        assert!(err.to_string().contains("nope.png"));
    }
}

mod simulated {
    use super::*;

    fn png() -> UploadFile {
        UploadFile::new("my cat.png", "image/png", vec![0u8; 8])
    }

    #[tokio::test]
    async fn always_succeeds_at_rate_one() {
        let transport = SimulatedTransport::new(1.0, Duration::ZERO, "sharefile.xyz");
        for _ in 0..20 {
            let response = transport.send(&png()).await.unwrap();
            let url = response.url.unwrap();
            assert!(url.starts_with("https://sharefile.xyz/"));
            assert!(url.ends_with("-my-cat.png"));
            assert!(response.filename.is_none());
        }
    }

    #[tokio::test]
    async fn always_fails_at_rate_zero() {
        let transport = SimulatedTransport::new(0.0, Duration::ZERO, "sharefile.xyz");
        for _ in 0..20 {
            let err = transport.send(&png()).await.unwrap_err();
            assert!(matches!(err, UploadError::Simulated));
        }
    }

    #[tokio::test]
    async fn simulated_record_keeps_local_name() {
        let transport = Arc::new(SimulatedTransport::new(1.0, Duration::ZERO, "share.test"));
        let client = UploadClient::new(transport, IMAGES_PREFIX);

        let record = client.upload(&png()).await.unwrap();

        assert_eq!(record.name, "my cat.png");
        assert!(record.url.starts_with("https://share.test/"));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_configured_latency() {
        let transport = SimulatedTransport::new(1.0, Duration::from_secs(2), "share.test");
        let started = tokio::time::Instant::now();

        transport.send(&png()).await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[test]
    fn default_matches_demo_settings() {
        let transport = SimulatedTransport::default();
        assert_eq!(transport.success_rate(), 0.8);
    }
}
