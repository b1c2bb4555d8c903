//! Full-lifecycle tests: initiate, upload parts, complete, cancel.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;
    use http::Method;

    use upflow_core::{CancelOutcome, UploadConfig, UploadDriver};
    use upflow_model::{RetryPolicy, UploadStatus};

    use crate::{ScriptedTransport, counting_callback, init_tracing};

    fn config() -> UploadConfig {
        let mut config = UploadConfig::new("http://storage.local/bucket", "data/object.bin");
        config.retry = RetryPolicy {
            max_retries: 1,
            backoff_base_secs: 0.0,
        };
        config
    }

    /// Upload two parts and complete, returning the upload id.
    async fn upload_two_parts(
        driver: &UploadDriver<ScriptedTransport>,
        config: UploadConfig,
    ) -> String {
        let upload_id = driver.initiate(config).await.expect("initiate");
        driver
            .upload_part(&upload_id, 1, Bytes::from_static(&[0xAA; 256]))
            .await
            .expect("part 1");
        driver
            .upload_part(&upload_id, 2, Bytes::from_static(&[0xBB; 256]))
            .await
            .expect("part 2");
        driver.complete(&upload_id).await.expect("complete");
        upload_id
    }

    #[tokio::test]
    async fn test_should_cancel_an_upload() {
        init_tracing();
        let driver = UploadDriver::new(ScriptedTransport::default());
        let started = Arc::new(AtomicUsize::new(0));
        let cancelled = Arc::new(AtomicUsize::new(0));

        let mut config = config();
        config.started = Some(counting_callback(&started));
        config.cancelled = Some(counting_callback(&cancelled));

        let upload_id = upload_two_parts(&driver, config).await;
        let outcome = driver.cancel(&upload_id).await.expect("cancel");

        assert_eq!(outcome, CancelOutcome::Cancelled);
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
        assert_eq!(
            driver.request_log(&upload_id).expect("log").order(),
            "initiate,upload-part-1,upload-part-2,complete,abort,verify"
        );
    }

    #[tokio::test]
    async fn test_should_walk_status_through_the_lifecycle() {
        let driver = UploadDriver::new(ScriptedTransport::default());
        let upload_id = driver.initiate(config()).await.expect("initiate");
        assert_eq!(
            driver.status(&upload_id).await.expect("status"),
            UploadStatus::Active
        );

        driver
            .upload_part(&upload_id, 1, Bytes::from_static(b"x"))
            .await
            .expect("part");
        driver.complete(&upload_id).await.expect("complete");
        assert_eq!(
            driver.status(&upload_id).await.expect("status"),
            UploadStatus::Completed
        );

        driver.cancel(&upload_id).await.expect("cancel");
        assert_eq!(
            driver.status(&upload_id).await.expect("status"),
            UploadStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_should_apply_initiate_headers_only_at_initiate() {
        let transport = Arc::new(ScriptedTransport::default());
        let driver = UploadDriver::new(Arc::clone(&transport));

        let mut config = config();
        config
            .headers_at_initiate
            .insert("x-upload-class".to_owned(), "archive".to_owned());
        config
            .headers_common
            .insert("x-tenant".to_owned(), "acme".to_owned());

        let upload_id = driver.initiate(config).await.expect("initiate");
        driver
            .upload_part(&upload_id, 1, Bytes::from_static(b"x"))
            .await
            .expect("part");

        let initiate_headers = transport.headers_for(&Method::POST);
        assert_eq!(
            initiate_headers.get("x-upload-class").map(String::as_str),
            Some("archive")
        );
        assert_eq!(
            initiate_headers.get("x-tenant").map(String::as_str),
            Some("acme")
        );

        let part_headers = transport.headers_for(&Method::PUT);
        assert!(part_headers.get("x-upload-class").is_none());
        assert_eq!(part_headers.get("x-tenant").map(String::as_str), Some("acme"));
    }

    #[tokio::test]
    async fn test_should_keep_independent_sessions_independent() {
        let driver = Arc::new(UploadDriver::new(ScriptedTransport::default()));

        // Two sessions over one driver; cancelling the first leaves the
        // second untouched. (The scripted service issues one fixed id, so
        // drive two separate drivers to keep ids distinct.)
        let other = Arc::new(UploadDriver::new(ScriptedTransport::default()));

        let id_a = driver.initiate(config()).await.expect("initiate a");
        let id_b = other.initiate(config()).await.expect("initiate b");

        driver.cancel(&id_a).await.expect("cancel a");

        assert_eq!(
            driver.status(&id_a).await.expect("status a"),
            UploadStatus::Cancelled
        );
        assert_eq!(
            other.status(&id_b).await.expect("status b"),
            UploadStatus::Active
        );
        assert_eq!(other.request_log(&id_b).expect("log b").order(), "initiate");
    }

    #[tokio::test]
    async fn test_should_record_methods_alongside_labels() {
        let driver = UploadDriver::new(ScriptedTransport::default());
        let upload_id = upload_two_parts(&driver, config()).await;
        driver.cancel(&upload_id).await.expect("cancel");

        let records = driver.request_log(&upload_id).expect("log").records();
        let methods: Vec<Method> = records.iter().map(|r| r.method.clone()).collect();
        assert_eq!(
            methods,
            vec![
                Method::POST,
                Method::PUT,
                Method::PUT,
                Method::POST,
                Method::DELETE,
                Method::GET,
            ]
        );
    }
}
