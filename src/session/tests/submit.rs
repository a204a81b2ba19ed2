use super::*;
use crate::types::AudioMode;
use crate::validation::VideoFile;

fn loading_visibility(events: &[Event]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Loading { visible } => Some(*visible),
            _ => None,
        })
        .collect()
}

async fn mount_running(server: &wiremock::MockServer, job_id: &str) {
    mount_status(
        server,
        job_id,
        vec![status_body(serde_json::json!({"status": "running", "progress": 1}))],
    )
    .await;
}

#[tokio::test]
async fn test_submit_url_starts_polling() {
    let (session, server) = create_test_session().await;
    Mock::given(method("POST"))
        .and(path("/api/process-video"))
        .and(body_json(serde_json::json!({
            "video_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "add_subtitles": true,
            "audio_mode": "synth"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": true, "task_id": "yt_1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_running(&server, "yt_1").await;

    let mut rx = session.subscribe();
    let job_id = session
        .submit_url(
            "  https://www.youtube.com/watch?v=dQw4w9WgXcQ \n",
            UploadOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(job_id, "yt_1");
    assert_eq!(session.active_job(), Some(job_id.clone()));
    assert!(!session.loading().is_visible());
    assert_eq!(success_texts(&session), vec!["Processing started".to_string()]);

    let events = drain(&mut rx);
    assert_eq!(loading_visibility(&events), vec![true, false]);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Submitted { job_id } if *job_id == "yt_1"
    )));

    collect_until(&mut rx, |e| matches!(e, Event::StatusUpdated { .. })).await;
    assert!(session.stop());
}

#[tokio::test]
async fn test_submit_url_rejects_invalid_input_without_request() {
    let (session, server) = create_test_session().await;

    let err = session
        .submit_url("https://vimeo.com/12345", UploadOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::InvalidUrl(_))
    ));

    let err = session
        .submit_url("   ", UploadOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::EmptyInput)));

    assert_eq!(
        error_texts(&session),
        vec![
            "Please enter a valid YouTube video link".to_string(),
            "Please enter a YouTube video link".to_string(),
        ]
    );
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!session.loading().is_visible());
    assert_eq!(session.poll_state(), PollState::Idle);
}

#[tokio::test]
async fn test_submit_url_refusal_uses_server_error() {
    let (session, server) = create_test_session().await;
    Mock::given(method("POST"))
        .and(path("/api/process-video"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "success": false,
            "error": "Video is private"
        })))
        .mount(&server)
        .await;

    let mut rx = session.subscribe();
    let err = session
        .submit_url("https://youtu.be/private1", UploadOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::SubmissionFailed { reason } => assert_eq!(reason, "Video is private"),
        other => panic!("expected submission failure, got {:?}", other),
    }
    assert_eq!(error_texts(&session), vec!["Video is private".to_string()]);
    assert!(!session.loading().is_visible());
    assert_eq!(loading_visibility(&drain(&mut rx)), vec![true, false]);
    assert!(!session.is_polling());
}

#[tokio::test]
async fn test_submit_url_refusal_without_error_text() {
    let (session, server) = create_test_session().await;
    Mock::given(method("POST"))
        .and(path("/api/process-video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": false})))
        .mount(&server)
        .await;

    let err = session
        .submit_url("youtube.com/watch?v=x", UploadOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SubmissionFailed { ref reason } if reason == "Processing failed"));
    assert_eq!(error_texts(&session), vec!["Processing failed".to_string()]);
}

#[tokio::test]
async fn test_submit_url_transport_error_hides_loading() {
    let (session, server) = create_test_session().await;
    Mock::given(method("POST"))
        .and(path("/api/process-video"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = session
        .submit_url("https://youtu.be/abc", UploadOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::SubmissionFailed { reason } => {
            assert!(reason.starts_with("Processing failed: "), "{}", reason);
            assert!(reason.contains("502"));
        }
        other => panic!("expected submission failure, got {:?}", other),
    }
    assert!(!session.loading().is_visible());
    assert_eq!(error_texts(&session).len(), 1);
}

#[tokio::test]
async fn test_submit_url_success_without_task_id_is_failure() {
    let (session, server) = create_test_session().await;
    Mock::given(method("POST"))
        .and(path("/api/process-video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
        .mount(&server)
        .await;

    let err = session
        .submit_url("https://youtu.be/abc", UploadOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SubmissionFailed { .. }));
    assert!(!session.is_polling());
}

#[tokio::test]
async fn test_submit_file_uploads_and_starts_polling() {
    let (session, server) = create_test_session().await;
    Mock::given(method("POST"))
        .and(path("/api/upload-video"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": true, "task_id": "up_1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_running(&server, "up_1").await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("lecture.mov");
    tokio::fs::write(&file_path, vec![0u8; 4096]).await.unwrap();
    let file = VideoFile::from_path(&file_path).await.unwrap();
    assert_eq!(file.content_type, "video/quicktime");

    let options = UploadOptions {
        add_subtitles: false,
        audio_mode: AudioMode::Original,
    };
    let job_id = session.submit_file(file, options).await.unwrap();

    assert_eq!(job_id, "up_1");
    assert!(session.is_polling());
    assert!(!session.loading().is_visible());
    assert_eq!(
        success_texts(&session),
        vec!["Upload complete, processing started".to_string()]
    );
    session.stop();
}

#[tokio::test]
async fn test_submit_file_rejects_non_video() {
    let (session, server) = create_test_session().await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("notes.txt");
    tokio::fs::write(&file_path, b"not a video").await.unwrap();
    let file = VideoFile::from_path(&file_path).await.unwrap();

    let err = session
        .submit_file(file, UploadOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::InvalidType { .. })
    ));
    assert_eq!(
        error_texts(&session),
        vec!["Please choose a valid video file".to_string()]
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_file_rejects_oversized() {
    let (session, server) = create_test_session().await;

    // Validation runs on declared metadata; the file is never opened
    let file = VideoFile::new("/nonexistent/huge.mp4", "video/mp4", 500 * 1024 * 1024 + 1);
    let err = session
        .submit_file(file, UploadOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::TooLarge { .. })
    ));
    assert_eq!(
        error_texts(&session),
        vec!["File size cannot exceed 500 MB".to_string()]
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_file_missing_on_disk_hides_loading() {
    let (session, server) = create_test_session().await;

    let file = VideoFile::new("/nonexistent/gone.mp4", "video/mp4", 1024);
    let err = session
        .submit_file(file, UploadOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::SubmissionFailed { reason } => assert!(reason.starts_with("Upload failed: ")),
        other => panic!("expected submission failure, got {:?}", other),
    }
    assert!(!session.loading().is_visible());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_second_submission_replaces_first_job() {
    let (session, server) = create_test_session().await;
    Mock::given(method("POST"))
        .and(path("/api/process-video"))
        .respond_with(Sequence::new(vec![
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": true, "task_id": "first"})),
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": true, "task_id": "second"})),
        ]))
        .mount(&server)
        .await;
    mount_running(&server, "first").await;
    mount_running(&server, "second").await;

    let mut rx = session.subscribe();
    session
        .submit_url("https://youtu.be/one", UploadOptions::default())
        .await
        .unwrap();
    session
        .submit_url("https://youtu.be/two", UploadOptions::default())
        .await
        .unwrap();

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::PollCancelled { job_id } if *job_id == "first"
    )));
    assert_eq!(session.active_job(), Some(JobId::from("second")));

    tokio::time::sleep(TEST_INTERVAL * 3).await;
    assert_eq!(request_count(&server, "/api/status/first").await, 0);
    assert_eq!(session.live_pollers(), 1);
    session.stop();
}
