//! Integration tests for a pod served over the native bridge

mod common;

use std::time::Duration;

use ::common::bridge;
use ::common::error::PodError;
use ::common::nav::{Action, ExternalFile, PickerEvent};
use ::common::rdf::{Matcher, Quad, Term};
use bytes::Bytes;

#[tokio::test]
async fn test_remote_pod_round_trip() {
    let (pod, host) = common::setup_test_pod().await;
    let (host_port, feature_port) = bridge::channel();
    let server = tokio::spawn(bridge::serve(pod, host_port));

    let remote = bridge::connect(feature_port);

    let id = remote
        .poly_out()
        .import_archive(common::ARCHIVE_URL, None)
        .await
        .unwrap();
    let data = remote
        .poly_out()
        .read_file(&format!("{}/docs/a.json", id))
        .await
        .unwrap();
    assert_eq!(data, Bytes::from(common::ENTRY_JSON));

    let quad = Quad::new(
        Term::named("http://example.org/me"),
        Term::named("http://example.org/name"),
        Term::lang_literal("Ich", "de"),
    );
    remote.poly_in().add(&quad).await.unwrap();
    assert_eq!(
        remote.poly_in().r#match(&Matcher::default()).await.unwrap(),
        vec![quad]
    );

    remote.poly_nav().set_title("Remote").await.unwrap();
    remote
        .poly_nav()
        .set_active_actions(&[Action::Back])
        .await
        .unwrap();
    assert_eq!(host.titles(), vec!["Remote".to_string()]);
    assert_eq!(host.history(), vec!["Remote".to_string()]);

    // the server stops once the feature side hangs up
    drop(remote);
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_errors_and_files_cross_the_bridge() {
    let (pod, host) = common::setup_test_pod().await;
    let (host_port, feature_port) = bridge::channel();
    tokio::spawn(bridge::serve(pod, host_port));
    let remote = bridge::connect(feature_port);

    assert!(matches!(
        remote.poly_out().read_file("polypod://missing").await,
        Err(PodError::NotFound(_))
    ));
    assert_eq!(
        remote
            .endpoint()
            .get("unknownEndpoint", None, None)
            .await,
        Err(PodError::UnknownEndpoint {
            operation: "get".to_string(),
            endpoint: "unknownEndpoint".to_string(),
        })
    );

    let picked = ExternalFile {
        name: "export.zip".to_string(),
        url: "file:///tmp/export.zip".to_string(),
        size: 3,
    };
    host.queue_pick(vec![PickerEvent::Selected(picked.clone())]);
    let file = remote
        .poly_nav()
        .pick_file(Some("application/zip"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(file.name, picked.name);
    assert_eq!(file.size, picked.size);
    assert!(file.url.starts_with("polypod-picked://"));
    assert!(!file.url.contains("/tmp/"));

    remote
        .poly_out()
        .write_file("polypod://notes", Bytes::from_static(b"\x00binary"))
        .await
        .unwrap();
    assert_eq!(
        remote.poly_out().read_file("polypod://notes").await.unwrap(),
        Bytes::from_static(b"\x00binary")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mutations_commit_in_call_order() {
    let (pod, _host) = common::setup_test_pod().await;
    let (host_port, feature_port) = bridge::channel();
    tokio::spawn(bridge::serve(pod, host_port));
    let remote = bridge::BridgeClient::start(feature_port).into_pod();
    let poly_in = remote.poly_in();

    for n in 0..50 {
        let quad = Quad::new(
            Term::named(format!("http://example.org/item/{}", n)),
            Term::named("http://example.org/seen"),
            Term::literal("yes"),
        );
        // both requests are on the wire before either reply comes back
        let (added, deleted) =
            futures::future::join(poly_in.add(&quad), poly_in.delete(&quad)).await;
        added.unwrap();
        deleted.unwrap();
        assert!(!poly_in.has(&quad).await.unwrap(), "round {}", n);
    }
}
