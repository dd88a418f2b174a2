//! Integration tests for pods that resolve after they are handed out

mod common;

use std::time::Duration;

use ::common::error::PodError;
use ::common::pod::Pod;
use tokio::sync::oneshot;

#[tokio::test]
async fn test_calls_wait_for_the_pod() {
    let (concrete, _host) = common::setup_test_pod().await;
    let id = concrete
        .poly_out()
        .import_archive(common::ARCHIVE_URL, None)
        .await
        .unwrap();
    let expected = concrete.poly_out().read_file(&id).await.unwrap();

    let (tx, rx) = oneshot::channel::<Pod>();
    let deferred = Pod::deferred(async move { rx.await.map_err(|e| PodError::Bridge(e.to_string())) });

    let pending = tokio::spawn({
        let deferred = deferred.clone();
        let id = id.clone();
        async move { deferred.poly_out().read_file(&id).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!pending.is_finished());

    assert!(tx.send(concrete).is_ok());
    assert_eq!(pending.await.unwrap().unwrap(), expected);
}

#[tokio::test]
async fn test_every_capability_shares_the_resolution() {
    let (concrete, _host) = common::setup_test_pod().await;
    let deferred = Pod::deferred(async move { Ok(concrete) });

    let id = deferred
        .poly_out()
        .import_archive(common::ARCHIVE_URL, None)
        .await
        .unwrap();
    deferred.poly_nav().set_title("Deferred").await.unwrap();
    assert_eq!(deferred.info().get_runtime().await.unwrap(), "polypod-rs");
    assert_eq!(
        deferred.poly_out().read_dir("").await.unwrap()[0].id,
        id
    );
}

#[tokio::test]
async fn test_failed_resolution_reaches_every_call() {
    let deferred = Pod::deferred(async { Err(PodError::Bridge("handshake failed".to_string())) });

    assert_eq!(
        deferred.poly_out().read_dir("").await,
        Err(PodError::Bridge("handshake failed".to_string()))
    );
    assert_eq!(
        deferred.info().get_version().await,
        Err(PodError::Bridge("handshake failed".to_string()))
    );
}
