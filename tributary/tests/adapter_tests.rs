/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tributary::prelude::*;

use crate::setup::sources::{CountingSource, FailingSource};
use crate::setup::*;

mod setup;

#[tokio::test]
async fn failing_source_reports_errors_and_keeps_polling() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = MessageBus::new();
    let feed: Arc<dyn MessageChannel> = Arc::new(SimpleChannel::new());
    bus.register_channel("feed", feed.clone())?;

    let source = FailingSource::new();
    let polls = source.poll_count();
    let adapter = PollingSourceAdapter::new(source, feed.clone())
        .with_period(Duration::from_millis(25));
    bus.register_source_adapter("failing", Arc::new(adapter))?;
    bus.start()?;

    let error_channel = bus.error_channel();
    for _ in 0..2 {
        let report = error_channel
            .receive_timeout(Some(Duration::from_millis(1_000)))
            .await
            .expect("each failed poll should be reported");
        assert_eq!(
            report.payload_as::<ErrorMessage>().unwrap().description(),
            "intentional test failure"
        );
    }
    bus.stop().await?;

    // Two reports arrived, so the adapter survived its first failure.
    assert!(polls.load(Ordering::SeqCst) >= 2);
    assert!(feed.try_receive().await.is_none());
    Ok(())
}

#[tokio::test]
async fn counting_source_items_arrive_as_messages() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = MessageBus::new();
    let feed: Arc<dyn MessageChannel> = Arc::new(SimpleChannel::new());
    bus.register_channel("feed", feed.clone())?;

    let adapter = PollingSourceAdapter::new(CountingSource::up_to(3), feed.clone())
        .with_period(Duration::from_millis(25))
        .with_limit(10);
    bus.register_source_adapter("counting", Arc::new(adapter))?;
    bus.start()?;

    let mut values = Vec::new();
    for _ in 0..3 {
        let message = feed
            .receive_timeout(Some(Duration::from_millis(1_000)))
            .await
            .expect("polled item should be injected");
        values.push(*message.payload_as::<usize>().unwrap());
    }
    bus.stop().await?;

    assert_eq!(values, vec![0, 1, 2]);
    assert!(feed.try_receive().await.is_none());
    Ok(())
}

#[tokio::test]
async fn poll_cycle_fails_when_the_channel_stays_full() -> anyhow::Result<()> {
    initialize_tracing();
    let feed: Arc<dyn MessageChannel> = Arc::new(SimpleChannel::with_capacity(1));
    let adapter = PollingSourceAdapter::new(CountingSource::up_to(2), feed.clone())
        .with_send_timeout(Duration::from_millis(25));

    // The first item fits; the second finds the channel full and nobody
    // draining it.
    let err = adapter.poll_once().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MessagingError>(),
        Some(MessagingError::SendFailed(_))
    ));
    assert!(feed.try_receive().await.is_some());
    Ok(())
}

#[tokio::test]
async fn injected_messages_consult_the_configured_generator() -> anyhow::Result<()> {
    initialize_tracing();

    #[derive(Debug)]
    struct FixedGenerator(uuid::Uuid);

    impl IdGenerator for FixedGenerator {
        fn next_id(&self) -> uuid::Uuid {
            self.0
        }
    }

    let id = uuid::Uuid::new_v4();
    let feed: Arc<dyn MessageChannel> = Arc::new(SimpleChannel::new());
    let adapter = PollingSourceAdapter::new(CountingSource::up_to(1), feed.clone())
        .with_generator(Arc::new(FixedGenerator(id)));

    assert_eq!(adapter.poll_once().await?, 1);
    let message = feed.try_receive().await.expect("item injected");
    assert_eq!(message.id(), id);
    Ok(())
}
