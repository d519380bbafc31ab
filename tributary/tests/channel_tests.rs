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
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tributary::prelude::*;

use crate::setup::*;

mod setup;

#[tokio::test]
async fn send_with_zero_timeout_on_full_channel_returns_false_immediately() {
    initialize_tracing();
    let channel = SimpleChannel::with_capacity(2);
    assert!(channel.try_send(Message::new("a".to_string())).await);
    assert!(channel.try_send(Message::new("b".to_string())).await);

    assert!(!channel.try_send(Message::new("c".to_string())).await);

    // The rejected message never entered the buffer.
    assert_eq!(
        channel
            .receive()
            .await
            .unwrap()
            .payload_as::<String>()
            .unwrap(),
        "a"
    );
    assert_eq!(
        channel
            .receive()
            .await
            .unwrap()
            .payload_as::<String>()
            .unwrap(),
        "b"
    );
    assert!(channel.try_receive().await.is_none());
}

#[tokio::test]
async fn receive_with_zero_timeout_on_empty_channel_returns_none_immediately() {
    initialize_tracing();
    let channel = SimpleChannel::new();
    assert!(channel.try_receive().await.is_none());
}

#[tokio::test]
async fn bounded_send_gives_up_after_the_timeout() {
    initialize_tracing();
    let channel = SimpleChannel::with_capacity(1);
    assert!(channel.send(Message::new(1_u32)).await);
    assert!(
        !channel
            .send_timeout(Message::new(2_u32), Some(Duration::from_millis(50)))
            .await
    );
}

#[tokio::test]
async fn interceptors_run_in_insertion_order_around_send_and_receive() {
    initialize_tracing();

    struct Recording {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl ChannelInterceptor for Recording {
        fn pre_send(&self, _message: &Message, _channel: &str) -> bool {
            self.log.lock().unwrap().push(format!("{}:pre_send", self.label));
            true
        }

        fn post_send(&self, _message: &Message, _channel: &str, sent: bool) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:post_send:{}", self.label, sent));
        }

        fn pre_receive(&self, _channel: &str) -> bool {
            self.log.lock().unwrap().push(format!("{}:pre_receive", self.label));
            true
        }

        fn post_receive(&self, message: Option<&Message>, _channel: &str) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:post_receive:{}", self.label, message.is_some()));
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let channel = SimpleChannel::new();
    channel.interceptors().add(Arc::new(Recording {
        label: "first",
        log: log.clone(),
    }));
    channel.interceptors().add(Arc::new(Recording {
        label: "second",
        log: log.clone(),
    }));

    assert!(channel.send(Message::new("x".to_string())).await);
    assert!(channel.receive().await.is_some());
    assert!(channel.try_receive().await.is_none());

    let entries = log.lock().unwrap().clone();
    assert_eq!(
        entries,
        vec![
            "first:pre_send",
            "second:pre_send",
            "first:post_send:true",
            "second:post_send:true",
            "first:pre_receive",
            "second:pre_receive",
            "first:post_receive:true",
            "second:post_receive:true",
            "first:pre_receive",
            "second:pre_receive",
            "first:post_receive:false",
            "second:post_receive:false",
        ]
    );
}

#[tokio::test]
async fn receive_veto_yields_none_without_dequeuing() {
    initialize_tracing();

    struct VetoReceives {
        vetoing: AtomicBool,
    }

    impl ChannelInterceptor for VetoReceives {
        fn pre_receive(&self, _channel: &str) -> bool {
            !self.vetoing.load(Ordering::SeqCst)
        }
    }

    let veto = Arc::new(VetoReceives {
        vetoing: AtomicBool::new(true),
    });
    let channel = SimpleChannel::new();
    channel.interceptors().add(veto.clone());

    assert!(channel.send(Message::new("kept".to_string())).await);
    assert!(channel.receive_timeout(Some(Duration::ZERO)).await.is_none());

    // Lifting the veto reveals the message untouched.
    veto.vetoing.store(false, Ordering::SeqCst);
    let message = channel.receive().await.unwrap();
    assert_eq!(message.payload_as::<String>().unwrap(), "kept");
}
