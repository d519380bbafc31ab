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
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;

use tributary::prelude::*;

/// A source whose every poll fails, counting attempts so tests can observe
/// that polling continues after a failure.
pub struct FailingSource {
    polls: Arc<AtomicUsize>,
}

impl FailingSource {
    pub fn new() -> Self {
        FailingSource {
            polls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A counter handle that outlives the source once it moves into an
    /// adapter.
    pub fn poll_count(&self) -> Arc<AtomicUsize> {
        self.polls.clone()
    }
}

#[async_trait]
impl PollableSource for FailingSource {
    async fn poll(&self, _limit: usize) -> anyhow::Result<Vec<Arc<dyn Payload>>> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("intentional test failure"))
    }
}

/// A source that hands out the numbers `0..total`, up to `limit` per poll.
pub struct CountingSource {
    next: AtomicUsize,
    total: usize,
}

impl CountingSource {
    pub fn up_to(total: usize) -> Self {
        CountingSource {
            next: AtomicUsize::new(0),
            total,
        }
    }
}

#[async_trait]
impl PollableSource for CountingSource {
    async fn poll(&self, limit: usize) -> anyhow::Result<Vec<Arc<dyn Payload>>> {
        let mut items: Vec<Arc<dyn Payload>> = Vec::new();
        while items.len() < limit {
            let value = self.next.fetch_add(1, Ordering::SeqCst);
            if value >= self.total {
                self.next.fetch_sub(1, Ordering::SeqCst);
                break;
            }
            items.push(Arc::new(value));
        }
        Ok(items)
    }
}
