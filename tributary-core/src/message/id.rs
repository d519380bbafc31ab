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

use uuid::Uuid;

/// Supplies unique identifiers for newly created messages.
///
/// The runtime only requires that identifiers be unique and inexpensive to
/// generate. A generator is passed explicitly at message-construction time
/// ([`Message::with_generator`](crate::message::Message::with_generator));
/// there is no process-wide generator to swap out.
pub trait IdGenerator: Send + Sync {
    /// Returns the next unique identifier.
    fn next_id(&self) -> Uuid;
}

/// The default identifier generator, producing random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn default_generator_yields_unique_ids() {
        let generator = UuidGenerator;
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generator.next_id()));
        }
    }
}
