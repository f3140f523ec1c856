/*
 * Copyright (c) 2024. Weir Contributors
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

//! Shared internal type aliases.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::traits::Consume;

/// A clonable boolean lifecycle flag (`running`, `looping`).
pub(crate) type HaltFlag = Arc<AtomicBool>;

/// A shared, type-erased actor implementation.
pub(crate) type ConsumerRef = Arc<dyn Consume>;
