// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # gxbank Core
//!
//! Foundational crate containing the bank data model, editor settings, the shared
//! error type and the contracts every collaborator (container codecs, image files,
//! renderer caches) is driven through.

#![warn(missing_docs)]

pub mod asset;
pub mod codec;
pub mod error;
pub mod event;
pub mod settings;

pub use error::{BankError, BankResult, ErrorKind};
pub use settings::{ByteOrder, EditorSettings, Game, Interpolation};
