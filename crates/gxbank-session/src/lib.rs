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

//! # gxbank Session
//!
//! The stateful layer of the workspace. A [`Session`] owns the loaded texture and
//! model banks and keeps the selection tree, dirty flag and renderer cache in step
//! with them; the [`Dispatcher`] drives a session from command-line arguments or
//! interactive input.

#![warn(missing_docs)]

pub mod command;
pub mod commands;
pub mod dispatcher;
pub mod selection;
pub mod session;
pub mod tokenizer;

pub use command::{Command, CommandContext, CommandRegistry, Flow, Mode};
pub use dispatcher::{BatchOutcome, Dispatcher};
pub use selection::{CheckState, DrawItem, NodeId, SelectionTree, TriStateTree};
pub use session::{Codecs, Session};
pub use tokenizer::tokenize;
