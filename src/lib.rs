// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // document loading + run profiles
pub mod diagram;    // mermaid export
pub mod engine;     // run sessions
pub mod errors;     // error handling
pub mod observability;
pub mod program;    // graph model, prototypes, serialization
pub mod traits;     // engine + validator seams
