// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod engine;
pub mod validator;

pub use engine::Engine;
pub use validator::{PermissiveValidator, Validation, Validator};
