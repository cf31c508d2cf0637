// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapters that let concrete scenes take part in routing.
//!
//! Enabled via feature flags so the routing core stays independent of any scene.

#[cfg(feature = "scene_adapter")]
pub mod scene;
