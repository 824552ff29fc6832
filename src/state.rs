// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::storage::SecureStorage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<SecureStorage>,
}

impl AppState {
    pub fn new(storage: SecureStorage) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }
}
