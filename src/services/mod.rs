// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - backend access and session state.

pub mod admin;
pub mod backend;
pub mod events;
pub mod layers;
pub mod navigator;
pub mod session;
pub mod token_store;

pub use backend::{ApiClient, ApiClientBuilder, Call, Exchange, RequestLayer, ResponseLayer};
pub use events::{SessionEvent, SessionEvents};
pub use navigator::Navigator;
pub use session::{AuthSession, AuthState, SessionError};
pub use token_store::{FilePersistence, MemoryPersistence, StoreError, TokenPersistence, TokenStore};
