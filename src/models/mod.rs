// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models exchanged with the admin backend.

pub mod admin;
pub mod envelope;
pub mod user;

pub use admin::{BlockRequest, DashboardStats, ExtendRequest, ListParams, TestingModeRequest};
pub use envelope::Envelope;
pub use user::{LoginRequest, LoginResponse, User};
