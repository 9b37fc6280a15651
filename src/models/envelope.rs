// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Uniform response wrapper returned by every backend endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// `{success, data, message?, errors?}` envelope.
///
/// When `success` is false, `data` must be treated as absent regardless of
/// the HTTP status the envelope arrived with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    /// Missing or `null` in the JSON body both decode to `None`.
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: Vec::new(),
        }
    }

    /// Application-level failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            errors: Vec::new(),
        }
    }

    fn rejection(self) -> ApiError {
        ApiError::Application {
            message: self.message,
            errors: self.errors,
        }
    }

    /// Unwrap the payload, turning `success: false` into an application error.
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(self.rejection());
        }
        self.data
            .ok_or_else(|| ApiError::Decode("successful envelope without data".to_string()))
    }

    /// Check the success flag only, discarding any payload.
    pub fn into_ack(self) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(self.rejection())
        }
    }
}

impl Envelope<Value> {
    /// Unwrap an opaque payload; a missing `data` becomes `null`.
    pub fn into_value(self) -> Result<Value, ApiError> {
        if !self.success {
            return Err(self.rejection());
        }
        Ok(self.data.unwrap_or(Value::Null))
    }

    /// Decode the payload as `T`.
    ///
    /// The payload of a failed envelope is dropped without being parsed, so
    /// a rejection always stays a rejection whatever shape its `data` has.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Envelope<T>, ApiError> {
        let data = match self.data {
            Some(data) if self.success => Some(
                serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))?,
            ),
            _ => None,
        };

        Ok(Envelope {
            success: self.success,
            data,
            message: self.message,
            errors: self.errors,
        })
    }
}
