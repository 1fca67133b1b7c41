use axum::body::Bytes;
use serde_json::Value;

use crate::{
    error::AppError::{self, InvalidInput, MalformedPayload},
    thought::{MAX_MESSAGE_LEN, MIN_MESSAGE_LEN},
};

/// Pulls a valid `message` out of a create request body.
pub fn get_message_from_body(body: &Bytes) -> Result<String, AppError> {
    let payload: Value = serde_json::from_slice(body).map_err(|_| MalformedPayload)?;

    let message = match payload.get("message") {
        None | Some(Value::Null) => return Err(InvalidInput("message is required".into())),
        Some(Value::String(message)) => message,
        Some(_) => return Err(InvalidInput("message must be a string".into())),
    };

    validate_message(message)?;

    Ok(message.clone())
}

pub fn validate_message(message: &str) -> Result<(), AppError> {
    // characters, not bytes
    let len = message.chars().count();

    if !(MIN_MESSAGE_LEN..=MAX_MESSAGE_LEN).contains(&len) {
        return Err(InvalidInput(format!(
            "message must be between {MIN_MESSAGE_LEN} and {MAX_MESSAGE_LEN} characters, got {len}"
        )));
    }

    Ok(())
}
