use serde::{Deserialize, Serialize};

/// JSON envelope shared by every endpoint: `{success, data?, message?}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Attach a human-readable note to a successful response.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_omits_data() {
        let body = serde_json::to_value(ApiResponse::error("ask a1 not found")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "ask a1 not found"})
        );
    }

    #[test]
    fn test_success_envelope_round_trip() {
        let body = serde_json::to_string(&ApiResponse::ok(42u8).with_message("Already connected"))
            .unwrap();
        let parsed: ApiResponse<u8> = serde_json::from_str(&body).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.data, Some(42));
        assert_eq!(parsed.message.as_deref(), Some("Already connected"));
    }
}
