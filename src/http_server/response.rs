//! # Response Envelopes
//!
//! Every response body carries `success`. Successful bodies add `data`
//! (and `count` for lists, `message` for writes); failures add `message` and,
//! when there is something to report, `error`.

use serde::Serialize;

/// Single record response
#[derive(Debug, Clone, Serialize)]
pub struct SingleResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

impl<T: Serialize> SingleResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: &'static str) -> Self {
        Self {
            success: true,
            message: Some(message),
            data,
        }
    }
}

/// List response
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
        }
    }

    pub fn with_detail(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_response_serialization() {
        let response = ListResponse::new(vec![json!({"id": 1}), json!({"id": 2})]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 2);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_single_response_omits_missing_message() {
        let json = serde_json::to_value(SingleResponse::new(json!({"id": 1}))).unwrap();
        assert!(json.get("message").is_none());

        let json = serde_json::to_value(SingleResponse::with_message(
            json!({"id": 1}),
            "Student created successfully",
        ))
        .unwrap();
        assert_eq!(json["message"], "Student created successfully");
    }

    #[test]
    fn test_error_response_serialization() {
        let json = serde_json::to_value(ErrorResponse::new("Student not found")).unwrap();
        assert_eq!(json, json!({"success": false, "message": "Student not found"}));

        let json =
            serde_json::to_value(ErrorResponse::with_detail("Error creating student", "bad"))
                .unwrap();
        assert_eq!(json["error"], "bad");
    }
}
