use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-facing message shown after an action settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(title: &str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".to_string(),
            message: message.into(),
        }
    }

    #[cfg(test)]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// The confirmation step shown before an order is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletePrompt {
    pub order_id: String,
    pub title: &'static str,
    pub text: &'static str,
    pub confirm_label: &'static str,
    pub cancel_label: &'static str,
}

impl DeletePrompt {
    pub fn for_order(order_id: &str) -> Self {
        Self {
            order_id: order_id.to_string(),
            title: "Are you sure?",
            text: "You won't be able to revert this!",
            confirm_label: "Yes, delete it!",
            cancel_label: "Cancel",
        }
    }
}
