use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// HTTP method used by an API call step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl ApiMethod {
    /// Only POST and PUT carry a request body.
    pub fn allows_body(self) -> bool {
        matches!(self, ApiMethod::Post | ApiMethod::Put)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApiMethod::Get => "GET",
            ApiMethod::Post => "POST",
            ApiMethod::Put => "PUT",
            ApiMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminant of a step, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepType {
    Navigate,
    Click,
    Input,
    Assert,
    ApiCall,
}

/// Type-specific part of a step.
///
/// Each variant holds only the fields that make sense for it, so switching
/// type can never leave stale fields behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StepKind {
    Navigate,
    Click,
    Input {
        #[serde(default)]
        value: String,
    },
    Assert,
    ApiCall {
        #[serde(default)]
        method: ApiMethod,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },
}

impl StepKind {
    pub fn step_type(&self) -> StepType {
        match self {
            StepKind::Navigate => StepType::Navigate,
            StepKind::Click => StepType::Click,
            StepKind::Input { .. } => StepType::Input,
            StepKind::Assert => StepType::Assert,
            StepKind::ApiCall { .. } => StepType::ApiCall,
        }
    }

    /// Builds the empty payload for a step type.
    pub fn empty(step_type: StepType) -> Self {
        match step_type {
            StepType::Navigate => StepKind::Navigate,
            StepType::Click => StepKind::Click,
            StepType::Input => StepKind::Input {
                value: String::new(),
            },
            StepType::Assert => StepKind::Assert,
            StepType::ApiCall => StepKind::ApiCall {
                method: ApiMethod::Get,
                body: None,
            },
        }
    }
}

/// One step of a test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    pub id: String,
    /// Short description of what the step does
    pub name: String,
    /// CSS selector, URL, or API endpoint
    pub target: String,
    #[serde(flatten)]
    pub kind: StepKind,
}

impl TestStep {
    pub fn new(kind: StepKind, name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: format!("step-{}", Uuid::new_v4().simple()),
            name: name.into(),
            target: target.into(),
            kind,
        }
    }

    pub fn step_type(&self) -> StepType {
        self.kind.step_type()
    }

    /// Switches the step to another type.
    ///
    /// Fields belonging to the old type are dropped. Switching to the type the
    /// step already has is a no-op.
    pub fn change_type(&mut self, step_type: StepType) {
        if self.step_type() != step_type {
            self.kind = StepKind::empty(step_type);
        }
    }

    /// Sets the method of an API call step, dropping the body when the new
    /// method cannot carry one. Ignored for other step types.
    pub fn set_method(&mut self, new_method: ApiMethod) {
        if let StepKind::ApiCall { method, body } = &mut self.kind {
            *method = new_method;
            if !new_method.allows_body() {
                *body = None;
            }
        }
    }

    /// Sets the request body of an API call step.
    ///
    /// Returns false (and changes nothing) unless the step is an API call
    /// whose method allows a body.
    pub fn set_body(&mut self, new_body: impl Into<String>) -> bool {
        match &mut self.kind {
            StepKind::ApiCall { method, body } if method.allows_body() => {
                *body = Some(new_body.into());
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_type_drops_old_fields() {
        let mut step = TestStep::new(
            StepKind::Input {
                value: "secret".to_string(),
            },
            "Type password",
            "#password",
        );
        step.change_type(StepType::Click);
        assert_eq!(step.kind, StepKind::Click);

        step.change_type(StepType::ApiCall);
        assert_eq!(
            step.kind,
            StepKind::ApiCall {
                method: ApiMethod::Get,
                body: None
            }
        );
    }

    #[test]
    fn test_change_to_same_type_keeps_payload() {
        let mut step = TestStep::new(
            StepKind::Input {
                value: "admin".to_string(),
            },
            "Type user",
            "#user",
        );
        step.change_type(StepType::Input);
        assert_eq!(
            step.kind,
            StepKind::Input {
                value: "admin".to_string()
            }
        );
    }

    #[test]
    fn test_method_without_body_clears_body() {
        let mut step = TestStep::new(StepKind::empty(StepType::ApiCall), "Create", "/api/users");
        step.set_method(ApiMethod::Post);
        assert!(step.set_body(r#"{"name":"a"}"#));

        step.set_method(ApiMethod::Delete);
        assert_eq!(
            step.kind,
            StepKind::ApiCall {
                method: ApiMethod::Delete,
                body: None
            }
        );
        assert!(!step.set_body("{}"));
    }

    #[test]
    fn test_method_display_matches_wire_name() {
        for method in [ApiMethod::Get, ApiMethod::Post, ApiMethod::Put, ApiMethod::Delete] {
            assert_eq!(
                serde_json::to_value(method).unwrap(),
                json!(method.to_string())
            );
        }
    }

    #[test]
    fn test_wire_shape() {
        let step = TestStep {
            id: "s1".to_string(),
            name: "Fetch users".to_string(),
            target: "/api/users".to_string(),
            kind: StepKind::ApiCall {
                method: ApiMethod::Get,
                body: None,
            },
        };
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "s1",
                "name": "Fetch users",
                "target": "/api/users",
                "type": "ApiCall",
                "method": "GET"
            })
        );
    }

    #[test]
    fn test_parse_input_step() {
        let step: TestStep = serde_json::from_value(json!({
            "id": "s2",
            "type": "Input",
            "name": "Enter email",
            "target": "#email",
            "value": "qa@example.com"
        }))
        .unwrap();
        assert_eq!(step.step_type(), StepType::Input);
        assert_eq!(
            step.kind,
            StepKind::Input {
                value: "qa@example.com".to_string()
            }
        );
    }
}
