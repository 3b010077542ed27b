//! Interrupts raised mid-turn and the decisions that answer them.
//!
//! The conversation engine pauses a turn with a batch of [`Interrupt`]s when
//! a tool call needs an OAuth grant or an explicit yes from the user. Each
//! interrupt is answered with a [`Decision`], and the batch of decisions is
//! packed into a [`ResumePayload`] that continues the paused turn.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Handle for an authorization request the user must complete in a browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Opaque request id, used to wait for completion.
    pub id: String,
    /// Consent link shown to the user.
    #[serde(default)]
    pub url: Option<String>,
}

/// What an interrupt is waiting on.
#[derive(Debug, Clone, PartialEq)]
pub enum InterruptKind {
    /// The tool needs the user to grant access to a third-party account.
    Authorization {
        tool_name: String,
        request: AuthorizationRequest,
    },
    /// The tool call must be approved by the user before it runs.
    HumanApproval { tool_name: String, input: Value },
    /// Neither flag was set. Always resolved as not authorized.
    Unrecognized { payload: Value },
}

/// JavaScript-style truthiness, the way other agents set interrupt flags.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

impl InterruptKind {
    /// Classifies a JSON interrupt value.
    ///
    /// Flags are read with truthy semantics (`true`, `1`, `"yes"` all count).
    /// Authorization is checked before human approval. An authorization flag
    /// without a usable `authorization_response` cannot be waited on and
    /// falls through to [`InterruptKind::Unrecognized`].
    pub fn from_value(value: &Value) -> Self {
        let unrecognized = || Self::Unrecognized {
            payload: value.clone(),
        };
        let Some(fields) = value.as_object() else {
            return unrecognized();
        };
        let tool_name = match fields.get("tool_name") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
        };

        if truthy(fields.get("authorization_required")) {
            return fields
                .get("authorization_response")
                .cloned()
                .and_then(|v| serde_json::from_value::<AuthorizationRequest>(v).ok())
                .map(|request| Self::Authorization { tool_name, request })
                .unwrap_or_else(unrecognized);
        }
        if truthy(fields.get("hitl_required")) {
            return Self::HumanApproval {
                tool_name,
                input: fields.get("input").cloned().unwrap_or(Value::Null),
            };
        }
        unrecognized()
    }

    /// Renders the interrupt into its JSON wire form.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Authorization { tool_name, request } => serde_json::json!({
                "authorization_required": true,
                "tool_name": tool_name,
                "authorization_response": request,
            }),
            Self::HumanApproval { tool_name, input } => serde_json::json!({
                "hitl_required": true,
                "tool_name": tool_name,
                "input": input,
            }),
            Self::Unrecognized { payload } => payload.clone(),
        }
    }

    /// Name of the gated tool, if the interrupt names one.
    #[cfg(test)]
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Self::Authorization { tool_name, .. } | Self::HumanApproval { tool_name, .. } => {
                Some(tool_name)
            }
            Self::Unrecognized { .. } => None,
        }
    }
}

/// A pause signal emitted by the engine.
///
/// Carries the wire `value` rather than a typed kind, so whoever handles it
/// classifies it with [`Interrupt::kind`] and must cope with values it does
/// not understand.
#[derive(Debug, Clone, PartialEq)]
pub struct Interrupt {
    pub id: String,
    pub value: Value,
}

impl Interrupt {
    /// An interrupt with a fresh id carrying the wire form of `kind`.
    pub fn new(kind: InterruptKind) -> Self {
        Self::from_value(uuid::Uuid::new_v4().to_string(), kind.to_value())
    }

    /// Wraps a raw JSON interrupt value.
    pub fn from_value(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }

    /// What the interrupt is waiting on.
    pub fn kind(&self) -> InterruptKind {
        InterruptKind::from_value(&self.value)
    }
}

/// Outcome of resolving one interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub authorized: bool,
}

impl Decision {
    pub fn allow() -> Self {
        Self { authorized: true }
    }

    pub fn deny() -> Self {
        Self { authorized: false }
    }
}

/// Value handed back to the engine to continue a paused turn.
///
/// A lone interrupt is answered with a bare decision, several with a list in
/// interrupt order. Serialized untagged, so the wire form is an object or an
/// array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResumePayload {
    Single(Decision),
    Batch(Vec<Decision>),
}

impl ResumePayload {
    /// Packs decisions. Returns `None` when there is nothing to resume.
    pub fn pack(mut decisions: Vec<Decision>) -> Option<Self> {
        match decisions.len() {
            0 => None,
            1 => decisions.pop().map(Self::Single),
            _ => Some(Self::Batch(decisions)),
        }
    }

    /// Decisions in interrupt order.
    pub fn into_decisions(self) -> Vec<Decision> {
        match self {
            Self::Single(decision) => vec![decision],
            Self::Batch(decisions) => decisions,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(decisions) => decisions.len(),
        }
    }
}
