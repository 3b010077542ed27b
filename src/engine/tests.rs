use super::*;
use crate::arcade::AuthorizationResponse;
use crate::interrupt::Decision;
use crate::message::{Role, ToolCall};
use crate::tools::ToolOutcome;
use anyhow::anyhow;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub(crate) struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ChatMessage>>>,
    pub requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub(crate) fn new(replies: impl IntoIterator<Item = ChatMessage>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from([Err(anyhow!("model unavailable"))])),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn last_request(&self) -> ModelRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait::async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: ModelRequest) -> Result<ChatMessage> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted reply left")))
    }
}

/// Backend whose authorization answers are fixed per tool.
#[derive(Default)]
pub(crate) struct FakeBackend {
    pending_auth: HashMap<String, String>,
    pub authorize_calls: Mutex<Vec<String>>,
    pub executed: Mutex<Vec<(String, Value)>>,
}

impl FakeBackend {
    /// `tool` reports a pending authorization with request id `id`.
    pub(crate) fn with_pending_auth(mut self, tool: &str, id: &str) -> Self {
        self.pending_auth.insert(tool.to_string(), id.to_string());
        self
    }

    fn executed_tools(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl ToolBackend for FakeBackend {
    async fn authorize(&self, tool_name: &str, user_id: &str) -> Result<AuthorizationResponse> {
        assert_eq!(user_id, "me@example.com");
        self.authorize_calls
            .lock()
            .unwrap()
            .push(tool_name.to_string());
        Ok(match self.pending_auth.get(tool_name) {
            Some(id) => AuthorizationResponse {
                id: Some(id.clone()),
                status: AuthStatus::Pending,
                url: Some(format!("https://example.com/consent/{id}")),
                scopes: Vec::new(),
            },
            None => AuthorizationResponse {
                id: None,
                status: AuthStatus::Completed,
                url: None,
                scopes: Vec::new(),
            },
        })
    }

    async fn execute(&self, tool_name: &str, input: Value, _user_id: &str) -> Result<ToolOutcome> {
        self.executed
            .lock()
            .unwrap()
            .push((tool_name.to_string(), input));
        Ok(ToolOutcome::success(format!("{tool_name} done")))
    }
}

fn spec(qualified: &str, auth: bool, approval: bool) -> ToolSpec {
    ToolSpec {
        name: crate::tools::model_tool_name(qualified),
        qualified_name: qualified.to_string(),
        description: format!("{qualified} tool"),
        parameters: json!({"type": "object", "properties": {}}),
        requires_authorization: auth,
        requires_approval: approval,
    }
}

pub(crate) fn reddit_catalog() -> ToolCatalog {
    ToolCatalog::new(vec![
        spec("Reddit.GetMyUsername", true, false),
        spec("Reddit.GetPostsInSubreddit", false, false),
        spec("Reddit.SubmitTextPost", false, true),
        spec("Reddit.CommentOnPost", false, true),
        spec("Reddit.ReplyToComment", true, true),
    ])
}

pub(crate) fn call(id: &str, name: &str) -> ToolCall {
    ToolCall::new(id, name, json!({"subreddit": "rust"}))
}

pub(crate) fn engine(model: Arc<ScriptedModel>, backend: Arc<FakeBackend>) -> ConversationEngine {
    ConversationEngine::new(EngineParts {
        system_prompt: "You are a Reddit assistant.".into(),
        model,
        tools: reddit_catalog(),
        backend,
        checkpointer: Arc::new(MemorySaver::new()),
        user_id: "me@example.com".into(),
    })
}

async fn run(
    engine: &ConversationEngine,
    input: TurnInput,
    thread: &ThreadConfig,
) -> Vec<StreamUpdate> {
    engine
        .stream(input, thread)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()
        .unwrap()
}

fn interrupts(updates: &[StreamUpdate]) -> Vec<Interrupt> {
    match updates.last() {
        Some(StreamUpdate::Interrupts(batch)) => batch.clone(),
        _ => Vec::new(),
    }
}

fn nodes(updates: &[StreamUpdate]) -> Vec<Node> {
    updates
        .iter()
        .filter_map(|u| match u {
            StreamUpdate::Messages { node, .. } => Some(*node),
            StreamUpdate::Interrupts(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn test_plain_reply_ends_turn() {
    let model = ScriptedModel::new([ChatMessage::assistant("Hi there")]);
    let engine = engine(model.clone(), Arc::new(FakeBackend::default()));
    let thread = ThreadConfig::new("t1");

    let updates = run(&engine, TurnInput::Message("hello".into()), &thread).await;

    assert_eq!(
        updates,
        [StreamUpdate::Messages {
            node: Node::Model,
            messages: vec![ChatMessage::assistant("Hi there")],
        }]
    );
    let request = model.last_request();
    assert_eq!(request.system_prompt, "You are a Reddit assistant.");
    assert_eq!(request.messages, [ChatMessage::user("hello")]);
    assert_eq!(request.tools.len(), 5);
    assert_eq!(engine.history(&thread).len(), 2);
}

#[tokio::test]
async fn test_ungated_tool_runs_and_model_is_called_again() {
    let model = ScriptedModel::new([
        ChatMessage::assistant_with_tools("", vec![call("c1", "Reddit_GetPostsInSubreddit")]),
        ChatMessage::assistant("Here are the posts"),
    ]);
    let backend = Arc::new(FakeBackend::default());
    let engine = engine(model.clone(), backend.clone());
    let thread = ThreadConfig::new("t1");

    let updates = run(&engine, TurnInput::Message("top of r/rust".into()), &thread).await;

    assert_eq!(nodes(&updates), [Node::Model, Node::Tools, Node::Model]);
    assert_eq!(backend.executed_tools(), ["Reddit.GetPostsInSubreddit"]);
    assert!(backend.authorize_calls.lock().unwrap().is_empty());

    let history = engine.history(&thread);
    let tool_message = &history[2];
    assert_eq!(tool_message.role, Role::Tool);
    assert_eq!(tool_message.tool_call_id.as_deref(), Some("c1"));
    assert_eq!(tool_message.text(), "Reddit.GetPostsInSubreddit done");
}

#[tokio::test]
async fn test_already_authorized_tool_does_not_interrupt() {
    let model = ScriptedModel::new([
        ChatMessage::assistant_with_tools("", vec![call("c1", "Reddit_GetMyUsername")]),
        ChatMessage::assistant("You are u/me"),
    ]);
    let backend = Arc::new(FakeBackend::default());
    let engine = engine(model, backend.clone());
    let thread = ThreadConfig::new("t1");

    let updates = run(&engine, TurnInput::Message("who am I".into()), &thread).await;

    assert!(interrupts(&updates).is_empty());
    assert_eq!(*backend.authorize_calls.lock().unwrap(), ["Reddit.GetMyUsername"]);
    assert_eq!(backend.executed_tools(), ["Reddit.GetMyUsername"]);
}

#[tokio::test]
async fn test_authorization_interrupt_then_resume() {
    let model = ScriptedModel::new([
        ChatMessage::assistant_with_tools("", vec![call("c1", "Reddit_GetMyUsername")]),
        ChatMessage::assistant("You are u/me"),
    ]);
    let backend = Arc::new(FakeBackend::default().with_pending_auth("Reddit.GetMyUsername", "ar_1"));
    let engine = engine(model, backend.clone());
    let thread = ThreadConfig::new("t1");

    let updates = run(&engine, TurnInput::Message("who am I".into()), &thread).await;
    let batch = interrupts(&updates);
    assert_eq!(batch.len(), 1);
    match batch[0].kind() {
        InterruptKind::Authorization { tool_name, request } => {
            assert_eq!(tool_name, "Reddit.GetMyUsername");
            assert_eq!(request.id, "ar_1");
            assert_eq!(
                request.url.as_deref(),
                Some("https://example.com/consent/ar_1")
            );
        }
        other => panic!("unexpected interrupt: {other:?}"),
    }
    assert!(backend.executed_tools().is_empty());

    let resumed = run(
        &engine,
        TurnInput::Resume(ResumePayload::Single(Decision::allow())),
        &thread,
    )
    .await;

    assert!(interrupts(&resumed).is_empty());
    assert_eq!(nodes(&resumed), [Node::Tools, Node::Model]);
    assert_eq!(backend.executed_tools(), ["Reddit.GetMyUsername"]);
    // A granted authorization is not asked for again.
    assert_eq!(backend.authorize_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_two_approvals_with_mixed_decisions() {
    let model = ScriptedModel::new([
        ChatMessage::assistant_with_tools(
            "",
            vec![
                call("c1", "Reddit_SubmitTextPost"),
                call("c2", "Reddit_CommentOnPost"),
            ],
        ),
        ChatMessage::assistant("Posted, but did not comment"),
    ]);
    let backend = Arc::new(FakeBackend::default());
    let engine = engine(model.clone(), backend.clone());
    let thread = ThreadConfig::new("t1");

    let updates = run(&engine, TurnInput::Message("post and comment".into()), &thread).await;
    let batch = interrupts(&updates);
    assert_eq!(batch.len(), 2);
    assert!(batch
        .iter()
        .all(|i| matches!(i.kind(), InterruptKind::HumanApproval { .. })));
    assert_eq!(batch[0].kind().tool_name(), Some("Reddit.SubmitTextPost"));

    let payload = ResumePayload::pack(vec![Decision::allow(), Decision::deny()]).unwrap();
    let resumed = run(&engine, TurnInput::Resume(payload), &thread).await;

    assert!(interrupts(&resumed).is_empty());
    assert_eq!(backend.executed_tools(), ["Reddit.SubmitTextPost"]);
    let results = match &resumed[0] {
        StreamUpdate::Messages { node, messages } => {
            assert_eq!(*node, Node::Tools);
            messages.clone()
        }
        other => panic!("unexpected update: {other:?}"),
    };
    assert_eq!(results[0].text(), "Reddit.SubmitTextPost done");
    assert_eq!(
        results[1].text(),
        "The user did not authorize the Reddit_CommentOnPost tool call."
    );

    // The model sees both results on its next call.
    let request = model.last_request();
    assert_eq!(
        request
            .messages
            .iter()
            .filter(|m| m.role == Role::Tool)
            .count(),
        2
    );
}

#[tokio::test]
async fn test_tool_needing_auth_and_approval_takes_two_cycles() {
    let model = ScriptedModel::new([
        ChatMessage::assistant_with_tools("", vec![call("c1", "Reddit_ReplyToComment")]),
        ChatMessage::assistant("Replied"),
    ]);
    let backend =
        Arc::new(FakeBackend::default().with_pending_auth("Reddit.ReplyToComment", "ar_2"));
    let engine = engine(model, backend.clone());
    let thread = ThreadConfig::new("t1");

    let first = run(&engine, TurnInput::Message("reply".into()), &thread).await;
    assert!(matches!(
        interrupts(&first)[0].kind(),
        InterruptKind::Authorization { .. }
    ));

    let allow = || TurnInput::Resume(ResumePayload::Single(Decision::allow()));
    let second = run(&engine, allow(), &thread).await;
    assert_eq!(second.len(), 1);
    assert!(matches!(
        interrupts(&second)[0].kind(),
        InterruptKind::HumanApproval { .. }
    ));
    assert!(backend.executed_tools().is_empty());

    let third = run(&engine, allow(), &thread).await;
    assert!(interrupts(&third).is_empty());
    assert_eq!(backend.executed_tools(), ["Reddit.ReplyToComment"]);
}

#[tokio::test]
async fn test_resume_without_pause_is_rejected() {
    let engine = engine(ScriptedModel::new(Vec::new()), Arc::new(FakeBackend::default()));
    let thread = ThreadConfig::new("t1");

    let items: Vec<_> = engine
        .stream(
            TurnInput::Resume(ResumePayload::Single(Decision::allow())),
            &thread,
        )
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    let err = items.into_iter().next().unwrap().unwrap_err();
    assert_eq!(
        err.downcast_ref::<EngineError>(),
        Some(&EngineError::NothingToResume)
    );
}

#[tokio::test]
async fn test_resume_length_mismatch_is_rejected() {
    let model = ScriptedModel::new([ChatMessage::assistant_with_tools(
        "",
        vec![
            call("c1", "Reddit_SubmitTextPost"),
            call("c2", "Reddit_CommentOnPost"),
        ],
    )]);
    let engine = engine(model, Arc::new(FakeBackend::default()));
    let thread = ThreadConfig::new("t1");
    run(&engine, TurnInput::Message("post".into()), &thread).await;

    let items: Vec<_> = engine
        .stream(
            TurnInput::Resume(ResumePayload::Single(Decision::allow())),
            &thread,
        )
        .collect()
        .await;

    let err = items.into_iter().next().unwrap().unwrap_err();
    assert_eq!(
        err.downcast_ref::<EngineError>(),
        Some(&EngineError::ResumeMismatch {
            expected: 2,
            got: 1
        })
    );
}

#[tokio::test]
async fn test_new_message_cancels_paused_calls() {
    let model = ScriptedModel::new([
        ChatMessage::assistant_with_tools("", vec![call("c1", "Reddit_SubmitTextPost")]),
        ChatMessage::assistant("Never mind then"),
    ]);
    let backend = Arc::new(FakeBackend::default());
    let engine = engine(model.clone(), backend.clone());
    let thread = ThreadConfig::new("t1");

    run(&engine, TurnInput::Message("post".into()), &thread).await;
    let updates = run(&engine, TurnInput::Message("actually, don't".into()), &thread).await;

    assert_eq!(nodes(&updates), [Node::Model]);
    assert!(backend.executed_tools().is_empty());
    let messages = model.last_request().messages;
    let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, [Role::User, Role::Assistant, Role::Tool, Role::User]);
    assert!(messages[2].text().starts_with("Tool call cancelled"));
}

#[tokio::test]
async fn test_unknown_tool_becomes_error_result() {
    let model = ScriptedModel::new([
        ChatMessage::assistant_with_tools("", vec![call("c1", "Reddit_DeleteEverything")]),
        ChatMessage::assistant("That tool does not exist"),
    ]);
    let backend = Arc::new(FakeBackend::default());
    let engine = engine(model, backend.clone());
    let thread = ThreadConfig::new("t1");

    let updates = run(&engine, TurnInput::Message("delete".into()), &thread).await;

    assert!(backend.executed_tools().is_empty());
    match &updates[1] {
        StreamUpdate::Messages { messages, .. } => {
            assert_eq!(messages[0].text(), "Error: unknown tool Reddit_DeleteEverything");
        }
        other => panic!("unexpected update: {other:?}"),
    }
}

#[tokio::test]
async fn test_model_error_ends_stream() {
    let engine = engine(ScriptedModel::failing(), Arc::new(FakeBackend::default()));
    let thread = ThreadConfig::new("t1");

    let items: Vec<_> = engine
        .stream(TurnInput::Message("hello".into()), &thread)
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    assert!(items[0].is_err());
}

#[tokio::test]
async fn test_threads_do_not_share_history() {
    let model = ScriptedModel::new([
        ChatMessage::assistant("one"),
        ChatMessage::assistant("two"),
    ]);
    let engine = engine(model.clone(), Arc::new(FakeBackend::default()));

    run(&engine, TurnInput::Message("a".into()), &ThreadConfig::new("t1")).await;
    run(&engine, TurnInput::Message("b".into()), &ThreadConfig::new("t2")).await;

    assert_eq!(model.last_request().messages, [ChatMessage::user("b")]);
}

#[test]
fn test_resume_on_unrecognized_interrupt_denies_call() {
    let mut checkpoint = Checkpoint::default();
    let mut pending = PendingCall::new(call("c1", "Reddit_SubmitTextPost"));
    pending.awaiting = Some(Interrupt::from_value(
        "int_1",
        json!({"tool_name": "Reddit.SubmitTextPost", "needs": "something else"}),
    ));
    checkpoint.pending.push(pending);

    apply_resume(&mut checkpoint, ResumePayload::Single(Decision::allow())).unwrap();

    let call = &checkpoint.pending[0];
    assert!(call.denied);
    assert!(!call.approved);
    assert!(call.awaiting.is_none());
}
