use super::*;
use std::collections::HashMap;

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_parse_full_config() {
    let config: Config = toml::from_str(
        r#"
model = "anthropic/claude-sonnet-4-5"
user_id = "me@example.com"

[provider.anthropic]
api_key = "sk-ant"

[arcade]
base_url = "http://localhost:9099"

[tools]
toolkits = ["Reddit", "Math"]
limit = 20
require_approval = ["Reddit.SubmitTextPost"]
"#,
    )
    .unwrap();

    assert_eq!(config.model.as_deref(), Some("anthropic/claude-sonnet-4-5"));
    assert_eq!(
        config.provider.anthropic.unwrap().api_key.as_deref(),
        Some("sk-ant")
    );
    assert_eq!(config.tools.limit, Some(20));
    assert_eq!(config.arcade.base_url.as_deref(), Some("http://localhost:9099"));
}

#[test]
fn test_empty_config_parses() {
    let config: Config = toml::from_str("").unwrap();
    assert!(config.model.is_none());
    assert!(config.tools.toolkits.is_none());
}

#[test]
fn test_merge_project_wins() {
    let global: Config = toml::from_str(
        r#"
model = "gpt-4o"
user_id = "global@example.com"
[provider.openai]
api_key = "global-key"
base_url = "http://global"
[tools]
limit = 50
"#,
    )
    .unwrap();
    let project: Config = toml::from_str(
        r#"
user_id = "project@example.com"
[provider.openai]
api_key = "project-key"
[tools]
toolkits = ["Reddit"]
"#,
    )
    .unwrap();

    let merged = Config::merge(global, project);
    assert_eq!(merged.model.as_deref(), Some("gpt-4o"));
    assert_eq!(merged.user_id.as_deref(), Some("project@example.com"));
    let openai = merged.provider.openai.unwrap();
    assert_eq!(openai.api_key.as_deref(), Some("project-key"));
    assert_eq!(openai.base_url.as_deref(), Some("http://global"));
    assert_eq!(merged.tools.limit, Some(50));
    assert_eq!(merged.tools.toolkits, Some(vec!["Reddit".to_string()]));
}

#[test]
fn test_resolve_str_substitutes_env() {
    std::env::set_var("REDDIT_AGENT_TEST_SUBST", "secret");
    assert_eq!(
        Config::resolve_str("key-{env:REDDIT_AGENT_TEST_SUBST}-end"),
        "key-secret-end"
    );
    assert_eq!(Config::resolve_str("{env:REDDIT_AGENT_TEST_UNSET_VAR}"), "");
    assert_eq!(Config::resolve_str("no {env:closing"), "no {env:closing");
}

#[test]
fn test_resolve_str_does_not_expand_substituted_values() {
    std::env::set_var("REDDIT_AGENT_TEST_SELF_REF", "{env:REDDIT_AGENT_TEST_SELF_REF}");
    assert_eq!(
        Config::resolve_str("a-{env:REDDIT_AGENT_TEST_SELF_REF}-b"),
        "a-{env:REDDIT_AGENT_TEST_SELF_REF}-b"
    );

    std::env::set_var("REDDIT_AGENT_TEST_FIRST", "1");
    std::env::set_var("REDDIT_AGENT_TEST_SECOND", "2");
    assert_eq!(
        Config::resolve_str("{env:REDDIT_AGENT_TEST_FIRST}{env:REDDIT_AGENT_TEST_SECOND}"),
        "12"
    );
}

#[test]
fn test_user_id_precedence() {
    let config = Config {
        user_id: Some("file@example.com".into()),
        ..Config::default()
    };
    assert_eq!(
        config
            .user_id_with(env(&[("ARCADE_USER_ID", "env@example.com")]))
            .unwrap(),
        "env@example.com"
    );
    assert_eq!(config.user_id_with(env(&[])).unwrap(), "file@example.com");
}

#[test]
fn test_missing_user_id_message() {
    let err = Config::default().user_id_with(env(&[])).unwrap_err();
    assert_eq!(err, ConfigError::MissingUserId);
    assert_eq!(
        err.to_string(),
        "Missing ARCADE_USER_ID. Add it to your .env file."
    );
}

#[test]
fn test_model_precedence() {
    let config = Config {
        model: Some("gpt-4o-mini".into()),
        ..Config::default()
    };
    let vars = env(&[("OPENAI_MODEL", "gpt-4o")]);
    assert_eq!(config.model_name_with(Some("o3"), &vars).unwrap(), "o3");
    assert_eq!(config.model_name_with(None, &vars).unwrap(), "gpt-4o");
    assert_eq!(config.model_name_with(None, env(&[])).unwrap(), "gpt-4o-mini");
}

#[test]
fn test_missing_model_message() {
    let err = Config::default()
        .model_name_with(Some("  "), env(&[]))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing OPENAI_MODEL. Add it to your .env file."
    );
}

#[test]
fn test_tool_query_defaults() {
    let query = Config::default().tool_query("me".into(), &ToolOverrides::default());
    assert_eq!(query.toolkits, ["Reddit"]);
    assert!(query.tools.is_empty());
    assert_eq!(query.limit, 100);
    assert_eq!(
        query.require_approval,
        [
            "Reddit.CommentOnPost",
            "Reddit.ReplyToComment",
            "Reddit.SubmitTextPost"
        ]
    );
}

#[test]
fn test_tool_query_cli_overrides_file() {
    let config: Config = toml::from_str(
        r#"
[tools]
toolkits = ["Math"]
tools = ["Math.Sqrt"]
limit = 5
"#,
    )
    .unwrap();
    let overrides = ToolOverrides {
        toolkits: vec!["Reddit".into()],
        tools: Vec::new(),
        limit: Some(10),
    };
    let query = config.tool_query("me".into(), &overrides);
    assert_eq!(query.toolkits, ["Reddit"]);
    assert_eq!(query.tools, ["Math.Sqrt"]);
    assert_eq!(query.limit, 10);
}

#[test]
fn test_system_prompt_defaults_to_reddit_prompt() {
    assert_eq!(
        Config::default().system_prompt(),
        crate::prompt::REDDIT_SYSTEM_PROMPT
    );
    let config = Config {
        system_prompt: Some("Be brief.".into()),
        ..Config::default()
    };
    assert_eq!(config.system_prompt(), "Be brief.");
}
