use crate::places::Coordinate;
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use color_eyre::Result;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

/// 進捗メッセージの受け口
pub type ProgressSink = Arc<dyn Fn(&str) + Send + Sync + 'static>;

/// ツール実行時に渡すセッション由来の情報。
/// ワーカーが1ターンごとに作り直すので、現在地はそのターン時点のスナップショット。
#[derive(Clone, Default)]
pub struct ToolContext {
    pub location: Option<Coordinate>,
    progress: Option<ProgressSink>,
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("location", &self.location)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl ToolContext {
    pub fn new(location: Option<Coordinate>) -> Self {
        Self { location, progress: None }
    }

    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// 進捗をログに残し、受け口があれば転送する
    pub fn report(&self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "places", progress = %message, "tool_progress");
        if let Some(sink) = &self.progress {
            sink(&message);
        }
    }
}

/// ランタイムで実行するツール関数の型。
/// 引数(JSON)とコンテキストを受け取り、結果(JSON)を返す。
pub type ToolHandler = Arc<dyn Fn(&Value, &ToolContext) -> Result<Value> + Send + Sync + 'static>;

/// JSON Schema (object) のパラメータ定義
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParameters(Value);

impl ToolParameters {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// `ToolParameters` のビルダー
#[derive(Debug, Default)]
pub struct ToolParametersBuilder {
    properties: Map<String, Value>,
    required: Vec<String>,
    additional_properties: Option<bool>,
}

impl ToolParametersBuilder {
    pub fn new_object() -> Self {
        Self::default()
    }

    pub fn add_string(mut self, name: &str, description: Option<&str>) -> Self {
        let mut prop = json!({ "type": "string" });
        if let Some(d) = description {
            prop["description"] = json!(d);
        }
        self.properties.insert(name.to_string(), prop);
        self
    }

    pub fn required(mut self, name: &str) -> Self {
        if !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
        self
    }

    pub fn additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = Some(allowed);
        self
    }

    pub fn build(self) -> ToolParameters {
        let mut schema = json!({
            "type": "object",
            "properties": Value::Object(self.properties),
            "required": self.required,
        });
        if let Some(allowed) = self.additional_properties {
            schema["additionalProperties"] = json!(allowed);
        }
        ToolParameters(schema)
    }
}

/// function calling に渡すメタデータと実行ハンドラをまとめた定義。
#[derive(Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: ToolParameters,
    pub strict: bool,
    handler: ToolHandler,
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("strict", &self.strict)
            .finish()
    }
}

impl ToolDefinition {
    pub fn new(
        name: &'static str,
        description: &'static str,
        parameters: ToolParameters,
        handler: ToolHandler,
    ) -> Self {
        Self { name, description, parameters, strict: false, handler }
    }

    /// SDK の `FunctionObject` に変換
    pub fn function_object(&self) -> FunctionObject {
        FunctionObject {
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            parameters: Some(self.parameters.as_value().clone()),
            strict: Some(self.strict),
        }
    }

    /// ChatCompletionTool 形式（APIへ渡す vector 用）
    pub fn as_chat_tool(&self) -> ChatCompletionTool {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: self.function_object(),
        }
    }

    /// ツールを実行
    pub fn execute(&self, args: &Value, ctx: &ToolContext) -> Result<Value> {
        (self.handler)(args, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn tool_definition_executes_closure_with_context() -> Result<()> {
        let params = ToolParametersBuilder::new_object()
            .add_string("name", Some("who to greet"))
            .required("name")
            .required("name")
            .additional_properties(false)
            .build();
        assert_eq!(params.as_value()["required"], json!(["name"]));
        assert_eq!(params.as_value()["additionalProperties"], json!(false));

        let tool = ToolDefinition::new(
            "greet",
            "Greet someone, mentioning whether a location is known",
            params,
            Arc::new(|v: &Value, ctx: &ToolContext| -> Result<Value> {
                let name = v.get("name").and_then(|n| n.as_str()).ok_or_else(|| color_eyre::eyre::eyre!("missing name"))?;
                Ok(json!({ "text": format!("hi {name}"), "located": ctx.location.is_some() }))
            }),
        );

        let ctx = ToolContext::new(Coordinate::new(1.0, 2.0));
        let out = tool.execute(&json!({"name": "ana"}), &ctx)?;
        assert_eq!(out["text"], "hi ana");
        assert_eq!(out["located"], true);
        assert!(tool.execute(&json!({}), &ctx).is_err());

        let chat_tool = tool.as_chat_tool();
        assert_eq!(chat_tool.function.name, "greet");
        Ok(())
    }

    #[test]
    fn report_forwards_to_sink() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink_seen = seen.clone();
        let ctx = ToolContext::default().with_progress(Arc::new(move |m: &str| sink_seen.lock().unwrap().push(m.to_string())));
        ctx.report("Geocoding location: Delhi...");
        assert_eq!(*seen.lock().unwrap(), vec!["Geocoding location: Delhi...".to_string()]);
    }
}
