//! エージェントに公開する唯一のツール: 位置解決 → 検索 → 要約

use super::geocoder::Geocoder;
use super::resolver::{LocationResolver, ResolveStep};
use super::search::PlacesSearch;
use super::summarizer::Summarizer;
use crate::llm::{Completion, ToolContext, ToolDefinition, ToolParametersBuilder};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

pub const PLACES_TOOL_NAME: &str = "places_search";

pub const PLACES_TOOL_DESCRIPTION: &str = "Use this tool to find information about places like restaurants or cafes. \
It can search near the user's current location or in a specific city if mentioned (e.g., 'restaurants in Delhi').";

pub struct PlacesTool {
    resolver: LocationResolver,
    search: Arc<dyn PlacesSearch>,
    summarizer: Summarizer,
    radius_m: u32,
}

impl PlacesTool {
    pub fn new(
        llm: Arc<dyn Completion>,
        geocoder: Arc<dyn Geocoder>,
        search: Arc<dyn PlacesSearch>,
        radius_m: u32,
    ) -> Self {
        Self {
            resolver: LocationResolver::new(llm.clone(), geocoder),
            search,
            summarizer: Summarizer::new(llm),
            radius_m,
        }
    }

    /// 常に空でない回答文を返す。失敗もすべて文字列で返す。
    #[instrument(name = "places_tool_run", skip(self, ctx))]
    pub fn run(&self, query: &str, ctx: &ToolContext) -> String {
        let center = self.resolver.resolve_with(query, ctx.location, |step| match step {
            ResolveStep::Geocoding(phrase) => ctx.report(format!("Geocoding location: {phrase}...")),
            ResolveStep::GeocodeFailed(detail) => ctx.report(format!("Geocoding failed: {detail}")),
            ResolveStep::UsingSessionLocation(_) => {}
        });
        let center = match center {
            Ok(c) => c,
            Err(e) => {
                info!(target: "places", reason = %e, "location unresolved");
                return e.to_string();
            }
        };

        ctx.report(format!("Searching for '{query}' near {center}..."));
        // 抽出した地名ではなく元の質問文をそのまま検索語にする
        let raw = self.search.search(query, center, self.radius_m);
        match &raw {
            Ok(r) => info!(target: "places", count = r.len(), "places_found"),
            Err(e) => info!(target: "places", error = %e, "places_search_failed"),
        }
        self.summarizer.summarize(&raw)
    }
}

/// `PlacesTool` をエージェント用のツール定義に包む
pub fn build_places_search_tool(tool: Arc<PlacesTool>) -> ToolDefinition {
    let parameters = ToolParametersBuilder::new_object()
        .add_string(
            "query",
            Some("The user's request about places, including any city or area they mentioned"),
        )
        .required("query")
        .additional_properties(false)
        .build();

    ToolDefinition::new(
        PLACES_TOOL_NAME,
        PLACES_TOOL_DESCRIPTION,
        parameters,
        Arc::new(move |args: &Value, ctx: &ToolContext| -> color_eyre::Result<Value> {
            let query = match args.get("query").and_then(|v| v.as_str()) {
                Some(s) if !s.trim().is_empty() => s,
                _ => return Ok(json!({"error": "query is required string"})),
            };
            Ok(json!({ "answer": tool.run(query, ctx) }))
        }),
    )
}
