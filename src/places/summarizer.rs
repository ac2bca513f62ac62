//! 検索結果を LLM で箇条書きにまとめる

use super::types::{PlacesResult, SearchError};
use crate::llm::Completion;
use std::sync::Arc;
use tracing::{instrument, warn};

const SUMMARY_INSTRUCTION: &str = "Summarize the nearby places from this JSON into a clear, bulleted list. \
Include the name and address. If no places are found, say so.";

/// 要約プロンプトを生成
pub fn summary_prompt(places_text: &str) -> String {
    format!("{SUMMARY_INSTRUCTION}\nJSON:\n{places_text}")
}

/// 検索結果（またはエラー文）を正規化したテキストにする
pub fn canonical_text(raw: &Result<PlacesResult, SearchError>) -> String {
    match raw {
        Ok(result) => serde_json::to_string_pretty(result).unwrap_or_else(|_| format!("{result:?}")),
        Err(e) => serde_json::to_string_pretty(&format!("Error fetching places: {e}"))
            .unwrap_or_else(|_| format!("Error fetching places: {e}")),
    }
}

/// LLM を使わずに箇条書きを作る（LLM失敗時・空応答時の代替）
pub fn render_fallback(raw: &Result<PlacesResult, SearchError>) -> String {
    match raw {
        Ok(result) if result.is_empty() => "No places were found.".to_string(),
        Ok(result) => result
            .places
            .iter()
            .map(|p| format!("- {}, {}", p.display_name, p.formatted_address))
            .collect::<Vec<_>>()
            .join("\n"),
        Err(e) => format!("Error fetching places: {e}"),
    }
}

pub struct Summarizer {
    llm: Arc<dyn Completion>,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn Completion>) -> Self {
        Self { llm }
    }

    /// 必ず空でない文字列を返す
    #[instrument(name = "summarize", skip_all)]
    pub fn summarize(&self, raw: &Result<PlacesResult, SearchError>) -> String {
        let prompt = summary_prompt(&canonical_text(raw));
        match self.llm.complete(&prompt) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(target: "places", "summary completion was blank; rendering locally");
                render_fallback(raw)
            }
            Err(e) => {
                warn!(target: "places", error = %e, "summary completion failed; rendering locally");
                render_fallback(raw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places::Place;
    use color_eyre::Result;
    use std::sync::Mutex;

    struct Recording {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl Completion for Recording {
        fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|e| color_eyre::eyre::eyre!(e))
        }
    }

    fn three() -> PlacesResult {
        PlacesResult {
            places: (1..=3)
                .map(|i| Place { display_name: format!("Cafe {i}"), formatted_address: format!("{i} Main St") })
                .collect(),
        }
    }

    #[test]
    fn prompt_carries_pretty_json() {
        let llm = Arc::new(Recording { reply: Ok("- Cafe 1".into()), prompts: Mutex::new(vec![]) });
        let s = Summarizer::new(llm.clone());
        let out = s.summarize(&Ok(three()));
        assert_eq!(out, "- Cafe 1");
        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("Summarize the nearby places"));
        assert!(prompts[0].contains("\"displayName\": \"Cafe 2\""));
    }

    #[test]
    fn error_text_is_passed_through() {
        let llm = Arc::new(Recording { reply: Ok("No places.".into()), prompts: Mutex::new(vec![]) });
        let s = Summarizer::new(llm.clone());
        s.summarize(&Err(SearchError::Failure("timed out".into())));
        assert!(llm.prompts.lock().unwrap()[0].contains("Error fetching places: timed out"));
    }

    #[test]
    fn llm_failure_renders_locally() {
        let llm = Arc::new(Recording { reply: Err("boom".into()), prompts: Mutex::new(vec![]) });
        let s = Summarizer::new(llm);
        let out = s.summarize(&Ok(three()));
        assert_eq!(out.lines().count(), 3);
        assert!(out.starts_with("- Cafe 1, 1 Main St"));
    }

    #[test]
    fn blank_reply_on_empty_result_says_none_found() {
        let llm = Arc::new(Recording { reply: Ok("  ".into()), prompts: Mutex::new(vec![]) });
        let s = Summarizer::new(llm);
        assert_eq!(s.summarize(&Ok(PlacesResult::default())), "No places were found.");
    }
}
