// Prompt template for the aggressiveness rating.
//
// The template holds a single `{text}` placeholder that is replaced with the
// post verbatim. Other braces are literal, so the JSON example in the
// instructions needs no escaping.

use std::path::Path;

use anyhow::{Context, Result};

/// Placeholder replaced with the post text.
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Built-in rubric (Japanese). The model answers the `reason` in the
/// prompt's language, about 40 characters long.
const DEFAULT_TEMPLATE: &str = r#"
あなたはソーシャルメディアの投稿を分析し、その攻撃性を評価する専門家です。
以下の基準に従って、与えられた文章の攻撃性スコアを決定し、その理由を説明してください。

# 評価基準:
0: 攻撃性なし。
1-3: 軽度の攻撃性（例: 皮肉、無神経な表現）。
4-6: 中程度の攻撃性（例: 明確な批判、侮辱）。
7-9: 高度の攻撃性（例: 強い敵意、脅迫）。
10: 極度の攻撃性（例: 暴力の助長、深刻な人権侵害）。

# 分析対象の文章:
---
{text}
---

# 出力形式:
必ず以下のJSON形式で回答してください。
{
  "score": [0-10の整数],
  "reason": "なぜそのスコアを付けたのかを40文字程度で具体的に説明"
}
"#;

/// A prompt with one `{text}` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Build a template, rejecting ones without a `{text}` slot.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(TEXT_PLACEHOLDER) {
            anyhow::bail!("Prompt template is missing the {TEXT_PLACEHOLDER} placeholder");
        }
        Ok(Self { template })
    }

    /// Load a template from a text file.
    pub fn load(path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt template {}", path.display()))?;
        Self::new(template).with_context(|| format!("Invalid prompt template {}", path.display()))
    }

    /// Substitute `text` into the template.
    pub fn render(&self, text: &str) -> String {
        self.template.replace(TEXT_PLACEHOLDER, text)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}
