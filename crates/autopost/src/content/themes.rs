//! Theme catalog for articles and routine posts.

use serde::Serialize;

use crate::error::PlanError;

/// Separator between the parts of a theme name.
pub const THEME_NAME_SEPARATOR: &str = " × ";

/// A content category shared by the article and the routine posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    /// Stable lookup key.
    pub key: String,
    /// Display name, parts joined by [`THEME_NAME_SEPARATOR`].
    pub name: String,
    pub description: String,
    pub talking_points: Vec<String>,
}

impl Theme {
    #[must_use]
    pub fn new(key: &str, name: &str, description: &str, talking_points: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            talking_points: talking_points.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Name truncated at the first separator, used as a hashtag.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.name
            .split(THEME_NAME_SEPARATOR)
            .next()
            .unwrap_or(&self.name)
    }

    /// Fail fast on a theme that has nothing to talk about.
    pub fn ensure_talking_points(&self) -> Result<(), PlanError> {
        if self.talking_points.is_empty() {
            return Err(PlanError::EmptyTalkingPoints(self.key.clone()));
        }
        Ok(())
    }
}

/// Ordered, immutable set of themes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRegistry {
    themes: Vec<Theme>,
}

impl ThemeRegistry {
    /// Build a registry from themes in declaration order.
    #[must_use]
    pub fn new(themes: Vec<Theme>) -> Self {
        Self { themes }
    }

    /// The compiled-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            Theme::new(
                "relationships",
                "恋愛・人間関係 × 男性視点 × リアル語り",
                "非モテ、職場での立ち位置、彼女との関係、自己肯定感との戦いなどを等身大で語る。",
                &[
                    "20代後半の飲み会で感じた孤独感",
                    "職場で頼られたいけど距離感が難しい件",
                    "彼女の何気ない一言で救われた体験",
                    "自己肯定感を守るためにやった小さな習慣",
                ],
            ),
            Theme::new(
                "daily_emotion",
                "日常 × 感情 × 生活改善・気づき",
                "感情の揺らぎから生活改善のヒントを見つける。",
                &[
                    "朝起きられない問題を感情ログで解決した話",
                    "休日の虚無感を散歩で打ち消した気づき",
                    "仕事帰りのルーティンに温かい飲み物を入れた理由",
                    "スマホ時間を減らすための『強制オフライン』術",
                ],
            ),
            Theme::new(
                "ai_strategy",
                "AI活用 × 人生攻略（裏テーマ）",
                "AIをひっそり味方につけて、日常と人間関係を攻略する裏技。",
                &[
                    "AIで自分の感情パターンを見える化した話",
                    "ChatGPTに彼女とのLINEを添削してもらったエピソード",
                    "仕事の資料作りをAIで時短したら心の余裕ができた件",
                    "AI習慣化コーチを導入して三日坊主を卒業した話",
                ],
            ),
        ])
    }

    /// All themes, in declaration order.
    #[must_use]
    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    /// Look up a theme by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.key == key)
    }

    /// Look up a theme by key, as a plan error when absent.
    pub fn require(&self, key: &str) -> Result<&Theme, PlanError> {
        self.get(key)
            .ok_or_else(|| PlanError::UnknownTheme(key.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.themes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Themes for `slots` consecutive slots, round-robin in declaration order.
    pub fn cycle(&self, slots: usize) -> Result<Vec<&Theme>, PlanError> {
        if self.themes.is_empty() {
            return Err(PlanError::EmptyCatalog);
        }
        Ok((0..slots)
            .map(|i| &self.themes[i % self.themes.len()])
            .collect())
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
