//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Request gate constants
pub mod throttle {
    /// Minimum interval between two accepted questions from one session (seconds)
    pub const WINDOW_SECS: f64 = 5.0;

    /// Tracked sessions above which expired entries are pruned on admission
    pub const PRUNE_THRESHOLD: usize = 10_000;
}

/// Provider chain constants
pub mod chain {
    /// Source identifier reported when every provider failed
    pub const FALLBACK_SOURCE: &str = "fallback";

    /// Answer returned when every configured provider failed
    pub const FALLBACK_MESSAGE: &str = "申し訳ありません。現在、当AIチャットサービスはシステム上の問題により、\
すべてのAIエンジンへの接続が停止しています。早急に復旧作業を進めておりますので、\
しばらく時間をおいてから再度お試しください。ご不便をおかけし、誠に申し訳ございません。";
}

/// Provider defaults
pub mod provider {
    pub const PRIMARY_NAME: &str = "openai";
    pub const PRIMARY_API_BASE: &str = "https://api.openai.com/v1";
    pub const PRIMARY_MODEL: &str = "gpt-4o-mini-2024-07-18";
    pub const PRIMARY_API_KEY_ENV: &str = "OPENAI_API_KEY";
    pub const PRIMARY_TIMEOUT_SECS: u64 = 30;

    pub const SECONDARY_NAME: &str = "openrouter";
    pub const SECONDARY_API_BASE: &str = "https://openrouter.ai/api/v1";
    pub const SECONDARY_MODEL: &str = "meta-llama/llama-4-maverick:free";
    pub const SECONDARY_API_KEY_ENV: &str = "OPENROUTER_API_KEY";
    pub const SECONDARY_TIMEOUT_SECS: u64 = 20;

    /// Maximum characters of an error body kept in failure reasons
    pub const ERROR_BODY_PREVIEW_CHARS: usize = 200;
}

/// Response analyzer constants
pub mod analyzer {
    /// Literal identifying the promoted club in generated answers
    pub const DEFAULT_MARKER: &str = "物理研究部";

    /// Rank prefixes in match order: (prefix, rank)
    pub const RANK_PREFIXES: [(&str, u8); 6] = [
        ("1.", 1),
        ("1、", 1),
        ("2.", 2),
        ("2、", 2),
        ("3.", 3),
        ("3、", 3),
    ];
}

/// Telemetry collector constants
pub mod telemetry {
    pub const DEFAULT_ENDPOINT: &str = "https://docs.google.com/forms/d/e/1FAIpQLSf03n6xv1fLukql1FsogaT4VD0MW07Q7vhF3GG6Gc4GaFHHSg/formResponse";
    pub const QUESTION_FIELD: &str = "entry.1028184207";
    pub const ANSWER_FIELD: &str = "entry.1966575961";
    pub const RANK_FIELD: &str = "entry.2026372673";

    /// Delivery timeout (seconds)
    pub const TIMEOUT_SECS: u64 = 5;

    /// Maximum characters of a collector response body kept in logs
    pub const BODY_PREVIEW_CHARS: usize = 200;
}

/// HTTP surface constants
pub mod server {
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 5000;

    /// Cookie carrying the session identifier
    pub const SESSION_COOKIE: &str = "clubguide_session";

    pub const GREETING: &str = "こんにちは、新入生！あなたの興味や得意なこと、挑戦したいことを教えてください。AIがあなたにぴったりの部活をランキング形式で推薦します！";
    pub const EMPTY_QUESTION_MESSAGE: &str = "質問を入力してください。";
    pub const THROTTLED_MESSAGE: &str =
        "質問の送信間隔が短すぎます。前の質問から5秒以上あけてから、もう一度送信してください。";
    pub const NO_PROVIDERS_MESSAGE: &str =
        "AIエンジンの認証情報が設定されていないため、現在このサービスは利用できません。";
    pub const INTERNAL_ERROR_MESSAGE: &str =
        "AIからの応答処理中に予期せぬエラーが発生しました。時間をおいて再度お試しください。";
}
