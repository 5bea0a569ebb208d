pub const PLATFORM: &str = if cfg!(target_os = "windows") {
    "Windows"
} else if cfg!(target_os = "linux") {
    "Linux"
} else if cfg!(target_os = "macos") {
    "macOS"
} else {
    "Unknown"
};

pub const DEFAULT_AGENT_NAME: &str = "assistant";

pub const DEFAULT_SYSTEM_PROMPT: &str = const_format::formatcp!(
    r#"
You are a helpful assistant running inside a terminal chat session on {platform}.

- Answer directly and keep responses terminal-friendly: plain text, short
  paragraphs, no heavy formatting.
- When the user asks for code, prefer a single complete snippet over prose.
- If a request is ambiguous, ask one clarifying question before answering.
"#,
    platform = PLATFORM
);
