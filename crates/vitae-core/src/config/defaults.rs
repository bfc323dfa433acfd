// --- Default value functions ---

pub(super) fn default_name() -> String {
    "Vitae".to_string()
}
pub(super) fn default_data_dir() -> String {
    "~/.vitae".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_true() -> bool {
    true
}
pub(super) fn default_timeout_secs() -> u64 {
    30
}
pub(super) fn default_openrouter_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}
pub(super) fn default_openrouter_model() -> String {
    "mistralai/mistral-7b-instruct:free".to_string()
}
pub(super) fn default_referer() -> String {
    "http://localhost:3000".to_string()
}
pub(super) fn default_title() -> String {
    "AI Portfolio Agent".to_string()
}
pub(super) fn default_temperature() -> f32 {
    0.7
}
pub(super) fn default_max_tokens() -> u32 {
    500
}
pub(super) fn default_huggingface_url() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}
pub(super) fn default_huggingface_model() -> String {
    "mistralai/Mistral-7B-Instruct-v0.1".to_string()
}
pub(super) fn default_db_path() -> String {
    "~/.vitae/data/vitae.db".to_string()
}
pub(super) fn default_api_host() -> String {
    "127.0.0.1".to_string()
}
pub(super) fn default_api_port() -> u16 {
    3000
}
