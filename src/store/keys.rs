pub fn user_stats_key(user_id: &str) -> String {
    user_id.to_string()
}
