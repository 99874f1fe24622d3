pub const USER_STATS: &str = "user_stats";
pub const META: &str = "meta";
