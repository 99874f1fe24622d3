/// 公共验证函数模块
/// 提供用户标识与视频标识的输入验证，供统计和视频路由共用。
use crate::constants::{MAX_USER_ID_CHARS, MAX_VIDEO_ID_CHARS};

/// 验证用户标识：1-128 字符，仅允许字母、数字和 . _ @ + - 字符
pub fn validate_user_id(user_id: &str) -> Result<(), &'static str> {
    if user_id.is_empty() {
        return Err("用户标识不能为空");
    }
    if user_id.chars().count() > MAX_USER_ID_CHARS {
        return Err("用户标识长度不能超过128个字符");
    }
    if !user_id.bytes().all(|b| {
        b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'@' || b == b'+' || b == b'-'
    }) {
        return Err("用户标识只能包含字母、数字和 . _ @ + - 字符");
    }
    Ok(())
}

/// 验证视频逻辑 ID：1-128 字符，仅允许字母、数字和 . _ - 字符，
/// 不得以点号开头，不得包含连续点号（防止路径逃逸）。
pub fn validate_video_id(video_id: &str) -> Result<(), &'static str> {
    if video_id.is_empty() {
        return Err("视频标识不能为空");
    }
    if video_id.chars().count() > MAX_VIDEO_ID_CHARS {
        return Err("视频标识长度不能超过128个字符");
    }
    if !video_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-')
    {
        return Err("视频标识只能包含字母、数字和 . _ - 字符");
    }
    if video_id.starts_with('.') || video_id.contains("..") {
        return Err("视频标识不能以点号开头或包含连续点号");
    }
    Ok(())
}
