/// CAS（Compare-And-Swap）操作最大重试次数
pub const MAX_CAS_RETRIES: u32 = 20;

/// 用户标识最大字符数
pub const MAX_USER_ID_CHARS: usize = 128;

/// 视频逻辑 ID 最大字符数
pub const MAX_VIDEO_ID_CHARS: usize = 128;

/// 视频文件统一扩展名
pub const VIDEO_EXTENSION: &str = ".mp4";

/// 视频流式读取缓冲区大小（字节）
pub const STREAM_BUF_BYTES: usize = 64 * 1024;

/// 允许的统计字段名列表（错误提示用）
pub const ALLOWED_STAT_NAMES: &str = "'training', 'easy', 'medium', 'hard'";
