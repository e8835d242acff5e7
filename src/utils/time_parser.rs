use chrono::{DateTime, Duration, Utc};

/// 过期时间解析器
pub struct TimeParser;

impl TimeParser {
    /// 解析时间字符串，支持多种格式：
    /// - RFC3339 格式：2023-10-01T12:00:00Z
    /// - 毫秒时间戳：1735689600000
    /// - 相对时间：1d, 2w, 3M, 1y, 1h30m, 2d12h
    pub fn parse_expire_time(input: &str) -> Result<DateTime<Utc>, String> {
        Self::parse_expire_time_from(input, Utc::now())
    }

    /// 以 `now` 为基准解析，便于测试
    pub fn parse_expire_time_from(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
        let input = input.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(dt.with_timezone(&Utc));
        }

        // 纯数字视为毫秒时间戳（与存储格式一致）
        if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
            return input
                .parse::<i64>()
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .ok_or_else(|| format!("Invalid millisecond timestamp: '{}'", input));
        }

        Self::parse_relative_time(input, now)
    }

    fn parse_relative_time(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
        let mut total_duration = Duration::zero();
        let mut remaining = input;

        while !remaining.is_empty() {
            let num_len = remaining
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(remaining.len());
            if num_len == 0 {
                return Err(format!("Invalid time format: '{}'", input));
            }

            let num: i64 = remaining[..num_len]
                .parse()
                .map_err(|_| format!("Invalid number: '{}'", &remaining[..num_len]))?;
            remaining = &remaining[num_len..];

            let unit_len = remaining
                .find(|c: char| !c.is_alphabetic())
                .unwrap_or(remaining.len());
            if unit_len == 0 {
                return Err(format!("Missing time unit after '{}'", num));
            }
            let unit = &remaining[..unit_len];

            // 单位区分大小写：M 为月，m 为分钟
            let duration = match unit {
                "M" | "month" | "months" => Duration::days(num * 30),
                _ => match unit.to_lowercase().as_str() {
                    "s" | "sec" | "second" | "seconds" => Duration::seconds(num),
                    "m" | "min" | "minute" | "minutes" => Duration::minutes(num),
                    "h" | "hour" | "hours" => Duration::hours(num),
                    "d" | "day" | "days" => Duration::days(num),
                    "w" | "week" | "weeks" => Duration::weeks(num),
                    "y" | "year" | "years" => Duration::days(num * 365),
                    _ => return Err(format!("Unsupported time unit: '{}'", unit)),
                },
            };

            total_duration += duration;
            remaining = &remaining[unit_len..];
        }

        if total_duration == Duration::zero() {
            return Err("Time interval cannot be zero".to_string());
        }

        now.checked_add_signed(total_duration)
            .ok_or_else(|| "Expiration time out of range".to_string())
    }
}
