// ==========================================
// 纺织家具生产经营系统 - 仓储层行解析工具
// ==========================================
// 统一 TEXT 列 → 时间/枚举 的解析与错误上抛
// 口径: DateTime 按 RFC3339 存储，NaiveDate 按 %Y-%m-%d 存储
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;

/// 构造列级解析失败错误（保留列号便于定位）
pub(crate) fn invalid_text(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

/// 解析 RFC3339 时间列
pub(crate) fn parse_utc(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| invalid_text(idx, format!("无效时间 '{}': {}", raw, e)))
}

/// 解析 %Y-%m-%d 日期列
pub(crate) fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| invalid_text(idx, format!("无效日期 '{}': {}", raw, e)))
}

/// 解析枚举存储码
pub(crate) fn parse_code<T>(
    idx: usize,
    raw: &str,
    label: &str,
    from_code: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    from_code(raw).ok_or_else(|| invalid_text(idx, format!("无效{}存储码 '{}'", label, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::OrderStatus;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(0, "2026-08-06").unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
        );
        assert!(parse_date(0, "06.08.2026").is_err());
    }

    #[test]
    fn test_parse_code() {
        let status = parse_code(2, "PAID", "订单状态", OrderStatus::from_code).unwrap();
        assert_eq!(status, OrderStatus::Paid);
        assert!(parse_code(2, "UNKNOWN", "订单状态", OrderStatus::from_code).is_err());
    }
}
