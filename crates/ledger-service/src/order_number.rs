//! 订单号校验
//!
//! 订单号是任意长度的十进制数字串，末位为 Luhn 校验位。

use crate::error::{LedgerError, Result};

/// Luhn 校验
///
/// 从校验位左侧的数字开始，每隔一位乘 2（大于 9 则减 9），
/// 所有数字之和能被 10 整除即为合法。非数字串或空串返回 false。
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() {
        return false;
    }

    let mut sum = 0u32;
    for (i, b) in digits.bytes().rev().enumerate() {
        if !b.is_ascii_digit() {
            return false;
        }
        let mut d = u32::from(b - b'0');
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }

    sum % 10 == 0
}

/// 解析外部传入的订单号
///
/// 去掉首尾空白后必须全部为数字，否则为格式错误；
/// 格式正确但校验位不符为 `InvalidOrderNumber`。
pub fn parse_order_number(raw: &str) -> Result<String> {
    let number = raw.trim();
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::MalformedOrderNumber(raw.to_string()));
    }
    if !luhn_valid(number) {
        return Err(LedgerError::InvalidOrderNumber(number.to_string()));
    }
    Ok(number.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luhn_known_numbers() {
        assert!(luhn_valid("125764357"));
        assert!(luhn_valid("79927398713"));
        assert!(luhn_valid("4561261212345467"));
        assert!(!luhn_valid("6432964973280"));
        assert!(!luhn_valid("1234567812345678"));
    }

    #[test]
    fn test_luhn_edge_cases() {
        assert!(luhn_valid("0"));
        assert!(!luhn_valid(""));
        assert!(!luhn_valid("12a4"));
    }

    #[test]
    fn test_luhn_accepts_numbers_beyond_u64() {
        // 24 位，超过 u64 表示范围
        assert!(luhn_valid("799273987137992739871308"));
    }

    #[test]
    fn test_parse_order_number() {
        assert_eq!(parse_order_number(" 79927398713\n").unwrap(), "79927398713");

        assert!(matches!(
            parse_order_number("12-34"),
            Err(LedgerError::MalformedOrderNumber(_))
        ));
        assert!(matches!(
            parse_order_number("   "),
            Err(LedgerError::MalformedOrderNumber(_))
        ));
        assert!(matches!(
            parse_order_number("6432964973280"),
            Err(LedgerError::InvalidOrderNumber(_))
        ));
    }
}
