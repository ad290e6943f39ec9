use crate::domain::model::{Order, ReferralCode, SessionToken};
use serde::Serialize;

pub const TOKEN_PRESENT: &str = "token_present";
pub const ORDERS_IS_ARRAY: &str = "orders_is_array";
pub const REFERRAL_CODE_PRESENT: &str = "referral_code_present";
pub const REFERRAL_CODE_MATCHES: &str = "referral_code_matches";
pub const DATABASE_REACHABLE: &str = "database_reachable";

/// 單一檢查的結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn pass(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: detail.into(),
        }
    }
}

pub fn token_present(token: &SessionToken) -> CheckResult {
    if token.is_empty() {
        CheckResult::fail(TOKEN_PRESENT, "login returned an empty token")
    } else {
        CheckResult::pass(TOKEN_PRESENT, format!("token received ({} chars)", token.as_str().len()))
    }
}

// 陣列形狀已由 adapter 保證，這裡只記錄筆數
pub fn orders_is_array(orders: &[Order]) -> CheckResult {
    CheckResult::pass(ORDERS_IS_ARRAY, format!("{} pending order(s)", orders.len()))
}

pub fn referral_code_present(code: Option<&ReferralCode>) -> CheckResult {
    match code {
        Some(code) if !code.is_empty() => {
            CheckResult::pass(REFERRAL_CODE_PRESENT, format!("referralCode = {}", code))
        }
        Some(_) => CheckResult::fail(REFERRAL_CODE_PRESENT, "registration returned an empty referralCode"),
        None => CheckResult::fail(REFERRAL_CODE_PRESENT, "registration response has no referralCode"),
    }
}

pub fn referral_code_matches(registered: &ReferralCode, profile: Option<&ReferralCode>) -> CheckResult {
    match profile {
        Some(code) if code == registered => {
            CheckResult::pass(REFERRAL_CODE_MATCHES, format!("/me returned the same code {}", code))
        }
        Some(code) => CheckResult::fail(
            REFERRAL_CODE_MATCHES,
            format!("/me returned {} but registration returned {}", code, registered),
        ),
        None => CheckResult::fail(REFERRAL_CODE_MATCHES, "/me response has no referralCode"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_present() {
        assert!(token_present(&SessionToken::new("abc")).passed);
        assert!(!token_present(&SessionToken::new("")).passed);
        assert!(!token_present(&SessionToken::new("   ")).passed);
    }

    #[test]
    fn test_orders_is_array_counts_orders() {
        let result = orders_is_array(&[]);
        assert!(result.passed);
        assert_eq!(result.detail, "0 pending order(s)");
    }

    #[test]
    fn test_referral_code_present() {
        let code = ReferralCode::new("REF42");
        assert!(referral_code_present(Some(&code)).passed);
        assert!(!referral_code_present(Some(&ReferralCode::new(""))).passed);
        assert!(!referral_code_present(None).passed);
    }

    #[test]
    fn test_referral_code_matches() {
        let registered = ReferralCode::new("REF42");
        assert!(referral_code_matches(&registered, Some(&ReferralCode::new("REF42"))).passed);

        let mismatch = referral_code_matches(&registered, Some(&ReferralCode::new("OTHER")));
        assert!(!mismatch.passed);
        assert!(mismatch.detail.contains("OTHER"));

        assert!(!referral_code_matches(&registered, None).passed);
    }
}
