//! Business rules independent from process state.

use std::collections::HashSet;

use super::{CaptureMode, PaymentKind};

/// Injectable payment rules, read-only after construction.
///
/// The defaults allow every currency, permit immediate capture exactly when
/// the mode is [`CaptureMode::Immediate`], and never force SCA.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    /// Allowed currency codes. `None` allows all.
    supported_currencies: Option<HashSet<String>>,

    /// Force strong customer authentication at creation time.
    force_sca: bool,
}

impl Policy {
    /// Creates the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts supported currencies to the given set.
    pub fn allow_only(codes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            supported_currencies: Some(
                codes
                    .into_iter()
                    .map(|c| c.into().to_ascii_uppercase())
                    .collect(),
            ),
            force_sca: false,
        }
    }

    /// Returns a copy of this policy that always requires SCA.
    pub fn with_forced_sca(mut self) -> Self {
        self.force_sca = true;
        self
    }

    /// Whether capture is allowed directly from the created state, without
    /// a prior hold.
    pub fn allow_immediate_capture(&self, _kind: PaymentKind, mode: CaptureMode) -> bool {
        mode == CaptureMode::Immediate
    }

    /// Whether the currency is allowed.
    pub fn is_currency_supported(&self, code: &str) -> bool {
        match &self.supported_currencies {
            None => true,
            Some(set) => set.contains(&code.to_ascii_uppercase()),
        }
    }

    /// Whether SCA must be required at creation time. Extension point for
    /// amount- or region-based rules; the static policy only honors the
    /// forced flag.
    pub fn should_require_sca(&self, _kind: PaymentKind, _mode: CaptureMode) -> bool {
        self.force_sca
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_all_currencies() {
        let policy = Policy::new();
        assert!(policy.is_currency_supported("USD"));
        assert!(policy.is_currency_supported("XTS"));
    }

    #[test]
    fn allow_only_restricts() {
        let policy = Policy::allow_only(["usd", "EUR"]);
        assert!(policy.is_currency_supported("USD"));
        assert!(policy.is_currency_supported("eur"));
        assert!(!policy.is_currency_supported("GBP"));
    }

    #[test]
    fn immediate_capture_follows_mode() {
        let policy = Policy::new();
        assert!(policy.allow_immediate_capture(PaymentKind::OneTime, CaptureMode::Immediate));
        assert!(policy.allow_immediate_capture(PaymentKind::Recurring, CaptureMode::Immediate));
        assert!(!policy.allow_immediate_capture(PaymentKind::OneTime, CaptureMode::Manual));
    }

    #[test]
    fn sca_is_forced_only_when_configured() {
        let policy = Policy::new();
        assert!(!policy.should_require_sca(PaymentKind::OneTime, CaptureMode::Immediate));

        let forced = Policy::new().with_forced_sca();
        assert!(forced.should_require_sca(PaymentKind::OneTime, CaptureMode::Immediate));
    }
}
