use rust_decimal::Decimal;

/// Decimal scale for all currency amounts (2 decimal places)
pub const SCALE: u32 = 2;

/// Currency rounding tolerance used for every "is this paid off" comparison.
///
/// Balances within 0.01 of zero are considered settled.
pub fn epsilon() -> Decimal {
    Decimal::new(1, SCALE)
}

/// Rounds an amount to the currency scale
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp(SCALE)
}

/// Outstanding balance, clamped at zero
pub fn remaining(original: Decimal, received: Decimal) -> Decimal {
    (original - received).max(Decimal::ZERO)
}

/// Whether a balance is settled within the currency tolerance
pub fn is_settled(original: Decimal, received: Decimal) -> bool {
    original - received <= epsilon()
}

/// Validates that an amount is non-negative and within the currency scale
pub fn validate_amount(amount: Decimal) -> Result<(), String> {
    if amount.scale() > SCALE {
        return Err(format!(
            "amounts must have at most {} decimal places, got {}",
            SCALE,
            amount.scale()
        ));
    }

    if amount < Decimal::ZERO {
        return Err("amount cannot be negative".to_string());
    }

    Ok(())
}
